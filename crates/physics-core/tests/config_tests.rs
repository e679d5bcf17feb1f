// Host-side tests for configuration parsing, validation and module set-up.

use physics_core::*;

#[test]
fn partial_json_keeps_defaults() {
    let config = Config::from_json_str(
        r#"{
            "midi": { "channel": 3 },
            "gravity": { "preset": "black-hole" },
            "pendulum": { "mode": "pitch-bend" }
        }"#,
    )
    .unwrap();
    assert_eq!(config.midi.channel, 3);
    assert_eq!(config.midi.device, None);
    assert_eq!(config.gravity.preset, GravityPreset::BlackHole);
    assert_eq!(config.gravity.controllers, [74, 75, 76]);
    assert_eq!(config.pendulum.mode, OutputMode::PitchBend);
    assert_eq!(config.particle, ParticleSection::default());
}

#[test]
fn empty_object_is_default() {
    assert_eq!(Config::from_json_str("{}").unwrap(), Config::default());
}

#[test]
fn cc_alias_for_controller_mode() {
    let config = Config::from_json_str(r#"{ "pendulum": { "mode": "cc" } }"#).unwrap();
    assert_eq!(config.pendulum.mode, OutputMode::Controller);
}

#[test]
fn unknown_names_are_parse_errors() {
    let err = Config::from_json_str(r#"{ "gravity": { "preset": "neptune" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(Config::from_json_str("not json").is_err());
}

#[test]
fn sanitize_replaces_invalid_values_with_defaults() {
    let mut config = Config::default();
    config.midi.channel = 0;
    config.gravity.controllers = [74, 200, 76];
    config.particle.temperature = 1.5;
    config.particle.width = 50.0;
    config.pendulum.length = f32::NAN;

    let errors = config.sanitize();
    assert_eq!(errors.len(), 5, "{errors:?}");
    assert!(errors.contains(&ConfigError::Channel(0)));
    assert!(errors.contains(&ConfigError::Controller(200)));

    assert_eq!(config.midi.channel, 1);
    assert_eq!(config.gravity.controllers, [74, 75, 76]);
    assert_eq!(config.particle.temperature, 0.5);
    assert_eq!(config.particle.width, 400.0);
    assert_eq!(config.pendulum.length, 200.0);
    assert!(config.sanitize().is_empty());
}

#[test]
fn valid_config_is_untouched() {
    let mut config = Config::default();
    config.midi.channel = 16;
    config.particle.temperature = 0.0;
    config.pendulum.length = 300.0;
    let before = config.clone();
    assert!(config.sanitize().is_empty());
    assert_eq!(config, before);
}

#[test]
fn modules_pick_up_configuration() {
    let mut config = Config::default();
    config.midi.channel = 5;
    config.gravity.preset = GravityPreset::Moon;
    config.pendulum.mode = OutputMode::PitchBend;
    config.pendulum.length = 120.0;
    config.particle.temperature = 0.9;

    let gravity = GravityModule::from_config(&config);
    assert_eq!(gravity.preset, GravityPreset::Moon);
    assert!(gravity.sliders.iter().all(|s| s.binding.channel.number() == 5));

    let pendulum = PendulumModule::from_config(&config);
    assert_eq!(pendulum.mode, OutputMode::PitchBend);
    assert_eq!(pendulum.params.length, 120.0);

    let particle = ParticleModule::from_config(&config);
    assert_eq!(particle.temperature, 0.9);
}

#[test]
fn runtime_setters_reject_bad_values() {
    let config = Config::default();
    let mut gravity = GravityModule::from_config(&config);
    assert_eq!(gravity.set_controller(0, 200), Err(ConfigError::Controller(200)));
    let cc74 = Target::Controller(ControllerNumber::new(74).unwrap());
    assert_eq!(gravity.sliders[0].binding.target, cc74);

    let mut pendulum = PendulumModule::from_config(&config);
    assert!(pendulum.set_length(f32::NAN).is_err());
    assert_eq!(pendulum.params.length, 200.0);

    let mut particle = ParticleModule::from_config(&config);
    assert!(particle.set_temperature(-0.1).is_err());
    assert_eq!(particle.temperature, 0.5);
}

#[test]
fn routing_addresses_every_binding() {
    let config = Config::default();
    let device = DeviceId::new("IAC Driver Bus 1");
    let channel = Channel::new(9).unwrap();
    let modules: Vec<Box<dyn Simulation>> = vec![
        Box::new(GravityModule::from_config(&config)),
        Box::new(ParticleModule::from_config(&config)),
        Box::new(PendulumModule::from_config(&config)),
    ];
    for mut module in modules {
        module.route_output(&device, channel);
        let mut sink = MemorySink::new();
        module.step(1.0 / 60.0, &mut sink);
        assert!(!sink.messages.is_empty(), "{}", module.name());
        for msg in &sink.messages {
            assert_eq!(msg.device, device, "{}", module.name());
            assert_eq!(msg.channel, channel, "{}", module.name());
        }
    }
}

#[test]
fn preset_names_round_trip() {
    for preset in GravityPreset::ALL {
        assert_eq!(preset.to_string().parse::<GravityPreset>(), Ok(preset));
        assert_eq!(preset.label().parse::<GravityPreset>(), Ok(preset));
    }
}
