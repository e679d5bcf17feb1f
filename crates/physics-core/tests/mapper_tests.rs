// Host-side tests for value quantization, the deadband and send-failure handling.

use physics_core::*;

/// Refuses the first `failures` sends, then records like `MemorySink`.
struct FlakySink {
    failures: usize,
    inner: MemorySink,
}

impl MidiSink for FlakySink {
    fn send(&mut self, msg: &MidiMessage) -> Result<(), SendError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(SendError::Transmit {
                device: "flaky".to_string(),
                reason: "buffer full".to_string(),
            });
        }
        self.inner.send(msg)
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

fn cc(n: u8) -> ControllerNumber {
    ControllerNumber::new(n).unwrap()
}

fn cc_binding() -> MidiBinding {
    MidiBinding::controller(cc(74), Channel::default(), (0.0, 127.0))
}

#[test]
fn same_quantized_value_is_sent_once() {
    let mut binding = cc_binding();
    let mut sink = MemorySink::new();
    assert_eq!(binding.push(10.2, &mut sink), PushOutcome::Sent(10));
    assert_eq!(binding.push(10.4, &mut sink), PushOutcome::Unchanged);
    assert_eq!(binding.push(9.6, &mut sink), PushOutcome::Unchanged);
    assert_eq!(binding.push(11.0, &mut sink), PushOutcome::Sent(11));
    assert_eq!(sink.values_for(Target::Controller(cc(74))), vec![10, 11]);
    assert_eq!(binding.last_sent(), Some(11));
}

#[test]
fn failed_send_is_retried_next_frame() {
    let mut binding = cc_binding();
    let mut sink = FlakySink {
        failures: 2,
        inner: MemorySink::new(),
    };
    assert!(matches!(binding.push(5.0, &mut sink), PushOutcome::Failed(_)));
    assert_eq!(binding.last_sent(), None);
    assert!(matches!(binding.push(5.0, &mut sink), PushOutcome::Failed(_)));
    assert_eq!(binding.push(5.0, &mut sink), PushOutcome::Sent(5));
    assert_eq!(binding.push(5.0, &mut sink), PushOutcome::Unchanged);
    assert_eq!(sink.inner.messages.len(), 1);
}

#[test]
fn null_sink_reports_not_connected() {
    let mut binding = cc_binding();
    assert_eq!(
        binding.push(64.0, &mut NullSink),
        PushOutcome::Failed(SendError::NotConnected)
    );
    assert_eq!(NullSink.describe(), "Not Connected");
}

#[test]
fn retargeting_resends_current_value() {
    let mut binding = cc_binding();
    let mut sink = MemorySink::new();
    binding.push(40.0, &mut sink);
    binding.set_target(Target::Controller(cc(80)));
    assert_eq!(binding.push(40.0, &mut sink), PushOutcome::Sent(40));
    assert_eq!(sink.values_for(Target::Controller(cc(80))), vec![40]);

    binding.set_channel(Channel::new(10).unwrap());
    assert_eq!(binding.push(40.0, &mut sink), PushOutcome::Sent(40));
    assert_eq!(sink.messages.last().unwrap().channel.number(), 10);

    binding.set_device(DeviceId::new("Synth"));
    assert_eq!(binding.push(40.0, &mut sink), PushOutcome::Sent(40));
    assert_eq!(sink.messages.last().unwrap().device.as_str(), "Synth");
    assert_eq!(binding.push(40.0, &mut sink), PushOutcome::Unchanged);
}

#[test]
fn quantize_rescales_rounds_and_clamps() {
    assert_eq!(quantize(0.5, (0.0, 1.0), OutputRange::Controller), 64);
    assert_eq!(quantize(-3.0, (0.0, 1.0), OutputRange::Controller), 0);
    assert_eq!(quantize(9.0, (0.0, 1.0), OutputRange::Controller), 127);
    assert_eq!(quantize(0.5, (0.0, 1.0), OutputRange::PitchBend), 0);
    assert_eq!(quantize(1.0, (-1.0, 1.0), OutputRange::PitchBend), 8192);
    // inverted domains flip the direction
    assert_eq!(quantize(0.0, (1.0, 0.0), OutputRange::Controller), 127);
}

#[test]
fn degenerate_inputs_stay_in_range() {
    assert_eq!(quantize(5.0, (2.0, 2.0), OutputRange::Controller), 0);
    assert_eq!(quantize(5.0, (2.0, 2.0), OutputRange::PitchBend), -8192);
    let nan = quantize(f32::NAN, (0.0, 1.0), OutputRange::Controller);
    assert!((0..=127).contains(&nan));
    assert_eq!(quantize(f32::INFINITY, (0.0, 1.0), OutputRange::PitchBend), 8192);
}
