// Host-side tests for the gravity sliders: decay law and end-to-end CC output.

use physics_core::constants::{CC_MAX, FRAME_DT};
use physics_core::*;

fn controllers() -> [ControllerNumber; 3] {
    [74, 75, 76].map(|cc| ControllerNumber::new(cc).unwrap())
}

/// Frames until the slider lands on exactly 0, checking monotonicity on the way.
fn frames_to_rest(start: f32, preset: GravityPreset) -> u32 {
    let (mut p, mut v) = (start, 0.0);
    let mut frames = 0;
    while p != 0.0 {
        let (np, nv) = step_gravity(p, v, preset, FRAME_DT);
        assert!(np <= p, "{preset}: {p} rose to {np}");
        assert!(np >= 0.0, "{preset}: {np} below zero");
        p = np;
        v = nv;
        frames += 1;
        assert!(frames < 10_000, "{preset} never settled from {start}");
    }
    frames
}

#[test]
fn decay_is_monotone_for_every_preset() {
    for preset in GravityPreset::ALL {
        if preset == GravityPreset::ZeroG {
            continue;
        }
        for start in [1.0, 10.0, 63.5, 64.0, 100.0, 127.0] {
            frames_to_rest(start, preset);
        }
    }
}

#[test]
fn zero_g_leaves_sliders_where_they_are() {
    let (mut p, mut v) = (93.0, 0.0);
    for _ in 0..600 {
        (p, v) = step_gravity(p, v, GravityPreset::ZeroG, FRAME_DT);
    }
    assert_eq!((p, v), (93.0, 0.0));
}

#[test]
fn black_hole_reaches_exact_zero_within_bound() {
    let bound = GravityPreset::BlackHole.settle_frames().unwrap();
    assert_eq!(bound, 36);
    for start in 0..=CC_MAX {
        let frames = frames_to_rest(start as f32, GravityPreset::BlackHole);
        assert!(frames <= bound, "start {start} took {frames} frames");
    }
}

#[test]
fn every_preset_settles_within_its_bound() {
    for preset in GravityPreset::ALL {
        let Some(bound) = preset.settle_frames() else {
            continue;
        };
        for start in 0..=CC_MAX {
            let frames = frames_to_rest(start as f32, preset);
            assert!(frames <= bound, "{preset} from {start}: {frames} > {bound}");
        }
    }
}

#[test]
fn stronger_presets_settle_faster() {
    let bounds: Vec<u32> = GravityPreset::ALL
        .iter()
        .filter_map(|p| p.settle_frames())
        .collect();
    assert!(bounds.windows(2).all(|w| w[0] > w[1]), "{bounds:?}");
}

#[test]
fn earth_drag_to_top_then_release_falls_to_zero() {
    let mut module = GravityModule::new(GravityPreset::Earth, controllers(), Channel::default());
    let mut sink = MemorySink::new();
    let target = Target::Controller(ControllerNumber::new(74).unwrap());

    // press on the handle of slider 0, drag above the track, hold for a bit
    let track = slider_track(0);
    let x = track.track.center().x;
    let handle_y = track.handle_y(module.sliders[0].value / CC_MAX as f32);
    module.handle_pointer(PointerEvent::down(x, handle_y));
    module.handle_pointer(PointerEvent::moved(x, track.track.origin.y - 50.0));
    for _ in 0..5 {
        module.step(FRAME_DT, &mut sink);
    }
    assert_eq!(module.sliders[0].value, 127.0);
    assert_eq!(sink.values_for(target).last(), Some(&127));

    module.handle_pointer(PointerEvent::up(x, track.track.origin.y - 50.0));
    let held = sink.values_for(target).len();

    let bound = GravityPreset::Earth.settle_frames().unwrap();
    let mut frames_to_zero = None;
    for frame in 1..=bound + 10 {
        module.step(FRAME_DT, &mut sink);
        if frames_to_zero.is_none() && module.sliders[0].value == 0.0 {
            frames_to_zero = Some(frame);
        }
    }
    let frames = frames_to_zero.expect("slider never reached zero");
    assert!(frames <= bound, "{frames} > {bound}");

    let falling = &sink.values_for(target)[held - 1..];
    assert_eq!(falling[0], 127);
    assert!(falling.len() > 2);
    assert!(
        falling.windows(2).all(|w| w[1] < w[0]),
        "not strictly decreasing: {falling:?}"
    );
    assert_eq!(falling.last(), Some(&0));
}

#[test]
fn held_slider_does_not_decay() {
    let mut module = GravityModule::new(GravityPreset::BlackHole, controllers(), Channel::default());
    let mut sink = MemorySink::new();
    module.grab(1, 90.0);
    for _ in 0..120 {
        module.step(FRAME_DT, &mut sink);
    }
    assert_eq!(module.sliders[1].value, 90.0);
    // the free sliders have long since fallen
    assert_eq!(module.sliders[0].value, 0.0);
    module.release(1);
    for _ in 0..60 {
        module.step(FRAME_DT, &mut sink);
    }
    assert_eq!(module.sliders[1].value, 0.0);
}

#[test]
fn preset_control_picks_closest_preset() {
    let mut module = GravityModule::new(GravityPreset::Earth, controllers(), Channel::default());
    let track = preset_track().track;
    let x = track.center().x;
    let handle_y = preset_track().handle_y(GravityPreset::Earth.strength());
    module.handle_pointer(PointerEvent::down(x, handle_y));
    module.handle_pointer(PointerEvent::moved(x, track.origin.y - 100.0));
    module.handle_pointer(PointerEvent::up(x, track.origin.y - 100.0));
    assert_eq!(module.preset, GravityPreset::BlackHole);
}

#[test]
fn controller_change_resends_current_value() {
    let mut module = GravityModule::new(GravityPreset::ZeroG, controllers(), Channel::default());
    let mut sink = MemorySink::new();
    module.step(FRAME_DT, &mut sink);
    assert_eq!(sink.messages.len(), 3);
    module.step(FRAME_DT, &mut sink);
    assert_eq!(sink.messages.len(), 3);

    assert!(module.set_controller(2, 200).is_err());
    module.set_controller(2, 20).unwrap();
    module.step(FRAME_DT, &mut sink);
    let cc20 = Target::Controller(ControllerNumber::new(20).unwrap());
    assert_eq!(sink.values_for(cc20), vec![64]);
}

#[test]
fn status_names_preset_and_values() {
    let module = GravityModule::new(GravityPreset::Moon, controllers(), Channel::default());
    let status = module.status();
    assert!(status.contains("Moon"), "{status}");
    assert!(status.contains("CC74=64"), "{status}");
}
