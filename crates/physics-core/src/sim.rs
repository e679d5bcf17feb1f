use crate::input::PointerEvent;
use crate::mapper::PushOutcome;
use crate::midi::{Channel, DeviceId, MidiSink};
use crate::state::Shape;

/// What one frame step did on the MIDI side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub sent: usize,
    pub failures: usize,
}

impl FrameReport {
    pub fn record(&mut self, outcome: &PushOutcome) {
        match outcome {
            PushOutcome::Unchanged => {}
            PushOutcome::Sent(_) => self.sent += 1,
            PushOutcome::Failed(_) => self.failures += 1,
        }
    }
}

/// A running demo module. One instance owns all of its bodies, parameters and
/// bindings; the frame loop drives it strictly in this order each frame:
/// pointer events, then `step`, then `shapes`.
pub trait Simulation {
    fn name(&self) -> &'static str;

    fn handle_pointer(&mut self, ev: PointerEvent);

    /// Address every output axis at `device` on `channel`.
    fn route_output(&mut self, device: &DeviceId, channel: Channel);

    /// Advance by `dt`, then push every output axis through its binding.
    fn step(&mut self, dt: f32, sink: &mut dyn MidiSink) -> FrameReport;

    /// Render snapshot in scene coordinates.
    fn shapes(&self, out: &mut Vec<Shape>);

    /// One-line status for the window title.
    fn status(&self) -> String;
}
