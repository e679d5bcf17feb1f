//! Connection check: one controller swept 0 → 127 → 0 at a fixed rate, so a
//! listening synth audibly confirms the port and channel before the physics
//! modules are used.

use crate::config::{controller_or, Config};
use crate::constants::*;
use crate::input::PointerEvent;
use crate::mapper::MidiBinding;
use crate::midi::{Channel, ControllerNumber, DeviceId, MidiSink, Target};
use crate::sim::{FrameReport, Simulation};
use crate::state::Shape;
use glam::Vec2;

const BAR: Vec2 = Vec2::new(100.0, 280.0);
const BAR_SIZE: Vec2 = Vec2::new(600.0, 40.0);

pub struct SweepModule {
    pub value: f32,
    pub rising: bool,
    /// Controller units per second.
    pub rate: f32,
    pub binding: MidiBinding,
}

impl SweepModule {
    pub fn new(cc: ControllerNumber, channel: Channel) -> Self {
        log::info!("[sweep] cc={} ch{}", cc.number(), channel.number());
        Self {
            value: 0.0,
            rising: true,
            rate: SWEEP_RATE,
            binding: MidiBinding::controller(cc, channel, (0.0, CC_MAX as f32)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            controller_or(config.sweep.controller, SWEEP_DEFAULT_CC),
            config.channel(),
        )
    }

    /// Move toward the current end of the range, turning around on arrival.
    pub fn advance(&mut self, dt: f32) {
        let top = CC_MAX as f32;
        if self.rising {
            self.value += self.rate * dt;
            if self.value >= top {
                self.value = top;
                self.rising = false;
            }
        } else {
            self.value -= self.rate * dt;
            if self.value <= 0.0 {
                self.value = 0.0;
                self.rising = true;
            }
        }
    }
}

impl Simulation for SweepModule {
    fn name(&self) -> &'static str {
        "MIDI Test"
    }

    fn route_output(&mut self, device: &DeviceId, channel: Channel) {
        self.binding.route(device, channel);
    }

    fn handle_pointer(&mut self, _ev: PointerEvent) {}

    fn step(&mut self, dt: f32, sink: &mut dyn MidiSink) -> FrameReport {
        self.advance(dt);
        let mut report = FrameReport::default();
        report.record(&self.binding.push(self.value, sink));
        report
    }

    fn shapes(&self, out: &mut Vec<Shape>) {
        let fill = BAR_SIZE.x * self.value / CC_MAX as f32;
        out.push(Shape::rect(BAR + BAR_SIZE * 0.5, BAR_SIZE, DARK_GRAY));
        if fill > 0.0 {
            out.push(Shape::rect(
                BAR + Vec2::new(fill * 0.5, BAR_SIZE.y * 0.5),
                Vec2::new(fill, BAR_SIZE.y),
                GREEN,
            ));
        }
        Shape::outline(BAR, BAR_SIZE, 2.0, WHITE, out);
    }

    fn status(&self) -> String {
        let q = self.binding.quantize(self.value);
        let value = match self.binding.target {
            Target::Controller(cc) => format!("CC{}={}", cc.number(), q),
            Target::PitchBend => format!("PB={}", q),
        };
        format!("MIDI Test | sending {value}")
    }
}
