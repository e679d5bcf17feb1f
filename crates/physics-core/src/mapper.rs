//! Simulation value → quantized MIDI value, with a one-step deadband.

use crate::constants::{CC_MAX, CC_MIN, PITCH_BEND_MAX, PITCH_BEND_MIN};
use crate::midi::{Channel, ControllerNumber, DeviceId, MidiMessage, MidiSink, SendError, Target};

/// Integer output range of a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputRange {
    /// `[0, 127]`
    Controller,
    /// `[-8192, 8192]`
    PitchBend,
}

impl OutputRange {
    pub fn bounds(self) -> (i32, i32) {
        match self {
            OutputRange::Controller => (CC_MIN, CC_MAX),
            OutputRange::PitchBend => (PITCH_BEND_MIN, PITCH_BEND_MAX),
        }
    }
}

/// Linearly rescale `value` from `domain` onto `range`, round half away from
/// zero and clamp. A degenerate domain maps everything to the low end.
pub fn quantize(value: f32, domain: (f32, f32), range: OutputRange) -> i32 {
    let (lo, hi) = range.bounds();
    let span = domain.1 - domain.0;
    let t = if span.abs() > f32::EPSILON {
        (value - domain.0) / span
    } else {
        0.0
    };
    let scaled = lo as f32 + t * (hi - lo) as f32;
    // NaN casts to 0, which the clamp keeps inside the range
    (scaled.round() as i32).clamp(lo, hi)
}

/// Result of pushing one simulation value through a binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// Quantized value equals last-sent; nothing transmitted.
    Unchanged,
    Sent(i32),
    /// The sink refused the message. Last-sent is untouched so the value is
    /// offered again on the next frame.
    Failed(SendError),
}

/// One output axis: where it goes, what simulation span it covers, and what
/// was last transmitted.
#[derive(Clone, Debug)]
pub struct MidiBinding {
    pub device: DeviceId,
    pub channel: Channel,
    pub target: Target,
    pub domain: (f32, f32),
    last_sent: Option<i32>,
    failing: bool,
}

impl MidiBinding {
    pub fn new(device: DeviceId, channel: Channel, target: Target, domain: (f32, f32)) -> Self {
        Self {
            device,
            channel,
            target,
            domain,
            last_sent: None,
            failing: false,
        }
    }

    pub fn controller(cc: ControllerNumber, channel: Channel, domain: (f32, f32)) -> Self {
        Self::new(DeviceId::default(), channel, Target::Controller(cc), domain)
    }

    pub fn pitch_bend(channel: Channel, domain: (f32, f32)) -> Self {
        Self::new(DeviceId::default(), channel, Target::PitchBend, domain)
    }

    pub fn range(&self) -> OutputRange {
        match self.target {
            Target::Controller(_) => OutputRange::Controller,
            Target::PitchBend => OutputRange::PitchBend,
        }
    }

    pub fn quantize(&self, value: f32) -> i32 {
        quantize(value, self.domain, self.range())
    }

    pub fn last_sent(&self) -> Option<i32> {
        self.last_sent
    }

    /// Point the binding at a new controller. The next push always transmits.
    pub fn set_target(&mut self, target: Target) {
        self.target = target;
        self.last_sent = None;
    }

    pub fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
        self.last_sent = None;
    }

    pub fn set_device(&mut self, device: DeviceId) {
        self.device = device;
        self.last_sent = None;
    }

    /// Readdress to `device` on `channel`. The next push always transmits.
    pub fn route(&mut self, device: &DeviceId, channel: Channel) {
        self.set_device(device.clone());
        self.set_channel(channel);
    }

    /// Quantize `value` and transmit it if it differs from last-sent.
    pub fn push(&mut self, value: f32, sink: &mut dyn MidiSink) -> PushOutcome {
        let quantized = self.quantize(value);
        if self.last_sent == Some(quantized) {
            return PushOutcome::Unchanged;
        }
        let msg = MidiMessage {
            device: self.device.clone(),
            channel: self.channel,
            target: self.target,
            value: quantized,
        };
        match sink.send(&msg) {
            Ok(()) => {
                if self.failing {
                    log::info!("[midi] {:?} transmitting again", self.target);
                    self.failing = false;
                }
                self.last_sent = Some(quantized);
                PushOutcome::Sent(quantized)
            }
            Err(err) => {
                if !self.failing {
                    log::warn!("[midi] {:?} dropped: {err}", self.target);
                    self.failing = true;
                }
                PushOutcome::Failed(err)
            }
        }
    }
}
