//! MIDI message types and the output sink seam.
//!
//! Everything here is device-agnostic. The native frontend provides a
//! `midir`-backed sink; tests and dry runs use [`MemorySink`].

use crate::config::ConfigError;
use crate::constants::{CC_MAX, PITCH_BEND_CENTER_WIRE};
use thiserror::Error;

/// Failure reported by an output sink. Always non-fatal for the simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("no MIDI device connected")]
    NotConnected,
    #[error("MIDI device {device} rejected message: {reason}")]
    Transmit { device: String, reason: String },
}

/// MIDI channel, stored 1-based as users see it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Channel(u8);

impl Channel {
    pub fn new(one_based: u8) -> Result<Self, ConfigError> {
        if (1..=16).contains(&one_based) {
            Ok(Self(one_based))
        } else {
            Err(ConfigError::Channel(one_based))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based channel nibble used in status bytes.
    pub fn wire(self) -> u8 {
        self.0 - 1
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self(crate::constants::DEFAULT_CHANNEL)
    }
}

/// Continuous controller number (0-127).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControllerNumber(u8);

impl ControllerNumber {
    pub const MIN: Self = Self(0);

    pub fn new(cc: u8) -> Result<Self, ConfigError> {
        if i32::from(cc) <= CC_MAX {
            Ok(Self(cc))
        } else {
            Err(ConfigError::Controller(cc))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

/// What a binding drives on the receiving device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Controller(ControllerNumber),
    PitchBend,
}

/// Identifier of the output device a message is addressed to. Empty when no
/// port is attached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One outgoing value: `(device, channel, controller or pitch bend, value)`.
///
/// `value` is 0..=127 for controllers and -8192..=8192 for pitch bend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiMessage {
    pub device: DeviceId,
    pub channel: Channel,
    pub target: Target,
    pub value: i32,
}

impl MidiMessage {
    /// Encode as a three-byte channel voice message.
    pub fn to_bytes(&self) -> [u8; 3] {
        let ch = self.channel.wire();
        match self.target {
            Target::Controller(cc) => [0xB0 | ch, cc.number(), self.value.clamp(0, CC_MAX) as u8],
            Target::PitchBend => {
                let wire = (self.value + PITCH_BEND_CENTER_WIRE).clamp(0, 0x3FFF) as u16;
                [0xE0 | ch, (wire & 0x7F) as u8, ((wire >> 7) & 0x7F) as u8]
            }
        }
    }
}

/// Destination for MIDI output. Implementations must not block the frame loop
/// for longer than a single non-blocking port write.
pub trait MidiSink {
    fn send(&mut self, msg: &MidiMessage) -> Result<(), SendError>;

    /// Short human-readable description for status displays.
    fn describe(&self) -> String;

    /// Device that messages sent here arrive at.
    fn device(&self) -> DeviceId {
        DeviceId::default()
    }
}

/// Sink used when no device is attached; every send fails with `NotConnected`.
#[derive(Debug, Default)]
pub struct NullSink;

impl MidiSink for NullSink {
    fn send(&mut self, _msg: &MidiMessage) -> Result<(), SendError> {
        Err(SendError::NotConnected)
    }

    fn describe(&self) -> String {
        "Not Connected".to_string()
    }
}

/// Records every accepted message in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub messages: Vec<MidiMessage>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values sent to one target, in transmission order.
    pub fn values_for(&self, target: Target) -> Vec<i32> {
        self.messages
            .iter()
            .filter(|m| m.target == target)
            .map(|m| m.value)
            .collect()
    }
}

impl MidiSink for MemorySink {
    fn send(&mut self, msg: &MidiMessage) -> Result<(), SendError> {
        log::debug!(
            "[midi] ch{} {:?} = {}",
            msg.channel.number(),
            msg.target,
            msg.value
        );
        self.messages.push(msg.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Dry run ({} sent)", self.messages.len())
    }
}
