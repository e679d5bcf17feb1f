//! Start-up configuration: MIDI routing plus per-module parameters.
//!
//! Values arrive from a JSON file and/or command-line overrides. Anything out
//! of range is rejected here and replaced by its default, so the simulation
//! loop only ever sees valid settings.

use crate::constants::*;
use crate::gravity::GravityPreset;
use crate::midi::{Channel, ControllerNumber};
use crate::pendulum::OutputMode;
use serde::Deserialize;
use thiserror::Error;

/// Rejected configuration value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("MIDI channel {0} is outside 1-16")]
    Channel(u8),
    #[error("controller number {0} is outside 0-127")]
    Controller(u8),
    #[error("unknown gravity preset `{0}`")]
    Preset(String),
    #[error("unknown output mode `{0}`")]
    OutputMode(String),
    #[error("{name} {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("invalid configuration file: {0}")]
    Parse(String),
}

pub const PARTICLE_MIN_EXTENT: f32 = 100.0;
pub const PARTICLE_MAX_WIDTH: f32 = 500.0;
pub const PARTICLE_MAX_HEIGHT: f32 = 450.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MidiSection {
    /// Port index or case-insensitive name fragment.
    pub device: Option<String>,
    /// 1-based.
    pub channel: u8,
}

impl Default for MidiSection {
    fn default() -> Self {
        Self {
            device: None,
            channel: DEFAULT_CHANNEL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GravitySection {
    pub preset: GravityPreset,
    pub controllers: [u8; 3],
}

impl Default for GravitySection {
    fn default() -> Self {
        Self {
            preset: GravityPreset::Earth,
            controllers: GRAVITY_DEFAULT_CCS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleSection {
    pub temperature: f32,
    /// `[red x, red y]`, `[green x, green y]`
    pub controllers: [[u8; 2]; 2],
    pub width: f32,
    pub height: f32,
    pub seed: u64,
}

impl Default for ParticleSection {
    fn default() -> Self {
        Self {
            temperature: PARTICLE_DEFAULT_TEMPERATURE,
            controllers: PARTICLE_DEFAULT_CCS,
            width: PARTICLE_AREA_SIZE.x,
            height: PARTICLE_AREA_SIZE.y,
            seed: PARTICLE_DEFAULT_SEED,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PendulumSection {
    pub length: f32,
    pub mode: OutputMode,
    pub controller: u8,
}

impl Default for PendulumSection {
    fn default() -> Self {
        Self {
            length: PENDULUM_DEFAULT_LENGTH,
            mode: OutputMode::Controller,
            controller: PENDULUM_DEFAULT_CC,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SweepSection {
    pub controller: u8,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            controller: SWEEP_DEFAULT_CC,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub midi: MidiSection,
    pub gravity: GravitySection,
    pub particle: ParticleSection,
    pub pendulum: PendulumSection,
    pub sweep: SweepSection,
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Replace an invalid controller number with its fallback, recording why.
fn sanitize_cc(cc: &mut u8, fallback: u8, errors: &mut Vec<ConfigError>) {
    if let Err(e) = ControllerNumber::new(*cc) {
        errors.push(e);
        *cc = fallback;
    }
}

fn sanitize_range(
    value: &mut f32,
    name: &'static str,
    min: f32,
    max: f32,
    fallback: f32,
    errors: &mut Vec<ConfigError>,
) {
    if let Err(e) = check_range(name, *value, min, max) {
        errors.push(e);
        *value = fallback;
    }
}

impl Config {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Replace every out-of-range value with its default. Returns the
    /// rejections so the caller can report them.
    pub fn sanitize(&mut self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let defaults = Config::default();

        if let Err(e) = Channel::new(self.midi.channel) {
            errors.push(e);
            self.midi.channel = defaults.midi.channel;
        }
        for (cc, fallback) in self
            .gravity
            .controllers
            .iter_mut()
            .zip(defaults.gravity.controllers)
        {
            sanitize_cc(cc, fallback, &mut errors);
        }
        for (pair, fallback) in self
            .particle
            .controllers
            .iter_mut()
            .zip(defaults.particle.controllers)
        {
            for (cc, fb) in pair.iter_mut().zip(fallback) {
                sanitize_cc(cc, fb, &mut errors);
            }
        }
        sanitize_cc(
            &mut self.pendulum.controller,
            defaults.pendulum.controller,
            &mut errors,
        );
        sanitize_cc(
            &mut self.sweep.controller,
            defaults.sweep.controller,
            &mut errors,
        );

        sanitize_range(
            &mut self.particle.temperature,
            "temperature",
            0.0,
            1.0,
            defaults.particle.temperature,
            &mut errors,
        );
        sanitize_range(
            &mut self.particle.width,
            "particle area width",
            PARTICLE_MIN_EXTENT,
            PARTICLE_MAX_WIDTH,
            defaults.particle.width,
            &mut errors,
        );
        sanitize_range(
            &mut self.particle.height,
            "particle area height",
            PARTICLE_MIN_EXTENT,
            PARTICLE_MAX_HEIGHT,
            defaults.particle.height,
            &mut errors,
        );
        sanitize_range(
            &mut self.pendulum.length,
            "pendulum length",
            PENDULUM_MIN_LENGTH,
            PENDULUM_MAX_LENGTH,
            defaults.pendulum.length,
            &mut errors,
        );

        for e in &errors {
            log::warn!("[config] {e}; using default");
        }
        errors
    }

    pub fn channel(&self) -> Channel {
        Channel::new(self.midi.channel).unwrap_or_default()
    }
}

/// Controller number from an already sanitized field.
pub(crate) fn controller_or(cc: u8, fallback: u8) -> ControllerNumber {
    ControllerNumber::new(cc)
        .or_else(|_| ControllerNumber::new(fallback))
        .unwrap_or(ControllerNumber::MIN)
}
