//! Gravity module: three CC sliders that fall back to zero once released.

use crate::body::BodyMode;
use crate::config::{controller_or, Config, ConfigError};
use crate::constants::*;
use crate::input::{PointerEvent, PointerPhase, VerticalSlider};
use crate::mapper::MidiBinding;
use crate::midi::{Channel, ControllerNumber, DeviceId, MidiSink, Target};
use crate::sim::{FrameReport, Simulation};
use crate::state::Shape;
use glam::Vec2;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Named gravity strengths, weakest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GravityPreset {
    ZeroG,
    Moon,
    #[default]
    Earth,
    Jupiter,
    BlackHole,
}

impl GravityPreset {
    pub const ALL: [GravityPreset; 5] = [
        GravityPreset::ZeroG,
        GravityPreset::Moon,
        GravityPreset::Earth,
        GravityPreset::Jupiter,
        GravityPreset::BlackHole,
    ];

    /// Position on the gravity control, 0..=1.
    pub fn strength(self) -> f32 {
        match self {
            GravityPreset::ZeroG => 0.0,
            GravityPreset::Moon => 0.2,
            GravityPreset::Earth => 0.5,
            GravityPreset::Jupiter => 0.8,
            GravityPreset::BlackHole => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GravityPreset::ZeroG => "Zero G",
            GravityPreset::Moon => "Moon",
            GravityPreset::Earth => "Earth",
            GravityPreset::Jupiter => "Jupiter",
            GravityPreset::BlackHole => "Black Hole",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GravityPreset::ZeroG => "zero-g",
            GravityPreset::Moon => "moon",
            GravityPreset::Earth => "earth",
            GravityPreset::Jupiter => "jupiter",
            GravityPreset::BlackHole => "black-hole",
        }
    }

    /// Pull per unit of displacement (1/s^2). Squared strength keeps the low
    /// presets gentle and the high ones dramatic.
    pub fn stiffness(self) -> f32 {
        let s = self.strength();
        s * s * GRAVITY_PULL
    }

    /// Natural decay rate `sqrt(stiffness)` in rad/s.
    pub fn rate(self) -> f32 {
        self.stiffness().sqrt()
    }

    /// Upper bound on frames needed to reach exactly 0 from anywhere in the
    /// CC range at the fixed frame step. `None` for Zero-G.
    ///
    /// Black Hole settles within 36 frames (0.6 s).
    pub fn settle_frames(self) -> Option<u32> {
        let rate = self.rate();
        (rate > 0.0).then(|| (GRAVITY_SETTLE_RATE_TIME / (rate * FRAME_DT)).ceil() as u32)
    }

    /// Preset nearest to a normalized control position.
    pub fn closest(strength: f32) -> Self {
        let mut best = GravityPreset::ZeroG;
        let mut best_d = f32::MAX;
        for p in Self::ALL {
            let d = (p.strength() - strength).abs();
            if d < best_d {
                best_d = d;
                best = p;
            }
        }
        best
    }
}

impl fmt::Display for GravityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GravityPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == key || p.name().replace('-', "") == key)
            .ok_or_else(|| ConfigError::Preset(s.to_string()))
    }
}

/// Advance one slider by `dt`.
///
/// Critically damped pull toward zero: `a = -k p - 2 sqrt(k) v`, integrated
/// semi-implicitly. From rest the motion is monotone; crossing zero or
/// dropping under the snap threshold lands exactly on 0 with zero velocity.
/// Zero-G leaves the slider where it is.
pub fn step_gravity(position: f32, velocity: f32, preset: GravityPreset, dt: f32) -> (f32, f32) {
    let k = preset.stiffness();
    let position = position.clamp(CC_MIN as f32, CC_MAX as f32);
    if k <= 0.0 {
        return (position, 0.0);
    }
    let damping = 2.0 * k.sqrt();
    let v = velocity + (-k * position - damping * velocity) * dt;
    let p = position + v * dt;
    if p * position <= 0.0 || p.abs() < GRAVITY_SNAP_THRESHOLD {
        return (0.0, 0.0);
    }
    (p.clamp(CC_MIN as f32, CC_MAX as f32), v)
}

/// One falling CC slider.
#[derive(Clone, Debug)]
pub struct GravitySlider {
    pub value: f32,
    pub velocity: f32,
    pub mode: BodyMode<f32>,
    pub binding: MidiBinding,
}

impl GravitySlider {
    pub fn new(cc: ControllerNumber, channel: Channel) -> Self {
        Self {
            value: GRAVITY_START_VALUE,
            velocity: 0.0,
            mode: BodyMode::Free,
            binding: MidiBinding::controller(cc, channel, (CC_MIN as f32, CC_MAX as f32)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Control {
    Slider(usize),
    Preset,
}

// Layout
const SLIDER_START_X: f32 = 100.0;
const SLIDER_SPACING: f32 = 150.0;
const SLIDER_Y: f32 = 200.0;
const SLIDER_W: f32 = 80.0;
const SLIDER_H: f32 = 300.0;
const HANDLE_H: f32 = 20.0;
const PRESET_TRACK: VerticalSlider = VerticalSlider::new(600.0, 150.0, 30.0, 200.0);

pub fn slider_track(index: usize) -> VerticalSlider {
    VerticalSlider::new(
        SLIDER_START_X + index as f32 * SLIDER_SPACING,
        SLIDER_Y,
        SLIDER_W,
        SLIDER_H,
    )
}

pub fn preset_track() -> VerticalSlider {
    PRESET_TRACK
}

/// Three falling sliders plus the gravity preset control.
pub struct GravityModule {
    pub sliders: Vec<GravitySlider>,
    pub preset: GravityPreset,
    active: Option<(Control, f32)>,
}

impl GravityModule {
    pub fn new(preset: GravityPreset, controllers: [ControllerNumber; 3], channel: Channel) -> Self {
        log::info!(
            "[gravity] preset={} ccs={:?} ch{}",
            preset,
            controllers.map(|c| c.number()),
            channel.number()
        );
        Self {
            sliders: controllers
                .iter()
                .map(|&cc| GravitySlider::new(cc, channel))
                .collect(),
            preset,
            active: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let ccs = config.gravity.controllers;
        let controllers =
            std::array::from_fn(|i| controller_or(ccs[i], GRAVITY_DEFAULT_CCS[i]));
        Self::new(config.gravity.preset, controllers, config.channel())
    }

    pub fn set_preset(&mut self, preset: GravityPreset) {
        if preset != self.preset {
            log::info!("[gravity] preset {} -> {}", self.preset, preset);
            self.preset = preset;
        }
    }

    /// Reassign one slider's controller; an invalid number keeps the old one.
    pub fn set_controller(&mut self, index: usize, cc: u8) -> Result<(), ConfigError> {
        let cc = ControllerNumber::new(cc)?;
        if let Some(s) = self.sliders.get_mut(index) {
            s.binding.set_target(Target::Controller(cc));
        }
        Ok(())
    }

    /// Take hold of a slider and set it directly. Decay is suspended until
    /// [`GravityModule::release`].
    pub fn grab(&mut self, index: usize, value: f32) {
        if let Some(s) = self.sliders.get_mut(index) {
            let value = value.clamp(CC_MIN as f32, CC_MAX as f32);
            s.mode.grab(value);
            s.value = value;
            s.velocity = 0.0;
            log::info!("[gravity] begin drag on slider {}", index);
        }
    }

    pub fn drag(&mut self, index: usize, value: f32) {
        if let Some(s) = self.sliders.get_mut(index) {
            if s.mode.is_held() {
                let value = value.clamp(CC_MIN as f32, CC_MAX as f32);
                s.mode.drag(value);
                s.value = value;
            }
        }
    }

    /// Let go of a slider. It starts falling from rest.
    pub fn release(&mut self, index: usize) {
        if let Some(s) = self.sliders.get_mut(index) {
            if s.mode.release().is_some() {
                s.velocity = 0.0;
                log::info!("[gravity] release slider {} at {:.1}", index, s.value);
            }
        }
    }

    fn control_at(&self, p: Vec2) -> Option<Control> {
        (0..self.sliders.len())
            .find(|&i| slider_track(i).track.contains(p))
            .map(Control::Slider)
            .or_else(|| PRESET_TRACK.track.contains(p).then_some(Control::Preset))
    }

    fn control_value(&self, control: Control, y: f32) -> f32 {
        match control {
            Control::Slider(i) => slider_track(i).normalized_at(y) * CC_MAX as f32,
            Control::Preset => PRESET_TRACK.normalized_at(y),
        }
    }

    fn handle_y(&self, control: Control) -> f32 {
        match control {
            Control::Slider(i) => {
                slider_track(i).handle_y(self.sliders[i].value / CC_MAX as f32)
            }
            Control::Preset => PRESET_TRACK.handle_y(self.preset.strength()),
        }
    }
}

impl Simulation for GravityModule {
    fn name(&self) -> &'static str {
        "Gravity"
    }

    fn route_output(&mut self, device: &DeviceId, channel: Channel) {
        for s in &mut self.sliders {
            s.binding.route(device, channel);
        }
    }

    fn handle_pointer(&mut self, ev: PointerEvent) {
        match ev.phase {
            PointerPhase::Down => {
                if let Some(control) = self.control_at(ev.position) {
                    // keep the grab point under the pointer so clicking does not jump
                    let offset = ev.position.y - self.handle_y(control);
                    self.active = Some((control, offset));
                    let v = self.control_value(control, ev.position.y - offset);
                    match control {
                        Control::Slider(i) => self.grab(i, v),
                        Control::Preset => self.set_preset(GravityPreset::closest(v)),
                    }
                }
            }
            PointerPhase::Move => {
                if let Some((control, offset)) = self.active {
                    let v = self.control_value(control, ev.position.y - offset);
                    match control {
                        Control::Slider(i) => self.drag(i, v),
                        Control::Preset => self.set_preset(GravityPreset::closest(v)),
                    }
                }
            }
            PointerPhase::Up => {
                if let Some((Control::Slider(i), _)) = self.active.take() {
                    self.release(i);
                }
            }
        }
    }

    fn step(&mut self, dt: f32, sink: &mut dyn MidiSink) -> FrameReport {
        let mut report = FrameReport::default();
        for s in &mut self.sliders {
            if s.mode.is_held() {
                s.mode.sample(dt);
            } else {
                (s.value, s.velocity) = step_gravity(s.value, s.velocity, self.preset, dt);
            }
            report.record(&s.binding.push(s.value, sink));
        }
        report
    }

    fn shapes(&self, out: &mut Vec<Shape>) {
        for (i, s) in self.sliders.iter().enumerate() {
            let track = slider_track(i).track;
            out.push(Shape::rect(track.center(), track.size, GRAY));
            Shape::outline(track.origin, track.size, 2.0, WHITE, out);
            let hy = slider_track(i).handle_y(s.value / CC_MAX as f32);
            let color = if s.mode.is_held() { RED } else { BLUE };
            out.push(Shape::rect(
                Vec2::new(track.center().x, hy),
                Vec2::new(SLIDER_W, HANDLE_H),
                color,
            ));
        }

        // preset control, green (weak) at the bottom to red (strong) at the top
        let track = PRESET_TRACK.track;
        const BANDS: usize = 10;
        let band_h = track.size.y / BANDS as f32;
        for b in 0..BANDS {
            let t = 1.0 - (b as f32 + 0.5) / BANDS as f32;
            let y = track.origin.y + band_h * (b as f32 + 0.5);
            out.push(Shape::rect(
                Vec2::new(track.center().x, y),
                Vec2::new(track.size.x - 4.0, band_h),
                [t, 0.4 * (1.0 - t), 0.0, 1.0],
            ));
        }
        Shape::outline(track.origin, track.size, 2.0, WHITE, out);
        out.push(Shape::rect(
            Vec2::new(track.center().x, PRESET_TRACK.handle_y(self.preset.strength())),
            Vec2::new(track.size.x + 10.0, 15.0),
            WHITE,
        ));
    }

    fn status(&self) -> String {
        let values = self
            .sliders
            .iter()
            .map(|s| match s.binding.target {
                Target::Controller(cc) => format!("CC{}={}", cc.number(), s.binding.quantize(s.value)),
                Target::PitchBend => format!("PB={}", s.binding.quantize(s.value)),
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Gravity | {} ({}%) | {}",
            self.preset.label(),
            (self.preset.strength() * 100.0).round(),
            values
        )
    }
}
