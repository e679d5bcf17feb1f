//! Pendulum module: a damped simple pendulum sent as CC or pitch bend.

use crate::body::BodyMode;
use crate::config::{controller_or, Config, ConfigError};
use crate::constants::*;
use crate::input::{PointerEvent, PointerPhase, Rect, VerticalSlider};
use crate::mapper::MidiBinding;
use crate::midi::{Channel, ControllerNumber, DeviceId, MidiSink, Target};
use crate::sim::{FrameReport, Simulation};
use crate::state::Shape;
use glam::Vec2;
use serde::Deserialize;
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Which MIDI message the pendulum angle drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    #[default]
    #[serde(alias = "cc")]
    Controller,
    PitchBend,
}

impl OutputMode {
    pub fn toggled(self) -> Self {
        match self {
            OutputMode::Controller => OutputMode::PitchBend,
            OutputMode::PitchBend => OutputMode::Controller,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputMode::Controller => "MIDI CC",
            OutputMode::PitchBend => "Pitch Bend",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cc" | "controller" | "midi-cc" => Ok(OutputMode::Controller),
            "pb" | "pitch-bend" | "pitchbend" | "bend" => Ok(OutputMode::PitchBend),
            _ => Err(ConfigError::OutputMode(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PendulumState {
    /// Radians from straight down, positive toward +x.
    pub angle: f32,
    pub angular_velocity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendulumParams {
    pub length: f32,
    pub gravity: f32,
    pub damping: f32,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            length: PENDULUM_DEFAULT_LENGTH,
            gravity: PENDULUM_GRAVITY,
            damping: PENDULUM_DAMPING,
        }
    }
}

/// Wrap an angle into `[-PI, PI]`.
pub fn wrap_angle(rad: f32) -> f32 {
    if (-PI..=PI).contains(&rad) {
        return rad;
    }
    (rad + PI).rem_euclid(2.0 * PI) - PI
}

/// One semi-implicit Euler step of `a = -(g/L) sin(theta) - damping * omega`.
pub fn step_pendulum(state: &mut PendulumState, params: &PendulumParams, dt: f32) {
    let length = params.length.max(f32::EPSILON);
    let accel =
        -(params.gravity / length) * state.angle.sin() - params.damping * state.angular_velocity;
    state.angular_velocity += accel * dt;
    state.angle = wrap_angle(state.angle + state.angular_velocity * dt);
}

/// Small-angle period `2 PI sqrt(L / g)`.
pub fn small_angle_period(length: f32, gravity: f32) -> f32 {
    2.0 * PI * (length / gravity).sqrt()
}

pub fn bob_position(pivot: Vec2, length: f32, angle: f32) -> Vec2 {
    pivot + Vec2::new(angle.sin(), angle.cos()) * length
}

/// Pendulum angle that points the rod at `pointer`, limited to the drag range.
///
/// The held rod cannot pass over the pivot: while the pointer is in the wedge
/// above the drag range, or has jumped across it, the angle stays at the limit
/// on the side of `previous`.
pub fn drag_angle(pivot: Vec2, pointer: Vec2, previous: f32) -> f32 {
    let d = pointer - pivot;
    let raw = d.x.atan2(d.y);
    if raw.abs() > PENDULUM_MAX_DRAG_ANGLE || (raw - previous).abs() > PI {
        PENDULUM_MAX_DRAG_ANGLE.copysign(previous)
    } else {
        raw
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Drag {
    Bob,
    Length { offset: f32 },
}

const LENGTH_TRACK: VerticalSlider = VerticalSlider::new(550.0, 150.0, 30.0, 200.0);
const MODE_BUTTON: Rect = Rect::new(550.0, 400.0, 120.0, 40.0);
const PICK_SCALE: f32 = 2.0; // grab area relative to the bob radius

pub fn length_track() -> VerticalSlider {
    LENGTH_TRACK
}

pub fn mode_button() -> Rect {
    MODE_BUTTON
}

pub struct PendulumModule {
    pub state: PendulumState,
    pub params: PendulumParams,
    pub mode: OutputMode,
    pub body: BodyMode<f32>,
    pub pivot: Vec2,
    pub cc_binding: MidiBinding,
    pub bend_binding: MidiBinding,
    trail: VecDeque<Vec2>,
    drag: Option<Drag>,
}

impl PendulumModule {
    pub fn new(length: f32, mode: OutputMode, cc: ControllerNumber, channel: Channel) -> Self {
        let domain = (-PENDULUM_OUTPUT_ANGLE, PENDULUM_OUTPUT_ANGLE);
        log::info!(
            "[pendulum] length={:.0} mode={} cc={} ch{}",
            length,
            mode,
            cc.number(),
            channel.number()
        );
        Self {
            state: PendulumState {
                angle: PENDULUM_START_ANGLE,
                angular_velocity: 0.0,
            },
            params: PendulumParams {
                length: length.clamp(PENDULUM_MIN_LENGTH, PENDULUM_MAX_LENGTH),
                ..PendulumParams::default()
            },
            mode,
            body: BodyMode::Free,
            pivot: PENDULUM_PIVOT,
            cc_binding: MidiBinding::controller(cc, channel, domain),
            bend_binding: MidiBinding::pitch_bend(channel, domain),
            trail: VecDeque::with_capacity(PENDULUM_TRAIL_LEN + 1),
            drag: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let p = &config.pendulum;
        Self::new(
            p.length,
            p.mode,
            controller_or(p.controller, PENDULUM_DEFAULT_CC),
            config.channel(),
        )
    }

    pub fn set_length(&mut self, length: f32) -> Result<(), ConfigError> {
        if !(PENDULUM_MIN_LENGTH..=PENDULUM_MAX_LENGTH).contains(&length) {
            return Err(ConfigError::OutOfRange {
                name: "pendulum length",
                value: length,
                min: PENDULUM_MIN_LENGTH,
                max: PENDULUM_MAX_LENGTH,
            });
        }
        self.params.length = length;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: OutputMode) {
        if mode != self.mode {
            log::info!("[pendulum] output {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn bob(&self) -> Vec2 {
        bob_position(self.pivot, self.params.length, self.state.angle)
    }

    /// Take hold of the bob at `angle`; motion stops until release.
    pub fn grab(&mut self, angle: f32) {
        self.state.angle = angle;
        self.state.angular_velocity = 0.0;
        self.body.grab(angle);
        log::info!("[pendulum] grab at {:.2} rad", angle);
    }

    pub fn drag_to(&mut self, angle: f32) {
        if self.body.is_held() {
            self.state.angle = angle;
            self.body.drag(angle);
        }
    }

    /// Let go; the swing resumes with the drag's last-frame angular velocity.
    pub fn release(&mut self) {
        if let Some(omega) = self.body.release() {
            self.state.angular_velocity = omega;
            log::info!(
                "[pendulum] release at {:.2} rad, {:.2} rad/s",
                self.state.angle,
                omega
            );
        }
    }

    pub fn trail(&self) -> impl Iterator<Item = &Vec2> {
        self.trail.iter()
    }

    fn active_binding(&mut self) -> &mut MidiBinding {
        match self.mode {
            OutputMode::Controller => &mut self.cc_binding,
            OutputMode::PitchBend => &mut self.bend_binding,
        }
    }

    fn length_at(&self, y: f32) -> f32 {
        PENDULUM_MIN_LENGTH
            + LENGTH_TRACK.normalized_at(y) * (PENDULUM_MAX_LENGTH - PENDULUM_MIN_LENGTH)
    }

    fn length_handle_y(&self) -> f32 {
        let n = (self.params.length - PENDULUM_MIN_LENGTH)
            / (PENDULUM_MAX_LENGTH - PENDULUM_MIN_LENGTH);
        LENGTH_TRACK.handle_y(n)
    }
}

impl Simulation for PendulumModule {
    fn name(&self) -> &'static str {
        "Pendulum"
    }

    fn route_output(&mut self, device: &DeviceId, channel: Channel) {
        self.cc_binding.route(device, channel);
        self.bend_binding.route(device, channel);
    }

    fn handle_pointer(&mut self, ev: PointerEvent) {
        match ev.phase {
            PointerPhase::Down => {
                if LENGTH_TRACK.track.contains(ev.position) {
                    let offset = ev.position.y - self.length_handle_y();
                    self.drag = Some(Drag::Length { offset });
                } else if MODE_BUTTON.contains(ev.position) {
                    self.set_mode(self.mode.toggled());
                } else if ev.position.distance(self.bob()) < PENDULUM_BOB_RADIUS * PICK_SCALE {
                    self.drag = Some(Drag::Bob);
                    self.grab(drag_angle(self.pivot, ev.position, self.state.angle));
                }
            }
            PointerPhase::Move => match self.drag {
                Some(Drag::Bob) => {
                    self.drag_to(drag_angle(self.pivot, ev.position, self.state.angle));
                }
                Some(Drag::Length { offset }) => {
                    self.params.length = self.length_at(ev.position.y - offset);
                }
                None => {}
            },
            PointerPhase::Up => {
                if let Some(Drag::Bob) = self.drag.take() {
                    self.release();
                }
            }
        }
    }

    fn step(&mut self, dt: f32, sink: &mut dyn MidiSink) -> FrameReport {
        if self.body.is_held() {
            self.body.sample(dt);
        } else {
            step_pendulum(&mut self.state, &self.params, dt);
        }

        let bob = self.bob();
        self.trail.push_back(bob);
        while self.trail.len() > PENDULUM_TRAIL_LEN {
            self.trail.pop_front();
        }

        let angle = self.state.angle;
        let mut report = FrameReport::default();
        report.record(&self.active_binding().push(angle, sink));
        report
    }

    fn shapes(&self, out: &mut Vec<Shape>) {
        let n = self.trail.len();
        for (i, (a, b)) in self.trail.iter().zip(self.trail.iter().skip(1)).enumerate() {
            let g = 0.4 * i as f32 / n as f32;
            out.push(Shape::segment(*a, *b, 2.0, [g, g, g, 1.0]));
        }

        let bob = self.bob();
        out.push(Shape::segment(self.pivot, bob, 3.0, WHITE));
        out.push(Shape::circle(self.pivot, 8.0, WHITE));
        let color = if self.body.is_held() { RED } else { BLUE };
        out.push(Shape::circle(bob, PENDULUM_BOB_RADIUS, color));
        out.push(Shape::circle(bob - Vec2::splat(5.0), 6.0, WHITE));

        let track = LENGTH_TRACK.track;
        out.push(Shape::rect(track.center(), track.size, GRAY));
        Shape::outline(track.origin, track.size, 2.0, WHITE, out);
        out.push(Shape::rect(
            Vec2::new(track.center().x, self.length_handle_y()),
            Vec2::new(track.size.x + 10.0, 15.0),
            WHITE,
        ));

        let button_color = match self.mode {
            OutputMode::Controller => BLUE,
            OutputMode::PitchBend => GREEN,
        };
        out.push(Shape::rect(MODE_BUTTON.center(), MODE_BUTTON.size, button_color));
        Shape::outline(MODE_BUTTON.origin, MODE_BUTTON.size, 2.0, WHITE, out);
    }

    fn status(&self) -> String {
        let angle = self.state.angle;
        let binding = match self.mode {
            OutputMode::Controller => &self.cc_binding,
            OutputMode::PitchBend => &self.bend_binding,
        };
        let value = match binding.target {
            Target::Controller(cc) => format!("CC{}={}", cc.number(), binding.quantize(angle)),
            Target::PitchBend => format!("PB={}", binding.quantize(angle)),
        };
        format!(
            "Pendulum | L={:.0} | {:.1} deg | {} {}",
            self.params.length,
            angle.to_degrees(),
            self.mode,
            value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_angle_keeps_range() {
        assert_eq!(wrap_angle(1.0), 1.0);
        assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn drag_angle_points_at_pointer() {
        let pivot = Vec2::new(0.0, 0.0);
        assert_eq!(drag_angle(pivot, Vec2::new(0.0, 10.0), 0.0), 0.0);
        assert!((drag_angle(pivot, Vec2::new(10.0, 10.0), 0.0) - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn drag_angle_stays_on_its_side_above_the_pivot() {
        let pivot = Vec2::new(0.0, 0.0);
        let left = -2.0;
        // straight up, either side of the top
        assert_eq!(
            drag_angle(pivot, Vec2::new(0.001, -10.0), left),
            -PENDULUM_MAX_DRAG_ANGLE
        );
        assert_eq!(
            drag_angle(pivot, Vec2::new(-0.001, -10.0), 2.0),
            PENDULUM_MAX_DRAG_ANGLE
        );
        // a jump from just inside the left limit to just inside the right one
        let across = Vec2::new(10.0, -12.0);
        assert!(drag_angle(pivot, across, 0.0) > 2.0);
        assert_eq!(
            drag_angle(pivot, across, -2.4),
            -PENDULUM_MAX_DRAG_ANGLE
        );
    }

    #[test]
    fn output_mode_parses() {
        assert_eq!("cc".parse::<OutputMode>(), Ok(OutputMode::Controller));
        assert_eq!(
            "Pitch-Bend".parse::<OutputMode>(),
            Ok(OutputMode::PitchBend)
        );
        assert!("volume".parse::<OutputMode>().is_err());
    }
}
