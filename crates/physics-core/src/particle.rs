//! Particle module: two discs bouncing in a box, positions sent as CC.

use crate::body::BodyMode;
use crate::config::{controller_or, Config, ConfigError};
use crate::constants::*;
use crate::input::{PointerEvent, PointerPhase, VerticalSlider};
use crate::mapper::MidiBinding;
use crate::midi::{Channel, ControllerNumber, DeviceId, MidiSink, Target};
use crate::sim::{FrameReport, Simulation};
use crate::state::Shape;
use glam::Vec2;
use rand::prelude::*;

/// Axis-aligned container in area-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn from_size(size: Vec2) -> Self {
        Self {
            min: Vec2::ZERO,
            max: size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Physical state of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disc {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub mass: f32,
}

impl Disc {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            mass: 1.0,
        }
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    /// Keep the whole disc inside `bounds` without touching velocity.
    pub fn confine(&mut self, bounds: Bounds) {
        let lo = bounds.min + Vec2::splat(self.radius);
        let hi = (bounds.max - Vec2::splat(self.radius)).max(lo);
        self.position = self.position.clamp(lo, hi);
    }
}

/// Bounce a disc off the walls it has crossed.
///
/// Each axis is handled on its own, so a corner reflects both components.
/// The wall-normal velocity is turned to point back inside with its
/// magnitude kept; for a disc moving into the wall that is exactly `-v_n`.
/// Returns whether any wall was hit.
pub fn resolve_walls(disc: &mut Disc, bounds: Bounds) -> bool {
    let lo = bounds.min + Vec2::splat(disc.radius);
    let hi = bounds.max - Vec2::splat(disc.radius);
    let mut hit = false;

    if disc.position.x < lo.x {
        disc.position.x = lo.x;
        disc.velocity.x = disc.velocity.x.abs();
        hit = true;
    } else if disc.position.x > hi.x {
        disc.position.x = hi.x;
        disc.velocity.x = -disc.velocity.x.abs();
        hit = true;
    }

    if disc.position.y < lo.y {
        disc.position.y = lo.y;
        disc.velocity.y = disc.velocity.y.abs();
        hit = true;
    } else if disc.position.y > hi.y {
        disc.position.y = hi.y;
        disc.velocity.y = -disc.velocity.y.abs();
        hit = true;
    }
    hit
}

/// Elastic collision between two discs using their own masses.
pub fn resolve_pair(a: &mut Disc, b: &mut Disc) -> bool {
    let (inv_a, inv_b) = (a.mass.recip(), b.mass.recip());
    resolve_pair_weighted(a, b, inv_a, inv_b)
}

/// Elastic collision with explicit inverse masses (0 = immovable).
///
/// Overlapping discs are pushed apart along the centre line, split by inverse
/// mass, until they just touch. If they are approaching, the normal component
/// of the relative velocity is reversed (restitution 1); tangential
/// components are untouched. Coincident centres separate along +X.
pub fn resolve_pair_weighted(a: &mut Disc, b: &mut Disc, inv_a: f32, inv_b: f32) -> bool {
    let inv_sum = inv_a + inv_b;
    let delta = a.position - b.position;
    let dist = delta.length();
    let contact = a.radius + b.radius;
    if dist >= contact || inv_sum <= 0.0 {
        return false;
    }
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };

    let overlap = contact - dist;
    a.position += normal * (overlap * inv_a / inv_sum);
    b.position -= normal * (overlap * inv_b / inv_sum);

    let approach = (a.velocity - b.velocity).dot(normal);
    if approach < 0.0 {
        let impulse = -2.0 * approach / inv_sum;
        a.velocity += normal * (impulse * inv_a);
        b.velocity -= normal * (impulse * inv_b);
    }
    true
}

/// Speed scale applied to integration at a given temperature.
pub fn speed_multiplier(temperature: f32) -> f32 {
    1.0 + temperature.clamp(0.0, 1.0) * (PARTICLE_MAX_SPEED_MULTIPLIER - 1.0)
}

/// A disc plus its drag state and its two CC bindings.
#[derive(Clone, Debug)]
pub struct Particle {
    pub disc: Disc,
    pub mode: BodyMode<Vec2>,
    pub color: [f32; 4],
    pub x_binding: MidiBinding,
    pub y_binding: MidiBinding,
}

impl Particle {
    /// A held particle behaves as an immovable obstacle.
    fn inverse_mass(&self) -> f32 {
        if self.mode.is_held() {
            0.0
        } else {
            self.disc.mass.recip()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Drag {
    Temperature { offset: f32 },
    Particle { index: usize, offset: Vec2 },
}

const TEMPERATURE_TRACK: VerticalSlider = VerticalSlider::new(500.0, 150.0, 30.0, 200.0);
const GRID_SPACING: f32 = 50.0;
const PICK_SCALE: f32 = 1.5; // grab area relative to the disc radius

pub fn temperature_track() -> VerticalSlider {
    TEMPERATURE_TRACK
}

pub struct ParticleModule {
    pub particles: [Particle; 2],
    pub temperature: f32,
    pub bounds: Bounds,
    /// Scene position of the area's top-left corner.
    pub origin: Vec2,
    rng: StdRng,
    drag: Option<Drag>,
}

impl ParticleModule {
    pub fn new(
        controllers: [[ControllerNumber; 2]; 2],
        channel: Channel,
        area: Vec2,
        temperature: f32,
        seed: u64,
    ) -> Self {
        let bounds = Bounds::from_size(area);
        let mut rng = StdRng::seed_from_u64(seed);
        let colors = [RED, GREEN];
        let particles = std::array::from_fn(|i| {
            let margin = PARTICLE_SPAWN_MARGIN.min(area.min_element() * 0.5);
            let position = Vec2::new(
                rng.gen_range(margin..=area.x - margin),
                rng.gen_range(margin..=area.y - margin),
            );
            let velocity = Vec2::new(
                rng.gen_range(-PARTICLE_INITIAL_SPEED..=PARTICLE_INITIAL_SPEED),
                rng.gen_range(-PARTICLE_INITIAL_SPEED..=PARTICLE_INITIAL_SPEED),
            );
            let [cc_x, cc_y] = controllers[i];
            Particle {
                disc: Disc::new(position, velocity, PARTICLE_RADIUS),
                mode: BodyMode::Free,
                color: colors[i],
                x_binding: MidiBinding::controller(cc_x, channel, (0.0, area.x)),
                y_binding: MidiBinding::controller(cc_y, channel, (0.0, area.y)),
            }
        });
        log::info!(
            "[particle] area={}x{} temperature={:.2} seed={} ch{}",
            area.x,
            area.y,
            temperature,
            seed,
            channel.number()
        );
        Self {
            particles,
            temperature: temperature.clamp(0.0, 1.0),
            bounds,
            origin: PARTICLE_AREA_ORIGIN,
            rng,
            drag: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let ccs = config.particle.controllers;
        let controllers = std::array::from_fn(|i| {
            std::array::from_fn(|axis| controller_or(ccs[i][axis], PARTICLE_DEFAULT_CCS[i][axis]))
        });
        Self::new(
            controllers,
            config.channel(),
            Vec2::new(config.particle.width, config.particle.height),
            config.particle.temperature,
            config.particle.seed,
        )
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ConfigError::OutOfRange {
                name: "temperature",
                value: temperature,
                min: 0.0,
                max: 1.0,
            });
        }
        self.temperature = temperature;
        Ok(())
    }

    /// Grab a particle at an area-local position.
    pub fn grab(&mut self, index: usize, at: Vec2) {
        let bounds = self.bounds;
        if let Some(p) = self.particles.get_mut(index) {
            p.disc.position = at;
            p.disc.confine(bounds);
            p.disc.velocity = Vec2::ZERO;
            p.mode.grab(p.disc.position);
            log::info!("[particle] begin drag on particle {}", index);
        }
    }

    pub fn drag_to(&mut self, index: usize, at: Vec2) {
        let bounds = self.bounds;
        if let Some(p) = self.particles.get_mut(index) {
            if p.mode.is_held() {
                p.disc.position = at;
                p.disc.confine(bounds);
                p.mode.drag(p.disc.position);
            }
        }
    }

    /// Throw a held particle with its grip's exit velocity.
    pub fn release(&mut self, index: usize) {
        let mult = speed_multiplier(self.temperature);
        if let Some(p) = self.particles.get_mut(index) {
            if let Some(exit) = p.mode.release() {
                p.disc.velocity = (exit / mult).clamp_length_max(PARTICLE_MAX_SPEED);
                log::info!(
                    "[particle] release particle {} with velocity ({:.0}, {:.0})",
                    index,
                    p.disc.velocity.x,
                    p.disc.velocity.y
                );
            }
        }
    }

    fn to_local(&self, scene: Vec2) -> Vec2 {
        scene - self.origin
    }

    fn integrate(&mut self, dt: f32) {
        let mult = speed_multiplier(self.temperature);
        let jitter = PARTICLE_JITTER * self.temperature;
        for p in &mut self.particles {
            if p.mode.is_held() {
                p.mode.sample(dt);
                continue;
            }
            if jitter > 0.0 {
                let nudge = Vec2::new(
                    self.rng.gen_range(-1.0f32..=1.0),
                    self.rng.gen_range(-1.0f32..=1.0),
                );
                p.disc.velocity += nudge * jitter;
            }
            p.disc.velocity = p.disc.velocity.clamp_length_max(PARTICLE_MAX_SPEED);
            p.disc.position += p.disc.velocity * mult * dt;
            resolve_walls(&mut p.disc, self.bounds);
        }
    }

    fn collide(&mut self) {
        let [a, b] = &mut self.particles;
        let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
        if resolve_pair_weighted(&mut a.disc, &mut b.disc, inv_a, inv_b) {
            a.disc.confine(self.bounds);
            b.disc.confine(self.bounds);
        }
    }
}

impl Simulation for ParticleModule {
    fn name(&self) -> &'static str {
        "Particle"
    }

    fn route_output(&mut self, device: &DeviceId, channel: Channel) {
        for p in &mut self.particles {
            p.x_binding.route(device, channel);
            p.y_binding.route(device, channel);
        }
    }

    fn handle_pointer(&mut self, ev: PointerEvent) {
        match ev.phase {
            PointerPhase::Down => {
                if TEMPERATURE_TRACK.track.contains(ev.position) {
                    let offset = ev.position.y - TEMPERATURE_TRACK.handle_y(self.temperature);
                    self.drag = Some(Drag::Temperature { offset });
                    return;
                }
                let local = self.to_local(ev.position);
                let hit = self.particles.iter().position(|p| {
                    p.disc.position.distance(local) < p.disc.radius * PICK_SCALE
                });
                if let Some(index) = hit {
                    let offset = local - self.particles[index].disc.position;
                    self.drag = Some(Drag::Particle { index, offset });
                    self.grab(index, local - offset);
                }
            }
            PointerPhase::Move => match self.drag {
                Some(Drag::Temperature { offset }) => {
                    self.temperature = TEMPERATURE_TRACK.normalized_at(ev.position.y - offset);
                }
                Some(Drag::Particle { index, offset }) => {
                    let local = self.to_local(ev.position);
                    self.drag_to(index, local - offset);
                }
                None => {}
            },
            PointerPhase::Up => {
                if let Some(Drag::Particle { index, .. }) = self.drag.take() {
                    self.release(index);
                }
            }
        }
    }

    fn step(&mut self, dt: f32, sink: &mut dyn MidiSink) -> FrameReport {
        self.integrate(dt);
        self.collide();

        let mut report = FrameReport::default();
        for p in &mut self.particles {
            report.record(&p.x_binding.push(p.disc.position.x, sink));
            report.record(&p.y_binding.push(p.disc.position.y, sink));
        }
        report
    }

    fn shapes(&self, out: &mut Vec<Shape>) {
        let size = self.bounds.size();
        let mut x = GRID_SPACING;
        while x < size.x {
            let a = self.origin + Vec2::new(x, 0.0);
            out.push(Shape::segment(a, a + Vec2::new(0.0, size.y), 1.0, DARK_GRAY));
            x += GRID_SPACING;
        }
        let mut y = GRID_SPACING;
        while y < size.y {
            let a = self.origin + Vec2::new(0.0, y);
            out.push(Shape::segment(a, a + Vec2::new(size.x, 0.0), 1.0, DARK_GRAY));
            y += GRID_SPACING;
        }
        Shape::outline(self.origin, size, 2.0, WHITE, out);

        for p in &self.particles {
            let c = self.origin + p.disc.position;
            out.push(Shape::circle(c, p.disc.radius, p.color));
            let hl = [
                (p.color[0] + 0.4).min(1.0),
                (p.color[1] + 0.4).min(1.0),
                (p.color[2] + 0.4).min(1.0),
                1.0,
            ];
            out.push(Shape::circle(c - Vec2::splat(3.0), p.disc.radius / 3.0, hl));
        }

        // temperature control, blue (cold) at the bottom to red (hot) at the top
        let track = TEMPERATURE_TRACK.track;
        const BANDS: usize = 10;
        let band_h = track.size.y / BANDS as f32;
        for b in 0..BANDS {
            let t = 1.0 - (b as f32 + 0.5) / BANDS as f32;
            let y = track.origin.y + band_h * (b as f32 + 0.5);
            out.push(Shape::rect(
                Vec2::new(track.center().x, y),
                Vec2::new(track.size.x - 4.0, band_h),
                [t, 0.0, 1.0 - t, 1.0],
            ));
        }
        Shape::outline(track.origin, track.size, 2.0, WHITE, out);
        out.push(Shape::rect(
            Vec2::new(track.center().x, TEMPERATURE_TRACK.handle_y(self.temperature)),
            Vec2::new(track.size.x + 10.0, 15.0),
            WHITE,
        ));
    }

    fn status(&self) -> String {
        let axis = |b: &MidiBinding, v: f32| match b.target {
            Target::Controller(cc) => format!("CC{}={}", cc.number(), b.quantize(v)),
            Target::PitchBend => format!("PB={}", b.quantize(v)),
        };
        let [red, green] = &self.particles;
        format!(
            "Particle | temp {:.0}% (x{:.1}) | red {} {} | green {} {}",
            self.temperature * 100.0,
            speed_multiplier(self.temperature),
            axis(&red.x_binding, red.disc.position.x),
            axis(&red.y_binding, red.disc.position.y),
            axis(&green.x_binding, green.disc.position.x),
            axis(&green.y_binding, green.disc.position.y),
        )
    }
}
