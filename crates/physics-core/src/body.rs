//! Drag-vs-physics ownership of a body.
//!
//! A body is either `Free` (the integrator moves it) or `Held` by the pointer.
//! While held, the grip samples the pointer once per fixed step so that
//! release can hand the integrator a finite-difference exit velocity.
//!
//! Pointer input arrives once per redraw while a redraw may run several fixed
//! steps, so the difference spans the time since the pointer last moved, not
//! a single step.

use crate::constants::GRIP_STILL_SEC;
use std::ops::{Div, Sub};

/// Pointer grip on a body. `T` is the held coordinate (`f32` or `Vec2`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grip<T> {
    /// Latest pointer-derived position.
    pub target: T,
    last: T,
    velocity: T,
    /// Time since `last` was taken.
    since: f32,
}

impl<T> Grip<T>
where
    T: Copy + Default + PartialEq + Sub<Output = T> + Div<f32, Output = T>,
{
    pub fn new(at: T) -> Self {
        Self {
            target: at,
            last: at,
            velocity: T::default(),
            since: 0.0,
        }
    }

    pub fn move_to(&mut self, to: T) {
        self.target = to;
    }

    /// Called once per fixed step while held. Steps without pointer movement
    /// keep the last measured velocity until the grip has been still for
    /// `GRIP_STILL_SEC`. A grip at rest measures its next movement from the
    /// step before it.
    pub fn sample(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.since += dt;
        if self.target != self.last {
            self.velocity = (self.target - self.last) / self.since;
            self.last = self.target;
            self.since = 0.0;
        } else if self.velocity == T::default() || self.since > GRIP_STILL_SEC {
            self.velocity = T::default();
            self.since = 0.0;
        }
    }

    pub fn velocity(&self) -> T {
        self.velocity
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BodyMode<T> {
    #[default]
    Free,
    Held(Grip<T>),
}

impl<T> BodyMode<T>
where
    T: Copy + Default + PartialEq + Sub<Output = T> + Div<f32, Output = T>,
{
    pub fn is_held(&self) -> bool {
        matches!(self, BodyMode::Held(_))
    }

    /// Free → Held on pointer-down.
    pub fn grab(&mut self, at: T) {
        *self = BodyMode::Held(Grip::new(at));
    }

    /// Update the grip target; ignored while free.
    pub fn drag(&mut self, to: T) {
        if let BodyMode::Held(grip) = self {
            grip.move_to(to);
        }
    }

    pub fn sample(&mut self, dt: f32) {
        if let BodyMode::Held(grip) = self {
            grip.sample(dt);
        }
    }

    /// Held → Free. Returns the exit velocity, or `None` if the body was free.
    pub fn release(&mut self) -> Option<T> {
        match std::mem::take(self) {
            BodyMode::Held(grip) => Some(grip.velocity()),
            BodyMode::Free => None,
        }
    }
}
