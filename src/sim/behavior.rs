//! Per-ball behaviors: the override points of a ball
//!
//! The world owns one behavior per ball and calls it around physics: before each
//! integration step, when a hard collision produced a new velocity, and when a
//! collision is predicted on the outer radius.

use std::any::Any;
use std::fmt::Debug;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use crate::{heading_vector, normalize_angle};

pub trait BallBehavior: Debug {
    /// Called before `Ball::process` on every integration step
    fn before_process(&mut self, _ball: &mut Ball, _dt: f32) {}

    /// A hard collision computed `new_velocity` for `ball`. The default accepts it.
    fn on_collision(&mut self, ball: &mut Ball, _other: &Ball, new_velocity: Vec3, _dt: f32) {
        ball.velocity = new_velocity;
    }

    /// `other` entered this ball's outer radius (at most once per pair per tick)
    fn on_future_collision(&mut self, _ball: &mut Ball, _other: &Ball) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Plain ball: accepts physics as computed
#[derive(Debug, Clone, Copy, Default)]
pub struct Passive;

impl BallBehavior for Passive {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Driving characteristics of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleFeatures {
    /// Top speed forward (world units/s)
    pub max_speed: f32,
    /// Top speed in reverse
    pub max_speed_back: f32,
    /// Acceleration at full throttle (world units/s²)
    pub acceleration: f32,
    /// Turn rate at full steer and top speed (radians/s)
    pub handling: f32,
    /// Fraction of speed lost per second when coasting
    pub friction: f32,
    /// Vertical launch speed of a jump
    pub jump_speed: f32,
}

impl Default for VehicleFeatures {
    fn default() -> Self {
        Self {
            max_speed: 400.0,
            max_speed_back: 120.0,
            acceleration: 300.0,
            handling: 2.5,
            friction: 0.3,
            jump_speed: 350.0,
        }
    }
}

/// Driver-controlled ball (karts). Controls are latched by the host each frame
/// and applied on every integration step.
#[derive(Debug, Clone, Default)]
pub struct Vehicle {
    pub features: VehicleFeatures,
    throttle: f32,
    steer: f32,
    jump_requested: bool,
    crashes: u32,
    threats: u32,
}

impl Vehicle {
    pub fn new(features: VehicleFeatures) -> Self {
        Self {
            features,
            ..Default::default()
        }
    }

    /// Throttle in -1..=1 (negative = reverse)
    pub fn accelerate(&mut self, percentage: f32) {
        self.throttle = percentage.clamp(-1.0, 1.0);
    }

    pub fn brake(&mut self) {
        self.throttle = 0.0;
    }

    /// Steering in -1..=1 (positive turns toward +heading)
    pub fn steer(&mut self, amount: f32) {
        self.steer = amount.clamp(-1.0, 1.0);
    }

    pub fn jump(&mut self) {
        self.jump_requested = true;
    }

    /// Hard collisions taken so far
    pub fn crashes(&self) -> u32 {
        self.crashes
    }

    /// Outer-radius warnings received so far
    pub fn threats(&self) -> u32 {
        self.threats
    }

    /// Speed as a fraction of the top speed in the current gear
    pub fn speed_percent(&self, ball: &Ball) -> f32 {
        let max = if ball.is_reverse() {
            self.features.max_speed_back
        } else {
            self.features.max_speed
        };
        (ball.speed() / max.max(f32::EPSILON)).min(1.0)
    }
}

impl BallBehavior for Vehicle {
    fn before_process(&mut self, ball: &mut Ball, dt: f32) {
        if ball.flying {
            // no grip in the air
            ball.acceleration.x = 0.0;
            ball.acceleration.z = 0.0;
            self.jump_requested = false;
            return;
        }

        if self.jump_requested {
            self.jump_requested = false;
            ball.velocity.y = self.features.jump_speed;
            ball.flying = true;
        }

        // Steering bites harder the faster we go
        let grip = self.speed_percent(ball);
        ball.rotation.y = normalize_angle(ball.rotation.y + self.steer * self.features.handling * grip * dt);

        let heading = heading_vector(ball.rotation.y);
        let speed = ball.speed();
        let along = ball.velocity.dot(heading);

        // Re-align the velocity with the heading (tyres do not slide)
        let direction = if along < 0.0 { -heading } else { heading };
        ball.velocity.x = direction.x * speed;
        ball.velocity.z = direction.z * speed;

        ball.forward = self.throttle > 0.0;
        ball.reverse = self.throttle < 0.0;

        let push = heading * self.throttle * self.features.acceleration;
        ball.acceleration.x = push.x;
        ball.acceleration.z = push.z;

        if self.throttle == 0.0 {
            let keep = (1.0 - self.features.friction).clamp(0.0, 1.0).powf(dt);
            ball.velocity.x *= keep;
            ball.velocity.z *= keep;
        }

        let limit = if along < 0.0 {
            self.features.max_speed_back
        } else {
            self.features.max_speed
        };
        if speed > limit {
            let scale = limit / speed;
            ball.velocity.x *= scale;
            ball.velocity.z *= scale;
        }
    }

    fn on_collision(&mut self, ball: &mut Ball, other: &Ball, new_velocity: Vec3, _dt: f32) {
        self.crashes += 1;
        log::debug!("Vehicle {} hit {} ({})", ball.id(), other.id(), other.class_name());
        ball.velocity = new_velocity;
    }

    fn on_future_collision(&mut self, _ball: &mut Ball, _other: &Ball) {
        self.threats += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
