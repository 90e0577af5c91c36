//! Ball entity and per-object physics
//!
//! A ball is a circle in the XZ plane riding over a terrain height-field. Each
//! sub-step it integrates acceleration and velocity, then reconciles its height
//! with the ground: small bumps are ridden over, moderate slopes are climbed at a
//! speed penalty, steep drops launch it into the air and steep rises are crashes.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ids::BallId;
use super::profile::{ObjectLocation, ObjectProperties};
use super::terrain::TerrainHeightQuery;
use crate::consts::{OUTER_RADIUS_FACTOR, OVERLAP_EPSILON};
use crate::error::{PhysicsError, Result};
use crate::settings::PhysicsSettings;
use crate::xz;

/// Result of an overlap test between two balls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlaps {
    /// Hard overlap: the balls interpenetrate
    Overlaps,
    /// Only the outer (prediction) radii overlap
    OverlapsOuter,
    NoOverlaps,
}

/// Motion state derived from the flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Grounded,
    /// Following rising/falling ground at a speed penalty
    Climbing,
    Flying,
    /// Frozen ghost: rendered, never simulated
    Disabled,
}

/// One circular actor, dynamic or static
#[derive(Debug, Clone)]
pub struct Ball {
    pub(crate) id: BallId,
    pub(crate) profile: Arc<ObjectProperties>,

    pub(crate) position: Vec3,
    /// Heading lives in `rotation.y`
    pub(crate) rotation: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) acceleration: Vec3,

    pub(crate) outer_radius_factor: f32,
    pub(crate) overlap_epsilon: f32,
    pub(crate) mass_multiplier: f32,
    pub(crate) radius_multiplier: f32,
    pub(crate) radius_animator: f32,

    /// Ground inclination under the ball (x, z), for visual tilt
    pub(crate) terrain_angle: Vec2,
    /// Speed retained per second imposed by terrain irregularities
    pub(crate) penalty: f32,

    pub(crate) flying: bool,
    pub(crate) disabled: bool,
    pub(crate) forward: bool,
    pub(crate) reverse: bool,

    // Per-sub-step simulation bookkeeping
    pub(crate) orig_position: Vec3,
    pub(crate) sim_time_remaining: f32,
    pub(crate) step_speed: f32,
    anim_time: f32,
}

impl Ball {
    /// Create a ball from a validated profile
    pub fn new(id: BallId, profile: Arc<ObjectProperties>, location: &ObjectLocation) -> Result<Self> {
        profile.validate()?;
        let is_static = profile.is_static;
        Ok(Self {
            id,
            profile,
            position: location.position,
            rotation: location.rotation,
            velocity: if is_static { Vec3::ZERO } else { location.initial_speed },
            acceleration: if is_static {
                Vec3::ZERO
            } else {
                location.initial_acceleration
            },
            outer_radius_factor: OUTER_RADIUS_FACTOR,
            overlap_epsilon: OVERLAP_EPSILON,
            mass_multiplier: 1.0,
            radius_multiplier: 1.0,
            radius_animator: 0.0,
            terrain_angle: Vec2::ZERO,
            penalty: 1.0,
            flying: false,
            disabled: false,
            forward: false,
            reverse: false,
            orig_position: location.position,
            sim_time_remaining: 0.0,
            step_speed: 0.0,
            anim_time: 0.0,
        })
    }

    // --- Read-only accessors for the rendering layer ---

    pub fn id(&self) -> BallId {
        self.id
    }

    pub fn class_name(&self) -> &str {
        &self.profile.class_name
    }

    pub fn properties(&self) -> &ObjectProperties {
        &self.profile
    }

    pub fn is_static(&self) -> bool {
        self.profile.is_static
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Heading angle (radians around +Y)
    pub fn angle(&self) -> f32 {
        self.rotation.y
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Horizontal speed modulus
    pub fn speed(&self) -> f32 {
        xz(self.velocity).length()
    }

    pub fn mass(&self) -> f32 {
        self.profile.mass * self.mass_multiplier
    }

    /// The pulse scales with the multiplier so the radius stays positive
    /// (`scale_pulse < 1` is enforced by the profile)
    pub fn radius(&self) -> f32 {
        self.profile.radius * self.radius_multiplier * (1.0 + self.radius_animator)
    }

    /// Inflated radius used only to predict upcoming collisions
    pub fn outer_radius(&self) -> f32 {
        self.profile.radius
            * self.radius_multiplier
            * (self.outer_radius_factor + self.radius_animator)
    }

    pub fn draw_radius(&self) -> f32 {
        self.radius() * self.profile.draw_radius_multiplier
    }

    pub fn terrain_angle(&self) -> Vec2 {
        self.terrain_angle
    }

    pub fn is_flying(&self) -> bool {
        self.flying
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn motion_state(&self) -> MotionState {
        if self.disabled {
            MotionState::Disabled
        } else if self.flying {
            MotionState::Flying
        } else if self.penalty < 1.0 {
            MotionState::Climbing
        } else {
            MotionState::Grounded
        }
    }

    // --- Mutators available to hosts ---

    /// Freeze or release the ball. A disabled ball keeps rendering but is
    /// skipped by the simulation.
    pub fn disable(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_mass_multiplier(&mut self, multiplier: f32) -> Result<()> {
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            return Err(PhysicsError::InvalidMultiplier {
                id: self.id.0,
                value: multiplier,
            });
        }
        self.mass_multiplier = multiplier;
        Ok(())
    }

    pub fn set_radius_multiplier(&mut self, multiplier: f32) -> Result<()> {
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            return Err(PhysicsError::InvalidMultiplier {
                id: self.id.0,
                value: multiplier,
            });
        }
        self.radius_multiplier = multiplier;
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        if !self.is_static() {
            self.velocity = velocity;
        }
    }

    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        if !self.is_static() {
            self.acceleration = acceleration;
        }
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.rotation.y = heading;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    // --- Geometry (XZ plane) ---

    /// Distance between centers
    pub fn distance(&self, target: &Ball) -> f32 {
        xz(self.position).distance(xz(target.position))
    }

    pub fn is_point_in_ball(&self, point: Vec3) -> bool {
        xz(self.position).distance(xz(point)) < self.radius()
    }

    /// Whether the two balls touch, using the outer radii when `outer` is set
    pub fn intersects(&self, other: &Ball, outer: bool) -> bool {
        self.distance(other) < self.radius_sum(other, outer) - self.overlap_epsilon
    }

    /// Hard overlap takes precedence over outer overlap
    pub fn overlaps(&self, other: &Ball) -> Overlaps {
        if self.intersects(other, false) {
            Overlaps::Overlaps
        } else if self.intersects(other, true) {
            Overlaps::OverlapsOuter
        } else {
            Overlaps::NoOverlaps
        }
    }

    pub(crate) fn radius_sum(&self, other: &Ball, outer: bool) -> f32 {
        if outer {
            self.outer_radius() + other.outer_radius()
        } else {
            self.radius() + other.radius()
        }
    }

    /// Unit vector from `target` to this ball in the XZ plane. Coincident
    /// centers fall back to +X so separation stays deterministic.
    pub fn separation_normal(&self, target: &Ball) -> Vec3 {
        let delta = xz(self.position) - xz(target.position);
        let dist = delta.length();
        if dist < crate::consts::STABLE {
            return Vec3::X;
        }
        Vec3::new(delta.x / dist, 0.0, delta.y / dist)
    }

    /// Translation to apply to this ball so both circles end up exactly touching
    pub fn calculate_overlap_displacement(&self, target: &Ball, outer: bool) -> Vec3 {
        let sum = self.radius_sum(target, outer);
        let dist = self.distance(target);
        if dist < crate::consts::STABLE {
            return Vec3::X * sum;
        }
        self.separation_normal(target) * (sum - dist)
    }

    /// Penetration depth against another ball (0 when apart)
    pub fn penetration(&self, other: &Ball) -> f32 {
        (self.radius_sum(other, false) - self.distance(other)).max(0.0)
    }

    /// A static, motionless proxy sharing this ball's material. Walls and terrain
    /// crashes are resolved as collisions against these.
    pub fn make_collision_ball(&self, radius: f32, position: Vec3) -> Ball {
        let profile = ObjectProperties {
            class_name: "fake".to_string(),
            radius: radius.max(crate::consts::STABLE),
            mass: self.mass(),
            is_static: true,
            ..(*self.profile).clone()
        };
        Ball {
            id: BallId::FAKE,
            profile: Arc::new(profile),
            position,
            rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            outer_radius_factor: 1.0,
            overlap_epsilon: self.overlap_epsilon,
            mass_multiplier: 1.0,
            radius_multiplier: 1.0,
            radius_animator: 0.0,
            terrain_angle: Vec2::ZERO,
            penalty: 1.0,
            flying: false,
            disabled: false,
            forward: false,
            reverse: false,
            orig_position: position,
            sim_time_remaining: 0.0,
            step_speed: 0.0,
            anim_time: 0.0,
        }
    }

    // --- Simulation ---

    pub(crate) fn apply_settings(&mut self, settings: &PhysicsSettings) {
        self.outer_radius_factor = settings.outer_radius_factor;
        self.overlap_epsilon = settings.overlap_epsilon;
    }

    /// Advance intrinsic animation (spin and radius pulse)
    pub(crate) fn animate(&mut self, dt: f32) {
        let anim = self.profile.animation;
        if !anim.enabled {
            return;
        }
        self.anim_time += dt;
        self.rotation += anim.delta_rotation * dt;
        self.radius_animator = anim.scale_pulse * self.anim_time.sin();
    }

    /// Integrate one sub-step: acceleration -> velocity -> position, then terrain.
    ///
    /// Returns a collision proxy when the ball crashed into a rise too steep to
    /// climb; the world resolves it like any other static contact.
    pub fn process(
        &mut self,
        terrain: &dyn TerrainHeightQuery,
        settings: &PhysicsSettings,
        dt: f32,
    ) -> Option<Ball> {
        if self.disabled || self.is_static() || dt <= 0.0 {
            return None;
        }

        self.apply_settings(settings);
        self.animate(dt);

        let start = self.position;
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;

        let crash = self.process_heights(terrain, settings, start);
        self.apply_drag(dt);
        crash
    }

    /// Height reconciliation against the terrain after an XZ move from `start`
    fn process_heights(
        &mut self,
        terrain: &dyn TerrainHeightQuery,
        settings: &PhysicsSettings,
        start: Vec3,
    ) -> Option<Ball> {
        let behavior = self.profile.terrain;
        let ground = terrain.height(self.position);
        self.terrain_angle = terrain.angle(self.position, self.radius());

        if self.flying {
            if self.position.y > ground {
                self.acceleration.y = settings.gravity;
                return None;
            }
            // Flew into ground rising above the height we left from
            let rise = ground - start.y;
            if rise > behavior.ride_height_seamless {
                let run = xz(self.position).distance(xz(start)).max(settings.stable);
                if rise / run > behavior.climb_limit {
                    self.acceleration.y = settings.gravity;
                    return Some(self.crash(start));
                }
            }
            // Landing
            self.position.y = ground;
            let rebound = -self.velocity.y * self.profile.elasticity;
            if rebound > settings.landing_rebound {
                self.velocity.y = rebound;
                self.acceleration.y = settings.gravity;
            } else {
                self.velocity.y = 0.0;
                self.acceleration.y = 0.0;
                self.flying = false;
            }
            return None;
        }

        let delta = ground - self.position.y;
        let run = xz(self.position).distance(xz(start)).max(settings.stable);
        self.penalty = 1.0;

        if delta.abs() <= behavior.ride_height_seamless {
            self.settle(ground);
            return None;
        }

        let slope = delta.abs() / run;
        if delta > 0.0 {
            if slope <= behavior.climb_limit {
                self.climb(ground, slope / behavior.climb_limit.max(f32::EPSILON));
                return None;
            }
            return Some(self.crash(start));
        }

        if slope <= behavior.fall_limit {
            self.climb(ground, slope / behavior.fall_limit.max(f32::EPSILON));
        } else {
            // Ground fell away: airborne
            self.flying = true;
            self.acceleration.y = settings.gravity;
        }
        None
    }

    fn settle(&mut self, ground: f32) {
        self.position.y = ground;
        self.velocity.y = 0.0;
        self.acceleration.y = 0.0;
    }

    fn climb(&mut self, ground: f32, steepness: f32) {
        self.settle(ground);
        let scratching = self.profile.terrain.scratching;
        self.penalty = 1.0 - (1.0 - scratching) * steepness.clamp(0.0, 1.0);
    }

    /// Rise too steep: lose speed and produce a wall proxy placed so that static
    /// resolution pushes the ball back to `start`.
    ///
    /// The proxy is at least as large as the move, so its center always lies
    /// ahead of the ball however far the sub-step carried it.
    fn crash(&mut self, start: Vec3) -> Ball {
        let moved = xz(self.position) - xz(start);
        let dir = moved.normalize_or(Vec2::X);
        let efficiency = self.profile.crash_efficiency;
        self.velocity.x *= efficiency;
        self.velocity.z *= efficiency;
        self.position.y = start.y;

        let radius = self.radius();
        let wall_radius = radius.max(moved.length());
        let wall = start + Vec3::new(dir.x, 0.0, dir.y) * (radius + wall_radius);
        self.make_collision_ball(wall_radius, wall)
    }

    /// Per-second speed retention for terrain/air and climbing penalty
    fn apply_drag(&mut self, dt: f32) {
        let aero = self.profile.aero;
        let horizontal = if self.flying { aero.air } else { aero.terrain * self.penalty };
        let keep = horizontal.powf(dt);
        self.velocity.x *= keep;
        self.velocity.z *= keep;
        if self.flying {
            self.velocity.y *= aero.air_vertical.powf(dt);
        }
    }
}

/// Read-only per-frame view of a ball for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub id: BallId,
    pub class_name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub radius: f32,
    pub draw_radius: f32,
    pub velocity: Vec3,
    pub speed: f32,
    pub flying: bool,
    pub disabled: bool,
}

impl From<&Ball> for BallSnapshot {
    fn from(ball: &Ball) -> Self {
        Self {
            id: ball.id,
            class_name: ball.class_name().to_string(),
            position: ball.position,
            rotation: ball.rotation,
            radius: ball.radius(),
            draw_radius: ball.draw_radius(),
            velocity: ball.velocity,
            speed: ball.speed(),
            flying: ball.flying,
            disabled: ball.disabled,
        }
    }
}
