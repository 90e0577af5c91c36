//! PixFu Physics - ball physics and collision core
//!
//! Core modules:
//! - `sim`: Balls, terrain interaction, collision resolution and the world orchestrator
//! - `settings`: Tunable simulation constants (sub-steps, gravity, thresholds)
//! - `error`: Construction/configuration errors
//!
//! Everything happens in the XZ plane; Y is terrain height, never a collision axis.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{PhysicsError, Result};
pub use settings::PhysicsSettings;

use glam::{Vec2, Vec3};

/// Engine-wide physics constants
pub mod consts {
    /// ID carried by every synthetic collision proxy ("fake ball")
    pub const FAKE_BALL_ID: u32 = 9999;

    /// Gravity in world units/s² (a 9.8-ish value scaled to world units)
    pub const ACCELERATION_EARTH: f32 = -9.8 * 100.0;

    /// Integration sub-steps per frame
    pub const SIMULATION_UPDATES: u32 = 2;
    /// Resolution passes per sub-step (collision trees may never fully settle)
    pub const MAX_SIMULATION_STEPS: u32 = 3;

    /// Threshold below which an object is considered at rest
    pub const STABLE: f32 = 0.001;

    /// Slack subtracted from radius sums so touching balls do not report overlap
    pub const OVERLAP_EPSILON: f32 = 1e-3;

    /// Outer radius = radius * this (collision prediction only)
    pub const OUTER_RADIUS_FACTOR: f32 = 1.5;

    /// Minimum rebound speed after landing before the ball settles on the ground
    pub const LANDING_REBOUND: f32 = 20.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Project a world position onto the collision plane (x, z)
#[inline]
pub fn xz(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Unit direction in the XZ plane for a heading angle (radians around +Y)
#[inline]
pub fn heading_vector(heading: f32) -> Vec3 {
    Vec3::new(heading.cos(), 0.0, heading.sin())
}
