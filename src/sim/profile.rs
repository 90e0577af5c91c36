//! Object profiles and the object database
//!
//! A profile is the immutable physical description of a class of objects (a tree,
//! a virus, a kart). Balls share their profile through an `Arc`. The `ObjectDb`
//! maps an integer object id to a profile plus a default placement so games can
//! populate a world by id.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Rough resistance to terrain and air, as fraction of speed retained per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectAerodynamics {
    /// Horizontal retention while touching the ground
    pub terrain: f32,
    /// Horizontal retention while airborne
    pub air: f32,
    /// Vertical retention while airborne
    pub air_vertical: f32,
}

impl Default for ObjectAerodynamics {
    fn default() -> Self {
        Self {
            terrain: 0.8,
            air: 0.95,
            air_vertical: 0.9,
        }
    }
}

/// How an object reacts to height changes while crawling over terrain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainBehavior {
    /// Speed retained per second when climbing at the climb limit (1 = no loss)
    pub scratching: f32,
    /// Steepest rise (height / horizontal run) that is climbed instead of crashed into
    pub climb_limit: f32,
    /// Steepest drop (height / horizontal run) that is followed instead of fallen off
    pub fall_limit: f32,
    /// Height differences up to this are ridden over unaffected
    pub ride_height_seamless: f32,
}

impl Default for TerrainBehavior {
    fn default() -> Self {
        Self {
            scratching: 0.6,
            climb_limit: 0.3,
            fall_limit: 0.3,
            ride_height_seamless: 5.0,
        }
    }
}

/// Intrinsic animation: spin around every axis and pulse the radius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectAnimation {
    pub enabled: bool,
    /// Radians per second around x, y, z
    pub delta_rotation: Vec3,
    /// sin() pulse on the radius (0.1 = 10% size variation)
    pub scale_pulse: f32,
}

/// Immutable physical description of an object class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectProperties {
    /// Class name, also the asset key for the renderer
    pub class_name: String,
    pub radius: f32,
    pub mass: f32,
    /// Bounce coefficient (0 = dead stop, 1 = perfectly elastic)
    pub elasticity: f32,
    /// Fraction of horizontal speed kept after crashing into a terrain wall
    pub crash_efficiency: f32,
    pub aero: ObjectAerodynamics,
    pub terrain: TerrainBehavior,
    pub animation: ObjectAnimation,
    /// Static objects never move and never collide with other statics
    pub is_static: bool,
    /// Visual-only inflation (a tall tree collides with its trunk only)
    pub draw_radius_multiplier: f32,
}

impl Default for ObjectProperties {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            radius: 1.0,
            mass: 1.0,
            elasticity: 0.8,
            crash_efficiency: 0.75,
            aero: ObjectAerodynamics::default(),
            terrain: TerrainBehavior::default(),
            animation: ObjectAnimation::default(),
            is_static: false,
            draw_radius_multiplier: 1.0,
        }
    }
}

fn retention(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

impl ObjectProperties {
    /// A dynamic profile with the given class, radius and mass
    pub fn new(class_name: impl Into<String>, radius: f32, mass: f32) -> Self {
        Self {
            class_name: class_name.into(),
            radius,
            mass,
            ..Default::default()
        }
    }

    /// A static obstacle profile (trees, posts)
    pub fn fixed(class_name: impl Into<String>, radius: f32, mass: f32) -> Self {
        Self {
            is_static: true,
            elasticity: 0.0,
            crash_efficiency: 0.0,
            ..Self::new(class_name, radius, mass)
        }
    }

    /// Check the invariants the simulation relies on (mass and radius > 0, ...)
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| {
            Err(PhysicsError::InvalidProfile {
                class: self.class_name.clone(),
                reason,
            })
        };

        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return fail(format!("radius {} must be > 0", self.radius));
        }
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return fail(format!("mass {} must be > 0", self.mass));
        }
        if !(self.elasticity >= 0.0 && self.elasticity.is_finite()) {
            return fail(format!("elasticity {} must be >= 0", self.elasticity));
        }
        if !retention(self.crash_efficiency) {
            return fail(format!(
                "crash_efficiency {} outside 0..=1",
                self.crash_efficiency
            ));
        }
        let aero = &self.aero;
        if !(retention(aero.terrain) && retention(aero.air) && retention(aero.air_vertical)) {
            return fail("aerodynamic coefficients must be within 0..=1".into());
        }
        let t = &self.terrain;
        if !retention(t.scratching) {
            return fail(format!("scratching {} outside 0..=1", t.scratching));
        }
        if !(t.climb_limit >= 0.0 && t.fall_limit >= 0.0 && t.ride_height_seamless >= 0.0) {
            return fail("terrain limits must be >= 0".into());
        }
        if !(0.0..1.0).contains(&self.animation.scale_pulse) {
            return fail(format!(
                "scale_pulse {} would collapse the radius",
                self.animation.scale_pulse
            ));
        }
        if !(self.draw_radius_multiplier > 0.0) {
            return fail("draw_radius_multiplier must be > 0".into());
        }
        Ok(())
    }
}

/// Optional initial placement and motion for a new object
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectLocation {
    pub position: Vec3,
    pub rotation: Vec3,
    pub initial_speed: Vec3,
    pub initial_acceleration: Vec3,
}

impl ObjectLocation {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn moving(position: Vec3, initial_speed: Vec3) -> Self {
        Self {
            position,
            initial_speed,
            ..Default::default()
        }
    }
}

/// Registry entry: shared profile and its default location
pub type ObjectDbEntry = (Arc<ObjectProperties>, ObjectLocation);

/// Database of object profiles keyed by object id
#[derive(Debug, Clone, Default)]
pub struct ObjectDb {
    entries: HashMap<i32, ObjectDbEntry>,
}

impl ObjectDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a profile. Invalid profiles are rejected here rather
    /// than at their first collision.
    pub fn insert(
        &mut self,
        oid: i32,
        properties: ObjectProperties,
        default_location: ObjectLocation,
    ) -> Result<()> {
        if let Err(e) = properties.validate() {
            log::warn!("Rejected object {}: {}", oid, e);
            return Err(e);
        }
        self.entries
            .insert(oid, (Arc::new(properties), default_location));
        Ok(())
    }

    pub fn get(&self, oid: i32) -> Result<&ObjectDbEntry> {
        self.entries.get(&oid).ok_or(PhysicsError::UnknownObject(oid))
    }

    pub fn contains(&self, oid: i32) -> bool {
        self.entries.contains_key(&oid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
