//! Simulation module
//!
//! All physics lives here. The module is pure and deterministic:
//! - Caller-supplied frame time, split into fixed sub-steps
//! - Stable iteration order (insertion order of balls)
//! - No rendering or platform dependencies; terrain is a height query

pub mod ball;
pub mod behavior;
pub mod collision;
pub mod delayer;
pub mod ids;
pub mod profile;
pub mod segment;
pub mod terrain;
pub mod world;

pub use ball::{Ball, BallSnapshot, MotionState, Overlaps};
pub use behavior::{BallBehavior, Passive, Vehicle, VehicleFeatures};
pub use collision::{
    CollisionResult, reflect_velocity, resolve_dynamic_collision, resolve_static_collision,
};
pub use delayer::LinearDelayer;
pub use ids::{BallId, IdAllocator};
pub use profile::{
    ObjectAerodynamics, ObjectAnimation, ObjectDb, ObjectDbEntry, ObjectLocation, ObjectProperties,
    TerrainBehavior,
};
pub use segment::LineSegment;
pub use terrain::{FlatTerrain, FnTerrain, HeightField, TerrainHeightQuery, TerrainSet};
pub use world::BallWorld;
