//! Errors raised while building a world.
//!
//! The per-frame simulation path never fails; everything here is detected when
//! objects, profiles or settings are created.

use std::fmt;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PhysicsError>;

#[derive(Debug)]
pub enum PhysicsError {
    /// A profile with non-positive mass/radius or out-of-range coefficients
    InvalidProfile { class: String, reason: String },
    /// A runtime mass/radius multiplier that would make the ball degenerate
    InvalidMultiplier { id: u32, value: f32 },
    /// Lookup of an object id that was never inserted into the registry
    UnknownObject(i32),
    /// An explicit ball id that is reserved for proxies or already in use
    IdUnavailable(u32),
    InvalidSettings(String),
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::InvalidProfile { class, reason } => {
                write!(f, "Invalid profile '{}': {}", class, reason)
            }
            PhysicsError::InvalidMultiplier { id, value } => {
                write!(f, "Invalid multiplier {} for ball {}", value, id)
            }
            PhysicsError::UnknownObject(oid) => write!(f, "Object {} not in database", oid),
            PhysicsError::IdUnavailable(id) => {
                write!(f, "Ball id {} is reserved or already in use", id)
            }
            PhysicsError::InvalidSettings(reason) => write!(f, "Invalid settings: {}", reason),
            PhysicsError::Io(e) => write!(f, "IO error: {}", e),
            PhysicsError::Parse(e) => write!(f, "JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for PhysicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PhysicsError::Io(e) => Some(e),
            PhysicsError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PhysicsError {
    fn from(err: std::io::Error) -> Self {
        PhysicsError::Io(err)
    }
}

impl From<serde_json::Error> for PhysicsError {
    fn from(err: serde_json::Error) -> Self {
        PhysicsError::Parse(err)
    }
}
