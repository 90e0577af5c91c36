//! Boundary line segments (track walls) in the XZ plane
//!
//! `sy`/`ey` are world Z coordinates. The segment is thickened by `radius`,
//! which is also the radius of the fake balls generated against it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LineSegment {
    pub sx: f32,
    pub sy: f32,
    pub ex: f32,
    pub ey: f32,
    pub radius: f32,
}

impl LineSegment {
    pub fn new(start: Vec2, end: Vec2, radius: f32) -> Self {
        Self {
            sx: start.x,
            sy: start.y,
            ex: end.x,
            ey: end.y,
            radius,
        }
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        Vec2::new(self.sx, self.sy)
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        Vec2::new(self.ex, self.ey)
    }

    /// Direction angle (radians)
    #[inline]
    pub fn angle(&self) -> f32 {
        (self.ey - self.sy).atan2(self.ex - self.sx)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.end() - self.start()).length()
    }

    pub fn scaled(&self, s: f32) -> Self {
        Self {
            sx: self.sx * s,
            sy: self.sy * s,
            ex: self.ex * s,
            ey: self.ey * s,
            radius: self.radius,
        }
    }

    pub fn translated(&self, x: f32, y: f32) -> Self {
        Self {
            sx: self.sx + x,
            sy: self.sy + y,
            ex: self.ex + x,
            ey: self.ey + y,
            radius: self.radius,
        }
    }

    /// Rotate both endpoints about the origin
    pub fn rotated(&self, rads: f32) -> Self {
        let rot = Vec2::from_angle(rads);
        Self::new(rot.rotate(self.start()), rot.rotate(self.end()), self.radius)
    }

    pub fn scale(&mut self, s: f32) {
        *self = self.scaled(s);
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        *self = self.translated(x, y);
    }

    pub fn rotate(&mut self, rads: f32) {
        *self = self.rotated(rads);
    }

    /// Closest point on the segment to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let start = self.start();
        let line_vec = self.end() - start;
        let line_len_sq = line_vec.length_squared();

        if line_len_sq < 0.0001 {
            return start; // Degenerate segment
        }

        let t = ((p - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
        start + line_vec * t
    }

    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }
}
