//! Terrain height queries
//!
//! The physics core never sees meshes or textures: all it needs is "how high is
//! the ground here". Hosts implement `TerrainHeightQuery` over whatever they
//! render; a few ready-made implementations live here.

use glam::{Vec2, Vec3};

/// Ground height lookup at a world XZ position
pub trait TerrainHeightQuery {
    /// Ground height (+Y) below `pos`
    fn height(&self, pos: Vec3) -> f32;

    /// Whether `pos` belongs to this terrain (multi-terrain worlds)
    fn contains(&self, _pos: Vec3) -> bool {
        true
    }

    /// Local ground inclination around `pos` as (angle along X, angle along Z),
    /// sampled `span` units away on each side
    fn angle(&self, pos: Vec3, span: f32) -> Vec2 {
        let span = span.max(f32::EPSILON);
        let dx = self.height(pos + Vec3::X * span) - self.height(pos - Vec3::X * span);
        let dz = self.height(pos + Vec3::Z * span) - self.height(pos - Vec3::Z * span);
        Vec2::new(dx.atan2(2.0 * span), dz.atan2(2.0 * span))
    }
}

/// Infinite flat ground
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl TerrainHeightQuery for FlatTerrain {
    fn height(&self, _pos: Vec3) -> f32 {
        self.height
    }
}

/// Closure adapter: `FnTerrain(|p| ...)`
pub struct FnTerrain<F>(pub F);

impl<F: Fn(Vec3) -> f32> TerrainHeightQuery for FnTerrain<F> {
    fn height(&self, pos: Vec3) -> f32 {
        (self.0)(pos)
    }
}

/// Heightmap terrain sampled from 8-bit luma pixels, one pixel per world unit
#[derive(Debug, Clone)]
pub struct HeightField {
    /// World XZ of pixel (0, 0)
    origin: Vec2,
    width: usize,
    depth: usize,
    heights: Vec<f32>,
}

impl HeightField {
    /// Build from row-major luma pixels; height = `scale_height * 1000 * luma / 255`
    pub fn from_luma(
        origin: Vec2,
        width: usize,
        depth: usize,
        pixels: &[u8],
        scale_height: f32,
    ) -> Option<Self> {
        if width == 0 || depth == 0 || pixels.len() != width * depth {
            return None;
        }
        let heights = pixels
            .iter()
            .map(|&p| scale_height * 1000.0 * p as f32 / 255.0)
            .collect();
        Some(Self {
            origin,
            width,
            depth,
            heights,
        })
    }

    /// Terrain size in world units (x, z)
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.depth as f32)
    }

    fn sample(&self, x: usize, z: usize) -> f32 {
        self.heights[z.min(self.depth - 1) * self.width + x.min(self.width - 1)]
    }
}

impl TerrainHeightQuery for HeightField {
    fn height(&self, pos: Vec3) -> f32 {
        let local = Vec2::new(pos.x, pos.z) - self.origin;
        if local.x < 0.0 || local.y < 0.0 {
            return 0.0;
        }
        let (fx, fz) = (local.x.floor(), local.y.floor());
        let (x, z) = (fx as usize, fz as usize);
        if x >= self.width || z >= self.depth {
            return 0.0;
        }

        // Bilinear blend between the four surrounding pixels
        let (tx, tz) = (local.x - fx, local.y - fz);
        let h00 = self.sample(x, z);
        let h10 = self.sample(x + 1, z);
        let h01 = self.sample(x, z + 1);
        let h11 = self.sample(x + 1, z + 1);
        let top = h00 + (h10 - h00) * tx;
        let bottom = h01 + (h11 - h01) * tx;
        top + (bottom - top) * tz
    }

    fn contains(&self, pos: Vec3) -> bool {
        let size = self.size();
        pos.x >= self.origin.x
            && pos.z >= self.origin.y
            && pos.x <= self.origin.x + size.x
            && pos.z <= self.origin.y + size.y
    }
}

/// Several terrains stitched into one world
#[derive(Default)]
pub struct TerrainSet {
    terrains: Vec<Box<dyn TerrainHeightQuery>>,
}

impl TerrainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, terrain: Box<dyn TerrainHeightQuery>) {
        self.terrains.push(terrain);
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }
}

impl TerrainHeightQuery for TerrainSet {
    /// A single terrain always answers; otherwise the first terrain containing
    /// the position does, and uncovered positions are at height 0
    fn height(&self, pos: Vec3) -> f32 {
        if let [only] = self.terrains.as_slice() {
            return only.height(pos);
        }
        self.terrains
            .iter()
            .find(|t| t.contains(pos))
            .map(|t| t.height(pos))
            .unwrap_or(0.0)
    }

    fn contains(&self, pos: Vec3) -> bool {
        match self.terrains.as_slice() {
            [only] => only.contains(pos),
            all => all.iter().any(|t| t.contains(pos)),
        }
    }
}
