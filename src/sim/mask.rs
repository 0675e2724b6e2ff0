//! Per-pixel occupancy masks
//!
//! A [`Mask`] is a plain boolean field. The terrain wraps one together with the
//! world-to-mask `surface_offset`; the character's collision silhouette is a
//! bare mask placed against it.

use glam::{IVec2, Vec2};

use crate::error::{Error, Result};

/// Alpha above which a pixel counts as solid
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 127;

/// A width x height boolean occupancy field, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// An all-clear mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `solid(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, solid: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let bits = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| solid(x, y))
            .collect();
        Self {
            width,
            height,
            bits,
        }
    }

    /// Build a mask from a row-major alpha channel
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8], threshold: u8) -> Result<Self> {
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(Error::MaskSize {
                width,
                height,
                actual: alpha.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bits: alpha.iter().map(|&a| a > threshold).collect(),
        })
    }

    /// A `size` footprint holding a solid disc of `radius` at its center
    pub fn centered_disc(width: u32, height: u32, radius: f32) -> Self {
        let center = Vec2::new(width as f32, height as f32) * 0.5;
        let r2 = radius * radius;
        Self::from_fn(width, height, |x, y| {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            (p - center).length_squared() <= r2
        })
    }

    /// (width, height)
    #[inline]
    pub fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Whether the pixel is solid. Out-of-bounds pixels are clear.
    #[inline]
    pub fn point_occupied(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.bits[self.index(x as u32, y as u32)]
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Mirror left-to-right
    pub fn flipped_horizontal(&self) -> Self {
        let w = self.width;
        Self::from_fn(self.width, self.height, |x, y| {
            self.bits[self.index(w - 1 - x, y)]
        })
    }

    /// Nearest-neighbour resample to a new size
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        if self.width == 0 || self.height == 0 {
            return Self::new(width, height);
        }
        Self::from_fn(width, height, |x, y| {
            let sx = (x as u64 * self.width as u64 / width as u64) as u32;
            let sy = (y as u64 * self.height as u64 / height as u64) as u32;
            self.bits[self.index(sx, sy)]
        })
    }

    /// First pixel solid in both masks, with `other`'s top-left corner placed
    /// at `offset` in this mask's space. Returned in this mask's space.
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = offset.x.saturating_add_unsigned(other.width).min(self.width as i32);
        let y1 = offset.y.saturating_add_unsigned(other.height).min(self.height as i32);

        for y in y0..y1 {
            for x in x0..x1 {
                if self.bits[self.index(x as u32, y as u32)]
                    && other.bits[other.index((x - offset.x) as u32, (y - offset.y) as u32)]
                {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }

    /// Whether any pixel is solid in both masks
    #[inline]
    pub fn overlaps(&self, other: &Mask, offset: IVec2) -> bool {
        self.overlap(other, offset).is_some()
    }

    /// Whether a `size` rectangle at `offset` touches this mask's rectangle
    pub fn rect_intersects(&self, offset: IVec2, size: (u32, u32)) -> bool {
        offset.x < self.width as i32
            && offset.x.saturating_add_unsigned(size.0) > 0
            && offset.y < self.height as i32
            && offset.y.saturating_add_unsigned(size.1) > 0
    }
}

/// Static level terrain
#[derive(Debug, Clone)]
pub struct TerrainMask {
    mask: Mask,
    /// Mask-space = world-space + surface_offset
    surface_offset: IVec2,
}

impl TerrainMask {
    pub fn new(mask: Mask, surface_offset: IVec2) -> Self {
        Self {
            mask,
            surface_offset,
        }
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    #[inline]
    pub fn surface_offset(&self) -> IVec2 {
        self.surface_offset
    }

    #[inline]
    pub fn bounds(&self) -> (u32, u32) {
        self.mask.bounds()
    }

    /// World pixel to mask pixel. Saturates far outside the mask.
    #[inline]
    pub fn to_mask_space(&self, world: IVec2) -> IVec2 {
        world.saturating_add(self.surface_offset)
    }

    /// Whether the world pixel is solid
    #[inline]
    pub fn point_occupied(&self, world: IVec2) -> bool {
        let p = self.to_mask_space(world);
        self.mask.point_occupied(p.x, p.y)
    }

    /// Whether `shape`, with its top-left corner at world pixel `top_left`,
    /// touches solid terrain
    pub fn overlaps_at(&self, shape: &Mask, top_left: IVec2) -> bool {
        let offset = self.to_mask_space(top_left);
        self.mask.rect_intersects(offset, shape.bounds()) && self.mask.overlaps(shape, offset)
    }

    /// Solid everywhere at or below `surface_y` (world space)
    pub fn flat(width: u32, height: u32, surface_y: i32, surface_offset: IVec2) -> Self {
        let mask = Mask::from_fn(width, height, |_, y| y as i32 - surface_offset.y >= surface_y);
        Self::new(mask, surface_offset)
    }

    /// A parabolic bowl: lowest at the horizontal center, rising to
    /// `rim_height` pixels at the edges
    pub fn bowl(width: u32, height: u32, floor_y: f32, rim_height: f32) -> Self {
        let half = width as f32 * 0.5;
        let mask = Mask::from_fn(width, height, |x, y| {
            let t = (x as f32 + 0.5 - half) / half;
            let surface = floor_y - rim_height * t * t;
            y as f32 >= surface
        });
        Self::new(mask, IVec2::ZERO)
    }
}
