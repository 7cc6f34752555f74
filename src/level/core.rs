// src/level/core.rs
//! Core types for bitmap-driven level layout.
//! Keep this file dependency-light; sampler, generator and hosts build on it.
//!
//! Layout space is Z-up: X/Y span the floor plane, Z is height.

use bevy::math::{Vec2, Vec3};
use std::fmt;

/// World units between neighbouring grid cells.
/// Fixed: templates that are not 100 units wide overlap or leave gaps.
pub const GRID_STEP: f32 = 100.0;

/// Image pixels per unit of floor scale.
pub const FLOOR_PIXELS_PER_SCALE: f32 = 10.0;

// ---------- Colours ----------

/// One RGBA8 pixel, compared by exact equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PixelColor {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const RED: Self = Self::rgba(255, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Map a pixel onto the fixed colour table.
    pub fn classify(self) -> PixelClass {
        match self {
            Self::BLACK => PixelClass::Wall,
            Self::RED => PixelClass::BreakableWall,
            Self::WHITE => PixelClass::Empty,
            _ => PixelClass::Unclassified,
        }
    }
}

impl From<image::Rgba<u8>> for PixelColor {
    fn from(px: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self { r, g, b, a }
    }
}

impl From<PixelColor> for image::Rgba<u8> {
    fn from(c: PixelColor) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

impl fmt::Display for PixelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// What a pixel means to the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelClass {
    /// White: walkable, nothing placed.
    Empty,
    /// Black.
    Wall,
    /// Red.
    BreakableWall,
    /// Any other colour (anti-aliased edges, stray alpha, ...). Nothing placed.
    Unclassified,
}

impl PixelClass {
    /// Element to place for this pixel, if any.
    pub fn element(self) -> Option<ElementKind> {
        match self {
            Self::Wall => Some(ElementKind::Wall),
            Self::BreakableWall => Some(ElementKind::BreakableWall),
            Self::Empty | Self::Unclassified => None,
        }
    }
}

// ---------- Elements & footprints ----------

/// Structural element placed per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Wall,
    BreakableWall,
}

impl ElementKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::BreakableWall => "BreakableWall",
        }
    }
}

/// 3D bounding-box size of a template (X, Y ground plane, Z height).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Footprint(pub Vec3);

impl Footprint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.0
    }

    /// Vertical offset that puts the element's base on the floor plane.
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.0.z * 0.5
    }

    /// Finite and non-negative on every axis.
    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0.cmpge(Vec3::ZERO).all()
    }
}

/// Anything the generator can place; only the footprint matters to it.
pub trait Placeable {
    fn footprint(&self) -> Footprint;
}

impl Placeable for Footprint {
    fn footprint(&self) -> Footprint {
        *self
    }
}

// ---------- Output ----------

/// One element at a layout-space position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub kind: ElementKind,
    pub position: Vec3,
}

/// Floor transform for one run; always at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorSpec {
    pub position: Vec3,
    pub scale: Vec3,
}

impl FloorSpec {
    /// Scale (width/10, height/10, 1). A zero dimension gives a zero scale on that axis.
    pub fn for_image(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::new(
                width as f32 / FLOOR_PIXELS_PER_SCALE,
                height as f32 / FLOOR_PIXELS_PER_SCALE,
                1.0,
            ),
        }
    }

    /// Ground-plane size of the scaled floor for a given unscaled floor template.
    pub fn world_size(&self, base: Footprint) -> Vec2 {
        base.size().truncate() * self.scale.truncate()
    }
}

/// Per-run pixel tallies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub walls: u32,
    pub breakable_walls: u32,
    pub empty: u32,
    pub unclassified: u32,
}

impl ScanStats {
    pub fn placed(&self) -> u32 {
        self.walls + self.breakable_walls
    }

    pub fn scanned(&self) -> u32 {
        self.placed() + self.empty + self.unclassified
    }

    pub(crate) fn record(&mut self, class: PixelClass) {
        match class {
            PixelClass::Wall => self.walls += 1,
            PixelClass::BreakableWall => self.breakable_walls += 1,
            PixelClass::Empty => self.empty += 1,
            PixelClass::Unclassified => self.unclassified += 1,
        }
    }
}

/// Complete result of one pure generation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub floor: FloorSpec,
    pub placements: Vec<Placement>,
    pub stats: ScanStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_colours_classify() {
        assert_eq!(PixelColor::BLACK.classify(), PixelClass::Wall);
        assert_eq!(PixelColor::RED.classify(), PixelClass::BreakableWall);
        assert_eq!(PixelColor::WHITE.classify(), PixelClass::Empty);
    }

    #[test]
    fn near_sentinels_are_unclassified() {
        assert_eq!(PixelColor::rgb(1, 0, 0).classify(), PixelClass::Unclassified);
        assert_eq!(PixelColor::rgba(0, 0, 0, 254).classify(), PixelClass::Unclassified);
        assert_eq!(PixelColor::rgba(255, 0, 0, 0).classify(), PixelClass::Unclassified);
        assert_eq!(PixelClass::Unclassified.element(), None);
    }

    #[test]
    fn converts_from_image_rgba() {
        let c: PixelColor = image::Rgba([255u8, 0, 0, 255]).into();
        assert_eq!(c, PixelColor::RED);
        assert_eq!(c.to_string(), "#ff0000ff");
    }

    #[test]
    fn footprint_half_height_and_validity() {
        let f = Footprint::new(100.0, 100.0, 300.0);
        assert_eq!(f.half_height(), 150.0);
        assert!(f.is_valid());
        assert!(!Footprint::new(100.0, -1.0, 1.0).is_valid());
        assert!(!Footprint::new(f32::NAN, 1.0, 1.0).is_valid());
    }

    #[test]
    fn floor_spec_scales_with_image() {
        let floor = FloorSpec::for_image(25, 40);
        assert_eq!(floor.position, Vec3::ZERO);
        assert_eq!(floor.scale, Vec3::new(2.5, 4.0, 1.0));
        assert_eq!(
            floor.world_size(Footprint::new(1000.0, 1000.0, 10.0)),
            Vec2::new(2500.0, 4000.0)
        );

        let empty = FloorSpec::for_image(0, 7);
        assert_eq!(empty.scale, Vec3::new(0.0, 0.7, 1.0));
    }
}
