// src/level/generator.rs
//! Pixel-to-layout walk: outer loop over X, inner over Y, one decision per pixel.

use std::convert::Infallible;

use bevy::prelude::*;

use super::core::{
    ElementKind, FloorSpec, Footprint, Layout, PixelClass, PixelColor, Placeable, Placement,
    ScanStats, GRID_STEP,
};
use super::sampler::SampledImage;

/// Geometry inputs for one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub floor_position: Vec3,
    /// Ground-plane size of the scaled floor.
    pub floor_size: Vec2,
    pub wall: Footprint,
    pub breakable: Footprint,
}

impl LayoutParams {
    pub fn new(floor_size: Vec2, wall: &dyn Placeable, breakable: &dyn Placeable) -> Self {
        Self {
            floor_position: Vec3::ZERO,
            floor_size,
            wall: wall.footprint(),
            breakable: breakable.footprint(),
        }
    }

    /// Cursor position for the first pixel: the wall-sized cell in the floor's +X/-Y corner.
    pub fn start(&self) -> Vec3 {
        let wall = self.wall.size();
        Vec3::new(
            self.floor_position.x + (self.floor_size.x * 0.5 - wall.x * 0.5),
            self.floor_position.y - (self.floor_size.y * 0.5 - wall.y * 0.5),
            0.0,
        )
    }

    fn half_height(&self, kind: ElementKind) -> f32 {
        match kind {
            ElementKind::Wall => self.wall.half_height(),
            ElementKind::BreakableWall => self.breakable.half_height(),
        }
    }
}

/// Running grid position. The pending delta is applied when the next pixel is visited,
/// so the last pixel of a run never moves the cursor.
struct Cursor {
    position: Vec3,
    pending: Vec3,
}

impl Cursor {
    fn new(start: Vec3) -> Self {
        Self { position: start, pending: Vec3::ZERO }
    }

    #[inline]
    fn advance(&mut self) {
        self.position += self.pending;
    }

    #[inline]
    fn next_row(&mut self) {
        self.pending = Vec3::new(0.0, GRID_STEP, 0.0);
    }

    #[inline]
    fn next_column(&mut self, height: u32) {
        self.pending = Vec3::new(-GRID_STEP, -(GRID_STEP * height.saturating_sub(1) as f32), 0.0);
    }
}

/// Walk every pixel and hand each placement to `emit`. An `Err` from `emit`
/// stops the walk and is returned as-is.
pub fn scan<E>(
    sampled: &SampledImage<'_>,
    params: &LayoutParams,
    mut emit: impl FnMut(Placement) -> Result<(), E>,
) -> Result<ScanStats, E> {
    let (width, height) = (sampled.width(), sampled.height());
    let mut cursor = Cursor::new(params.start());
    let mut stats = ScanStats::default();
    let mut first_unclassified: Option<(u32, u32, PixelColor)> = None;

    for x in 0..width {
        for y in 0..height {
            let color = sampled.get(x, y);
            let class = color.classify();
            stats.record(class);

            cursor.advance();

            if let Some(kind) = class.element() {
                cursor.position.z = params.half_height(kind);
                emit(Placement { kind, position: cursor.position })?;
            } else if class == PixelClass::Unclassified && first_unclassified.is_none() {
                first_unclassified = Some((x, y, color));
            }

            cursor.next_row();
        }
        cursor.next_column(height);
    }

    if let Some((x, y, color)) = first_unclassified {
        warn!(
            "{}: {} pixel(s) match no sentinel colour and were left empty (first at ({}, {}) = {})",
            sampled.source().display(),
            stats.unclassified,
            x,
            y,
            color
        );
    }

    Ok(stats)
}

/// Pure generation pass: floor record plus every placement in scan order.
pub fn generate(
    sampled: &SampledImage<'_>,
    floor_size: Vec2,
    wall: &dyn Placeable,
    breakable: &dyn Placeable,
) -> Layout {
    let params = LayoutParams::new(floor_size, wall, breakable);
    let mut placements = Vec::new();

    let stats = match scan(sampled, &params, |p| {
        placements.push(p);
        Ok::<(), Infallible>(())
    }) {
        Ok(stats) => stats,
        Err(never) => match never {},
    };

    debug!(
        "{}: {} walls, {} breakable walls from {}x{} pixels",
        sampled.source().display(),
        stats.walls,
        stats.breakable_walls,
        sampled.width(),
        sampled.height()
    );

    Layout {
        floor: FloorSpec::for_image(sampled.width(), sampled.height()),
        placements,
        stats,
    }
}
