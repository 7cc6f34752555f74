// src/level/sampler.rs
//! Read-only pixel access for one generation pass.
//!
//! `LevelImage` owns the decoded RGBA8 grid. `SampledImage` is the scoped view the
//! generator reads through; opening it locks the image and dropping it unlocks, so
//! every exit path (including `?` and panics unwinding through a run) releases it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use image::RgbaImage;

use super::core::PixelColor;
use super::error::LevelError;

/// A decoded level bitmap.
pub struct LevelImage {
    source: PathBuf,
    pixels: RgbaImage,
    locked: AtomicBool,
    locks: AtomicU32,
}

impl LevelImage {
    pub fn from_rgba(source: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        Self {
            source: source.into(),
            pixels,
            locked: AtomicBool::new(false),
            locks: AtomicU32::new(0),
        }
    }

    /// Decode an image file (any format the `image` crate is built with).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|e| LevelError::image_unavailable(path, e))?;
        Ok(Self::from_rgba(path, decoded.to_rgba8()))
    }

    /// Decode an in-memory encoded image; `source` is only used for diagnostics.
    pub fn from_bytes(source: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self, LevelError> {
        let source = source.into();
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| LevelError::image_unavailable(source.clone(), e))?;
        Ok(Self::from_rgba(source, decoded.to_rgba8()))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// True while a `SampledImage` view is alive.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Number of successful `SampledImage::open` calls so far.
    pub fn lock_count(&self) -> u32 {
        self.locks.load(Ordering::Relaxed)
    }
}

/// Scoped read-only view over a `LevelImage`.
pub struct SampledImage<'a> {
    image: &'a LevelImage,
}

impl<'a> SampledImage<'a> {
    /// Lock `image` for reading. `None` (no image bound) or an image that is already
    /// locked by another view is `ImageUnavailable`.
    pub fn open(image: impl Into<Option<&'a LevelImage>>) -> Result<Self, LevelError> {
        let Some(image) = image.into() else {
            return Err(LevelError::image_unavailable("<none>", "no image bound"));
        };

        if image
            .locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LevelError::image_unavailable(
                image.source(),
                "pixel data is already locked",
            ));
        }
        image.locks.fetch_add(1, Ordering::Relaxed);

        Ok(Self { image })
    }

    /// Pixel at (x, y), row-major storage. Panics outside `[0,width) x [0,height)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> PixelColor {
        (*self.image.pixels.get_pixel(x, y)).into()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.pixels.height()
    }

    pub fn source(&self) -> &Path {
        self.image.source()
    }
}

impl Drop for SampledImage<'_> {
    fn drop(&mut self) {
        self.image.locked.store(false, Ordering::Release);
    }
}
