use crate::foundation::core::{PixelRect, SampleFormat};
use crate::foundation::error::{TessellaError, TessellaResult};
use crate::raster::accessor::{RasterSource, RoiMask};
use crate::raster::tile::{TileBuffer, TileSamples};

/// [`RasterSource`] backed by an in-memory tile.
///
/// Suits hosts that already hold decoded planar buffers, and doubles as the
/// test raster for the compositor.
#[derive(Clone, Debug)]
pub struct MemoryRaster {
    tile: TileBuffer,
}

impl MemoryRaster {
    /// Wrap an existing tile.
    pub fn new(tile: TileBuffer) -> Self {
        Self { tile }
    }

    /// Build from typed samples, validating length against the geometry.
    pub fn from_samples(
        rect: PixelRect,
        band_count: usize,
        samples: TileSamples,
    ) -> TessellaResult<Self> {
        Ok(Self::new(TileBuffer::from_samples(rect, band_count, samples)?))
    }

    /// Single- or multi-band unsigned byte raster.
    pub fn from_u8(rect: PixelRect, band_count: usize, data: Vec<u8>) -> TessellaResult<Self> {
        Self::from_samples(rect, band_count, TileSamples::U8(data))
    }

    /// Single- or multi-band 32-bit float raster.
    pub fn from_f32(rect: PixelRect, band_count: usize, data: Vec<f32>) -> TessellaResult<Self> {
        Self::from_samples(rect, band_count, TileSamples::F32(data))
    }

    /// The wrapped tile.
    pub fn tile(&self) -> &TileBuffer {
        &self.tile
    }
}

impl RasterSource for MemoryRaster {
    fn bounds(&self) -> PixelRect {
        self.tile.rect()
    }

    fn sample_format(&self) -> SampleFormat {
        self.tile.sample_format()
    }

    fn band_count(&self) -> usize {
        self.tile.band_count()
    }

    fn read_tile(&self, rect: PixelRect) -> TessellaResult<TileBuffer> {
        if rect.is_empty() || self.bounds().intersection(rect) != rect {
            return Err(TessellaError::validation(format!(
                "read_tile rect {rect:?} is not inside raster bounds {:?}",
                self.bounds()
            )));
        }
        let zeros = vec![0.0; self.band_count()];
        let mut out = TileBuffer::filled(rect, self.sample_format(), self.band_count(), &zeros)?;
        out.copy_region_from(&self.tile)?;
        Ok(out)
    }
}

/// [`RoiMask`] backed by an in-memory grid; 0 outside its rectangle.
#[derive(Clone, Debug)]
pub struct MemoryRoi {
    rect: PixelRect,
    samples: Vec<i32>,
}

impl MemoryRoi {
    /// Wrap a row-major grid of mask values covering `rect`.
    pub fn new(rect: PixelRect, samples: Vec<i32>) -> TessellaResult<Self> {
        let expected = (rect.width as usize)
            .checked_mul(rect.height as usize)
            .ok_or_else(|| TessellaError::validation("mask dimensions overflow"))?;
        if samples.len() != expected {
            return Err(TessellaError::validation(format!(
                "mask length {} does not match {}x{}",
                samples.len(),
                rect.width,
                rect.height
            )));
        }
        Ok(Self { rect, samples })
    }
}

impl RoiMask for MemoryRoi {
    fn sample(&self, x: i32, y: i32) -> i32 {
        if !self.rect.contains(x, y) {
            return 0;
        }
        let idx =
            (y - self.rect.y) as usize * self.rect.width as usize + (x - self.rect.x) as usize;
        self.samples[idx]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/memory.rs"]
mod tests;
