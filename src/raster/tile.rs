use crate::foundation::core::{PixelRect, SampleFormat};
use crate::foundation::error::{TessellaError, TessellaResult};
use crate::raster::sample::Sample;

/// Typed backing storage of a [`TileBuffer`], one variant per sample format.
#[derive(Clone, Debug, PartialEq)]
pub enum TileSamples {
    /// Unsigned 8-bit samples.
    U8(Vec<u8>),
    /// Unsigned 16-bit samples.
    U16(Vec<u16>),
    /// Signed 16-bit samples.
    I16(Vec<i16>),
    /// Signed 32-bit samples.
    I32(Vec<i32>),
    /// 32-bit float samples.
    F32(Vec<f32>),
    /// 64-bit float samples.
    F64(Vec<f64>),
}

impl TileSamples {
    /// Format of the stored samples.
    pub fn sample_format(&self) -> SampleFormat {
        match self {
            Self::U8(_) => SampleFormat::U8,
            Self::U16(_) => SampleFormat::U16,
            Self::I16(_) => SampleFormat::I16,
            Self::I32(_) => SampleFormat::I32,
            Self::F32(_) => SampleFormat::F32,
            Self::F64(_) => SampleFormat::F64,
        }
    }

    /// Total number of stored samples across all bands.
    pub fn len(&self) -> usize {
        match self {
            Self::U8(d) => d.len(),
            Self::U16(d) => d.len(),
            Self::I16(d) => d.len(),
            Self::I32(d) => d.len(),
            Self::F32(d) => d.len(),
            Self::F64(d) => d.len(),
        }
    }

    /// `true` when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A typed, planar, band-major raster tile.
///
/// The buffer stores `band_count` planes back to back; inside a plane the
/// line stride equals the rect width and the pixel stride is 1, so the
/// sample for `(x, y, band)` lives at
/// `band_offset(band) + (y - rect.y) * line_stride() + (x - rect.x)`.
///
/// This is both the border-extended working tile the compositor reads from
/// and the destination tile it returns.
#[derive(Clone, Debug, PartialEq)]
pub struct TileBuffer {
    rect: PixelRect,
    band_count: usize,
    samples: TileSamples,
}

impl TileBuffer {
    /// Wrap existing samples, validating the buffer length against the
    /// geometry.
    pub fn from_samples(
        rect: PixelRect,
        band_count: usize,
        samples: TileSamples,
    ) -> TessellaResult<Self> {
        let expected = checked_sample_count(rect, band_count)?;
        if samples.len() != expected {
            return Err(TessellaError::validation(format!(
                "tile buffer length {} does not match {} bands over {}x{}",
                samples.len(),
                band_count,
                rect.width,
                rect.height
            )));
        }
        Ok(Self {
            rect,
            band_count,
            samples,
        })
    }

    /// Allocate a tile with every pixel of band `b` set to `band_values[b]`
    /// (converted with the format's narrowing cast).
    pub fn filled(
        rect: PixelRect,
        format: SampleFormat,
        band_count: usize,
        band_values: &[f64],
    ) -> TessellaResult<Self> {
        if band_values.len() != band_count {
            return Err(TessellaError::validation(format!(
                "expected {} fill values, got {}",
                band_count,
                band_values.len()
            )));
        }
        checked_sample_count(rect, band_count)?;
        let plane = rect.width as usize * rect.height as usize;
        let samples = match format {
            SampleFormat::U8 => fill_planes::<u8>(plane, band_values),
            SampleFormat::U16 => fill_planes::<u16>(plane, band_values),
            SampleFormat::I16 => fill_planes::<i16>(plane, band_values),
            SampleFormat::I32 => fill_planes::<i32>(plane, band_values),
            SampleFormat::F32 => fill_planes::<f32>(plane, band_values),
            SampleFormat::F64 => fill_planes::<f64>(plane, band_values),
        };
        Ok(Self {
            rect,
            band_count,
            samples,
        })
    }

    /// Bounding rectangle of the tile.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Number of bands.
    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Sample format of the backing storage.
    pub fn sample_format(&self) -> SampleFormat {
        self.samples.sample_format()
    }

    /// Typed backing storage.
    pub fn samples(&self) -> &TileSamples {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut TileSamples {
        &mut self.samples
    }

    /// Samples per scanline within a band plane.
    pub fn line_stride(&self) -> usize {
        self.rect.width as usize
    }

    /// Samples per pixel within a scanline.
    pub fn pixel_stride(&self) -> usize {
        1
    }

    /// Offset of the first sample of `band`.
    pub fn band_offset(&self, band: usize) -> usize {
        band * self.rect.width as usize * self.rect.height as usize
    }

    /// Read one sample at absolute pixel coordinates, widened to `f64`.
    /// Returns `None` outside the tile rect or band range.
    pub fn sample_f64(&self, x: i32, y: i32, band: usize) -> Option<f64> {
        if band >= self.band_count || !self.rect.contains(x, y) {
            return None;
        }
        let idx = self.band_offset(band)
            + (y - self.rect.y) as usize * self.line_stride()
            + (x - self.rect.x) as usize;
        let v = match &self.samples {
            TileSamples::U8(d) => f64::from(d[idx]),
            TileSamples::U16(d) => f64::from(d[idx]),
            TileSamples::I16(d) => f64::from(d[idx]),
            TileSamples::I32(d) => f64::from(d[idx]),
            TileSamples::F32(d) => f64::from(d[idx]),
            TileSamples::F64(d) => d[idx],
        };
        Some(v)
    }

    /// Copy the rect overlap of `src` into this tile. Both tiles must share
    /// format and band count; non-overlapping rects copy nothing.
    pub(crate) fn copy_region_from(&mut self, src: &TileBuffer) -> TessellaResult<()> {
        if self.band_count != src.band_count {
            return Err(TessellaError::MismatchedBandCount {
                expected: self.band_count,
                found: src.band_count,
            });
        }
        let overlap = self.rect.intersection(src.rect);
        if overlap.is_empty() {
            return Ok(());
        }
        let geom = RegionGeom {
            bands: self.band_count,
            rows: overlap.height as usize,
            run: overlap.width as usize,
            dst_width: self.rect.width as usize,
            dst_plane: self.rect.width as usize * self.rect.height as usize,
            dst_x: (overlap.x - self.rect.x) as usize,
            dst_y: (overlap.y - self.rect.y) as usize,
            src_width: src.rect.width as usize,
            src_plane: src.rect.width as usize * src.rect.height as usize,
            src_x: (overlap.x - src.rect.x) as usize,
            src_y: (overlap.y - src.rect.y) as usize,
        };
        match (&mut self.samples, &src.samples) {
            (TileSamples::U8(d), TileSamples::U8(s)) => copy_region(d, s, &geom),
            (TileSamples::U16(d), TileSamples::U16(s)) => copy_region(d, s, &geom),
            (TileSamples::I16(d), TileSamples::I16(s)) => copy_region(d, s, &geom),
            (TileSamples::I32(d), TileSamples::I32(s)) => copy_region(d, s, &geom),
            (TileSamples::F32(d), TileSamples::F32(s)) => copy_region(d, s, &geom),
            (TileSamples::F64(d), TileSamples::F64(s)) => copy_region(d, s, &geom),
            (d, s) => {
                return Err(TessellaError::MismatchedSampleFormat {
                    expected: d.sample_format(),
                    found: s.sample_format(),
                });
            }
        }
        Ok(())
    }
}

struct RegionGeom {
    bands: usize,
    rows: usize,
    run: usize,
    dst_width: usize,
    dst_plane: usize,
    dst_x: usize,
    dst_y: usize,
    src_width: usize,
    src_plane: usize,
    src_x: usize,
    src_y: usize,
}

fn copy_region<T: Copy>(dst: &mut [T], src: &[T], g: &RegionGeom) {
    for band in 0..g.bands {
        for row in 0..g.rows {
            let d = band * g.dst_plane + (g.dst_y + row) * g.dst_width + g.dst_x;
            let s = band * g.src_plane + (g.src_y + row) * g.src_width + g.src_x;
            dst[d..d + g.run].copy_from_slice(&src[s..s + g.run]);
        }
    }
}

fn fill_planes<T: Sample>(plane: usize, band_values: &[f64]) -> TileSamples {
    let mut data = Vec::with_capacity(plane * band_values.len());
    for &v in band_values {
        data.resize(data.len() + plane, T::from_raw_f64(v));
    }
    T::wrap_vec(data)
}

fn checked_sample_count(rect: PixelRect, band_count: usize) -> TessellaResult<usize> {
    (rect.width as usize)
        .checked_mul(rect.height as usize)
        .and_then(|pixels| pixels.checked_mul(band_count))
        .ok_or_else(|| TessellaError::validation("tile dimensions overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/tile.rs"]
mod tests;
