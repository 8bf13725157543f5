use crate::foundation::core::{PixelRect, SampleFormat};
use crate::foundation::error::{TessellaError, TessellaResult};
use crate::raster::tile::TileBuffer;

/// Random-access typed raster over integer coordinates, as supplied by the
/// host for source images and alpha masks.
///
/// Implementations copy on demand: `read_tile` extracts a fresh
/// [`TileBuffer`] for any rectangle inside `bounds`, so concurrent readers
/// never share mutable state.
pub trait RasterSource: Send + Sync {
    /// Bounding rectangle of the raster.
    fn bounds(&self) -> PixelRect;

    /// Sample format of the raster.
    fn sample_format(&self) -> SampleFormat;

    /// Number of bands.
    fn band_count(&self) -> usize;

    /// Copy the pixels of `rect` (which the caller keeps inside `bounds`)
    /// into a new tile whose rect equals `rect`.
    fn read_tile(&self, rect: PixelRect) -> TessellaResult<TileBuffer>;
}

/// Region-of-interest mask consulted per destination pixel.
///
/// A pixel is inside the region iff `sample` is strictly positive.
/// Coordinates outside the mask's coverage must report 0.
pub trait RoiMask: Send + Sync {
    /// Mask value at absolute pixel coordinates.
    fn sample(&self, x: i32, y: i32) -> i32;
}

/// Fill policy for the border of an extended tile.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum BorderFill {
    /// Pad with zero. Used for alpha masks so padded pixels carry no weight.
    Zero,
    /// Pad with a constant, e.g. the saturated low end of a data format.
    Constant(f64),
}

impl BorderFill {
    fn value(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Constant(v) => v,
        }
    }
}

/// Extend a source's data out to `dest_rect`.
///
/// Returns `None` when the source does not intersect `dest_rect` at all (the
/// source contributes nothing to this tile). Otherwise the returned tile
/// covers `dest_rect`, padded with the format's saturated-low fill outside
/// the source bounds.
pub(crate) fn extend_data_tile(
    source: &dyn RasterSource,
    dest_rect: PixelRect,
    format: SampleFormat,
    band_count: usize,
) -> TessellaResult<Option<TileBuffer>> {
    let coverage = dest_rect.intersection(source.bounds());
    if coverage.is_empty() {
        return Ok(None);
    }
    let pad = format.pad_fill();
    let fill = if pad == 0.0 {
        BorderFill::Zero
    } else {
        BorderFill::Constant(pad)
    };
    extend_over(source, dest_rect, coverage, fill, format, band_count).map(Some)
}

/// Extend a single-band mask (alpha) out to `dest_rect` with zero fill.
///
/// Unlike data tiles this always yields a tile: a mask that misses the
/// destination rect entirely is all zero, which rejects every pixel.
pub(crate) fn extend_mask_tile(
    mask: &dyn RasterSource,
    dest_rect: PixelRect,
    format: SampleFormat,
) -> TessellaResult<TileBuffer> {
    let coverage = dest_rect.intersection(mask.bounds());
    extend_over(mask, dest_rect, coverage, BorderFill::Zero, format, 1)
}

fn extend_over(
    source: &dyn RasterSource,
    dest_rect: PixelRect,
    coverage: PixelRect,
    fill: BorderFill,
    format: SampleFormat,
    band_count: usize,
) -> TessellaResult<TileBuffer> {
    let band_values = vec![fill.value(); band_count];
    let mut tile = TileBuffer::filled(dest_rect, format, band_count, &band_values)?;
    if coverage.is_empty() {
        return Ok(tile);
    }
    let read = source.read_tile(coverage)?;
    if read.rect() != coverage {
        return Err(TessellaError::validation(
            "read_tile returned a tile with an unexpected rect",
        ));
    }
    if read.sample_format() != format {
        return Err(TessellaError::MismatchedSampleFormat {
            expected: format,
            found: read.sample_format(),
        });
    }
    if read.band_count() != band_count {
        return Err(TessellaError::MismatchedBandCount {
            expected: band_count,
            found: read.band_count(),
        });
    }
    tile.copy_region_from(&read)?;
    Ok(tile)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/accessor.rs"]
mod tests;
