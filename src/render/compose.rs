use smallvec::SmallVec;

use crate::foundation::core::{PixelRect, SampleFormat};
use crate::foundation::error::{TessellaError, TessellaResult};
use crate::plan::mosaic::{MosaicMode, MosaicPlan};
use crate::raster::accessor::{RoiMask, extend_data_tile, extend_mask_tile};
use crate::raster::range::SampleRange;
use crate::raster::sample::Sample;
use crate::raster::tile::TileBuffer;

/// Compose one destination tile.
///
/// Materializes a border-extended tile per contributing source, then runs
/// the typed per-pixel loop for the plan's sample format. Pixels no source
/// contributes to receive the destination no-data value.
pub(crate) fn compose_tile(plan: &MosaicPlan, dest_rect: PixelRect) -> TessellaResult<TileBuffer> {
    let format = plan.sample_format();
    let band_count = plan.band_count();
    let mut dest = TileBuffer::filled(dest_rect, format, band_count, plan.destination_no_data())?;
    if dest_rect.is_empty() {
        return Ok(dest);
    }

    let mut inputs = Vec::with_capacity(plan.sources().len());
    let mut any_coverage = false;
    for source in plan.sources() {
        let coverage = dest_rect.intersection(source.image().bounds());
        let data = extend_data_tile(source.image(), dest_rect, format, band_count)?;
        // Alpha is only materialized for sources that contribute data; it is
        // zero-extended so pixels beyond the mask bounds carry no weight.
        let alpha = match (&data, source.alpha()) {
            (Some(_), Some(alpha)) => Some(extend_mask_tile(alpha, dest_rect, format)?),
            _ => None,
        };
        any_coverage |= data.is_some();
        inputs.push(SourceInputs {
            data,
            alpha,
            coverage,
        });
    }
    if !any_coverage {
        return Ok(dest);
    }

    match format {
        SampleFormat::U8 => compose_typed::<u8>(plan, dest_rect, &inputs, &mut dest),
        SampleFormat::U16 => compose_typed::<u16>(plan, dest_rect, &inputs, &mut dest),
        SampleFormat::I16 => compose_typed::<i16>(plan, dest_rect, &inputs, &mut dest),
        SampleFormat::I32 => compose_typed::<i32>(plan, dest_rect, &inputs, &mut dest),
        SampleFormat::F32 => compose_typed::<f32>(plan, dest_rect, &inputs, &mut dest),
        SampleFormat::F64 => compose_typed::<f64>(plan, dest_rect, &inputs, &mut dest),
    }?;
    Ok(dest)
}

/// Border-extended per-source tiles for one destination rect.
struct SourceInputs {
    data: Option<TileBuffer>,
    alpha: Option<TileBuffer>,
    coverage: PixelRect,
}

/// Per-source typed state valid for the whole tile.
struct SourceState<'a, T: Sample> {
    data: &'a [T],
    weight: WeightKind<'a, T>,
    validity: Validity<'a, T>,
    window: Window,
}

/// One source's slice of a single band, as consumed by the pixel loops.
struct BandLane<'a, T: Sample> {
    data: &'a [T],
    weight: WeightKind<'a, T>,
    validity: Validity<'a, T>,
    window: Window,
}

/// How a source's per-pixel acceptance/weight is decided: alpha mask when
/// one is attached, else ROI, else unconditional.
#[derive(Clone, Copy)]
enum WeightKind<'a, T: Sample> {
    Alpha(&'a [T]),
    Roi(&'a dyn RoiMask),
    None,
}

/// No-data test of one source. U8 sources with a range use the plan's baked
/// lookup table; the other formats test the range directly, with NaN
/// counting as no-data on the float paths.
#[derive(Clone, Copy)]
enum Validity<'a, T: Sample> {
    AlwaysData,
    Range(SampleRange<T>),
    ByteLut(&'a [[u8; 256]]),
}

impl<T: Sample> Validity<'_, T> {
    #[inline]
    fn rejects(self, value: T, band: usize, no_data: T) -> bool {
        match self {
            Self::AlwaysData => false,
            Self::Range(range) => range.contains(value) || value.is_nan(),
            Self::ByteLut(tables) => tables[band][value.lut_index()] == no_data.lut_byte(),
        }
    }
}

/// Real coverage of a source within the tile, in tile-local coordinates
/// (half-open). Padded border pixels fall outside the window and are never
/// read as samples.
#[derive(Clone, Copy)]
struct Window {
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
}

impl Window {
    fn new(coverage: PixelRect, rect: PixelRect) -> Self {
        let x0 = (i64::from(coverage.x) - i64::from(rect.x)) as usize;
        let y0 = (i64::from(coverage.y) - i64::from(rect.y)) as usize;
        Self {
            x0,
            x1: x0 + coverage.width as usize,
            y0,
            y1: y0 + coverage.height as usize,
        }
    }

    #[inline]
    fn contains(self, row: usize, col: usize) -> bool {
        col >= self.x0 && col < self.x1 && row >= self.y0 && row < self.y1
    }
}

#[derive(Clone, Copy)]
struct PixelCursor {
    idx: usize,
    row: usize,
    col: usize,
    x: i32,
    y: i32,
}

fn compose_typed<T: Sample>(
    plan: &MosaicPlan,
    rect: PixelRect,
    inputs: &[SourceInputs],
    dest: &mut TileBuffer,
) -> TessellaResult<()> {
    debug_assert_eq!(T::FORMAT, plan.sample_format());
    let width = rect.width as usize;
    let height = rect.height as usize;
    let plane = width * height;
    let band_count = plan.band_count();
    let mode = plan.mode();
    let alpha_bitmask = plan.alpha_bitmask();
    let no_data: SmallVec<[T; 4]> = plan
        .destination_no_data()
        .iter()
        .map(|&v| T::from_raw_f64(v))
        .collect();

    let mut states: SmallVec<[SourceState<'_, T>; 4]> = SmallVec::new();
    for (index, (source, input)) in plan.sources().iter().zip(inputs).enumerate() {
        let Some(data_tile) = &input.data else {
            continue;
        };
        let data = T::slice(data_tile.samples())
            .ok_or_else(|| TessellaError::validation("extended data tile format mismatch"))?;
        let weight = if let Some(alpha_tile) = &input.alpha {
            WeightKind::Alpha(
                T::slice(alpha_tile.samples()).ok_or_else(|| {
                    TessellaError::validation("extended alpha tile format mismatch")
                })?,
            )
        } else if let Some(roi) = source.roi() {
            WeightKind::Roi(roi)
        } else {
            WeightKind::None
        };
        let validity = if let Some(tables) = plan.byte_lut(index) {
            Validity::ByteLut(tables)
        } else if let Some(range) = source.no_data() {
            Validity::Range(T::range_of(range).ok_or_else(|| {
                TessellaError::validation("no-data range format mismatch in compose")
            })?)
        } else {
            Validity::AlwaysData
        };
        states.push(SourceState {
            data,
            weight,
            validity,
            window: Window::new(input.coverage, rect),
        });
    }

    let dest_samples = T::slice_mut(dest.samples_mut())
        .ok_or_else(|| TessellaError::validation("destination tile format mismatch"))?;

    for band in 0..band_count {
        let band_no_data = no_data[band];
        let lanes: SmallVec<[BandLane<'_, T>; 4]> = states
            .iter()
            .map(|state| BandLane {
                data: &state.data[band * plane..(band + 1) * plane],
                weight: state.weight,
                validity: state.validity,
                window: state.window,
            })
            .collect();
        let dest_plane = &mut dest_samples[band * plane..(band + 1) * plane];

        match mode {
            MosaicMode::Overlay => {
                for row in 0..height {
                    let y = rect.y + row as i32;
                    let line = row * width;
                    for col in 0..width {
                        let cursor = PixelCursor {
                            idx: line + col,
                            row,
                            col,
                            x: rect.x + col as i32,
                            y,
                        };
                        dest_plane[cursor.idx] = overlay_sample(&lanes, band, cursor, band_no_data);
                    }
                }
            }
            MosaicMode::Blend => {
                for row in 0..height {
                    let y = rect.y + row as i32;
                    let line = row * width;
                    for col in 0..width {
                        let cursor = PixelCursor {
                            idx: line + col,
                            row,
                            col,
                            x: rect.x + col as i32,
                            y,
                        };
                        dest_plane[cursor.idx] =
                            blend_sample(&lanes, band, cursor, alpha_bitmask, band_no_data);
                    }
                }
            }
        }
    }

    Ok(())
}

/// First source that covers the pixel, passes its no-data test and is
/// accepted by its weight kind wins; otherwise destination no-data.
#[inline]
fn overlay_sample<T: Sample>(
    lanes: &[BandLane<'_, T>],
    band: usize,
    cursor: PixelCursor,
    no_data: T,
) -> T {
    for lane in lanes {
        if !lane.window.contains(cursor.row, cursor.col) {
            continue;
        }
        let value = lane.data[cursor.idx];
        if lane.validity.rejects(value, band, no_data) {
            continue;
        }
        let accept = match lane.weight {
            WeightKind::Alpha(alpha) => alpha[cursor.idx] != T::ZERO,
            WeightKind::Roi(roi) => roi.sample(cursor.x, cursor.y) > 0,
            WeightKind::None => true,
        };
        if accept {
            return value;
        }
    }
    no_data
}

/// Weighted mean over every covering source, accumulated in `f64` in source
/// order. The float formats add to the numerator only for valid samples so
/// NaN cannot contaminate the sum; the integer formats add unconditionally
/// with a zero weight.
#[inline]
fn blend_sample<T: Sample>(
    lanes: &[BandLane<'_, T>],
    band: usize,
    cursor: PixelCursor,
    alpha_bitmask: bool,
    no_data: T,
) -> T {
    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;
    for lane in lanes {
        if !lane.window.contains(cursor.row, cursor.col) {
            continue;
        }
        let value = lane.data[cursor.idx];
        let is_data = !lane.validity.rejects(value, band, no_data);
        let weight = if !is_data {
            0.0
        } else {
            match lane.weight {
                WeightKind::Alpha(alpha) => {
                    let weight = alpha[cursor.idx].to_f64();
                    if weight > 0.0 && alpha_bitmask {
                        1.0
                    } else {
                        weight / 255.0
                    }
                }
                WeightKind::Roi(roi) => {
                    if roi.sample(cursor.x, cursor.y) > 0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                WeightKind::None => 1.0,
            }
        };
        if is_data || !T::BLEND_GUARDS_NUMERATOR {
            numerator += weight * value.to_f64();
        }
        denominator += weight;
    }
    if denominator == 0.0 {
        no_data
    } else {
        T::clamp_round(numerator / denominator)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
