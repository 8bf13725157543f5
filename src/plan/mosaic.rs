use crate::foundation::core::{PixelRect, SampleFormat};
use crate::foundation::error::{TessellaError, TessellaResult};
use crate::plan::layout::{LayoutHint, plan_layout};
use crate::plan::source::SourceDescriptor;
use crate::raster::range::{NoDataRange, SampleRange};
use crate::raster::sample::Sample;
use crate::raster::tile::TileBuffer;

/// Compositing mode of a mosaic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MosaicMode {
    /// The first valid and accepted source at each pixel wins.
    Overlay,
    /// Weighted mean of all contributing sources at each pixel.
    Blend,
}

/// Construction options for a [`MosaicPlan`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MosaicOptions {
    /// Compositing mode.
    pub mode: MosaicMode,
    /// Destination no-data, one value per band. An empty vector defaults to
    /// zero; a vector shorter than the band count broadcasts its first
    /// element; a longer one is truncated.
    pub destination_no_data: Vec<f64>,
    /// Optional layout request.
    pub layout: LayoutHint,
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self {
            mode: MosaicMode::Overlay,
            destination_no_data: Vec::new(),
            layout: LayoutHint::default(),
        }
    }
}

/// Immutable compositing plan: destination layout, ordered sources, derived
/// no-data state and the per-source U8 lookup tables.
///
/// A plan is created once, owns no pixel data beyond its lookup tables, and
/// may be shared across threads; [`MosaicPlan::compose_tile`] is pure and
/// re-entrant.
pub struct MosaicPlan {
    mode: MosaicMode,
    bounds: PixelRect,
    sample_format: SampleFormat,
    band_count: usize,
    destination_no_data: Vec<f64>,
    sources: Vec<SourceDescriptor>,
    byte_luts: Vec<Option<Vec<[u8; 256]>>>,
    alpha_bitmask: bool,
}

impl MosaicPlan {
    /// Validate the descriptors, derive the destination layout and no-data
    /// state, and bake the U8 no-data lookup tables.
    pub fn new(sources: Vec<SourceDescriptor>, options: MosaicOptions) -> TessellaResult<Self> {
        let layout = plan_layout(&sources, &options.layout)?;
        let band_count = layout.band_count;
        let sample_format = layout.sample_format;

        let raw = &options.destination_no_data;
        let destination_no_data: Vec<f64> = if raw.is_empty() {
            vec![0.0; band_count]
        } else if raw.len() < band_count {
            vec![raw[0]; band_count]
        } else {
            raw[..band_count].to_vec()
        };

        let mut byte_luts = Vec::with_capacity(sources.len());
        let mut any_without_alpha = false;
        for source in &sources {
            if let Some(alpha) = source.alpha() {
                if alpha.band_count() != 1 {
                    return Err(TessellaError::MismatchedBandCount {
                        expected: 1,
                        found: alpha.band_count(),
                    });
                }
                if alpha.sample_format() != sample_format {
                    return Err(TessellaError::MismatchedSampleFormat {
                        expected: sample_format,
                        found: alpha.sample_format(),
                    });
                }
            } else {
                any_without_alpha = true;
            }

            if let Some(range) = source.no_data()
                && range.sample_format() != sample_format
            {
                return Err(TessellaError::InvalidNoDataRange {
                    expected: sample_format,
                    found: range.sample_format(),
                });
            }

            let lut = match (sample_format, source.no_data()) {
                (SampleFormat::U8, Some(NoDataRange::U8(range))) => {
                    Some(build_byte_lut(range, &destination_no_data))
                }
                _ => None,
            };
            byte_luts.push(lut);
        }

        Ok(Self {
            mode: options.mode,
            bounds: layout.rect,
            sample_format,
            band_count,
            destination_no_data,
            sources,
            byte_luts,
            // Alpha weights degrade to a bitmask as soon as any source has
            // no alpha channel of its own.
            alpha_bitmask: any_without_alpha,
        })
    }

    /// Compositing mode.
    pub fn mode(&self) -> MosaicMode {
        self.mode
    }

    /// Destination bounding rectangle.
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    /// Destination sample format (shared by all sources).
    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    /// Destination band count.
    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Destination no-data, one value per band.
    pub fn destination_no_data(&self) -> &[f64] {
        &self.destination_no_data
    }

    /// Ordered source descriptors.
    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    /// `true` when non-zero alpha counts as full weight rather than a
    /// proportional one.
    pub fn alpha_bitmask(&self) -> bool {
        self.alpha_bitmask
    }

    pub(crate) fn byte_lut(&self, source: usize) -> Option<&[[u8; 256]]> {
        self.byte_luts[source].as_deref()
    }

    /// Map a destination rectangle to the region source `index` contributes
    /// to it; empty when they are disjoint.
    pub fn map_dest_rect(&self, rect: PixelRect, index: usize) -> TessellaResult<PixelRect> {
        let source = self.sources.get(index).ok_or_else(|| {
            TessellaError::validation(format!("source index {index} out of range"))
        })?;
        Ok(rect.intersection(source.image().bounds()))
    }

    /// Map a source rectangle to the destination region it can affect.
    pub fn map_source_rect(&self, rect: PixelRect, index: usize) -> TessellaResult<PixelRect> {
        if index >= self.sources.len() {
            return Err(TessellaError::validation(format!(
                "source index {index} out of range"
            )));
        }
        Ok(rect.intersection(self.bounds))
    }

    /// Compose the destination tile covering `dest_rect`.
    ///
    /// Every pixel of the returned tile is written: composited where sources
    /// contribute, destination no-data elsewhere.
    pub fn compose_tile(&self, dest_rect: PixelRect) -> TessellaResult<TileBuffer> {
        crate::render::compose::compose_tile(self, dest_rect)
    }
}

fn build_byte_lut(range: &SampleRange<u8>, destination_no_data: &[f64]) -> Vec<[u8; 256]> {
    let mut bands = Vec::with_capacity(destination_no_data.len());
    for &band_no_data in destination_no_data {
        let no_data_byte = <u8 as Sample>::from_raw_f64(band_no_data);
        let mut table = [0u8; 256];
        for (value, entry) in table.iter_mut().enumerate() {
            let value = value as u8;
            *entry = if range.contains(value) {
                no_data_byte
            } else {
                value
            };
        }
        bands.push(table);
    }
    bands
}

#[cfg(test)]
#[path = "../../tests/unit/plan/mosaic.rs"]
mod tests;
