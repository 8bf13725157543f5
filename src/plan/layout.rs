use crate::foundation::core::{PixelRect, SampleFormat};
use crate::foundation::error::{TessellaError, TessellaResult};
use crate::plan::source::SourceDescriptor;

/// Optional layout request supplied at plan construction.
///
/// With sources present the hint rectangle, when non-empty, overrides the
/// union of the source bounds; hinted format and band count are honored only
/// when they match what the sources dictate and are silently replaced
/// otherwise. Without sources the hint must be complete.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutHint {
    /// Requested destination rectangle.
    pub rect: Option<PixelRect>,
    /// Requested sample format.
    pub sample_format: Option<SampleFormat>,
    /// Requested band count.
    pub band_count: Option<usize>,
}

/// Resolved destination layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MosaicLayout {
    pub rect: PixelRect,
    pub sample_format: SampleFormat,
    pub band_count: usize,
}

/// Validate cross-source compatibility and derive the destination layout.
pub(crate) fn plan_layout(
    sources: &[SourceDescriptor],
    hint: &LayoutHint,
) -> TessellaResult<MosaicLayout> {
    if sources.is_empty() {
        let rect = hint
            .rect
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                TessellaError::invalid_layout(
                    "a non-empty layout rectangle is required when there are no sources",
                )
            })?;
        let sample_format = hint.sample_format.ok_or_else(|| {
            TessellaError::invalid_layout("a sample format is required when there are no sources")
        })?;
        let band_count = hint.band_count.filter(|&b| b > 0).ok_or_else(|| {
            TessellaError::invalid_layout("a band count >= 1 is required when there are no sources")
        })?;
        return Ok(MosaicLayout {
            rect,
            sample_format,
            band_count,
        });
    }

    let first = sources[0].image();
    let sample_format = first.sample_format();
    let band_count = first.band_count();
    if band_count == 0 {
        return Err(TessellaError::invalid_layout(
            "sources must have at least one band",
        ));
    }

    for source in &sources[1..] {
        let image = source.image();
        if image.sample_format() != sample_format {
            return Err(TessellaError::MismatchedSampleFormat {
                expected: sample_format,
                found: image.sample_format(),
            });
        }
        if image.band_count() != band_count {
            return Err(TessellaError::MismatchedBandCount {
                expected: band_count,
                found: image.band_count(),
            });
        }
    }

    let rect = match hint.rect {
        Some(r) if !r.is_empty() => r,
        _ => sources
            .iter()
            .fold(PixelRect::default(), |acc, s| acc.union(s.image().bounds())),
    };

    Ok(MosaicLayout {
        rect,
        sample_format,
        band_count,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/plan/layout.rs"]
mod tests;
