use std::sync::Arc;

use crate::raster::accessor::{RasterSource, RoiMask};
use crate::raster::range::NoDataRange;

/// Per-source bundle: the image handle plus its optional alpha mask, ROI
/// mask and no-data range.
///
/// Descriptors hold handles, not pixel contents; the host keeps the
/// underlying rasters alive for at least the lifetime of the plan. The
/// descriptor order is the compositing order: overlay priority and blend
/// accumulation both follow it.
#[derive(Clone)]
pub struct SourceDescriptor {
    image: Arc<dyn RasterSource>,
    alpha: Option<Arc<dyn RasterSource>>,
    roi: Option<Arc<dyn RoiMask>>,
    no_data: Option<NoDataRange>,
}

impl SourceDescriptor {
    /// Descriptor with no masks and no no-data range.
    pub fn new(image: Arc<dyn RasterSource>) -> Self {
        Self {
            image,
            alpha: None,
            roi: None,
            no_data: None,
        }
    }

    /// Attach a single-band alpha mask sharing the source's sample format.
    pub fn with_alpha(mut self, alpha: Arc<dyn RasterSource>) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Attach a region-of-interest mask.
    pub fn with_roi(mut self, roi: Arc<dyn RoiMask>) -> Self {
        self.roi = Some(roi);
        self
    }

    /// Attach a no-data range; matching samples are treated as absent.
    pub fn with_no_data(mut self, no_data: NoDataRange) -> Self {
        self.no_data = Some(no_data);
        self
    }

    /// The source image.
    pub fn image(&self) -> &dyn RasterSource {
        self.image.as_ref()
    }

    /// The alpha mask, if any.
    pub fn alpha(&self) -> Option<&dyn RasterSource> {
        self.alpha.as_deref()
    }

    /// The ROI mask, if any.
    pub fn roi(&self) -> Option<&dyn RoiMask> {
        self.roi.as_deref()
    }

    /// The no-data range, if any.
    pub fn no_data(&self) -> Option<&NoDataRange> {
        self.no_data.as_ref()
    }
}
