//! Tessella is a tile-driven, multi-source raster mosaic compositor.
//!
//! Given an ordered set of pre-aligned 2-D rasters, each optionally carrying
//! a single-band alpha mask, a region-of-interest mask and a no-data value
//! range, Tessella derives a destination layout covering the union of the
//! source bounds and composes any requested destination tile under one of two
//! modes:
//!
//! - **Overlay**: the first valid and accepted source at each pixel wins.
//! - **Blend**: the weighted mean of all contributing sources at each pixel.
//!
//! # Pipeline overview
//!
//! 1. **Plan**: `Vec<SourceDescriptor> + MosaicOptions -> MosaicPlan`
//!    (layout validation, bounds union, no-data vector, U8 lookup tables)
//! 2. **Compose**: `MosaicPlan + PixelRect -> TileBuffer` via
//!    [`MosaicPlan::compose_tile`] (the pure per-tile engine)
//! 3. **Drive** (optional): [`compose_bounds`] tiles the full plan bounds and
//!    composes them sequentially or on a rayon pool.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure per-tile core**: [`MosaicPlan`] is immutable after construction
//!   and shareable across threads; each tile composition owns its buffers.
//! - **Source order is part of the contract**: overlay priority and blend
//!   accumulation both follow the descriptor order.
//! - **No runtime type dispatch in the hot path**: the per-pixel loops are
//!   monomorphized once per sample format.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;
mod plan;
mod raster;
mod render;

pub use foundation::core::{PixelRect, SampleFormat};
pub use foundation::error::{TessellaError, TessellaResult};
pub use plan::layout::LayoutHint;
pub use plan::mosaic::{MosaicMode, MosaicOptions, MosaicPlan};
pub use plan::source::SourceDescriptor;
pub use raster::accessor::{BorderFill, RasterSource, RoiMask};
pub use raster::memory::{MemoryRaster, MemoryRoi};
pub use raster::range::{NoDataRange, SampleRange};
pub use raster::tile::{TileBuffer, TileSamples};
pub use render::pipeline::{ComposeThreading, compose_bounds, tile_rects};
