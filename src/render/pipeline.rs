use rayon::prelude::*;

use crate::foundation::core::PixelRect;
use crate::foundation::error::{TessellaError, TessellaResult};
use crate::plan::mosaic::MosaicPlan;
use crate::raster::tile::TileBuffer;

/// Threading and tiling controls for whole-bounds composition.
#[derive(Clone, Debug)]
pub struct ComposeThreading {
    /// Compose tiles on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
    /// Edge length of the square tile grid.
    pub tile_size: u32,
}

impl Default for ComposeThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            tile_size: 256,
        }
    }
}

/// Split `bounds` into a row-major grid of tiles of at most
/// `tile_size` x `tile_size` pixels. Edge tiles are clipped to the bounds.
pub fn tile_rects(bounds: PixelRect, tile_size: u32) -> Vec<PixelRect> {
    if bounds.is_empty() || tile_size == 0 {
        return Vec::new();
    }
    let step = i64::from(tile_size);
    let max_x = bounds.max_x();
    let max_y = bounds.max_y();
    let mut out = Vec::new();
    let mut y = i64::from(bounds.y);
    while y < max_y {
        let tile_h = (max_y - y).min(step) as u32;
        let mut x = i64::from(bounds.x);
        while x < max_x {
            let tile_w = (max_x - x).min(step) as u32;
            out.push(PixelRect::new(x as i32, y as i32, tile_w, tile_h));
            x += step;
        }
        y += step;
    }
    out
}

/// Compose the full plan bounds as a grid of tiles and stitch the result
/// into one buffer.
///
/// This is the host-side driver around the pure per-tile core: the engine
/// itself never schedules, so parallelism lives here. The output is
/// byte-identical whether tiles are composed sequentially or in parallel.
pub fn compose_bounds(
    plan: &MosaicPlan,
    threading: &ComposeThreading,
) -> TessellaResult<TileBuffer> {
    if threading.tile_size == 0 {
        return Err(TessellaError::validation(
            "compose threading 'tile_size' must be >= 1",
        ));
    }
    let bounds = plan.bounds();
    let mut out = TileBuffer::filled(
        bounds,
        plan.sample_format(),
        plan.band_count(),
        plan.destination_no_data(),
    )?;
    let tiles = tile_rects(bounds, threading.tile_size);

    if !threading.parallel {
        for rect in tiles {
            let tile = plan.compose_tile(rect)?;
            out.copy_region_from(&tile)?;
        }
        return Ok(out);
    }

    let pool = build_thread_pool(threading.threads)?;
    let composed = pool.install(|| {
        tiles
            .par_iter()
            .map(|rect| plan.compose_tile(*rect))
            .collect::<Vec<_>>()
    });
    for tile in composed {
        out.copy_region_from(&tile?)?;
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> TessellaResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TessellaError::validation(
            "compose threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TessellaError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
