use super::*;
use crate::raster::memory::MemoryRaster;
use crate::raster::tile::TileSamples;

fn i16_raster(rect: PixelRect, data: Vec<i16>) -> MemoryRaster {
    MemoryRaster::from_samples(rect, 1, TileSamples::I16(data)).unwrap()
}

#[test]
fn data_extension_pads_with_the_format_sentinel() {
    let source = i16_raster(PixelRect::new(0, 0, 1, 1), vec![42]);
    let dest_rect = PixelRect::new(0, 0, 2, 1);
    let tile = extend_data_tile(&source, dest_rect, SampleFormat::I16, 1)
        .unwrap()
        .unwrap();
    assert_eq!(tile.rect(), dest_rect);
    assert_eq!(tile.sample_f64(0, 0, 0), Some(42.0));
    assert_eq!(tile.sample_f64(1, 0, 0), Some(f64::from(i16::MIN)));
}

#[test]
fn data_extension_is_none_without_coverage() {
    let source = i16_raster(PixelRect::new(0, 0, 1, 1), vec![42]);
    let tile = extend_data_tile(&source, PixelRect::new(5, 5, 2, 2), SampleFormat::I16, 1).unwrap();
    assert!(tile.is_none());
}

#[test]
fn float_extension_pads_with_negative_max() {
    let source =
        MemoryRaster::from_f32(PixelRect::new(0, 0, 1, 1), 1, vec![1.5]).unwrap();
    let tile = extend_data_tile(&source, PixelRect::new(0, 0, 2, 1), SampleFormat::F32, 1)
        .unwrap()
        .unwrap();
    assert_eq!(tile.sample_f64(1, 0, 0), Some(f64::from(-f32::MAX)));
}

#[test]
fn mask_extension_zero_fills_and_always_yields_a_tile() {
    let alpha = MemoryRaster::from_u8(PixelRect::new(0, 0, 1, 1), 1, vec![200]).unwrap();
    let tile = extend_mask_tile(&alpha, PixelRect::new(0, 0, 2, 2), SampleFormat::U8).unwrap();
    assert_eq!(tile.sample_f64(0, 0, 0), Some(200.0));
    assert_eq!(tile.sample_f64(1, 0, 0), Some(0.0));
    assert_eq!(tile.sample_f64(1, 1, 0), Some(0.0));

    // A mask with no coverage at all still materializes, all zero.
    let far = extend_mask_tile(&alpha, PixelRect::new(9, 9, 2, 1), SampleFormat::U8).unwrap();
    assert_eq!(far.sample_f64(9, 9, 0), Some(0.0));
    assert_eq!(far.sample_f64(10, 9, 0), Some(0.0));
}

struct MisbehavingRaster;

impl RasterSource for MisbehavingRaster {
    fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, 4, 4)
    }

    fn sample_format(&self) -> SampleFormat {
        SampleFormat::U8
    }

    fn band_count(&self) -> usize {
        1
    }

    fn read_tile(&self, _rect: PixelRect) -> TessellaResult<TileBuffer> {
        // Wrong rect on purpose.
        TileBuffer::filled(PixelRect::new(0, 0, 1, 1), SampleFormat::U8, 1, &[0.0])
    }
}

#[test]
fn extension_rejects_host_contract_violations() {
    let dest_rect = PixelRect::new(0, 0, 2, 2);
    let result = extend_data_tile(&MisbehavingRaster, dest_rect, SampleFormat::U8, 1);
    assert!(result.is_err());
}
