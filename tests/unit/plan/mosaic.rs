use super::*;
use std::sync::Arc;

use crate::raster::memory::MemoryRaster;

fn u8_source(rect: PixelRect, data: Vec<u8>) -> SourceDescriptor {
    SourceDescriptor::new(Arc::new(MemoryRaster::from_u8(rect, 1, data).unwrap()))
}

fn flat_u8(rect: PixelRect, value: u8) -> SourceDescriptor {
    let len = rect.width as usize * rect.height as usize;
    u8_source(rect, vec![value; len])
}

fn alpha_raster(rect: PixelRect, value: u8) -> Arc<MemoryRaster> {
    let len = rect.width as usize * rect.height as usize;
    Arc::new(MemoryRaster::from_u8(rect, 1, vec![value; len]).unwrap())
}

#[test]
fn no_data_vector_defaults_broadcasts_and_truncates() {
    let rect = PixelRect::new(0, 0, 2, 2);
    let sources = |values: Vec<f64>| {
        let descs = vec![SourceDescriptor::new(Arc::new(
            MemoryRaster::from_samples(
                rect,
                3,
                crate::raster::tile::TileSamples::I32(vec![0; 12]),
            )
            .unwrap(),
        ))];
        MosaicPlan::new(
            descs,
            MosaicOptions {
                destination_no_data: values,
                ..MosaicOptions::default()
            },
        )
        .unwrap()
    };

    assert_eq!(sources(vec![]).destination_no_data(), &[0.0, 0.0, 0.0]);
    assert_eq!(sources(vec![5.0]).destination_no_data(), &[5.0, 5.0, 5.0]);
    assert_eq!(
        sources(vec![1.0, 2.0]).destination_no_data(),
        &[1.0, 1.0, 1.0]
    );
    assert_eq!(
        sources(vec![1.0, 2.0, 3.0, 4.0]).destination_no_data(),
        &[1.0, 2.0, 3.0]
    );
}

#[test]
fn byte_lut_maps_no_data_values_to_the_destination_byte() {
    let rect = PixelRect::new(0, 0, 1, 1);
    let range = SampleRange::new(100u8, 110u8).unwrap();
    let descs = vec![flat_u8(rect, 0).with_no_data(NoDataRange::U8(range))];
    let plan = MosaicPlan::new(
        descs,
        MosaicOptions {
            destination_no_data: vec![7.0],
            ..MosaicOptions::default()
        },
    )
    .unwrap();

    let lut = plan.byte_lut(0).unwrap();
    for value in 0..=255u8 {
        let expected = if range.contains(value) { 7 } else { value };
        assert_eq!(lut[0][value as usize], expected, "value {value}");
    }
}

#[test]
fn luts_are_only_built_for_u8_sources_with_a_range() {
    let rect = PixelRect::new(0, 0, 1, 1);
    let descs = vec![flat_u8(rect, 0)];
    let plan = MosaicPlan::new(descs, MosaicOptions::default()).unwrap();
    assert!(plan.byte_lut(0).is_none());
}

#[test]
fn alpha_bitmask_is_set_when_any_source_lacks_alpha() {
    let rect = PixelRect::new(0, 0, 1, 1);
    let with_alpha = || flat_u8(rect, 0).with_alpha(alpha_raster(rect, 255));

    let all = MosaicPlan::new(
        vec![with_alpha(), with_alpha()],
        MosaicOptions::default(),
    )
    .unwrap();
    assert!(!all.alpha_bitmask());

    let mixed = MosaicPlan::new(vec![with_alpha(), flat_u8(rect, 0)], MosaicOptions::default())
        .unwrap();
    assert!(mixed.alpha_bitmask());

    let none = MosaicPlan::new(vec![flat_u8(rect, 0)], MosaicOptions::default()).unwrap();
    assert!(none.alpha_bitmask());

    let empty = MosaicPlan::new(
        Vec::new(),
        MosaicOptions {
            layout: LayoutHint {
                rect: Some(rect),
                sample_format: Some(SampleFormat::U8),
                band_count: Some(1),
            },
            ..MosaicOptions::default()
        },
    )
    .unwrap();
    assert!(!empty.alpha_bitmask());
}

#[test]
fn alpha_images_must_be_single_band_and_same_format() {
    let rect = PixelRect::new(0, 0, 1, 1);
    let two_band_alpha = Arc::new(
        MemoryRaster::from_u8(rect, 2, vec![0, 0]).unwrap(),
    );
    let result = MosaicPlan::new(
        vec![flat_u8(rect, 0).with_alpha(two_band_alpha)],
        MosaicOptions::default(),
    );
    assert!(matches!(
        result,
        Err(TessellaError::MismatchedBandCount {
            expected: 1,
            found: 2,
        })
    ));

    let f32_alpha = Arc::new(MemoryRaster::from_f32(rect, 1, vec![1.0]).unwrap());
    let result = MosaicPlan::new(
        vec![flat_u8(rect, 0).with_alpha(f32_alpha)],
        MosaicOptions::default(),
    );
    assert!(matches!(
        result,
        Err(TessellaError::MismatchedSampleFormat { .. })
    ));
}

#[test]
fn no_data_range_must_match_the_source_format() {
    let rect = PixelRect::new(0, 0, 1, 1);
    let descs =
        vec![flat_u8(rect, 0).with_no_data(NoDataRange::I32(SampleRange::point(-1)))];
    assert!(matches!(
        MosaicPlan::new(descs, MosaicOptions::default()),
        Err(TessellaError::InvalidNoDataRange {
            expected: SampleFormat::U8,
            found: SampleFormat::I32,
        })
    ));
}

#[test]
fn rect_mapping_intersects_with_bounds() {
    let descs = vec![
        flat_u8(PixelRect::new(0, 0, 2, 2), 0),
        flat_u8(PixelRect::new(2, 0, 2, 2), 0),
    ];
    let plan = MosaicPlan::new(descs, MosaicOptions::default()).unwrap();
    assert_eq!(plan.bounds(), PixelRect::new(0, 0, 4, 2));

    let tile = PixelRect::new(1, 0, 2, 2);
    assert_eq!(
        plan.map_dest_rect(tile, 0).unwrap(),
        PixelRect::new(1, 0, 1, 2)
    );
    assert_eq!(
        plan.map_dest_rect(tile, 1).unwrap(),
        PixelRect::new(2, 0, 1, 2)
    );
    assert!(
        plan.map_dest_rect(PixelRect::new(10, 10, 1, 1), 0)
            .unwrap()
            .is_empty()
    );
    assert!(plan.map_dest_rect(tile, 2).is_err());

    assert_eq!(
        plan.map_source_rect(PixelRect::new(3, 0, 4, 4), 1).unwrap(),
        PixelRect::new(3, 0, 1, 2)
    );
    assert!(plan.map_source_rect(tile, 9).is_err());
}

#[test]
fn plans_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MosaicPlan>();
}
