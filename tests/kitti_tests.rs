// Tests for stereoset: indexing, decoding, and the transform chain
// over a synthetic on-disk benchmark tree.

use std::fs;
use std::path::Path;

use image::{ImageBuffer, Luma, Rgb, RgbImage};
use tempfile::TempDir;

use stereoset::{
    Compose, Dataset, DispMap, Error, Image, Kitti2015, Layout, Mode, Normalize, Pad, RandomCrop,
    StereoSample, ToTensor, Transform,
};

// ImageNet statistics in BGR order, as used with this benchmark.
const MEAN: [f32; 3] = [0.406, 0.456, 0.485];
const STD: [f32; 3] = [0.225, 0.224, 0.229];

// Fixture helpers

/// Deterministic frame: R = x, G = y, B = x + y (all mod 256).
fn write_frame(path: &Path, h: u32, w: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, (x + y) as u8]));
    img.save(path).unwrap();
}

/// Constant 16-bit disparity map with the given stored value.
fn write_disparity(path: &Path, h: u32, w: u32, stored: u16) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(w, h, Luma([stored]));
    img.save(path).unwrap();
}

/// Build a benchmark tree holding files for the given scene indices only.
/// Frames are 6x9; occluded disparity stores 512 (= 2.0 px), non-occluded 256.
fn scene_tree(indices: &[usize]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for &i in indices {
        let name = format!("{i:06}_10.png");
        write_frame(&root.join("training/image_2").join(&name), 6, 9);
        write_frame(&root.join("training/image_3").join(&name), 6, 9);
        write_disparity(&root.join("training/disp_occ_0").join(&name), 6, 9, 512);
        write_disparity(&root.join("training/disp_noc_0").join(&name), 6, 9, 256);
        write_frame(&root.join("testing/image_2").join(&name), 6, 9);
        write_frame(&root.join("testing/image_3").join(&name), 6, 9);
    }
    dir
}

/// In-memory sample for transform-only tests: each channel cell holds a
/// distinct value in [0, 255], disparity is a constant 1.5 px.
fn gradient_sample(h: usize, w: usize) -> StereoSample {
    let img = || {
        let mut data = Vec::with_capacity(h * w * 3);
        for i in 0..h * w * 3 {
            data.push((i % 256) as f32);
        }
        Image::from_hwc(data, h, w, 3)
    };
    StereoSample {
        left: img(),
        right: img(),
        disp: Some(DispMap::new(vec![1.5; h * w], h, w)),
    }
}

// Decoding

#[test]
fn train_sample_decodes_bgr_frames_and_scaled_disparity() {
    let dir = scene_tree(&[0]);
    let ds = Kitti2015::new(dir.path(), Mode::Train).build().unwrap();

    let sample = ds.get(0).unwrap();
    let left = &sample.left;
    assert_eq!((left.height, left.width, left.channels), (6, 9, 3));
    assert_eq!(left.layout, Layout::Hwc);

    // Channel 0 is blue, channel 2 is red.
    for y in 0..6 {
        for x in 0..9 {
            assert_eq!(left.at(y, x, 0), (x + y) as f32);
            assert_eq!(left.at(y, x, 1), y as f32);
            assert_eq!(left.at(y, x, 2), x as f32);
        }
    }

    let disp = sample.disp.as_ref().unwrap();
    assert_eq!((disp.height, disp.width), (6, 9));
    assert!(disp.data.iter().all(|&v| v == 2.0)); // 512 / 256
}

#[test]
fn occluded_flag_selects_the_disparity_variant() {
    let dir = scene_tree(&[0]);
    let noc = Kitti2015::new(dir.path(), Mode::Train)
        .occluded(false)
        .build()
        .unwrap();
    let disp = noc.get(0).unwrap().disp.unwrap();
    assert!(disp.data.iter().all(|&v| v == 1.0)); // 256 / 256
}

#[test]
fn test_mode_sample_carries_no_disparity() {
    let dir = scene_tree(&[0, 1]);
    let ds = Kitti2015::new(dir.path(), Mode::Test).build().unwrap();
    assert_eq!(ds.len(), 200);
    for i in [0, 1] {
        assert!(ds.get(i).unwrap().disp.is_none());
    }
}

#[test]
fn missing_file_surfaces_immediately() {
    let dir = scene_tree(&[0]);
    let ds = Kitti2015::new(dir.path(), Mode::Train).build().unwrap();
    let err = ds.get(1).unwrap_err();
    assert!(matches!(
        err,
        Error::FileNotFound(p) if p.ends_with("training/image_2/000001_10.png")
    ));
}

#[test]
fn corrupt_png_surfaces_as_decode_error() {
    let dir = scene_tree(&[0]);
    let bad = dir.path().join("training/image_2/000000_10.png");
    fs::write(&bad, b"not a png").unwrap();
    let ds = Kitti2015::new(dir.path(), Mode::Train).build().unwrap();
    assert!(matches!(ds.get(0).unwrap_err(), Error::Decode { .. }));
}

#[test]
fn eight_bit_disparity_file_is_rejected() {
    let dir = scene_tree(&[0]);
    let path = dir.path().join("training/disp_occ_0/000000_10.png");
    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(9, 6, Luma([3]));
    img.save(&path).unwrap();
    let ds = Kitti2015::new(dir.path(), Mode::Train).build().unwrap();
    assert!(matches!(
        ds.get(0).unwrap_err(),
        Error::DisparityFormat(p) if p == path
    ));
}

#[test]
fn mismatched_right_frame_dimensions_are_rejected() {
    let dir = scene_tree(&[0]);
    // 4x7 right frame against the 6x9 left frame.
    write_frame(&dir.path().join("training/image_3/000000_10.png"), 4, 7);
    let ds = Kitti2015::new(dir.path(), Mode::Train)
        .with_transform(Box::new(RandomCrop::seeded(5, 8, 3)))
        .build()
        .unwrap();
    let err = ds.get(0).unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected_h: 6,
            expected_w: 9,
            got_h: 4,
            got_w: 7,
            ..
        }
    ));
}

#[test]
fn mismatched_disparity_dimensions_are_rejected() {
    let dir = scene_tree(&[0]);
    write_disparity(&dir.path().join("training/disp_occ_0/000000_10.png"), 5, 9, 512);
    let ds = Kitti2015::new(dir.path(), Mode::Train).build().unwrap();
    assert!(matches!(
        ds.get(0).unwrap_err(),
        Error::ShapeMismatch {
            expected_h: 6,
            got_h: 5,
            ..
        }
    ));
}

// Normalize

#[test]
fn normalize_is_invertible() {
    let t = Normalize::new(MEAN, STD);
    let original = gradient_sample(4, 5);
    let out = t.apply(original.clone()).unwrap();

    for y in 0..4 {
        for x in 0..5 {
            for c in 0..3 {
                let recovered = (out.left.at(y, x, c) * STD[c] + MEAN[c]) * 255.0;
                assert!(
                    (recovered - original.left.at(y, x, c)).abs() < 1e-3,
                    "channel {c} at ({y},{x}): {recovered}"
                );
            }
        }
    }
}

#[test]
fn normalize_leaves_disparity_untouched() {
    let t = Normalize::new(MEAN, STD);
    let out = t.apply(gradient_sample(4, 5)).unwrap();
    assert_eq!(out.disp.unwrap().data, vec![1.5; 20]);
}

#[test]
fn normalize_requires_three_channel_frames() {
    let mut sample = gradient_sample(4, 5);
    sample.left = Image::from_hwc(vec![0.0; 20], 4, 5, 1);
    let err = Normalize::new(MEAN, STD).apply(sample).unwrap_err();
    assert!(matches!(err, Error::ChannelMismatch { expected: 3, got: 1 }));
}

#[test]
fn normalize_rejects_planar_input() {
    let sample = ToTensor::new().apply(gradient_sample(4, 5)).unwrap();
    let err = Normalize::new(MEAN, STD).apply(sample).unwrap_err();
    assert!(matches!(
        err,
        Error::LayoutMismatch {
            expected: Layout::Hwc,
            got: Layout::Chw,
        }
    ));
}

// ToTensor

#[test]
fn to_tensor_permutes_without_rescaling() {
    let original = gradient_sample(4, 5);
    let out = ToTensor::new().apply(original.clone()).unwrap();

    assert_eq!(out.left.layout, Layout::Chw);
    assert_eq!(out.left.data.len(), 4 * 5 * 3);
    for y in 0..4 {
        for x in 0..5 {
            for c in 0..3 {
                // `at` resolves the active layout, so values must agree.
                assert_eq!(out.left.at(y, x, c), original.left.at(y, x, c));
            }
        }
    }
    // Planar storage: channel 0 plane comes first.
    assert_eq!(out.left.data[0], original.left.at(0, 0, 0));
    assert_eq!(out.left.data[4 * 5], original.left.at(0, 0, 1));

    assert_eq!(out.disp.unwrap().data, vec![1.5; 20]);
}

#[test]
fn to_tensor_applied_twice_fails() {
    let once = ToTensor::new().apply(gradient_sample(3, 3)).unwrap();
    assert!(matches!(
        ToTensor::new().apply(once).unwrap_err(),
        Error::LayoutMismatch { .. }
    ));
}

// Pad

#[test]
fn pad_is_trailing_only_and_exact() {
    let sample = ToTensor::new().apply(gradient_sample(4, 5)).unwrap();
    let original = sample.clone();
    let out = Pad::new(7, 9).apply(sample).unwrap();

    assert_eq!((out.left.height, out.left.width), (7, 9));
    let disp = out.disp.as_ref().unwrap();
    assert_eq!((disp.height, disp.width), (7, 9));

    for y in 0..7 {
        for x in 0..9 {
            for c in 0..3 {
                let expect = if y < 4 && x < 5 {
                    original.left.at(y, x, c)
                } else {
                    0.0
                };
                assert_eq!(out.left.at(y, x, c), expect, "({y},{x},{c})");
            }
            let expect = if y < 4 && x < 5 { 1.5 } else { 0.0 };
            assert_eq!(disp.at(y, x), expect);
        }
    }
}

#[test]
fn pad_to_current_size_is_identity() {
    let sample = ToTensor::new().apply(gradient_sample(4, 5)).unwrap();
    let before = sample.left.clone();
    let out = Pad::new(4, 5).apply(sample).unwrap();
    assert_eq!(out.left, before);
}

#[test]
fn pad_smaller_than_sample_fails() {
    let sample = ToTensor::new().apply(gradient_sample(4, 5)).unwrap();
    let err = Pad::new(4, 4).apply(sample).unwrap_err();
    assert!(matches!(
        err,
        Error::PadExceedsTarget {
            target_h: 4,
            target_w: 4,
            height: 4,
            width: 5,
        }
    ));
}

#[test]
fn pad_rejects_interleaved_input() {
    let err = Pad::new(8, 8).apply(gradient_sample(4, 5)).unwrap_err();
    assert!(matches!(
        err,
        Error::LayoutMismatch {
            expected: Layout::Chw,
            got: Layout::Hwc,
        }
    ));
}

// Full pipeline

#[test]
fn canonical_pipeline_end_to_end() {
    let dir = scene_tree(&[0]);
    let pipeline = Compose::new(vec![
        Box::new(RandomCrop::seeded(4, 6, 11)),
        Box::new(Normalize::new(MEAN, STD)),
        Box::new(ToTensor::new()),
        Box::new(Pad::new(8, 10)),
    ]);
    let ds = Kitti2015::new(dir.path(), Mode::Train)
        .with_transform(Box::new(pipeline))
        .build()
        .unwrap();

    let sample = ds.get(0).unwrap();
    assert_eq!(sample.left.layout, Layout::Chw);
    assert_eq!((sample.left.height, sample.left.width), (8, 10));
    assert_eq!((sample.right.height, sample.right.width), (8, 10));

    let disp = sample.disp.unwrap();
    assert_eq!((disp.height, disp.width), (8, 10));
    // Cropped content stays top-left aligned, padding is zero.
    assert_eq!(disp.at(0, 0), 2.0);
    assert_eq!(disp.at(3, 5), 2.0);
    assert_eq!(disp.at(7, 9), 0.0);
    assert_eq!(sample.left.at(7, 9, 0), 0.0);

    // Normalized pixels land in the standardized range, not 0-255.
    assert!(sample.left.at(0, 0, 0).abs() < 10.0);
}

#[test]
fn pipeline_failure_discards_the_sample() {
    let dir = scene_tree(&[0]);
    let pipeline = Compose::new(vec![
        Box::new(RandomCrop::seeded(32, 32, 0)), // larger than the 6x9 frames
        Box::new(ToTensor::new()),
    ]);
    let ds = Kitti2015::new(dir.path(), Mode::Train)
        .with_transform(Box::new(pipeline))
        .build()
        .unwrap();
    assert!(matches!(ds.get(0).unwrap_err(), Error::CropTooLarge { .. }));
}

#[test]
fn dataset_names_follow_the_mode() {
    let dir = scene_tree(&[]);
    let train = Kitti2015::new(dir.path(), Mode::Train).build().unwrap();
    let test = Kitti2015::new(dir.path(), Mode::Test).build().unwrap();
    assert_eq!(train.name(), "kitti2015-train");
    assert_eq!(test.name(), "kitti2015-test");
}
