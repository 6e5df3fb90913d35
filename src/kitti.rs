// KITTI 2015 stereo benchmark — deterministic path index + PNG decoding
//
// The benchmark ships 200 training scenes and 200 test scenes with a fixed
// layout and zero-padded six-digit filenames:
//
//   <root>/training/image_2/000000_10.png .. 000199_10.png   (left, 3-channel)
//   <root>/training/image_3/...                              (right, 3-channel)
//   <root>/training/disp_occ_0/...                           (disparity, 16-bit)
//   <root>/training/disp_noc_0/...                           (non-occluded variant)
//   <root>/testing/image_2, image_3                          (no ground truth)
//
// The `_10` suffix names the reference frame of each stereo sequence pair.
// Disparity PNGs store `u16` values; true disparity in pixels is the stored
// value divided by 256, with 0 marking invalid pixels.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::DynamicImage;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::sample::{DispMap, Image, StereoSample};
use crate::transform::Transform;

/// Scenes per subset (training and testing each).
const NUM_SCENES: usize = 200;

/// Which split of the benchmark to index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Scenes `[0, 200 - validate_size)` of `training/`.
    Train,
    /// Scenes `[200 - validate_size, 200)` of `training/`.
    Validate,
    /// All 200 scenes of `testing/`; no disparity ground truth.
    Test,
}

impl Mode {
    fn subset_dir(self) -> &'static str {
        match self {
            Mode::Train | Mode::Validate => "training",
            Mode::Test => "testing",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Mode::Train),
            "validate" => Ok(Mode::Validate),
            "test" => Ok(Mode::Test),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Train => write!(f, "train"),
            Mode::Validate => write!(f, "validate"),
            Mode::Test => write!(f, "test"),
        }
    }
}

fn frame_name(index: usize) -> String {
    format!("{index:06}_10.png")
}

// Kitti2015Builder

/// Builder for [`Kitti2015`].
pub struct Kitti2015Builder {
    root: PathBuf,
    mode: Mode,
    validate_size: usize,
    occluded: bool,
    transform: Option<Box<dyn Transform>>,
}

impl Kitti2015Builder {
    /// Create a builder rooted at the benchmark directory.
    pub fn new<P: AsRef<Path>>(root: P, mode: Mode) -> Self {
        Kitti2015Builder {
            root: root.as_ref().to_path_buf(),
            mode,
            validate_size: 40,
            occluded: true,
            transform: None,
        }
    }

    /// Number of training scenes held out for validation (default 40).
    pub fn validate_size(mut self, n: usize) -> Self {
        self.validate_size = n;
        self
    }

    /// Use the occluded (`disp_occ_0`) ground truth instead of the
    /// non-occluded (`disp_noc_0`) variant. Default: occluded.
    pub fn occluded(mut self, yes: bool) -> Self {
        self.occluded = yes;
        self
    }

    /// Transform applied to every sample inside `get`.
    pub fn with_transform(mut self, t: Box<dyn Transform>) -> Self {
        self.transform = Some(t);
        self
    }

    /// Resolve the path lists and build the dataset.
    ///
    /// Fails with [`Error::InvalidSplit`] when the validation split is not
    /// strictly smaller than the benchmark. File existence is not checked
    /// here; a missing file surfaces from `get` for the index that needs it.
    pub fn build(self) -> Result<Kitti2015> {
        if self.validate_size >= NUM_SCENES {
            return Err(Error::InvalidSplit {
                got: self.validate_size,
                max: NUM_SCENES,
            });
        }

        let subset = self.root.join(self.mode.subset_dir());
        let indices = match self.mode {
            Mode::Train => 0..NUM_SCENES - self.validate_size,
            Mode::Validate => NUM_SCENES - self.validate_size..NUM_SCENES,
            Mode::Test => 0..NUM_SCENES,
        };

        let left_dir = subset.join("image_2");
        let right_dir = subset.join("image_3");
        let mut left_imgs = Vec::with_capacity(indices.len());
        let mut right_imgs = Vec::with_capacity(indices.len());
        for i in indices.clone() {
            left_imgs.push(left_dir.join(frame_name(i)));
            right_imgs.push(right_dir.join(frame_name(i)));
        }

        // Test mode carries no ground truth at all, not an empty list.
        let disp_imgs = match self.mode {
            Mode::Train | Mode::Validate => {
                let disp_dir = subset.join(if self.occluded {
                    "disp_occ_0"
                } else {
                    "disp_noc_0"
                });
                Some(indices.map(|i| disp_dir.join(frame_name(i))).collect())
            }
            Mode::Test => None,
        };

        Ok(Kitti2015 {
            mode: self.mode,
            left_imgs,
            right_imgs,
            disp_imgs,
            transform: self.transform,
        })
    }
}

// Kitti2015 dataset

/// The KITTI 2015 stereo benchmark as an indexed dataset.
///
/// Path lists are computed once at build time and never mutated; every
/// [`get`](Dataset::get) decodes fresh from disk, so concurrent reads from
/// multiple threads share no mutable state.
pub struct Kitti2015 {
    mode: Mode,
    left_imgs: Vec<PathBuf>,
    right_imgs: Vec<PathBuf>,
    /// `None` in test mode.
    disp_imgs: Option<Vec<PathBuf>>,
    transform: Option<Box<dyn Transform>>,
}

impl Kitti2015 {
    /// Convenience entry-point: `Kitti2015::new(root, mode)` returns a builder.
    pub fn new<P: AsRef<Path>>(root: P, mode: Mode) -> Kitti2015Builder {
        Kitti2015Builder::new(root, mode)
    }

    /// Which split this dataset indexes.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Left-frame path for the i-th sample.
    pub fn left_path(&self, index: usize) -> &Path {
        &self.left_imgs[index]
    }

    /// Right-frame path for the i-th sample.
    pub fn right_path(&self, index: usize) -> &Path {
        &self.right_imgs[index]
    }

    /// Disparity path for the i-th sample, if this split has ground truth.
    pub fn disp_path(&self, index: usize) -> Option<&Path> {
        self.disp_imgs.as_ref().map(|paths| paths[index].as_path())
    }
}

impl Dataset for Kitti2015 {
    fn len(&self) -> usize {
        self.left_imgs.len()
    }

    fn get(&self, index: usize) -> Result<StereoSample> {
        let left = load_frame(&self.left_imgs[index])?;
        let right = load_frame(&self.right_imgs[index])?;
        check_dims(&self.right_imgs[index], &left, right.height, right.width)?;
        let disp = match &self.disp_imgs {
            Some(paths) => {
                let disp = load_disparity(&paths[index])?;
                check_dims(&paths[index], &left, disp.height, disp.width)?;
                Some(disp)
            }
            None => None,
        };

        let mut sample = StereoSample { left, right, disp };
        if let Some(t) = &self.transform {
            sample = t.apply(sample)?;
        }
        Ok(sample)
    }

    fn name(&self) -> &str {
        match self.mode {
            Mode::Train => "kitti2015-train",
            Mode::Validate => "kitti2015-validate",
            Mode::Test => "kitti2015-test",
        }
    }
}

impl fmt::Debug for Kitti2015 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kitti2015")
            .field("mode", &self.mode)
            .field("len", &self.left_imgs.len())
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}

/// The left frame fixes the sample's spatial dimensions; every other decoded
/// array must match it exactly.
fn check_dims(path: &Path, left: &Image, got_h: usize, got_w: usize) -> Result<()> {
    if (got_h, got_w) != (left.height, left.width) {
        return Err(Error::ShapeMismatch {
            path: path.to_path_buf(),
            expected_h: left.height,
            expected_w: left.width,
            got_h,
            got_w,
        });
    }
    Ok(())
}

// PNG decoding

fn open_png(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    image::open(path).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Decode a 3-channel camera frame into an interleaved BGR [`Image`].
fn load_frame(path: &Path) -> Result<Image> {
    let rgb = open_png(path)?.to_rgb8();
    let (w, h) = rgb.dimensions();
    let raw = rgb.as_raw();

    // Swap to BGR so channel indices match the sample contract.
    let mut data = vec![0.0f32; raw.len()];
    for (dst, px) in data.chunks_exact_mut(3).zip(raw.chunks_exact(3)) {
        dst[0] = px[2] as f32;
        dst[1] = px[1] as f32;
        dst[2] = px[0] as f32;
    }
    Ok(Image::from_hwc(data, h as usize, w as usize, 3))
}

/// Decode a 16-bit grayscale disparity PNG.
///
/// The stored `u16` values divided by 256 yield the true disparity in
/// pixels (standard KITTI encoding); 0 stays 0 and marks invalid pixels.
pub fn load_disparity(path: &Path) -> Result<DispMap> {
    let buf = match open_png(path)? {
        DynamicImage::ImageLuma16(buf) => buf,
        _ => return Err(Error::DisparityFormat(path.to_path_buf())),
    };
    let (w, h) = buf.dimensions();
    let data: Vec<f32> = buf.as_raw().iter().map(|&v| v as f32 / 256.0).collect();
    Ok(DispMap::new(data, h as usize, w as usize))
}
