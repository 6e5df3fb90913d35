// Random augmentation — transforms that draw from an RNG
//
// The crop RNG is injectable: `seeded` makes property tests reproducible,
// `new` seeds from entropy. The generator sits behind a Mutex so that
// `apply(&self)` stays usable from a Send + Sync transform chain.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::sample::{DispMap, Image, Layout, StereoSample};
use crate::transform::Transform;

/// Crop the sample to `out_h x out_w` at one uniformly random top-left
/// offset, applied identically to the left frame, the right frame, and the
/// disparity map so spatial alignment is preserved.
///
/// Offsets are drawn from the half-open ranges `[0, h - out_h)` and
/// `[0, w - out_w)`; an exactly-sized image crops at offset 0. Requires
/// interleaved (HWC) frames; fails with [`Error::CropTooLarge`] if the
/// image is smaller than the requested window.
pub struct RandomCrop {
    out_h: usize,
    out_w: usize,
    rng: Mutex<StdRng>,
}

impl RandomCrop {
    /// Crop with an entropy-seeded generator.
    pub fn new(out_h: usize, out_w: usize) -> Self {
        Self {
            out_h,
            out_w,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Crop with a fixed seed for reproducible offset sequences.
    pub fn seeded(out_h: usize, out_w: usize, seed: u64) -> Self {
        Self {
            out_h,
            out_w,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Transform for RandomCrop {
    fn apply(&self, mut sample: StereoSample) -> Result<StereoSample> {
        sample.left.expect_layout(Layout::Hwc)?;
        sample.right.expect_layout(Layout::Hwc)?;

        let (h, w) = (sample.left.height, sample.left.width);
        if h < self.out_h || w < self.out_w {
            return Err(Error::CropTooLarge {
                crop_h: self.out_h,
                crop_w: self.out_w,
                height: h,
                width: w,
            });
        }

        let (top, left) = {
            let mut rng = self.rng.lock().expect("crop rng lock poisoned");
            let top = if h > self.out_h {
                rng.gen_range(0..h - self.out_h)
            } else {
                0
            };
            let left = if w > self.out_w {
                rng.gen_range(0..w - self.out_w)
            } else {
                0
            };
            (top, left)
        };

        sample.left = crop_image(sample.left, top, left, self.out_h, self.out_w);
        sample.right = crop_image(sample.right, top, left, self.out_h, self.out_w);
        if let Some(disp) = sample.disp.take() {
            sample.disp = Some(crop_disp(disp, top, left, self.out_h, self.out_w));
        }
        Ok(sample)
    }
}

fn crop_image(img: Image, top: usize, left: usize, out_h: usize, out_w: usize) -> Image {
    let c = img.channels;
    let mut cropped = vec![0.0f32; out_h * out_w * c];
    for y in 0..out_h {
        let src = ((top + y) * img.width + left) * c;
        let dst = y * out_w * c;
        cropped[dst..dst + out_w * c].copy_from_slice(&img.data[src..src + out_w * c]);
    }
    Image::from_hwc(cropped, out_h, out_w, c)
}

fn crop_disp(disp: DispMap, top: usize, left: usize, out_h: usize, out_w: usize) -> DispMap {
    let mut cropped = vec![0.0f32; out_h * out_w];
    for y in 0..out_h {
        let src = (top + y) * disp.width + left;
        let dst = y * out_w;
        cropped[dst..dst + out_w].copy_from_slice(&disp.data[src..src + out_w]);
    }
    DispMap::new(cropped, out_h, out_w)
}
