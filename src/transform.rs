// Transform chain — pure, all-or-nothing preprocessing steps
//
// Canonical order: decode -> RandomCrop [HWC] -> Normalize [HWC]
// -> ToTensor [HWC->CHW] -> Pad [CHW]. Each step checks the layout it
// requires and rejects anything else, so an out-of-order chain fails
// loudly instead of mis-indexing channels.

use crate::error::{Error, Result};
use crate::sample::{DispMap, Image, Layout, StereoSample};

/// A preprocessing step applied to each sample.
///
/// Transforms are pure value-in/value-out functions: on error the sample is
/// discarded and no partial mutation is observable.
pub trait Transform: Send + Sync {
    /// Apply the transform, returning the new sample.
    fn apply(&self, sample: StereoSample) -> Result<StereoSample>;
}

/// Chain multiple transforms in caller-supplied order.
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for Compose {
    fn apply(&self, mut sample: StereoSample) -> Result<StereoSample> {
        for t in &self.transforms {
            sample = t.apply(sample)?;
        }
        Ok(sample)
    }
}

// Normalize

/// Scale pixels to [0, 1] and standardize per channel:
/// `(v / 255 - mean[c]) / std[c]`.
///
/// `mean`/`std` index the image's stored (BGR) channel order. The disparity
/// map is left untouched. Requires interleaved (HWC) input.
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: [f32; 3],
    std: [f32; 3],
}

impl Normalize {
    pub fn new(mean: [f32; 3], std: [f32; 3]) -> Self {
        Self { mean, std }
    }

    fn standardize(&self, img: &mut Image) -> Result<()> {
        img.expect_layout(Layout::Hwc)?;
        let channels = img.channels;
        if channels != self.mean.len() {
            return Err(Error::ChannelMismatch {
                expected: self.mean.len(),
                got: channels,
            });
        }
        for px in img.data.chunks_exact_mut(channels) {
            for (c, v) in px.iter_mut().enumerate() {
                *v = (*v / 255.0 - self.mean[c]) / self.std[c];
            }
        }
        Ok(())
    }
}

impl Transform for Normalize {
    fn apply(&self, mut sample: StereoSample) -> Result<StereoSample> {
        self.standardize(&mut sample.left)?;
        self.standardize(&mut sample.right)?;
        Ok(sample)
    }
}

// ToTensor

/// Rearrange the frames from interleaved HWC to planar CHW.
///
/// No value rescaling happens here. The disparity map is already a 2-D
/// float array and passes through unchanged.
#[derive(Debug, Clone, Default)]
pub struct ToTensor;

impl ToTensor {
    pub fn new() -> Self {
        ToTensor
    }
}

fn hwc_to_chw(img: Image) -> Result<Image> {
    img.expect_layout(Layout::Hwc)?;
    let (h, w, c) = (img.height, img.width, img.channels);
    let mut planar = vec![0.0f32; img.data.len()];
    for y in 0..h {
        for x in 0..w {
            for ch in 0..c {
                planar[(ch * h + y) * w + x] = img.data[(y * w + x) * c + ch];
            }
        }
    }
    Ok(Image {
        data: planar,
        layout: Layout::Chw,
        ..img
    })
}

impl Transform for ToTensor {
    fn apply(&self, mut sample: StereoSample) -> Result<StereoSample> {
        sample.left = hwc_to_chw(sample.left)?;
        sample.right = hwc_to_chw(sample.right)?;
        Ok(sample)
    }
}

// Pad

/// Zero-pad the sample on the bottom and right only, to an exact
/// `target_h x target_w`.
///
/// Trailing-only padding keeps the original content top-left aligned, which
/// downstream consumers rely on. Requires planar (CHW) frames; fails with
/// [`Error::PadExceedsTarget`] if the sample is already larger than the
/// target in either dimension.
#[derive(Debug, Clone)]
pub struct Pad {
    target_h: usize,
    target_w: usize,
}

impl Pad {
    pub fn new(target_h: usize, target_w: usize) -> Self {
        Self { target_h, target_w }
    }

    fn check_fits(&self, height: usize, width: usize) -> Result<()> {
        if height > self.target_h || width > self.target_w {
            return Err(Error::PadExceedsTarget {
                target_h: self.target_h,
                target_w: self.target_w,
                height,
                width,
            });
        }
        Ok(())
    }

    fn pad_image(&self, img: Image) -> Result<Image> {
        img.expect_layout(Layout::Chw)?;
        self.check_fits(img.height, img.width)?;
        let mut out = vec![0.0f32; img.channels * self.target_h * self.target_w];
        for ch in 0..img.channels {
            for y in 0..img.height {
                let src = (ch * img.height + y) * img.width;
                let dst = (ch * self.target_h + y) * self.target_w;
                out[dst..dst + img.width].copy_from_slice(&img.data[src..src + img.width]);
            }
        }
        Ok(Image {
            data: out,
            height: self.target_h,
            width: self.target_w,
            ..img
        })
    }

    fn pad_disp(&self, disp: DispMap) -> Result<DispMap> {
        self.check_fits(disp.height, disp.width)?;
        let mut out = vec![0.0f32; self.target_h * self.target_w];
        for y in 0..disp.height {
            let src = y * disp.width;
            let dst = y * self.target_w;
            out[dst..dst + disp.width].copy_from_slice(&disp.data[src..src + disp.width]);
        }
        Ok(DispMap::new(out, self.target_h, self.target_w))
    }
}

impl Transform for Pad {
    fn apply(&self, mut sample: StereoSample) -> Result<StereoSample> {
        sample.left = self.pad_image(sample.left)?;
        sample.right = self.pad_image(sample.right)?;
        if let Some(disp) = sample.disp.take() {
            sample.disp = Some(self.pad_disp(disp)?);
        }
        Ok(sample)
    }
}
