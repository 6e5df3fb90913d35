// Sample value types — stereo frames, disparity maps, memory layout

use crate::error::{Error, Result};

/// Memory layout of a multi-channel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Interleaved height × width × channel, as decoded from disk.
    Hwc,
    /// Planar channel × height × width, after [`ToTensor`](crate::ToTensor).
    Chw,
}

/// A dense floating-point camera frame.
///
/// Pixel data is stored flat in row-major order for the active [`Layout`].
/// Values stay in the raw 0–255 range until [`Normalize`](crate::Normalize)
/// runs. Channel order is BGR, matching the benchmark's reference tooling;
/// the decoder in [`kitti`](crate::kitti) writes blue first.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub data: Vec<f32>,
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub layout: Layout,
}

impl Image {
    /// Build an image from interleaved (HWC) data.
    ///
    /// # Panics
    /// Panics if `data.len() != height * width * channels`.
    pub fn from_hwc(data: Vec<f32>, height: usize, width: usize, channels: usize) -> Self {
        assert_eq!(
            data.len(),
            height * width * channels,
            "Image: data length does not match {height}x{width}x{channels}"
        );
        Self {
            data,
            height,
            width,
            channels,
            layout: Layout::Hwc,
        }
    }

    /// Value at (row, col, channel), independent of the active layout.
    pub fn at(&self, y: usize, x: usize, c: usize) -> f32 {
        match self.layout {
            Layout::Hwc => self.data[(y * self.width + x) * self.channels + c],
            Layout::Chw => self.data[(c * self.height + y) * self.width + x],
        }
    }

    pub(crate) fn expect_layout(&self, expected: Layout) -> Result<()> {
        if self.layout == expected {
            Ok(())
        } else {
            Err(Error::LayoutMismatch {
                expected,
                got: self.layout,
            })
        }
    }
}

/// A single-channel ground-truth disparity map.
///
/// Values are true disparities in pixels; 0 marks invalid/unknown pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DispMap {
    pub data: Vec<f32>,
    pub height: usize,
    pub width: usize,
}

impl DispMap {
    /// Build a disparity map from row-major data.
    ///
    /// # Panics
    /// Panics if `data.len() != height * width`.
    pub fn new(data: Vec<f32>, height: usize, width: usize) -> Self {
        assert_eq!(
            data.len(),
            height * width,
            "DispMap: data length does not match {height}x{width}"
        );
        Self {
            data,
            height,
            width,
        }
    }

    /// Disparity at (row, col).
    pub fn at(&self, y: usize, x: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

/// One sample: the left/right frame pair plus, outside test mode, the
/// ground-truth disparity map.
///
/// All three arrays share the same spatial dimensions; the indexer
/// guarantees this at decode time and every transform preserves it.
#[derive(Debug, Clone)]
pub struct StereoSample {
    pub left: Image,
    pub right: Image,
    /// Absent in test mode (the benchmark ships no test ground truth).
    pub disp: Option<DispMap>,
}
