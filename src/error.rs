use std::io;
use std::path::PathBuf;

use crate::sample::Layout;

/// All errors that can occur while indexing or transforming samples.
///
/// Every failure is terminal for the access that produced it: there are no
/// retries and no index skipping. Missing files and decode failures surface
/// from `get`; argument errors surface from the builder or the transform
/// that rejected the sample.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mode string outside the enumerated set (train / validate / test).
    #[error("invalid mode {0:?}: expected \"train\", \"validate\" or \"test\"")]
    InvalidMode(String),

    /// Validation split would cover the whole benchmark or more.
    #[error("validate split of {got} scenes must be smaller than {max}")]
    InvalidSplit { got: usize, max: usize },

    /// An expected image or disparity file is absent.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The image library failed to decode a file.
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A decoded file's spatial dimensions differ from the left frame's.
    #[error(
        "frame shape mismatch at {}: expected {expected_h}x{expected_w}, got {got_h}x{got_w}",
        .path.display()
    )]
    ShapeMismatch {
        path: PathBuf,
        expected_h: usize,
        expected_w: usize,
        got_h: usize,
        got_w: usize,
    },

    /// A frame arrived with a channel count the transform cannot index.
    #[error("expected {expected}-channel frames, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    /// A disparity file decoded to something other than 16-bit grayscale.
    #[error("{} is not a 16-bit grayscale disparity map", .0.display())]
    DisparityFormat(PathBuf),

    /// Crop window larger than the image.
    #[error("crop {crop_h}x{crop_w} exceeds image {height}x{width}")]
    CropTooLarge {
        crop_h: usize,
        crop_w: usize,
        height: usize,
        width: usize,
    },

    /// Pad target smaller than the image in at least one dimension.
    #[error("pad target {target_h}x{target_w} is smaller than image {height}x{width}")]
    PadExceedsTarget {
        target_h: usize,
        target_w: usize,
        height: usize,
        width: usize,
    },

    /// A transform was handed an image in the wrong memory layout.
    #[error("layout mismatch: expected {expected:?}, got {got:?}")]
    LayoutMismatch { expected: Layout, got: Layout },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
