//! # stereoset
//!
//! Dataset loading and preprocessing for the KITTI 2015 stereo benchmark.
//!
//! This crate provides:
//! - [`Kitti2015`] — deterministic index over the benchmark's fixed directory
//!   layout (left/right frame pairs plus 16-bit encoded disparity maps)
//! - [`Dataset`] trait — indexed, `Send + Sync` access to decoded samples
//! - Sample transforms — [`RandomCrop`], [`Normalize`], [`ToTensor`], [`Pad`],
//!   chained in caller order with [`Compose`]
//!
//! Transforms are pure `StereoSample -> StereoSample` functions and are
//! all-or-nothing: a failing step discards the sample and surfaces an error.
//! The pipeline has one canonical order, enforced through [`Layout`] tags:
//!
//! ```text
//! decode -> RandomCrop [HWC] -> Normalize [HWC] -> ToTensor [HWC->CHW] -> Pad [CHW]
//! ```
//!
//! Batching, shuffling, and worker-pool parallelism are left to the
//! surrounding data-loading framework; every [`Dataset::get`] call is an
//! independent blocking read with no shared mutable state.

pub mod augment;
pub mod dataset;
pub mod error;
pub mod kitti;
pub mod sample;
pub mod transform;

pub use augment::RandomCrop;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use kitti::{load_disparity, Kitti2015, Kitti2015Builder, Mode};
pub use sample::{DispMap, Image, Layout, StereoSample};
pub use transform::{Compose, Normalize, Pad, ToTensor, Transform};
