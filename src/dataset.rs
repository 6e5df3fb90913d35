// Dataset trait — indexed access to decoded stereo samples

use crate::error::Result;
use crate::sample::StereoSample;

/// An ordered, fixed-size, indexable collection of stereo samples.
///
/// Implementations must be `Send + Sync`: a data-loading framework may call
/// [`get`](Dataset::get) from several worker threads at once, so all state
/// reachable from `get` has to be immutable or internally synchronized.
pub trait Dataset: Send + Sync {
    /// Total number of samples.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode and return the sample at position `index`.
    ///
    /// Each call re-reads from disk; samples are never cached and the
    /// returned value is owned exclusively by the caller.
    ///
    /// # Panics
    /// May panic if `index >= self.len()`.
    fn get(&self, index: usize) -> Result<StereoSample>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}
