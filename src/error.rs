//! Errors of the split/unsplit protocol
use thiserror::Error;

/// Failures of [`crate::GridShape::new`] and the
/// [`crate::SpaceTimeComm`] split/unsplit cycle.
///
/// Configuration errors (`ZeroTemporal`, `UnevenGrid`) are raised before any
/// process group is created and are job-fatal in an SPMD setting: every rank
/// derives the same shape from the same inputs, so every rank fails the same
/// way. Protocol errors (`AlreadySplit`, `NotSplit`) flag calls that would
/// otherwise silently overwrite or dangle group handles.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SplitError {
    /// The requested number of temporal processes was zero.
    #[error("number of temporal processes must be at least 1")]
    ZeroTemporal,
    /// The world does not divide evenly into the requested time slices.
    #[error(
        "cannot split {global_size} processes into {temporal_size} time slices: \
         {global_size} % {temporal_size} != 0"
    )]
    UnevenGrid {
        /// Number of processes in the ambient world.
        global_size: usize,
        /// Requested number of temporal processes.
        temporal_size: usize,
    },
    /// `split` was called while a split is already active.
    #[error("a space-time split is already active; unsplit first")]
    AlreadySplit,
    /// `unsplit` was called while no split is active.
    #[error("no space-time split is active")]
    NotSplit,
}
