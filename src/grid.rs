//! Deterministic mapping of flat process ranks onto a 2d space-time grid
//!
//! A world of `global` processes is arranged as `temporal` blocks of
//! `spatial` consecutive ranks. Every rank derives its position from its own
//! rank number alone, without message exchange, so all members of a collective
//! split agree on the partition by construction.
use crate::error::SplitError;

/// Shape of the space-time process grid.
///
/// Invariant: `spatial * temporal == global` (checked at construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    /// Number of processes in the ambient world
    global: usize,
    /// Processes per time slice
    spatial: usize,
    /// Number of time slices
    temporal: usize,
}

impl GridShape {
    /// Partition `global_size` processes into `temporal_size` time slices.
    ///
    /// An uneven grid is refused, not approximated.
    pub fn new(global_size: usize, temporal_size: usize) -> Result<Self, SplitError> {
        if temporal_size == 0 {
            return Err(SplitError::ZeroTemporal);
        }
        if global_size % temporal_size != 0 {
            return Err(SplitError::UnevenGrid {
                global_size,
                temporal_size,
            });
        }
        Ok(Self {
            global: global_size,
            spatial: global_size / temporal_size,
            temporal: temporal_size,
        })
    }

    /// The un-split `1 x 1` grid.
    #[must_use]
    pub fn unit() -> Self {
        Self {
            global: 1,
            spatial: 1,
            temporal: 1,
        }
    }

    /// Number of processes in the ambient world
    #[must_use]
    pub fn global_size(&self) -> usize {
        self.global
    }

    /// Number of processes per time slice
    #[must_use]
    pub fn spatial_size(&self) -> usize {
        self.spatial
    }

    /// Number of time slices
    #[must_use]
    pub fn temporal_size(&self) -> usize {
        self.temporal
    }

    /// Time-slice index of `rank`.
    ///
    /// Ranks sharing a spatial color form one spatial group: the block of
    /// `spatial_size` consecutive ranks cooperating on the same time slice.
    #[must_use]
    pub fn spatial_color(&self, rank: usize) -> usize {
        rank / self.spatial
    }

    /// Spatial position of `rank` within its time slice.
    ///
    /// Ranks sharing a temporal color form one temporal group: the processes
    /// holding the same spatial position across all time slices.
    #[must_use]
    pub fn temporal_color(&self, rank: usize) -> usize {
        rank % self.spatial
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::unit()
    }
}
