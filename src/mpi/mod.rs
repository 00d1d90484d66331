//! Feature: rsmpi-backed process groups
#![cfg(feature = "mpi")]
use crate::group::ProcessGroup;
use ::mpi::topology::{Color, Communicator, SystemCommunicator, UserCommunicator};

pub use ::mpi::environment::Universe;
pub use ::mpi::initialize;

/// The world communicator or a communicator produced by a split.
///
/// The world is never freed; a split-off `UserCommunicator` returns its
/// resources to the MPI runtime when dropped.
enum CommHandle {
    World(SystemCommunicator),
    Split(UserCommunicator),
}

/// A process group backed by an MPI communicator.
pub struct MpiGroup {
    comm: CommHandle,
}

impl MpiGroup {
    /// The world group of an initialized MPI universe.
    #[must_use]
    pub fn world(universe: &Universe) -> Self {
        Self {
            comm: CommHandle::World(universe.world()),
        }
    }

    /// The underlying communicator, for collective operations within this
    /// group (all-reduce across a time slice, broadcast along a temporal
    /// group, ...).
    #[must_use]
    pub fn communicator(&self) -> &dyn Communicator {
        match &self.comm {
            CommHandle::World(c) => c,
            CommHandle::Split(c) => c,
        }
    }

    /// Abort the whole MPI job. Used for configuration errors, which every
    /// rank of a collective call detects identically.
    pub fn abort(&self, errorcode: i32) -> ! {
        self.communicator().abort(errorcode)
    }
}

impl ProcessGroup for MpiGroup {
    fn size(&self) -> usize {
        self.communicator().size() as usize
    }

    fn rank(&self) -> usize {
        self.communicator().rank() as usize
    }

    fn split_by_color(&self, color: usize, key: usize) -> Self {
        // Colors and keys originate from MPI ranks and stay within i32.
        let comm = self
            .communicator()
            .split_by_color_with_key(Color::with_value(color as i32), key as i32)
            .expect("a non-negative color always yields a communicator");
        Self {
            comm: CommHandle::Split(comm),
        }
    }
}
