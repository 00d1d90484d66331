//! Space-time process-grid decomposition for parallel-in-time solvers
//!
//! Space-time-parallel methods (parareal, space-time multigrid) run `P`
//! cooperating processes as a `temporal x spatial` grid: blocks of
//! consecutive ranks cooperate on one time slice, while ranks holding the
//! same position in different blocks exchange data across time slices.
//! [`SpaceTimeComm`] derives both groupings deterministically from each
//! process's own rank, substitutes the ambient world with the spatial group
//! for the duration of the space-time computation, and restores it afterwards
//! without leaking group handles.
//!
//! The process-group substrate is pluggable through [`ProcessGroup`]: enable
//! the `mpi` feature for rsmpi communicators, or use [`LocalWorld`] to drive
//! all ranks of a simulated world from a single test thread.
//!
//! # Example
//! ```
//! use timegrid::{LocalWorld, SpaceTimeComm};
//!
//! // A simulated SPMD world of 8 ranks, split into 2 time slices of 4.
//! let world = LocalWorld::new(8);
//! let mut comms: Vec<_> = world.groups().into_iter().map(SpaceTimeComm::new).collect();
//! for comm in &mut comms {
//!     comm.split(2)?;
//! }
//! assert_eq!(comms[0].spatial_size(), 4);
//! assert_eq!(comms[5].spatial_rank(), 1); // time slice {4, 5, 6, 7}
//! assert_eq!(comms[5].temporal_rank(), 1); // temporal group {1, 5}
//! for comm in &mut comms {
//!     comm.unsplit()?;
//! }
//! # Ok::<(), timegrid::SplitError>(())
//! ```
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod comm;
pub mod error;
pub mod grid;
pub mod group;
pub mod local;
pub mod mpi;

pub use comm::{SpaceTimeComm, SplitGuard};
pub use error::SplitError;
pub use grid::GridShape;
pub use group::ProcessGroup;
pub use local::{LocalGroup, LocalWorld};
