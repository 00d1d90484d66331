//! Interface to the external process-group substrate
//!
//! The splitter only ever asks a group for its size, its own rank within the
//! group, and a color/key split. Everything else (transport, collectives,
//! startup) belongs to the substrate behind the implementation: rsmpi
//! communicators under the `mpi` feature, or the in-process simulation in
//! [`crate::local`] for tests.

/// A set of cooperating processes capable of collective operations.
///
/// Implementations release their substrate resources on `Drop`; there is no
/// explicit free. Dropping a group that member processes disagree about is a
/// collective-protocol violation and undefined at the substrate level.
pub trait ProcessGroup {
    /// Number of processes in this group.
    fn size(&self) -> usize;

    /// Rank of the calling process within this group, in `0..size()`.
    fn rank(&self) -> usize;

    /// Split this group into disjoint subgroups.
    ///
    /// Collective: every member of this group must call with some color.
    /// Members passing equal colors join the same new group, ordered by `key`
    /// (ties broken by parent rank). Returns the new group this process is a
    /// member of.
    ///
    /// Mismatched or missing calls across members block indefinitely or are
    /// undefined, per the substrate; there is no timeout.
    fn split_by_color(&self, color: usize, key: usize) -> Self
    where
        Self: Sized;
}
