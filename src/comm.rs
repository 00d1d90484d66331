//! Space-time splitting of a process world
//!
//! [`SpaceTimeComm`] partitions the ambient world of `P` processes into a
//! `temporal x spatial` grid and derives two orthogonal groups per process:
//! the *spatial* group (the time slice it computes on) and the *temporal*
//! group (its spatial position across all time slices). While a split is
//! active the spatial group substitutes the ambient world, so downstream
//! collective code transparently operates within one time slice; `unsplit`
//! restores the original world and releases both derived groups.
use crate::error::SplitError;
use crate::grid::GridShape;
use crate::group::ProcessGroup;
use std::ops::Deref;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

/// Whether a split is currently active.
///
/// `split` is only legal from `Inactive`, `unsplit` only from `Active`;
/// violating calls fail with a [`SplitError`] instead of overwriting handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Inactive,
    Active,
}

/// Splitter of a process world into a space-time grid.
///
/// Constructed around the ambient world group, which it references but never
/// releases. `split`/`unsplit` are collective: every member of the world must
/// call them in the same order with the same arguments, or the substrate
/// blocks indefinitely. One split may be active at a time; the cycle is not
/// re-entrant.
///
/// Group handles are shared via [`Rc`], so a collaborator holding the handle
/// returned by [`ambient`](Self::ambient) keeps that group alive even across
/// an `unsplit`; the splitter itself never exposes a dangling handle.
pub struct SpaceTimeComm<G: ProcessGroup> {
    /// The world at construction time; ambient again after `unsplit`.
    world: Rc<G>,
    /// Own time slice; aliases `world` while no split is active.
    spatial: Rc<G>,
    /// Same spatial position across time slices; aliases `world` when inactive.
    temporal: Rc<G>,
    /// Last-used grid shape; unit before the first split.
    shape: GridShape,
    state: SplitState,
    /// Emit a diagnostic with the grid sizes on each split.
    verbose: bool,
}

impl<G: ProcessGroup> SpaceTimeComm<G> {
    /// Wrap the ambient world group. No split is active; all three group
    /// handles refer to `world` and the sizes read `1`.
    pub fn new(world: G) -> Self {
        let world = Rc::new(world);
        Self {
            spatial: Rc::clone(&world),
            temporal: Rc::clone(&world),
            world,
            shape: GridShape::unit(),
            state: SplitState::Inactive,
            verbose: true,
        }
    }

    /// Split the world into `temporal_size` time slices.
    ///
    /// Collective over the whole world; every process must pass the same
    /// value. On success the spatial group substitutes the ambient world.
    ///
    /// # Errors
    /// [`SplitError::AlreadySplit`] if a split is active,
    /// [`SplitError::ZeroTemporal`] / [`SplitError::UnevenGrid`] if the world
    /// does not form an even `temporal_size x spatial` grid. Configuration
    /// errors are detected before any group is created; since every rank
    /// derives them identically, the whole job fails together.
    pub fn split(&mut self, temporal_size: usize) -> Result<(), SplitError> {
        if self.state == SplitState::Active {
            return Err(SplitError::AlreadySplit);
        }
        let shape = GridShape::new(self.world.size(), temporal_size)?;
        let rank = self.world.rank();
        // Equal colors join one group; ordering within each group follows the
        // world rank.
        let spatial = self.world.split_by_color(shape.spatial_color(rank), rank);
        let temporal = self.world.split_by_color(shape.temporal_color(rank), rank);
        self.spatial = Rc::new(spatial);
        self.temporal = Rc::new(temporal);
        self.shape = shape;
        self.state = SplitState::Active;
        if self.verbose {
            tracing::info!(
                global_size = shape.global_size(),
                temporal_size = shape.temporal_size(),
                spatial_size = shape.spatial_size(),
                "split world into space-time grid"
            );
        }
        Ok(())
    }

    /// Restore the pre-split world and release both derived groups.
    ///
    /// Collective over the spatial group. The grid-shape counters keep their
    /// last-used values and remain queryable.
    ///
    /// # Errors
    /// [`SplitError::NotSplit`] if no split is active.
    pub fn unsplit(&mut self) -> Result<(), SplitError> {
        if self.state == SplitState::Inactive {
            return Err(SplitError::NotSplit);
        }
        // Dropping the last handle returns the group to the substrate; the
        // stored handles are reset to the restored world, never left dangling.
        self.spatial = Rc::clone(&self.world);
        self.temporal = Rc::clone(&self.world);
        self.state = SplitState::Inactive;
        Ok(())
    }

    /// Split with guaranteed restoration: the returned guard performs the
    /// `unsplit` when it goes out of scope.
    ///
    /// # Errors
    /// Same as [`split`](Self::split).
    pub fn split_scoped(
        &mut self,
        temporal_size: usize,
    ) -> Result<SplitGuard<'_, G>, SplitError> {
        self.split(temporal_size)?;
        Ok(SplitGuard { comm: self })
    }

    /// Whether a split is currently active.
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.state == SplitState::Active
    }

    /// The group downstream collective code should treat as "the world":
    /// the spatial group while a split is active, the construction-time world
    /// otherwise.
    #[must_use]
    pub fn ambient(&self) -> Rc<G> {
        match self.state {
            SplitState::Active => Rc::clone(&self.spatial),
            SplitState::Inactive => Rc::clone(&self.world),
        }
    }

    /// The spatial group (own time slice). Aliases the world when no split is
    /// active.
    #[must_use]
    pub fn spatial_group(&self) -> &G {
        &self.spatial
    }

    /// The temporal group (same spatial position across time slices).
    /// Aliases the world when no split is active.
    #[must_use]
    pub fn temporal_group(&self) -> &G {
        &self.temporal
    }

    /// Last-used grid shape (unit before the first split).
    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of processes in the whole world grid.
    #[must_use]
    pub fn global_size(&self) -> usize {
        self.shape.global_size()
    }

    /// Number of processes per time slice.
    #[must_use]
    pub fn spatial_size(&self) -> usize {
        self.shape.spatial_size()
    }

    /// Number of time slices.
    #[must_use]
    pub fn temporal_size(&self) -> usize {
        self.shape.temporal_size()
    }

    /// Rank within the construction-time world.
    #[must_use]
    pub fn global_rank(&self) -> usize {
        self.world.rank()
    }

    /// Rank within the spatial group.
    #[must_use]
    pub fn spatial_rank(&self) -> usize {
        self.spatial.rank()
    }

    /// Rank within the temporal group.
    #[must_use]
    pub fn temporal_rank(&self) -> usize {
        self.temporal.rank()
    }

    /// Block the calling process. Not collective; a coordination and
    /// debugging aid.
    pub fn sleep(&self, microseconds: u64) {
        thread::sleep(Duration::from_micros(microseconds));
    }

    /// Gate the per-split size diagnostic.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}

/// Region guard returned by [`SpaceTimeComm::split_scoped`].
///
/// Dereferences to the splitter for the read accessors; restores the ambient
/// world on drop.
pub struct SplitGuard<'a, G: ProcessGroup> {
    comm: &'a mut SpaceTimeComm<G>,
}

impl<G: ProcessGroup> Deref for SplitGuard<'_, G> {
    type Target = SpaceTimeComm<G>;

    fn deref(&self) -> &Self::Target {
        self.comm
    }
}

impl<G: ProcessGroup> Drop for SplitGuard<'_, G> {
    fn drop(&mut self) {
        // The guard was created from a successful split, so the state is
        // Active and unsplit cannot fail.
        let _ = self.comm.unsplit();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::local::{LocalGroup, LocalWorld};

    /// Drive all ranks of a simulated world into one splitter each.
    fn comms(world: &LocalWorld) -> Vec<SpaceTimeComm<LocalGroup>> {
        world.groups().into_iter().map(SpaceTimeComm::new).collect()
    }

    #[test]
    fn unsplit_defaults() {
        let world = LocalWorld::new(8);
        let comm = SpaceTimeComm::new(world.group(3));
        assert!(!comm.is_split());
        assert_eq!(comm.global_size(), 1);
        assert_eq!(comm.spatial_size(), 1);
        assert_eq!(comm.temporal_size(), 1);
        // All three handles refer to the ambient world.
        assert_eq!(comm.ambient().size(), 8);
        assert_eq!(comm.spatial_group().size(), 8);
        assert_eq!(comm.temporal_group().size(), 8);
        assert_eq!(comm.global_rank(), 3);
    }

    #[test]
    fn split_sets_sizes_and_substitutes_ambient() {
        let world = LocalWorld::new(8);
        let mut comms = comms(&world);
        for comm in &mut comms {
            comm.split(2).unwrap();
        }
        for comm in &comms {
            assert!(comm.is_split());
            assert_eq!(comm.global_size(), 8);
            assert_eq!(comm.temporal_size(), 2);
            assert_eq!(comm.spatial_size(), 4);
            // The ambient world is now the own time slice.
            assert_eq!(comm.ambient().size(), 4);
        }
        assert_eq!(comms[5].spatial_group().world_ranks(), [4, 5, 6, 7]);
        assert_eq!(comms[5].temporal_group().world_ranks(), [1, 5]);
        assert_eq!(comms[5].spatial_rank(), 1);
        assert_eq!(comms[5].temporal_rank(), 1);
        assert_eq!(comms[5].global_rank(), 5);
    }

    #[test]
    fn unsplit_restores_ambient_and_keeps_counters() {
        let world = LocalWorld::new(4);
        let mut comms = comms(&world);
        for comm in &mut comms {
            comm.split(2).unwrap();
        }
        for comm in &mut comms {
            comm.unsplit().unwrap();
        }
        for (rank, comm) in comms.iter().enumerate() {
            assert!(!comm.is_split());
            assert_eq!(comm.ambient().size(), 4);
            assert_eq!(comm.ambient().rank(), rank);
            // Handles are reset to the restored world, not left dangling.
            assert_eq!(comm.spatial_group().world_ranks(), [0, 1, 2, 3]);
            assert_eq!(comm.temporal_group().world_ranks(), [0, 1, 2, 3]);
            // Counters keep the last-used shape.
            assert_eq!(comm.global_size(), 4);
            assert_eq!(comm.temporal_size(), 2);
            assert_eq!(comm.spatial_size(), 2);
        }
    }

    #[test]
    fn double_split_is_a_protocol_violation() {
        let world = LocalWorld::new(4);
        let mut comms = comms(&world);
        for comm in &mut comms {
            comm.split(2).unwrap();
        }
        assert_eq!(comms[0].split(2).unwrap_err(), SplitError::AlreadySplit);
        // The active split is untouched.
        assert!(comms[0].is_split());
        assert_eq!(comms[0].spatial_size(), 2);
    }

    #[test]
    fn unsplit_without_split_is_a_protocol_violation() {
        let world = LocalWorld::new(2);
        let mut comm = SpaceTimeComm::new(world.group(0));
        assert_eq!(comm.unsplit().unwrap_err(), SplitError::NotSplit);
    }

    #[test]
    fn uneven_grid_creates_no_groups() {
        let world = LocalWorld::new(7);
        let mut comms = comms(&world);
        for comm in &mut comms {
            assert_eq!(
                comm.split(2).unwrap_err(),
                SplitError::UnevenGrid {
                    global_size: 7,
                    temporal_size: 2
                }
            );
            assert!(!comm.is_split());
        }
        // The world is still splittable afterwards: no half-created epoch
        // blocks a later collective.
        for comm in &mut comms {
            comm.split(7).unwrap();
        }
        assert_eq!(comms[3].spatial_size(), 1);
        assert_eq!(comms[3].temporal_rank(), 3);
    }

    #[test]
    fn guard_restores_on_drop() {
        let world = LocalWorld::new(4);
        let mut comms = comms(&world);
        {
            let guards: Vec<_> = comms
                .iter_mut()
                .map(|c| c.split_scoped(4).unwrap())
                .collect();
            assert_eq!(guards[2].spatial_size(), 1);
            assert_eq!(guards[2].ambient().size(), 1);
        }
        for comm in &comms {
            assert!(!comm.is_split());
            assert_eq!(comm.ambient().size(), 4);
        }
    }

    #[test]
    fn ambient_handle_outlives_unsplit() {
        let world = LocalWorld::new(2);
        let mut comms = comms(&world);
        let slices: Vec<_> = comms
            .iter_mut()
            .map(|c| {
                c.split(2).unwrap();
                c.ambient()
            })
            .collect();
        for comm in &mut comms {
            comm.unsplit().unwrap();
        }
        // A collaborator that kept the spatial handle still sees a valid
        // group; the splitter itself reports the restored world.
        assert_eq!(slices[1].size(), 1);
        assert_eq!(comms[1].ambient().size(), 2);
    }
}
