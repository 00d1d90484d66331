//! In-process substrate simulating an SPMD world
//!
//! [`LocalWorld`] stands in for a message-passing runtime: it hands out one
//! [`LocalGroup`] per simulated rank, and a test drives all ranks through the
//! same call sequence from a single thread. Collective splits are recorded per
//! epoch (the n-th split call of every rank belongs to epoch n) and membership
//! is resolved lazily once every member of the parent group has joined.
//!
//! A query against a split in which some parent member has not yet taken part
//! panics: the single-threaded analogue of the permanent hang a mismatched
//! collective causes on a real substrate.
use crate::group::ProcessGroup;
use std::cell::RefCell;
use std::rc::Rc;

/// Per-world record of collective split calls.
struct WorldState {
    size: usize,
    /// `epochs[e][r]` is the `(color, key)` rank `r` passed to its `e`-th split.
    epochs: Vec<Vec<Option<(usize, usize)>>>,
    /// Epoch the next split call of each rank will join.
    next_epoch: Vec<usize>,
}

/// A simulated world of `size` single-threaded ranks.
#[derive(Clone)]
pub struct LocalWorld {
    state: Rc<RefCell<WorldState>>,
}

impl LocalWorld {
    /// Create a world of `size` simulated ranks.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "world size must be at least 1");
        Self {
            state: Rc::new(RefCell::new(WorldState {
                size,
                epochs: Vec::new(),
                next_epoch: vec![0; size],
            })),
        }
    }

    /// Number of ranks in this world.
    #[must_use]
    pub fn size(&self) -> usize {
        self.state.borrow().size
    }

    /// The world group as seen by `rank`.
    ///
    /// # Panics
    /// Panics if `rank` is out of range.
    #[must_use]
    pub fn group(&self, rank: usize) -> LocalGroup {
        assert!(rank < self.size(), "rank {rank} out of range");
        LocalGroup {
            state: Rc::clone(&self.state),
            world_rank: rank,
            lineage: Lineage::World,
        }
    }

    /// World groups for all ranks, in rank order.
    #[must_use]
    pub fn groups(&self) -> Vec<LocalGroup> {
        (0..self.size()).map(|r| self.group(r)).collect()
    }
}

#[derive(Clone)]
enum Lineage {
    World,
    Split {
        parent: Box<LocalGroup>,
        epoch: usize,
        color: usize,
    },
}

/// One rank's handle to a simulated process group.
///
/// Cheap to clone; clones refer to the same recorded world. Not `Send`: the
/// simulation is single-threaded by design, matching the SPMD model where
/// each process runs this core on one thread.
#[derive(Clone)]
pub struct LocalGroup {
    state: Rc<RefCell<WorldState>>,
    world_rank: usize,
    lineage: Lineage,
}

impl LocalGroup {
    /// World ranks of this group's members, in group-rank order.
    ///
    /// # Panics
    /// Panics if some member of the parent group has not yet performed the
    /// split this group came from (an incomplete collective).
    #[must_use]
    pub fn world_ranks(&self) -> Vec<usize> {
        match &self.lineage {
            Lineage::World => (0..self.state.borrow().size).collect(),
            Lineage::Split {
                parent,
                epoch,
                color,
            } => {
                let parents = parent.world_ranks();
                let state = self.state.borrow();
                let entries = &state.epochs[*epoch];
                let mut joined: Vec<(usize, usize)> = Vec::new();
                for &r in &parents {
                    let Some((c, k)) = entries[r] else {
                        panic!("collective split incomplete: rank {r} has not joined");
                    };
                    if c == *color {
                        joined.push((k, r));
                    }
                }
                joined.sort_unstable();
                joined.into_iter().map(|(_, r)| r).collect()
            }
        }
    }

    /// Rank of this process in the world this group belongs to.
    #[must_use]
    pub fn world_rank(&self) -> usize {
        self.world_rank
    }
}

impl ProcessGroup for LocalGroup {
    fn size(&self) -> usize {
        self.world_ranks().len()
    }

    fn rank(&self) -> usize {
        self.world_ranks()
            .iter()
            .position(|&r| r == self.world_rank)
            .expect("a group always contains its own rank")
    }

    fn split_by_color(&self, color: usize, key: usize) -> Self {
        let epoch = {
            let mut state = self.state.borrow_mut();
            let epoch = state.next_epoch[self.world_rank];
            state.next_epoch[self.world_rank] += 1;
            if state.epochs.len() <= epoch {
                let size = state.size;
                state.epochs.push(vec![None; size]);
            }
            state.epochs[epoch][self.world_rank] = Some((color, key));
            epoch
        };
        Self {
            state: Rc::clone(&self.state),
            world_rank: self.world_rank,
            lineage: Lineage::Split {
                parent: Box::new(self.clone()),
                epoch,
                color,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn world_group_covers_all_ranks() {
        let world = LocalWorld::new(4);
        let g = world.group(2);
        assert_eq!(g.size(), 4);
        assert_eq!(g.rank(), 2);
        assert_eq!(g.world_ranks(), [0, 1, 2, 3]);
    }

    #[test]
    fn parity_split_groups_even_and_odd() {
        let world = LocalWorld::new(6);
        let subs: Vec<LocalGroup> = world
            .groups()
            .iter()
            .map(|g| g.split_by_color(g.rank() % 2, g.rank()))
            .collect();
        assert_eq!(subs[0].world_ranks(), [0, 2, 4]);
        assert_eq!(subs[3].world_ranks(), [1, 3, 5]);
        assert_eq!(subs[4].rank(), 2);
        assert_eq!(subs[5].size(), 3);
    }

    #[test]
    fn key_controls_ordering_within_group() {
        let world = LocalWorld::new(3);
        // Reversed keys reverse the group-rank order.
        let subs: Vec<LocalGroup> = world
            .groups()
            .iter()
            .map(|g| g.split_by_color(0, 10 - g.rank()))
            .collect();
        assert_eq!(subs[0].world_ranks(), [2, 1, 0]);
        assert_eq!(subs[0].rank(), 2);
        assert_eq!(subs[2].rank(), 0);
    }

    #[test]
    fn subgroups_can_split_again() {
        let world = LocalWorld::new(4);
        let halves: Vec<LocalGroup> = world
            .groups()
            .iter()
            .map(|g| g.split_by_color(g.rank() / 2, g.rank()))
            .collect();
        // Each half splits into singletons by its sub-rank.
        let singles: Vec<LocalGroup> = halves
            .iter()
            .map(|g| g.split_by_color(g.rank(), g.rank()))
            .collect();
        for (r, s) in singles.iter().enumerate() {
            assert_eq!(s.size(), 1);
            assert_eq!(s.world_ranks(), [r]);
        }
    }

    #[test]
    #[should_panic(expected = "collective split incomplete")]
    fn incomplete_collective_panics_on_query() {
        let world = LocalWorld::new(2);
        let sub = world.group(0).split_by_color(0, 0);
        // Rank 1 never joins the split; membership is unresolvable.
        let _ = sub.size();
    }
}
