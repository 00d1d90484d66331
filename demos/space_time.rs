//! Run with
//!
//! cargo mpirun --np 8 --example space_time --features mpi
use mpi::collective::SystemOperation;
use mpi::traits::*;
use timegrid::mpi::MpiGroup;
use timegrid::{ProcessGroup, SpaceTimeComm};

fn main() {
    let universe = mpi::initialize().unwrap();
    let mut comm = SpaceTimeComm::new(MpiGroup::world(&universe));

    let temporal = 2;
    if let Err(err) = comm.split(temporal) {
        // Every rank derives the same configuration error; take the whole
        // job down instead of letting peers hang in the collective.
        eprintln!("space_time: {err}");
        comm.ambient().abort(1);
    }

    let world_rank = comm.global_rank();
    println!(
        "World rank {}/{}: time slice {}/{}, spatial rank {}/{}, temporal rank {}/{}",
        world_rank,
        comm.global_size(),
        world_rank / comm.spatial_size(),
        comm.temporal_size(),
        comm.spatial_rank(),
        comm.spatial_size(),
        comm.temporal_rank(),
        comm.temporal_size(),
    );

    // Verify spatial membership: summing world ranks across the own time
    // slice must give the sum of one contiguous block of ranks.
    let contribution = world_rank as i32;
    let mut sum = 0i32;
    comm.spatial_group()
        .communicator()
        .all_reduce_into(&contribution, &mut sum, SystemOperation::sum());
    let block = (world_rank / comm.spatial_size()) * comm.spatial_size();
    let expected: i32 = (block..block + comm.spatial_size()).sum::<usize>() as i32;
    assert_eq!(sum, expected, "rank {world_rank}: wrong time slice");

    // Verify temporal membership: the same spatial position recurs every
    // spatial_size ranks.
    let mut sum = 0i32;
    comm.temporal_group()
        .communicator()
        .all_reduce_into(&contribution, &mut sum, SystemOperation::sum());
    let position = world_rank % comm.spatial_size();
    let expected: i32 = (0..comm.temporal_size())
        .map(|slice| position + slice * comm.spatial_size())
        .sum::<usize>() as i32;
    assert_eq!(sum, expected, "rank {world_rank}: wrong temporal group");

    comm.unsplit().unwrap();
    assert_eq!(comm.ambient().size(), comm.global_size());
    assert_eq!(comm.ambient().rank(), world_rank);

    comm.ambient().communicator().barrier();
    if world_rank == 0 {
        println!("space-time split verified on {} processes", comm.global_size());
    }
}
