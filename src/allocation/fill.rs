//! Room filling: in-partition wrap-around scan followed by forward-only
//! carry-over into later partitions.

use super::store::{Partition, PartitionStore};
use super::types::Slot;

/// Collects the members of a room seeded at `seed`.
///
/// The seed comes first, then unassigned records of the seed's partition
/// from `seed.position + 1` to the end and from the start up to the seed,
/// then unassigned records of every later partition in order. Partitions
/// before the seed's are never visited. Stops as soon as `room_size`
/// members are collected.
pub(crate) fn gather_room(store: &PartitionStore, seed: Slot, room_size: usize) -> Vec<Slot> {
    let mut members = Vec::with_capacity(room_size);
    members.push(seed);
    fill_in_partition(store, seed, room_size, &mut members);
    if members.len() < room_size {
        carry_over(store, seed.partition, room_size, &mut members);
    }
    members
}

fn partition_len(store: &PartitionStore, index: usize) -> usize {
    store.partition(index).map_or(0, Partition::len)
}

fn fill_in_partition(store: &PartitionStore, seed: Slot, room_size: usize, members: &mut Vec<Slot>) {
    let len = partition_len(store, seed.partition);
    let wrapped = (seed.position + 1..len).chain(0..seed.position);
    for position in wrapped {
        if members.len() >= room_size {
            return;
        }
        let slot = Slot::new(seed.partition, position);
        if store.is_unassigned(slot) {
            members.push(slot);
        }
    }
}

fn carry_over(store: &PartitionStore, seed_partition: usize, room_size: usize, members: &mut Vec<Slot>) {
    for partition in seed_partition + 1..store.len() {
        for position in 0..partition_len(store, partition) {
            if members.len() >= room_size {
                return;
            }
            let slot = Slot::new(partition, position);
            if store.is_unassigned(slot) {
                members.push(slot);
            }
        }
    }
}
