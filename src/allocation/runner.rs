//! Room allocation engine.
//!
//! # Algorithm
//!
//! 1. Priority phase: for every distinct rank, ascending, scan partitions
//!    in their fixed order and positions left to right. Each unassigned
//!    record with that rank seeds a room, which is filled by
//!    [`gather_room`](super::fill::gather_room) and given the next id.
//! 2. Cleanup phase: scan again ignoring ranks; every record still
//!    unassigned seeds a room filled the same way.
//!
//! Both phases share one [`RoomIdGenerator`], so priority rooms always
//! carry lower ids than cleanup rooms, and rooms seeded by a higher
//! priority carry lower ids than those seeded by a lower one.

use std::num::NonZeroU32;

use serde::Serialize;

use super::config::AllocationConfig;
use super::counter::RoomIdGenerator;
use super::fill::gather_room;
use super::store::{Partition, PartitionStore};
use super::types::{Rank, RoomId, Slot};
use crate::error::Result;

/// Which pass of the engine created a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Seeded by a record of this rank during the priority phase.
    Priority(NonZeroU32),
    /// Seeded by a leftover record during cleanup.
    Cleanup,
}

/// One room formed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomGroup {
    pub id: RoomId,
    pub phase: Phase,
    /// The record that triggered the room.
    pub seed: Slot,
    /// All members, seed first, in the order they were collected.
    pub members: Vec<Slot>,
}

/// Outcome of an allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationReport {
    /// Rooms in creation order (and therefore id order).
    pub rooms: Vec<RoomGroup>,

    /// Capacity used for the run.
    pub room_size: usize,

    /// Id the generator would hand out next.
    pub next_room_id: RoomId,
}

impl AllocationReport {
    pub fn rooms_created(&self) -> usize {
        self.rooms.len()
    }

    /// Records newly placed by this run.
    pub fn records_assigned(&self) -> usize {
        self.rooms.iter().map(|r| r.members.len()).sum()
    }

    /// Rooms holding fewer than `room_size` records.
    pub fn under_filled(&self) -> impl Iterator<Item = &RoomGroup> {
        self.rooms
            .iter()
            .filter(move |r| r.members.len() < self.room_size)
    }

    /// Number of rooms created by `phase`.
    pub fn rooms_in_phase(&self, phase: Phase) -> usize {
        self.rooms.iter().filter(|r| r.phase == phase).count()
    }

    pub fn room(&self, id: RoomId) -> Option<&RoomGroup> {
        self.rooms.iter().find(|r| r.id == id)
    }
}

/// Executes room allocation over a [`PartitionStore`].
///
/// # Examples
///
/// ```
/// use u_roomalloc::allocation::{
///     AllocationConfig, AllocationRunner, Partition, PartitionStore, Rank, Record,
/// };
///
/// let mut store = PartitionStore::new(vec![Partition::new(
///     "a",
///     vec![
///         Record::new(Rank::Unranked),
///         Record::new(Rank::priority(1).unwrap()),
///     ],
/// )])
/// .unwrap();
///
/// let runner = AllocationRunner::new(AllocationConfig::default().with_room_size(2)).unwrap();
/// let report = runner.allocate(&mut store);
/// assert_eq!(report.rooms_created(), 1);
/// assert_eq!(store.unassigned_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct AllocationRunner {
    config: AllocationConfig,
}

impl AllocationRunner {
    /// Creates a runner, rejecting invalid configuration up front.
    pub fn new(config: AllocationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Allocates every unassigned record, numbering rooms from
    /// `first_room_id`.
    pub fn allocate(&self, store: &mut PartitionStore) -> AllocationReport {
        let mut ids = RoomIdGenerator::starting_at(self.config.first_room_id);
        self.allocate_with(store, &mut ids)
    }

    /// Allocates every unassigned record using a caller-owned generator.
    pub fn allocate_with(
        &self,
        store: &mut PartitionStore,
        ids: &mut RoomIdGenerator,
    ) -> AllocationReport {
        let room_size = self.config.room_size;
        let mut rooms = Vec::new();

        let ranks = store.distinct_ranks();
        for &rank in &ranks {
            let target = Rank::Priority(rank);
            for_each_position(store, |store, slot| {
                let is_seed = store
                    .get(slot)
                    .is_some_and(|r| !r.is_assigned() && r.rank() == target);
                if is_seed {
                    rooms.push(form_room(store, ids, slot, room_size, Phase::Priority(rank)));
                }
            });
        }
        let priority_rooms = rooms.len();
        log::info!(
            "priority phase: {} rooms over {} rank values",
            priority_rooms,
            ranks.len()
        );

        for_each_position(store, |store, slot| {
            if store.is_unassigned(slot) {
                rooms.push(form_room(store, ids, slot, room_size, Phase::Cleanup));
            }
        });
        log::info!("cleanup phase: {} rooms", rooms.len() - priority_rooms);

        let report = AllocationReport {
            rooms,
            room_size,
            next_room_id: ids.peek(),
        };
        let short = report.under_filled().count();
        if short > 0 {
            log::warn!("{short} of {} rooms are under-filled", report.rooms_created());
        }
        report
    }
}

/// Visits every slot in fixed order. Partition lengths never change
/// during a run, so the bounds are read up front.
fn for_each_position<F>(store: &mut PartitionStore, mut visit: F)
where
    F: FnMut(&mut PartitionStore, Slot),
{
    let lens: Vec<usize> = store.partitions().iter().map(Partition::len).collect();
    for (partition, len) in lens.into_iter().enumerate() {
        for position in 0..len {
            visit(store, Slot::new(partition, position));
        }
    }
}

fn form_room(
    store: &mut PartitionStore,
    ids: &mut RoomIdGenerator,
    seed: Slot,
    room_size: usize,
    phase: Phase,
) -> RoomGroup {
    let members = gather_room(store, seed, room_size);
    let id = ids.next_id();
    for &slot in &members {
        store.assign(slot, id);
    }
    log::debug!(
        "room {id} ({phase:?}) seeded at {seed} with {} members",
        members.len()
    );
    RoomGroup {
        id,
        phase,
        seed,
        members,
    }
}
