//! Room allocation engine.
//!
//! Partitions records into rooms of at most `room_size` members. Rooms are
//! seeded by the highest-priority unassigned record first, filled from the
//! seed's own partition (wrapping around), then from later partitions only,
//! and numbered by a single monotonic counter. A cleanup pass groups
//! whatever is left, ignoring rank.
//!
//! The scan order fully determines the outcome, so the engine is strictly
//! sequential.
//!
//! # Known trade-off
//!
//! Carry-over never looks at partitions before the seed's, so a room can
//! close under-filled while earlier partitions still hold unassigned
//! records.

mod config;
mod counter;
mod fill;
mod runner;
mod store;
mod types;

pub use config::AllocationConfig;
pub use counter::RoomIdGenerator;
pub use runner::{AllocationReport, AllocationRunner, Phase, RoomGroup};
pub use store::{Partition, PartitionStore};
pub use types::{Rank, Record, RoomId, Slot, UNRANKED_SENTINEL};
