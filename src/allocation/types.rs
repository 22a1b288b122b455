//! Record-level types: ranks, room ids and slots.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Raw value that stands for "no rank" in stored partitions.
pub const UNRANKED_SENTINEL: i64 = -1;

/// Priority of a record. Lower values are higher priority, and
/// priorities run from 1 to `u32::MAX`.
///
/// `Unranked` records never seed a room during the priority phase; they
/// are still collected as fill and seed rooms during cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Rank {
    #[default]
    Unranked,
    Priority(NonZeroU32),
}

impl Rank {
    /// Builds a priority rank, or `None` for zero.
    pub fn priority(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Rank::Priority)
    }

    /// Decodes a stored rank. A missing value and the sentinel both mean
    /// unranked. Any other non-positive value, or one above `u32::MAX`,
    /// is rejected with `None`.
    pub fn from_raw(raw: Option<i64>) -> Option<Self> {
        match raw {
            None | Some(UNRANKED_SENTINEL) => Some(Rank::Unranked),
            Some(v) if v >= 1 => u32::try_from(v).ok().and_then(Rank::priority),
            Some(_) => None,
        }
    }

    /// Encodes the rank for storage, using the sentinel for unranked.
    pub fn to_raw(self) -> i64 {
        match self {
            Rank::Unranked => UNRANKED_SENTINEL,
            Rank::Priority(p) => i64::from(p.get()),
        }
    }

    pub fn is_ranked(self) -> bool {
        matches!(self, Rank::Priority(_))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Unranked => f.write_str("unranked"),
            Rank::Priority(p) => write!(f, "{p}"),
        }
    }
}

/// Identifier shared by every record placed in the same room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(u64);

impl RoomId {
    /// Largest id a generator may start from. Everything above it is
    /// headroom for one id per record.
    pub const MAX_FIRST: RoomId = RoomId(u64::MAX / 2);

    /// Wraps a positive id; zero is not a valid room.
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(RoomId(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Never saturates for a generator started at or below `MAX_FIRST`:
    /// a run issues at most one id per record.
    pub(crate) fn successor(self) -> RoomId {
        RoomId(self.0.saturating_add(1))
    }
}

impl Default for RoomId {
    /// The first room id, 1.
    fn default() -> Self {
        RoomId(1)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a record: partition index in the store's fixed order, and
/// position inside that partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub partition: usize,
    pub position: usize,
}

impl Slot {
    pub fn new(partition: usize, position: usize) -> Self {
        Self {
            partition,
            position,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.partition, self.position)
    }
}

/// One allocatable unit, e.g. a student.
///
/// The room is written once by the allocation engine and never changed
/// afterwards; records loaded with a room already set are treated as
/// pre-allocated and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    attributes: BTreeMap<String, String>,
    rank: Rank,
    room: Option<RoomId>,
}

impl Record {
    pub fn new(rank: Rank) -> Self {
        Self {
            attributes: BTreeMap::new(),
            rank,
            room: None,
        }
    }

    /// Marks the record as already allocated to `room`.
    pub fn with_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Overwrites the rank. Used by rank assigners before allocation.
    pub fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room
    }

    pub fn is_assigned(&self) -> bool {
        self.room.is_some()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Writes the room. Callers must only do this for unassigned records.
    pub(crate) fn set_room(&mut self, room: RoomId) {
        debug_assert!(self.room.is_none(), "room already assigned");
        self.room = Some(room);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_from_raw() {
        assert_eq!(Rank::from_raw(None), Some(Rank::Unranked));
        assert_eq!(Rank::from_raw(Some(-1)), Some(Rank::Unranked));
        assert_eq!(Rank::from_raw(Some(3)), Rank::priority(3));
        assert_eq!(Rank::from_raw(Some(0)), None);
        assert_eq!(Rank::from_raw(Some(-7)), None);
        assert_eq!(Rank::from_raw(Some(i64::MAX)), None);
        assert_eq!(Rank::from_raw(Some(1 << 32)), None);
        assert_eq!(Rank::from_raw(Some(i64::from(u32::MAX))), Rank::priority(u32::MAX));
    }

    #[test]
    fn test_rank_raw_round_trip() {
        assert_eq!(Rank::Unranked.to_raw(), UNRANKED_SENTINEL);
        let r = Rank::priority(2).unwrap();
        assert_eq!(Rank::from_raw(Some(r.to_raw())), Some(r));
    }

    #[test]
    fn test_priority_ordering() {
        let one = Rank::priority(1).unwrap();
        let two = Rank::priority(2).unwrap();
        assert!(one < two);
        assert!(Rank::Unranked < one);
        assert!(!Rank::Unranked.is_ranked());
        assert!(one.is_ranked());
    }

    #[test]
    fn test_room_id_rejects_zero() {
        assert!(RoomId::new(0).is_none());
        assert_eq!(RoomId::new(5).map(RoomId::get), Some(5));
    }

    #[test]
    fn test_record_builders() {
        let room = RoomId::new(9).unwrap();
        let record = Record::new(Rank::Unranked)
            .with_attribute("name", "Asha")
            .with_room(room);
        assert_eq!(record.attribute("name"), Some("Asha"));
        assert_eq!(record.attribute("missing"), None);
        assert_eq!(record.room(), Some(room));
        assert!(record.is_assigned());
    }
}
