//! Partitions and the ordered arena that holds them.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::num::NonZeroU32;

use super::types::{Rank, Record, RoomId, Slot};
use crate::error::{Error, Result};

/// A named, ordered shard of the record population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    name: String,
    records: Vec<Record>,
}

impl Partition {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Builds a partition from stored `(attributes, rank, room)` values,
    /// rejecting ranks and rooms that cannot be represented.
    pub fn from_raw<I>(name: impl Into<String>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (BTreeMap<String, String>, Option<i64>, Option<u64>)>,
    {
        let name = name.into();
        let mut records = Vec::new();
        for (position, (attributes, raw_rank, raw_room)) in rows.into_iter().enumerate() {
            let rank = Rank::from_raw(raw_rank).ok_or_else(|| {
                let partition = name.clone();
                let value = raw_rank.unwrap_or_default();
                if value > i64::from(u32::MAX) {
                    Error::RankOutOfRange {
                        partition,
                        position,
                        value,
                    }
                } else {
                    Error::InvalidRank {
                        partition,
                        position,
                        value,
                    }
                }
            })?;
            let mut record = Record::new(rank).with_attributes(attributes);
            if let Some(value) = raw_room {
                let room = RoomId::new(value).ok_or_else(|| Error::InvalidRoom {
                    partition: name.clone(),
                    position,
                    value,
                })?;
                record = record.with_room(room);
            }
            records.push(record);
        }
        Ok(Self { name, records })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access for rank assignment. Rooms stay engine-owned.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ordered collection of partitions, addressable by [`Slot`].
///
/// Partitions are sorted by name once at construction; that order is fixed
/// for the lifetime of the store and governs every scan of the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStore {
    partitions: Vec<Partition>,
}

impl PartitionStore {
    /// Creates a store, ordering partitions lexicographically by name.
    ///
    /// Fails on empty or duplicate names.
    pub fn new(mut partitions: Vec<Partition>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(partitions.len());
        for p in &partitions {
            if p.name.is_empty() {
                return Err(Error::EmptyPartitionName);
            }
            if !seen.insert(p.name.as_str()) {
                return Err(Error::DuplicatePartition(p.name.clone()));
            }
        }
        partitions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { partitions })
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Mutable access to partitions without allowing reordering.
    pub fn partitions_mut(&mut self) -> impl Iterator<Item = &mut Partition> {
        self.partitions.iter_mut()
    }

    pub fn partition(&self, index: usize) -> Option<&Partition> {
        self.partitions.get(index)
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn get(&self, slot: Slot) -> Option<&Record> {
        self.partitions
            .get(slot.partition)
            .and_then(|p| p.records.get(slot.position))
    }

    /// Total number of records across all partitions.
    pub fn record_count(&self) -> usize {
        self.partitions.iter().map(Partition::len).sum()
    }

    pub fn unassigned_count(&self) -> usize {
        self.records().filter(|(_, r)| !r.is_assigned()).count()
    }

    /// Every record with its slot, in fixed partition order.
    pub fn records(&self) -> impl Iterator<Item = (Slot, &Record)> {
        self.partitions.iter().enumerate().flat_map(|(pi, p)| {
            p.records
                .iter()
                .enumerate()
                .map(move |(ri, r)| (Slot::new(pi, ri), r))
        })
    }

    /// The concatenated view: every record tagged with its partition name.
    pub fn concatenated(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.partitions
            .iter()
            .flat_map(|p| p.records.iter().map(move |r| (p.name.as_str(), r)))
    }

    /// Distinct priority values present, ascending. Unranked is excluded.
    pub fn distinct_ranks(&self) -> Vec<NonZeroU32> {
        let ranks: BTreeSet<NonZeroU32> = self
            .records()
            .filter_map(|(_, r)| match r.rank() {
                Rank::Priority(p) => Some(p),
                Rank::Unranked => None,
            })
            .collect();
        ranks.into_iter().collect()
    }

    pub(crate) fn is_unassigned(&self, slot: Slot) -> bool {
        self.get(slot).is_some_and(|r| !r.is_assigned())
    }

    pub(crate) fn assign(&mut self, slot: Slot, room: RoomId) {
        if let Some(record) = self
            .partitions
            .get_mut(slot.partition)
            .and_then(|p| p.records.get_mut(slot.position))
        {
            record.set_room(room);
        }
    }

    pub fn into_partitions(self) -> Vec<Partition> {
        self.partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(r: u32) -> Record {
        Record::new(Rank::priority(r).unwrap())
    }

    #[test]
    fn test_store_sorts_by_name() {
        let store = PartitionStore::new(vec![
            Partition::new("b", vec![ranked(1)]),
            Partition::new("a", vec![ranked(2)]),
            Partition::new("Cluster_010", vec![]),
        ])
        .unwrap();
        let names: Vec<&str> = store.partitions().iter().map(Partition::name).collect();
        assert_eq!(names, vec!["Cluster_010", "a", "b"]);
    }

    #[test]
    fn test_store_rejects_duplicates() {
        let err = PartitionStore::new(vec![
            Partition::new("a", vec![]),
            Partition::new("a", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::DuplicatePartition(name) if name == "a"));
    }

    #[test]
    fn test_store_rejects_empty_name() {
        let err = PartitionStore::new(vec![Partition::new("", vec![])]).unwrap_err();
        assert!(matches!(err, Error::EmptyPartitionName));
    }

    #[test]
    fn test_distinct_ranks_ascending_without_sentinel() {
        let store = PartitionStore::new(vec![
            Partition::new("a", vec![ranked(3), Record::new(Rank::Unranked), ranked(1)]),
            Partition::new("b", vec![ranked(3), ranked(2)]),
        ])
        .unwrap();
        let ranks: Vec<u32> = store.distinct_ranks().iter().map(|r| r.get()).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_raw_rejects_bad_rank_with_position() {
        let rows = vec![
            (BTreeMap::new(), Some(1), None),
            (BTreeMap::new(), Some(-1), None),
            (BTreeMap::new(), Some(0), None),
        ];
        let err = Partition::from_raw("c", rows).unwrap_err();
        match err {
            Error::InvalidRank {
                partition,
                position,
                value,
            } => {
                assert_eq!(partition, "c");
                assert_eq!(position, 2);
                assert_eq!(value, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_raw_reports_rank_out_of_range() {
        let rows = vec![(BTreeMap::new(), Some(2), None), (BTreeMap::new(), Some(1 << 32), None)];
        let err = Partition::from_raw("c", rows).unwrap_err();
        assert!(matches!(
            err,
            Error::RankOutOfRange { ref partition, position: 1, value } if partition == "c" && value == 1 << 32
        ));
    }

    #[test]
    fn test_from_raw_keeps_preassigned_rooms() {
        let rows = vec![(BTreeMap::new(), None, Some(12)), (BTreeMap::new(), Some(2), None)];
        let p = Partition::from_raw("c", rows).unwrap();
        assert_eq!(p.records()[0].room().map(RoomId::get), Some(12));
        assert_eq!(p.records()[0].rank(), Rank::Unranked);
        assert!(!p.records()[1].is_assigned());
    }

    #[test]
    fn test_from_raw_rejects_room_zero() {
        let rows = vec![(BTreeMap::new(), None, Some(0))];
        assert!(matches!(
            Partition::from_raw("c", rows),
            Err(Error::InvalidRoom { position: 0, .. })
        ));
    }

    #[test]
    fn test_concatenated_follows_fixed_order() {
        let store = PartitionStore::new(vec![
            Partition::new("z", vec![ranked(1)]),
            Partition::new("m", vec![ranked(2), ranked(3)]),
        ])
        .unwrap();
        let view: Vec<(&str, Rank)> = store.concatenated().map(|(n, r)| (n, r.rank())).collect();
        assert_eq!(
            view,
            vec![
                ("m", Rank::priority(2).unwrap()),
                ("m", Rank::priority(3).unwrap()),
                ("z", Rank::priority(1).unwrap()),
            ]
        );
        assert_eq!(store.record_count(), 3);
        assert_eq!(store.unassigned_count(), 3);
    }
}
