//! Condition-based rank assignment.

use std::collections::HashSet;

use super::table::{normalize_condition, RankingTable};
use super::types::{RankAssigner, RankingSource};
use crate::allocation::{PartitionStore, Rank, Record};
use crate::error::Result;

/// Ranks records by looking up one free-text attribute in a
/// [`RankingTable`].
///
/// A missing attribute, a negated answer, or a condition the table does
/// not know all yield [`Rank::Unranked`].
#[derive(Debug, Clone)]
pub struct ConditionRanker {
    attribute: String,
    table: RankingTable,
}

impl ConditionRanker {
    pub fn new(attribute: impl Into<String>, table: RankingTable) -> Self {
        Self {
            attribute: attribute.into(),
            table,
        }
    }

    /// Asks `source` to rank every distinct condition found in `records`.
    pub fn from_source<'a, S, I>(attribute: impl Into<String>, source: &S, records: I) -> Result<Self>
    where
        S: RankingSource + ?Sized,
        I: IntoIterator<Item = &'a Record>,
    {
        let attribute = attribute.into();
        let conditions = distinct_conditions(records, &attribute);
        log::info!(
            "requesting ranks for {} distinct values of {attribute:?}",
            conditions.len()
        );
        let table = source.rank_conditions(&conditions)?;

        let seen: HashSet<String> = conditions
            .iter()
            .filter_map(|c| normalize_condition(c))
            .collect();
        for (condition, _) in table.iter() {
            if !seen.contains(condition) {
                log::warn!("ranking source returned unknown condition {condition:?}");
            }
        }
        Ok(Self::new(attribute, table))
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn table(&self) -> &RankingTable {
        &self.table
    }
}

impl RankAssigner for ConditionRanker {
    fn rank(&self, record: &Record) -> Rank {
        record
            .attribute(&self.attribute)
            .and_then(|value| self.table.lookup(value))
            .map_or(Rank::Unranked, Rank::Priority)
    }
}

/// Raw, non-empty values of `attribute`, deduplicated in first-seen order.
pub fn distinct_conditions<'a, I>(records: I, attribute: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter_map(|r| r.attribute(attribute))
        .filter(|v| !v.trim().is_empty())
        .filter(|v| seen.insert(v.to_string()))
        .map(str::to_string)
        .collect()
}

/// Writes `assigner`'s rank onto every record of the store.
///
/// Returns the number of records that received a priority.
pub fn assign_ranks<A>(store: &mut PartitionStore, assigner: &A) -> usize
where
    A: RankAssigner + ?Sized,
{
    let mut ranked = 0;
    for partition in store.partitions_mut() {
        for record in partition.records_mut() {
            let rank = assigner.rank(record);
            if rank.is_ranked() {
                ranked += 1;
            }
            record.set_rank(rank);
        }
    }
    log::info!("assigned priority ranks to {ranked} records");
    ranked
}
