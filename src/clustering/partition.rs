//! Turning cluster labels into named partitions.

use std::collections::BTreeMap;

use crate::allocation::{Partition, PartitionStore, Record};
use crate::error::{Error, Result};

/// Name of the partition holding cluster `id` with `count` members.
///
/// Zero-padding keeps lexicographic order equal to numeric order for up to
/// a thousand clusters.
pub fn cluster_name(id: usize, count: usize) -> String {
    format!("Cluster_{id:03}_{count}_students")
}

/// Groups `records` by `labels` into one partition per non-empty cluster,
/// preserving input order inside each partition.
pub fn partition_by_cluster(records: Vec<Record>, labels: &[usize]) -> Result<PartitionStore> {
    if records.len() != labels.len() {
        return Err(Error::LabelCount {
            expected: records.len(),
            actual: labels.len(),
        });
    }

    let mut clusters: BTreeMap<usize, Vec<Record>> = BTreeMap::new();
    for (record, &label) in records.into_iter().zip(labels) {
        clusters.entry(label).or_default().push(record);
    }
    let partitions = clusters
        .into_iter()
        .map(|(id, members)| Partition::new(cluster_name(id, members.len()), members))
        .collect();
    PartitionStore::new(partitions)
}
