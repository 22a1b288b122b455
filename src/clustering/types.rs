//! Partition producer seam.

use crate::allocation::Record;
use crate::error::Result;

/// Assigns every record a cluster label.
///
/// Returns exactly one label per input record, in input order. Labels do
/// not need to be dense; each distinct label becomes one partition.
pub trait ClusterAssigner: Send + Sync {
    fn assign(&self, records: &[Record]) -> Result<Vec<usize>>;
}
