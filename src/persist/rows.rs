//! On-disk row shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::allocation::{Record, RoomId};

/// One record as stored in a partition file.
///
/// Ranks are stored raw (`-1` for unranked) and validated when the
/// partition is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub room: Option<u64>,
}

impl RecordRow {
    pub(crate) fn into_parts(self) -> (BTreeMap<String, String>, Option<i64>, Option<u64>) {
        (self.attributes, self.rank, self.room)
    }
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            attributes: record.attributes().clone(),
            rank: Some(record.rank().to_raw()),
            room: record.room().map(RoomId::get),
        }
    }
}

/// A row of the concatenated output, tagged with its partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub partition: String,
    #[serde(flatten)]
    pub row: RecordRow,
}
