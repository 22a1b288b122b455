//! Crate-wide error type.

use std::path::PathBuf;

/// Errors surfaced by configuration, loading, ranking, clustering and
/// allocation.
///
/// Every error is raised before the allocation engine mutates any record,
/// so a failed run leaves the partition set untouched.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A raw rank is neither the unranked sentinel nor a positive integer.
    #[error("invalid rank {value} in partition '{partition}' at position {position}")]
    InvalidRank {
        partition: String,
        position: usize,
        value: i64,
    },

    /// A raw rank is a positive integer above the largest priority,
    /// `u32::MAX`.
    #[error("rank {value} out of range in partition '{partition}' at position {position}")]
    RankOutOfRange {
        partition: String,
        position: usize,
        value: i64,
    },

    /// A pre-populated room id is not positive.
    #[error("invalid room id {value} in partition '{partition}' at position {position}")]
    InvalidRoom {
        partition: String,
        position: usize,
        value: u64,
    },

    /// Two partitions share a name.
    #[error("duplicate partition name '{0}'")]
    DuplicatePartition(String),

    /// A partition has an empty name.
    #[error("partition name must not be empty")]
    EmptyPartitionName,

    /// A cluster assigner returned one label per record, but not for
    /// every record.
    #[error("expected {expected} cluster labels, got {actual}")]
    LabelCount { expected: usize, actual: usize },

    /// Clustering could not be performed on the given records.
    #[error("clustering failed: {0}")]
    Clustering(String),

    /// The external ranking service returned an unusable response.
    #[error("malformed ranking response: {0}")]
    RankingResponse(String),

    /// Filesystem failure while reading or writing partitions.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A partition file could not be encoded or decoded.
    #[error("json error on {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rank_message_names_location() {
        let err = Error::InvalidRank {
            partition: "Cluster_003_12_students".into(),
            position: 7,
            value: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("Cluster_003_12_students"));
        assert!(msg.contains("position 7"));
        assert!(msg.contains("rank 0"));
    }

    #[test]
    fn test_rank_out_of_range_message() {
        let err = Error::RankOutOfRange {
            partition: "a".into(),
            position: 0,
            value: 1 << 32,
        };
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = Error::io(
            "clusters/a.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("clusters/a.json"));
    }
}
