//! End-to-end allocation: cluster, rank, allocate, persist.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationConfig, AllocationReport, AllocationRunner, PartitionStore, Record};
use crate::clustering::{partition_by_cluster, ClusterAssigner, ClusterConfig};
use crate::error::{Error, Result};
use crate::persist::{write_combined, write_partitions};
use crate::ranking::{assign_ranks, RankAssigner};

/// Attribute holding the reported health condition in the survey data.
pub const HEALTH_CONDITION_ATTRIBUTE: &str =
    "Do you have any health conditions or allergies your roommate should know?  (If no enter 'Nil')";

/// Configuration for a full pipeline run.
///
/// # Examples
///
/// ```
/// use u_roomalloc::pipeline::PipelineConfig;
///
/// let config = PipelineConfig::from_json_str(
///     r#"{ "allocation": { "room_size": 3 }, "output_dir": "clusters" }"#,
/// )
/// .unwrap();
/// assert_eq!(config.allocation.room_size, 3);
/// assert_eq!(config.clustering.k, 20);
/// assert!(config.combined_path.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub allocation: AllocationConfig,

    /// Settings for building a [`KMeansClusterer`](crate::clustering::KMeansClusterer).
    pub clustering: ClusterConfig,

    /// Attribute ranked by the condition ranker.
    pub condition_attribute: String,

    /// Directory receiving one file per partition.
    pub output_dir: Option<PathBuf>,

    /// File receiving the concatenated view.
    pub combined_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allocation: AllocationConfig::default(),
            clustering: ClusterConfig::default(),
            condition_attribute: HEALTH_CONDITION_ATTRIBUTE.into(),
            output_dir: None,
            combined_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_clustering(mut self, clustering: ClusterConfig) -> Self {
        self.clustering = clustering;
        self
    }

    pub fn with_condition_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.condition_attribute = attribute.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_combined_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.combined_path = Some(path.into());
        self
    }

    /// Parses a JSON configuration; absent fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::InvalidConfig(format!("pipeline config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.allocation.validate()?;
        self.clustering.validate()?;
        if self.condition_attribute.is_empty() {
            return Err(Error::InvalidConfig(
                "condition_attribute must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Final state of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub store: PartitionStore,
    pub report: AllocationReport,
}

/// Runs clustering, ranking and allocation in sequence.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    runner: AllocationRunner,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let runner = AllocationRunner::new(config.allocation.clone())?;
        Ok(Self { config, runner })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Partitions `records` with `clusterer`, ranks them with `ranker`,
    /// allocates rooms, and writes the configured outputs.
    pub fn run<C, R>(&self, records: Vec<Record>, clusterer: &C, ranker: &R) -> Result<PipelineOutcome>
    where
        C: ClusterAssigner + ?Sized,
        R: RankAssigner + ?Sized,
    {
        let total = records.len();
        let labels = clusterer.assign(&records)?;
        let mut store = partition_by_cluster(records, &labels)?;
        log::info!("{} records split into {} partitions", total, store.len());

        assign_ranks(&mut store, ranker);
        let report = self.runner.allocate(&mut store);

        if let Some(dir) = &self.config.output_dir {
            write_partitions(dir, &store)?;
        }
        if let Some(path) = &self.config.combined_path {
            write_combined(path, &store)?;
        }
        Ok(PipelineOutcome { store, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::Rank;
    use crate::persist::read_partitions;
    use crate::ranking::{ConditionRanker, RankingTable};
    use std::num::NonZeroU32;

    const NAME: &str = "name";

    /// Clusters by a fixed attribute value: "x" → 0, anything else → 1.
    struct ByGroup;

    impl ClusterAssigner for ByGroup {
        fn assign(&self, records: &[Record]) -> Result<Vec<usize>> {
            Ok(records
                .iter()
                .map(|r| usize::from(r.attribute("group") != Some("x")))
                .collect())
        }
    }

    struct Failing;

    impl ClusterAssigner for Failing {
        fn assign(&self, _records: &[Record]) -> Result<Vec<usize>> {
            Err(Error::Clustering("model unavailable".into()))
        }
    }

    fn student(name: &str, group: &str, condition: &str) -> Record {
        Record::new(Rank::Unranked)
            .with_attribute(NAME, name)
            .with_attribute("group", group)
            .with_attribute(HEALTH_CONDITION_ATTRIBUTE, condition)
    }

    fn ranker() -> ConditionRanker {
        let table = RankingTable::new().with_rank("Asthma", NonZeroU32::new(1).unwrap());
        ConditionRanker::new(HEALTH_CONDITION_ATTRIBUTE, table)
    }

    fn room_of(store: &PartitionStore, name: &str) -> u64 {
        store
            .records()
            .find(|(_, r)| r.attribute(NAME) == Some(name))
            .and_then(|(_, r)| r.room())
            .map_or(0, |id| id.get())
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default()
            .with_allocation(AllocationConfig::default().with_room_size(2))
            .with_output_dir(dir.path().join("clusters"))
            .with_combined_path(dir.path().join("combined.json"));
        let pipeline = Pipeline::new(config).unwrap();

        let records = vec![
            student("ana", "x", "Nil"),
            student("ben", "y", "asthma"),
            student("cai", "x", "None"),
            student("dev", "y", "Nil"),
            student("eli", "x", "Asthma"),
        ];
        let outcome = pipeline.run(records, &ByGroup, &ranker()).unwrap();

        // Cluster_000_3_students = [ana, cai, eli], Cluster_001_2_students = [ben, dev]
        // rank 1: eli seeds (wraps to ana) → 1; ben seeds with dev → 2; cleanup: cai → 3
        let store = &outcome.store;
        assert_eq!(room_of(store, "eli"), 1);
        assert_eq!(room_of(store, "ana"), 1);
        assert_eq!(room_of(store, "ben"), 2);
        assert_eq!(room_of(store, "dev"), 2);
        assert_eq!(room_of(store, "cai"), 3);
        assert_eq!(outcome.report.rooms_created(), 3);

        let reloaded = read_partitions(&dir.path().join("clusters")).unwrap();
        assert_eq!(&reloaded, store);
        assert!(dir.path().join("combined.json").is_file());
    }

    #[test]
    fn test_pipeline_without_outputs() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let outcome = pipeline
            .run(vec![student("ana", "x", "Nil")], &ByGroup, &ranker())
            .unwrap();
        assert_eq!(outcome.store.unassigned_count(), 0);
    }

    #[test]
    fn test_pipeline_propagates_cluster_failure() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let err = pipeline
            .run(vec![student("ana", "x", "Nil")], &Failing, &ranker())
            .unwrap_err();
        assert!(matches!(err, Error::Clustering(_)));
    }

    #[test]
    fn test_pipeline_rejects_bad_config() {
        let config = PipelineConfig::default()
            .with_allocation(AllocationConfig::default().with_room_size(0));
        assert!(Pipeline::new(config).is_err());
        assert!(PipelineConfig::from_json_str(r#"{"allocation": {"room_size": 0}}"#).is_err());
        assert!(PipelineConfig::from_json_str("not json").is_err());
    }
}
