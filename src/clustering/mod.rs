//! Partition production by clustering.
//!
//! Splits the record population into partitions of similar records before
//! allocation. Any labelling can be plugged in through
//! [`ClusterAssigner`]; [`KMeansClusterer`] is the bundled implementation
//! over weighted, label-encoded survey answers.
//!
//! # References
//!
//! - Lloyd (1982), "Least squares quantization in PCM"
//! - Arthur & Vassilvitskii (2007), "k-means++: The Advantages of Careful Seeding"

mod config;
mod encode;
mod kmeans;
mod partition;
mod types;

pub use config::{ClusterConfig, FeatureWeight};
pub use kmeans::KMeansClusterer;
pub use partition::{cluster_name, partition_by_cluster};
pub use types::ClusterAssigner;
