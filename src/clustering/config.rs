//! Clustering configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A categorical attribute used as a clustering dimension, scaled by
/// `weight` after label encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub attribute: String,
    pub weight: f64,
}

impl FeatureWeight {
    pub fn new(attribute: impl Into<String>, weight: f64) -> Self {
        Self {
            attribute: attribute.into(),
            weight,
        }
    }
}

/// Configuration for weighted k-means partitioning.
///
/// The default feature set is the hostel roommate survey: flexibility and
/// food habits dominate, sleep and study patterns follow, temperament
/// counts least.
///
/// # Examples
///
/// ```
/// use u_roomalloc::clustering::ClusterConfig;
///
/// let config = ClusterConfig::default()
///     .with_k(8)
///     .with_n_init(4)
///     .with_seed(7);
/// assert_eq!(config.k, 8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters.
    pub k: usize,

    /// Independent restarts; the lowest-inertia run wins.
    pub n_init: usize,

    /// Lloyd iterations per restart.
    pub max_iterations: usize,

    /// Random seed for reproducibility. `None` draws one per call.
    pub seed: Option<u64>,

    /// Run restarts on the rayon pool.
    pub parallel: bool,

    /// Replacement for a missing attribute before encoding.
    pub missing_value: String,

    /// Clustering dimensions.
    pub features: Vec<FeatureWeight>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: 20,
            n_init: 10,
            max_iterations: 300,
            seed: Some(42),
            parallel: true,
            missing_value: "Unknown".into(),
            features: survey_features(),
        }
    }
}

fn survey_features() -> Vec<FeatureWeight> {
    vec![
        FeatureWeight::new(
            "How open are you to adjusting if you don’t get roommate of similar choice?",
            15.0,
        ),
        FeatureWeight::new(
            "Are you comfortable sharing a room with someone with a different food habit?",
            12.0,
        ),
        FeatureWeight::new("What is your food preference?", 11.0),
        FeatureWeight::new("What is your sleeping pattern?", 10.0),
        FeatureWeight::new("What is your study habit preference?", 10.0),
        FeatureWeight::new("What kind of sleeping environment do you prefer?", 10.0),
        FeatureWeight::new("Do you consider yourself more of an:", 4.0),
    ]
}

impl ClusterConfig {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_n_init(mut self, n: usize) -> Self {
        self.n_init = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_missing_value(mut self, value: impl Into<String>) -> Self {
        self.missing_value = value.into();
        self
    }

    /// Replaces the feature set.
    pub fn with_features(mut self, features: Vec<FeatureWeight>) -> Self {
        self.features = features;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidConfig("k must be at least 1".into()));
        }
        if self.n_init == 0 {
            return Err(Error::InvalidConfig("n_init must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.features.is_empty() {
            return Err(Error::InvalidConfig("at least one feature is required".into()));
        }
        for f in &self.features {
            if !(f.weight.is_finite() && f.weight > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "weight for {:?} must be positive and finite, got {}",
                    f.attribute, f.weight
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClusterConfig::default();
        assert_eq!(config.k, 20);
        assert_eq!(config.n_init, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.features.len(), 7);
        assert!((config.features[0].weight - 15.0).abs() < 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_k() {
        assert!(ClusterConfig::default().with_k(0).validate().is_err());
    }

    #[test]
    fn test_validate_zero_restarts() {
        assert!(ClusterConfig::default().with_n_init(0).validate().is_err());
    }

    #[test]
    fn test_validate_bad_weight() {
        let config = ClusterConfig::default().with_features(vec![FeatureWeight::new("a", -1.0)]);
        assert!(config.validate().is_err());
        let config = ClusterConfig::default().with_features(vec![FeatureWeight::new("a", f64::NAN)]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_no_features() {
        assert!(ClusterConfig::default().with_features(vec![]).validate().is_err());
    }
}
