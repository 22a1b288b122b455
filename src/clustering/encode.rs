//! Weighted label encoding of categorical attributes.

use std::collections::BTreeSet;

use super::config::FeatureWeight;
use crate::allocation::Record;

/// Encodes records as points: one dimension per feature that appears on
/// at least one record. A value maps to its index among the sorted
/// distinct values of that feature, times the feature weight.
pub(crate) fn encode(records: &[Record], features: &[FeatureWeight], missing: &str) -> Vec<Vec<f64>> {
    let present: Vec<&FeatureWeight> = features
        .iter()
        .filter(|f| records.iter().any(|r| r.attribute(&f.attribute).is_some()))
        .collect();
    if present.len() < features.len() {
        log::debug!(
            "{} of {} clustering features absent from input",
            features.len() - present.len(),
            features.len()
        );
    }

    let mut points = vec![Vec::with_capacity(present.len()); records.len()];
    for feature in present {
        let value_of = |r: &Record| r.attribute(&feature.attribute).unwrap_or(missing).to_string();
        let labels: Vec<String> = records
            .iter()
            .map(value_of)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        for (point, record) in points.iter_mut().zip(records) {
            let value = value_of(record);
            let code = labels.binary_search(&value).unwrap_or_default();
            point.push(code as f64 * feature.weight);
        }
    }
    points
}
