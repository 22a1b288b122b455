//! Rank assignment.
//!
//! Turns a free-text attribute (e.g. a reported health condition) into an
//! allocation priority before the engine runs. Classification of distinct
//! conditions is delegated to an external [`RankingSource`]; this module
//! handles normalization, parsing of the classifier's answer, and writing
//! ranks onto records.

mod ranker;
mod table;
mod types;

pub use ranker::{assign_ranks, distinct_conditions, ConditionRanker};
pub use table::{normalize_condition, title_case, RankingTable};
pub use types::{RankAssigner, RankingSource};
