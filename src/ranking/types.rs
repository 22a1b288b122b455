//! Ranking seams.

use super::table::RankingTable;
use crate::allocation::{Rank, Record};
use crate::error::Result;

/// Maps a record to its allocation priority.
///
/// Ranks must be fully materialized before the allocation engine runs; the
/// engine never calls back into an assigner.
///
/// # Examples
///
/// ```
/// use u_roomalloc::allocation::{Rank, Record};
/// use u_roomalloc::ranking::RankAssigner;
///
/// // Everyone with a ground-floor request goes first.
/// struct GroundFloor;
///
/// impl RankAssigner for GroundFloor {
///     fn rank(&self, record: &Record) -> Rank {
///         match record.attribute("floor") {
///             Some("ground") => Rank::priority(1).unwrap(),
///             _ => Rank::Unranked,
///         }
///     }
/// }
///
/// let r = Record::new(Rank::Unranked).with_attribute("floor", "ground");
/// assert!(GroundFloor.rank(&r).is_ranked());
/// ```
pub trait RankAssigner: Send + Sync {
    /// Rank for `record`. `Rank::Unranked` excludes it from the priority
    /// phase.
    fn rank(&self, record: &Record) -> Rank;
}

/// External classifier that ranks free-text conditions.
///
/// Implementations typically call a remote model; tests substitute a fixed
/// table. The returned table is keyed by normalized condition.
pub trait RankingSource {
    fn rank_conditions(&self, conditions: &[String]) -> Result<RankingTable>;
}
