//! Priority-seeded room allocation over clustered populations.
//!
//! Partitions a population of records (e.g. students) into fixed-capacity
//! rooms while respecting a priority rank and a pre-computed partitioning:
//!
//! - **Allocation**: the room allocation engine. Rank-ordered seeding,
//!   in-partition wrap-around fill, forward-only carry-over into later
//!   partitions, and a cleanup pass, all numbered by one monotonic counter.
//! - **Ranking**: turns a free-text attribute into a priority through an
//!   external classifier seam.
//! - **Clustering**: produces the partitions, via weighted k-means over
//!   label-encoded survey answers or any custom assigner.
//! - **Persist**: JSON round trip of partitions and the combined view.
//! - **Pipeline**: cluster → rank → allocate → persist in one call.
//!
//! # Determinism
//!
//! Allocation is strictly sequential; scan order determines the outcome.
//! Clustering is reproducible for a fixed seed, with or without parallel
//! restarts.

pub mod allocation;
pub mod clustering;
pub mod error;
pub mod persist;
pub mod pipeline;
pub mod ranking;

pub use error::{Error, Result};
