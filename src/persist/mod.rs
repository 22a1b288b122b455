//! JSON persistence of partitions.
//!
//! Each partition is one file, `<name>.json`, holding an array of
//! `{ "attributes": {..}, "rank": -1 | n, "room": null | id }` rows. The
//! combined output is a single array of the same rows, each with an added
//! `"partition"` field, in the store's fixed order.

mod files;
mod rows;

pub use files::{
    read_combined, read_partition, read_partitions, write_combined, write_partition,
    write_partitions,
};
pub use rows::{CombinedRow, RecordRow};
