//! Reading and writing partition files.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::rows::{CombinedRow, RecordRow};
use crate::allocation::{Partition, PartitionStore};
use crate::error::{Error, Result};

const EXTENSION: &str = "json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| Error::json(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))
}

/// Loads one partition file. The partition is named after the file stem.
pub fn read_partition(path: &Path) -> Result<Partition> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rows: Vec<RecordRow> = read_json(path)?;
    Partition::from_raw(name, rows.into_iter().map(RecordRow::into_parts))
}

/// Loads every `*.json` file in `dir` into a store.
pub fn read_partitions(dir: &Path) -> Result<PartitionStore> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    let partitions = files
        .iter()
        .map(|p| read_partition(p))
        .collect::<Result<Vec<_>>>()?;
    log::info!("loaded {} partitions from {}", partitions.len(), dir.display());
    PartitionStore::new(partitions)
}

/// Writes `partition` to `dir/<name>.json` and returns the path.
pub fn write_partition(dir: &Path, partition: &Partition) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{EXTENSION}", partition.name()));
    let rows: Vec<RecordRow> = partition.records().iter().map(RecordRow::from).collect();
    write_json(&path, &rows)?;
    Ok(path)
}

/// Writes one file per partition into `dir`, creating it if needed.
pub fn write_partitions(dir: &Path, store: &PartitionStore) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let paths = store
        .partitions()
        .iter()
        .map(|p| write_partition(dir, p))
        .collect::<Result<Vec<_>>>()?;
    log::info!("wrote {} partitions to {}", paths.len(), dir.display());
    Ok(paths)
}

/// Writes all records, in fixed partition order, as one array.
pub fn write_combined(path: &Path, store: &PartitionStore) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let rows: Vec<CombinedRow> = store
        .concatenated()
        .map(|(name, record)| CombinedRow {
            partition: name.to_string(),
            row: RecordRow::from(record),
        })
        .collect();
    write_json(path, &rows)?;
    log::info!("wrote {} combined records to {}", rows.len(), path.display());
    Ok(())
}

/// Rebuilds a store from a file produced by [`write_combined`].
pub fn read_combined(path: &Path) -> Result<PartitionStore> {
    let rows: Vec<CombinedRow> = read_json(path)?;
    let mut grouped: BTreeMap<String, Vec<RecordRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.partition).or_default().push(row.row);
    }
    let partitions = grouped
        .into_iter()
        .map(|(name, rows)| Partition::from_raw(name, rows.into_iter().map(RecordRow::into_parts)))
        .collect::<Result<Vec<_>>>()?;
    PartitionStore::new(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{AllocationConfig, AllocationRunner, Rank, Record};

    fn sample_store() -> PartitionStore {
        let rank = |r: u32| Rank::priority(r).unwrap();
        PartitionStore::new(vec![
            Partition::new(
                "Cluster_001_2_students",
                vec![
                    Record::new(rank(2)).with_attribute("id", "s3"),
                    Record::new(Rank::Unranked).with_attribute("id", "s4"),
                ],
            ),
            Partition::new(
                "Cluster_000_1_students",
                vec![Record::new(rank(1)).with_attribute("id", "s1")],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_partitions_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = sample_store();
        AllocationRunner::new(AllocationConfig::default().with_room_size(2))
            .unwrap()
            .allocate(&mut store);

        let paths = write_partitions(dir.path(), &store).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("Cluster_000_1_students.json"));

        let loaded = read_partitions(dir.path()).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_read_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_partitions(dir.path(), &sample_store()).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a partition").unwrap();
        assert_eq!(read_partitions(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_read_reports_invalid_rank() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"attributes": {}, "rank": 1}, {"attributes": {}, "rank": -3}]"#,
        )
        .unwrap();
        let err = read_partitions(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRank { ref partition, position: 1, value: -3 } if partition == "a"
        ));
    }

    #[test]
    fn test_read_reports_malformed_json_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        match read_partitions(dir.path()).unwrap_err() {
            Error::Json { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_partitions(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_combined_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("combined.json");
        let store = sample_store();
        write_combined(&path, &store).unwrap();

        let rows: Vec<CombinedRow> = read_json(&path).unwrap();
        let ids: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.row.attributes.get("id").map(String::as_str))
            .collect();
        assert_eq!(ids, vec!["s1", "s3", "s4"]);

        assert_eq!(read_combined(&path).unwrap(), store);
    }
}
