//! Year snapshot persistence.
//!
//! The finalized accumulator map is serialized as one opaque binary blob
//! named `<year>.bin`. A rerun fully replaces the file; there is no
//! append or merge mode. The reader exists for the reporting layer and
//! for tests.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::stats::finalize::UserReport;

/// The persisted mapping: every user plus the synthetic `"all"` entry,
/// in first-encounter order.
pub type Snapshot = IndexMap<String, UserReport>;

/// Path of the snapshot for `year` inside `dir`.
pub fn snapshot_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("{year}.bin"))
}

/// Serialize the snapshot, replacing any existing file for the year.
pub fn write(dir: &Path, year: i32, snapshot: &Snapshot) -> Result<PathBuf> {
    let path = snapshot_path(dir, year);
    let file = File::create(&path)
        .with_context(|| format!("creating snapshot file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, snapshot)
        .with_context(|| format!("serializing snapshot {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flushing snapshot {}", path.display()))?;
    Ok(path)
}

/// Deserialize a snapshot written by [`write`].
pub fn read(path: &Path) -> Result<Snapshot> {
    let file = File::open(path)
        .with_context(|| format!("opening snapshot file {}", path.display()))?;
    bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("deserializing snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::accumulator::UserAcc;
    use crate::stats::finalize::finalize;

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut snapshot = Snapshot::new();
        snapshot.insert("all".to_string(), finalize(UserAcc::new()));
        snapshot.insert("alice".to_string(), finalize(UserAcc::new()));

        let path = write(dir.path(), 2023, &snapshot).expect("write");
        assert_eq!(path, dir.path().join("2023.bin"));

        let loaded = read(&path).expect("read");
        assert_eq!(loaded, snapshot);
        let keys: Vec<&String> = loaded.keys().collect();
        assert_eq!(keys, ["all", "alice"]);
    }

    #[test]
    fn test_rerun_replaces_file() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut first = Snapshot::new();
        first.insert("all".to_string(), finalize(UserAcc::new()));
        first.insert("alice".to_string(), finalize(UserAcc::new()));
        write(dir.path(), 2023, &first).expect("write");

        let mut second = Snapshot::new();
        second.insert("all".to_string(), finalize(UserAcc::new()));
        let path = write(dir.path(), 2023, &second).expect("rewrite");

        let loaded = read(&path).expect("read");
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_read_missing_file_errors() {
        assert!(read(Path::new("/nonexistent/2023.bin")).is_err());
    }
}
