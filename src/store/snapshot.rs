//! Binary snapshot persistence for in-memory indices.
//!
//! Each index is saved as one named artifact under the snapshot directory.
//! The format is a small framed header followed by a bincode payload:
//!
//! ```text
//! +-------+---------+-------------+----------+---------+
//! | magic | version | payload len | crc32    | payload |
//! | 4B    | u32 LE  | u64 LE      | u32 LE   | bincode |
//! +-------+---------+-------------+----------+---------+
//! ```
//!
//! Absence of an artifact is not an error. Corruption of any kind —
//! truncation, bad magic, a version stamp from another format revision, a
//! checksum mismatch, a decode failure — yields a snapshot error that the
//! cache treats as a miss and answers with a rebuild. Writes go through a
//! temporary file renamed into place, so a crashed writer cannot leave a
//! half-written artifact behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{KopisError, Result};

/// Magic bytes identifying a Kopis snapshot artifact.
const SNAPSHOT_MAGIC: [u8; 4] = *b"KSNP";

/// Format revision stamp. Bumped whenever the serialized shape of any
/// artifact changes; a mismatch invalidates the artifact.
const SNAPSHOT_VERSION: u32 = 1;

/// A directory of named snapshot artifacts.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    directory: PathBuf,
}

impl SnapshotStore {
    /// Open (creating if necessary) a snapshot store rooted at `directory`.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory).map_err(|e| {
                KopisError::snapshot(format!("failed to create snapshot directory: {e}"))
            })?;
        }

        if !directory.is_dir() {
            return Err(KopisError::snapshot(format!(
                "snapshot path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(SnapshotStore { directory })
    }

    /// The directory this store writes under.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Get the full path for an artifact name.
    fn artifact_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.snap"))
    }

    /// Whether an artifact with the given name exists on disk.
    pub fn exists(&self, name: &str) -> bool {
        self.artifact_path(name).is_file()
    }

    /// Delete an artifact if present.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.artifact_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Load a named artifact.
    ///
    /// Returns `Ok(None)` if the artifact does not exist. Any malformed
    /// content is a [`KopisError::Snapshot`].
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.artifact_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| KopisError::snapshot(format!("{name}: truncated header: {e}")))?;
        if magic != SNAPSHOT_MAGIC {
            return Err(KopisError::snapshot(format!("{name}: bad magic bytes")));
        }

        let version = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| KopisError::snapshot(format!("{name}: truncated header: {e}")))?;
        if version != SNAPSHOT_VERSION {
            return Err(KopisError::snapshot(format!(
                "{name}: format version {version}, expected {SNAPSHOT_VERSION}"
            )));
        }

        let payload_len = reader
            .read_u64::<LittleEndian>()
            .map_err(|e| KopisError::snapshot(format!("{name}: truncated header: {e}")))?;
        let expected_checksum = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| KopisError::snapshot(format!("{name}: truncated header: {e}")))?;

        let mut payload = vec![0u8; payload_len as usize];
        reader
            .read_exact(&mut payload)
            .map_err(|e| KopisError::snapshot(format!("{name}: truncated payload: {e}")))?;

        let checksum = crc32fast::hash(&payload);
        if checksum != expected_checksum {
            return Err(KopisError::snapshot(format!(
                "{name}: checksum mismatch: {checksum:#010x} != {expected_checksum:#010x}"
            )));
        }

        let value = bincode::deserialize(&payload)
            .map_err(|e| KopisError::snapshot(format!("{name}: decode failed: {e}")))?;
        Ok(Some(value))
    }

    /// Save a named artifact, replacing any existing one atomically.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let payload = bincode::serialize(value)
            .map_err(|e| KopisError::serialization(format!("{name}: encode failed: {e}")))?;
        let checksum = crc32fast::hash(&payload);

        let path = self.artifact_path(name);
        let tmp_path = self.directory.join(format!("{name}.snap.tmp"));

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(&SNAPSHOT_MAGIC)?;
            writer.write_u32::<LittleEndian>(SNAPSHOT_VERSION)?;
            writer.write_u64::<LittleEndian>(payload.len() as u64)?;
            writer.write_u32::<LittleEndian>(checksum)?;
            writer.write_all(&payload)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};

    use ahash::AHashMap;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let mut map: AHashMap<i32, Vec<u32>> = AHashMap::new();
        map.insert(1, vec![10, 20]);
        map.insert(2, vec![]);

        store.save("assoc", &map).unwrap();
        let restored: AHashMap<i32, Vec<u32>> = store.load("assoc").unwrap().unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_missing_artifact_is_none() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let loaded: Option<Vec<i32>> = store.load("nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_flipped_payload_byte_is_a_snapshot_error() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        store.save("docs", &vec![1i32, 2, 3]).unwrap();

        // Flip one payload byte past the 20-byte header.
        let path = dir.path().join("docs.snap");
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        file.seek(SeekFrom::Start(21)).unwrap();
        let mut byte = [0u8; 1];
        file.read_exact(&mut byte).unwrap();
        byte[0] ^= 0xFF;
        file.seek(SeekFrom::Start(21)).unwrap();
        file.write_all(&byte).unwrap();

        let result: Result<Option<Vec<i32>>> = store.load("docs");
        assert!(matches!(result, Err(KopisError::Snapshot(_))));
    }

    #[test]
    fn test_truncated_artifact_is_a_snapshot_error() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        store.save("docs", &vec![1i32, 2, 3]).unwrap();

        let path = dir.path().join("docs.snap");
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        let result: Result<Option<Vec<i32>>> = store.load("docs");
        assert!(matches!(result, Err(KopisError::Snapshot(_))));
    }

    #[test]
    fn test_foreign_file_is_a_snapshot_error() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("docs.snap"), b"not a snapshot").unwrap();

        let result: Result<Option<Vec<i32>>> = store.load("docs");
        assert!(matches!(result, Err(KopisError::Snapshot(_))));
    }

    #[test]
    fn test_save_replaces_existing_artifact() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        store.save("docs", &vec![1i32]).unwrap();
        store.save("docs", &vec![2i32, 3]).unwrap();

        let restored: Vec<i32> = store.load("docs").unwrap().unwrap();
        assert_eq!(restored, vec![2, 3]);
        assert!(!dir.path().join("docs.snap.tmp").exists());
    }
}
