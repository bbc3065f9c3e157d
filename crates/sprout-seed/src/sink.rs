//! Destinations for run artifacts
//!
//! The controller hands every artifact it produces (label volumes, JSON
//! records, the history table) to a [`SnapshotSink`] under its file name.
//! [`DirectorySink`] writes them into a folder, [`MemorySink`] keeps them,
//! and [`NullSink`] drops them.

use crate::error::SeedResult;
use log::info;
use sprout_core::Volume;
use sprout_io::{DelimitedTable, ensure_dir, write_json, write_volume_file};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Receiver of named run artifacts
pub trait SnapshotSink {
    /// Store a label volume.
    fn save_volume(&mut self, name: &str, volume: &Volume<u32>) -> SeedResult<()>;

    /// Store a JSON record.
    fn save_json(&mut self, name: &str, value: &serde_json::Value) -> SeedResult<()>;

    /// Store a delimited table.
    fn save_table(&mut self, name: &str, table: &DelimitedTable) -> SeedResult<()>;
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn save_volume(&mut self, _name: &str, _volume: &Volume<u32>) -> SeedResult<()> {
        Ok(())
    }

    fn save_json(&mut self, _name: &str, _value: &serde_json::Value) -> SeedResult<()> {
        Ok(())
    }

    fn save_table(&mut self, _name: &str, _table: &DelimitedTable) -> SeedResult<()> {
        Ok(())
    }
}

/// Keeps every artifact in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub volumes: BTreeMap<String, Volume<u32>>,
    pub json: BTreeMap<String, serde_json::Value>,
    pub tables: BTreeMap<String, DelimitedTable>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(&self, name: &str) -> Option<&Volume<u32>> {
        self.volumes.get(name)
    }

    /// Stored volume names starting with `prefix`, sorted.
    pub fn volume_names(&self, prefix: &str) -> Vec<&str> {
        self.volumes
            .keys()
            .filter(|k| k.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }
}

impl SnapshotSink for MemorySink {
    fn save_volume(&mut self, name: &str, volume: &Volume<u32>) -> SeedResult<()> {
        self.volumes.insert(name.to_string(), volume.clone());
        Ok(())
    }

    fn save_json(&mut self, name: &str, value: &serde_json::Value) -> SeedResult<()> {
        self.json.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn save_table(&mut self, name: &str, table: &DelimitedTable) -> SeedResult<()> {
        self.tables.insert(name.to_string(), table.clone());
        Ok(())
    }
}

/// Writes artifacts as files into one folder
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Use `dir` as the output folder, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> SeedResult<Self> {
        let dir = ensure_dir(dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl SnapshotSink for DirectorySink {
    fn save_volume(&mut self, name: &str, volume: &Volume<u32>) -> SeedResult<()> {
        let path = self.path_of(name);
        write_volume_file(volume, &path)?;
        info!("Saved {}", path.display());
        Ok(())
    }

    fn save_json(&mut self, name: &str, value: &serde_json::Value) -> SeedResult<()> {
        let path = self.path_of(name);
        write_json(value, &path)?;
        info!("Saved {}", path.display());
        Ok(())
    }

    fn save_table(&mut self, name: &str, table: &DelimitedTable) -> SeedResult<()> {
        let path = self.path_of(name);
        table.write_file(&path)?;
        info!("Saved {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::Shape;

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        let vol = Volume::filled(Shape::new_2d(2, 2).unwrap(), 7u32);
        sink.save_volume("INTER_a.svol", &vol).unwrap();
        sink.save_volume("FINAL_b.svol", &vol).unwrap();
        sink.save_json("config.json", &serde_json::json!({"k": 1}))
            .unwrap();
        assert_eq!(sink.volume_names("INTER_"), vec!["INTER_a.svol"]);
        assert_eq!(sink.volume("FINAL_b.svol"), Some(&vol));
        assert_eq!(sink.json["config.json"]["k"], 1);
    }

    #[test]
    fn test_null_sink() {
        let mut sink = NullSink;
        let vol = Volume::filled(Shape::new_2d(1, 1).unwrap(), 0u32);
        assert!(sink.save_volume("x", &vol).is_ok());
    }
}
