//! JSONL event journal, one file per run.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::RunObserver;
use crate::domain::EventRecord;
use crate::error::Result;

/// Appends every event as one JSON line to `<dir>/<run_id>.jsonl`.
pub struct JsonlObserver {
    base_path: PathBuf,
}

impl JsonlObserver {
    /// Create a journal rooted at `base_path`, creating the directory.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn run_path(&self, run_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", run_id))
    }

    /// Read back every event journaled for `run_id`.
    pub fn read_run(&self, run_id: &str) -> Result<Vec<EventRecord>> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                events.push(serde_json::from_str(&line)?);
            }
        }
        Ok(events)
    }
}

impl RunObserver for JsonlObserver {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn on_event(&self, event: &EventRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.run_path(&event.run_id))?;
        writeln!(file, "{}", serde_json::to_string(event)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FinalResult, event_types};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("journal");
        JsonlObserver::new(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_appends_and_reads_back() {
        let temp = TempDir::new().unwrap();
        let journal = JsonlObserver::new(temp.path()).unwrap();

        journal.on_event(&EventRecord::run_started("run-a", "add two numbers", 5)).unwrap();
        journal
            .on_event(&EventRecord::run_finished("run-a", 2, &FinalResult::NoArtifact, &BTreeMap::new()))
            .unwrap();
        journal.on_event(&EventRecord::run_started("run-b", "other", 1)).unwrap();

        let events = journal.read_run("run-a").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, event_types::RUN_STARTED);
        assert_eq!(events[1].event_type, event_types::RUN_FINISHED);
        assert_eq!(journal.read_run("run-b").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_run_is_empty() {
        let temp = TempDir::new().unwrap();
        let journal = JsonlObserver::new(temp.path()).unwrap();
        assert!(journal.read_run("run-missing").unwrap().is_empty());
    }

    #[test]
    fn test_write_failure_is_error() {
        let temp = TempDir::new().unwrap();
        let journal = JsonlObserver::new(temp.path()).unwrap();
        fs::remove_dir_all(temp.path()).unwrap();
        assert!(journal.on_event(&EventRecord::run_started("run-a", "x", 1)).is_err());
    }
}
