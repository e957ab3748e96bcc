//! Flat-file persistence for analysis runs.
//!
//! Each run is written as `<data_dir>/<run_id>.json`, and one row per run is
//! appended to a shared CSV log. The log append happens under an exclusive
//! file lock so concurrent requests cannot interleave or lose rows. A run
//! counts as persisted only once both writes have succeeded.

use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use swot_common::config::StorageConfig;
use swot_common::error::{Error, Result};

use crate::model::RunSummary;

/// Column order of the shared CSV log.
const LOG_HEADER: [&str; 6] = [
    "timestamp",
    "run_id",
    "company",
    "desired_outcomes",
    "top_priority_dimension",
    "top_priority_score",
];

/// Flat-file run store.
pub struct RunStore {
    data_dir: PathBuf,
    log_path: PathBuf,
}

impl RunStore {
    /// Create a store, ensuring the data directory exists.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            data_dir: config.data_dir.clone(),
            log_path: config.log_path(),
        })
    }

    /// Path of the per-run JSON file.
    fn run_path(&self, run_id: &str) -> PathBuf {
        self.data_dir.join(format!("{run_id}.json"))
    }

    /// Persist a run: JSON file first, then the CSV log row.
    pub fn persist(&self, summary: &RunSummary) -> Result<()> {
        let path = self.run_path(&summary.run_id);
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json)?;

        self.append_log(summary)?;

        tracing::info!(
            run_id = %summary.run_id,
            path = %path.display(),
            "Persisted analysis run"
        );
        Ok(())
    }

    /// Append the summary row to the CSV log under an exclusive lock.
    fn append_log(&self, summary: &RunSummary) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.lock_exclusive()?;

        let result = write_log_row(&file, summary);

        file.unlock()?;
        result
    }

    /// Load a run by id. Returns `Ok(None)` when the id is unknown.
    pub fn load(&self, run_id: &str) -> Result<Option<RunSummary>> {
        // Lookup ids come from an untrusted query string; anything that
        // could escape the data directory is treated as unknown.
        if !is_safe_run_id(run_id) {
            return Ok(None);
        }

        let path = self.run_path(run_id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let summary = serde_json::from_str(&content)?;
        Ok(Some(summary))
    }

    /// Path of the CSV log (exposed for tests and diagnostics).
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Write header (for a fresh log) and the summary row.
fn write_log_row(file: &File, summary: &RunSummary) -> Result<()> {
    let fresh = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if fresh {
        writer
            .write_record(LOG_HEADER)
            .map_err(|e| Error::Storage(format!("CSV header write failed: {e}")))?;
    }

    let top = summary.priorities.top();
    writer
        .write_record([
            summary.timestamp.to_rfc3339().as_str(),
            summary.run_id.as_str(),
            summary.company.as_str(),
            summary.desired_outcomes.as_str(),
            top.map(|t| t.dimension.as_str()).unwrap_or(""),
            top.map(|t| t.priority.to_string()).unwrap_or_default().as_str(),
        ])
        .map_err(|e| Error::Storage(format!("CSV row write failed: {e}")))?;

    writer
        .flush()
        .map_err(|e| Error::Storage(format!("CSV flush failed: {e}")))?;
    Ok(())
}

/// Run ids never contain path separators or parent-directory components.
fn is_safe_run_id(run_id: &str) -> bool {
    !run_id.is_empty()
        && !run_id.contains('/')
        && !run_id.contains('\\')
        && !run_id.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{make_run_id, Layer, LayerOutput, RunSummary, SwotItem};
    use crate::scoring::compute_priorities;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_summary() -> RunSummary {
        let mut canonical = LayerOutput::new(Layer::Canonical, "Acme", "growth");
        canonical.weaknesses = vec![
            SwotItem {
                text: "No Android app".into(),
                impact: 8,
                sentiment: -0.8,
            },
            SwotItem {
                text: "Stale reviews".into(),
                impact: 6,
                sentiment: -0.4,
            },
        ];
        let mut corpus = LayerOutput::new(Layer::Corpus, "Acme", "growth");
        corpus.weaknesses = vec![SwotItem {
            text: "Low social proof".into(),
            impact: 2,
            sentiment: -0.2,
        }];
        let transactional = LayerOutput::new(Layer::Transactional, "Acme", "growth");

        let priorities = compute_priorities(&canonical, &corpus, &transactional);
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        RunSummary {
            run_id: make_run_id(timestamp, "Acme"),
            timestamp,
            company: "Acme".into(),
            desired_outcomes: "growth".into(),
            canonical,
            corpus,
            transactional,
            priorities,
        }
    }

    fn store_in(dir: &TempDir) -> RunStore {
        let config = StorageConfig {
            data_dir: dir.path().join("swot_data"),
            log_file: "swot_runs.csv".into(),
        };
        RunStore::new(&config).unwrap()
    }

    #[test]
    fn test_persist_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let summary = sample_summary();

        store.persist(&summary).unwrap();
        let loaded = store.load(&summary.run_id).unwrap().unwrap();

        assert_eq!(loaded, summary);
    }

    #[test]
    fn test_load_unknown_id_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load("20990101000000_Nobody").unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load("../etc/passwd").unwrap().is_none());
        assert!(store.load("a/b").unwrap().is_none());
        assert!(store.load("").unwrap().is_none());
    }

    #[test]
    fn test_log_header_written_once() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let summary = sample_summary();

        store.persist(&summary).unwrap();
        store.persist(&summary).unwrap();

        let content = fs::read_to_string(store.log_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,run_id,company"));
        assert!(lines[1].contains(&summary.run_id));
    }

    #[test]
    fn test_log_row_carries_top_priority() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let summary = sample_summary();

        store.persist(&summary).unwrap();

        let content = fs::read_to_string(store.log_path()).unwrap();
        // weaknesses gap 7.0, mean 3.0 -> priority 21
        assert!(content.contains("weaknesses"));
        assert!(content.contains("21"));
    }
}
