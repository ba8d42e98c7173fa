//! Result sinks - where non-degenerate anomaly results land.
//!
//! Two sinks ship with the crate: a SQLite store for downstream dashboards
//! and a flat text archive, one file per run date. A run usually writes to
//! both.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::score::AnomalyResult;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors from a result sink. All fatal: losing results silently defeats the
/// point of the run.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to open the result store.
    #[error("failed to open result store: {0}")]
    Open(#[source] rusqlite::Error),

    /// A result insert failed.
    #[error("result insert failed: {0}")]
    Insert(#[from] rusqlite::Error),

    /// Archive file I/O failed.
    #[error("failed to write archive: {0}")]
    Archive(#[from] std::io::Error),
}

/// Receives one record per non-degenerate query per run.
pub trait ResultSink {
    fn write(&mut self, result: &AnomalyResult) -> SinkResult<()>;
}

const CREATE_RESULTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS billing_anomalies (
    anomaly_date TEXT NOT NULL,
    query TEXT NOT NULL,
    score REAL NOT NULL,
    is_anomaly INTEGER NOT NULL,
    daily_cost REAL NOT NULL,
    mean_cost REAL NOT NULL,
    std_cost REAL NOT NULL
)";

/// Writes results into the `billing_anomalies` table of a SQLite store,
/// creating the table on first open.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (or create) the result store.
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        let conn = Connection::open(path).map_err(SinkError::Open)?;
        conn.execute(CREATE_RESULTS_TABLE, [])
            .map_err(SinkError::Open)?;
        Ok(Self { conn })
    }
}

impl ResultSink for SqliteSink {
    fn write(&mut self, result: &AnomalyResult) -> SinkResult<()> {
        self.conn.execute(
            "INSERT INTO billing_anomalies \
             (anomaly_date, query, score, is_anomaly, daily_cost, mean_cost, std_cost) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                result.day.to_string(),
                result.query,
                result.score,
                result.is_anomaly,
                result.cost,
                result.mean,
                result.std,
            ],
        )?;
        Ok(())
    }
}

/// Appends the flat line-per-field rendering of each result to a per-run
/// archive file.
pub struct ArchiveSink {
    file: fs::File,
    path: PathBuf,
}

impl ArchiveSink {
    /// Create the archive file for one run date, truncating any previous
    /// file for that date.
    pub fn create(dir: impl AsRef<Path>, date: NaiveDate) -> SinkResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("anomaly_results_{}.txt", date));
        let file = fs::File::create(&path)?;
        Ok(Self { file, path })
    }

    /// Where this run's archive lives.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for ArchiveSink {
    fn write(&mut self, result: &AnomalyResult) -> SinkResult<()> {
        self.file.write_all(result.archive_lines().as_bytes())?;
        Ok(())
    }
}
