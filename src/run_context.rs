//! Run context - injected collaborators for one detector invocation.

use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-based idempotency markers keyed by run date.
///
/// A marker is a check, not a lock: two invocations for the same date racing
/// past the check will both run. Invocation is externally triggered at most
/// once per date in normal operation.
#[derive(Debug, Clone)]
pub struct MarkerStore {
    dir: PathBuf,
}

impl MarkerStore {
    /// Markers live as one file per date under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn marker_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("run_{}.marker", date))
    }

    /// Whether a completed run for this date is already recorded.
    pub fn is_complete(&self, date: NaiveDate) -> bool {
        self.marker_path(date).exists()
    }

    /// Record a completed run for this date.
    pub fn mark_complete(&self, date: NaiveDate) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.marker_path(date), format!("{}\n", date))
    }

    /// The marker directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Collaborators a single invocation runs against, passed explicitly so
/// tests can point them at scratch space.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub markers: MarkerStore,
}

impl RunContext {
    pub fn new(marker_dir: impl Into<PathBuf>) -> Self {
        Self {
            markers: MarkerStore::new(marker_dir),
        }
    }
}
