//! Per-label file dispatcher.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use cardio_types::{format_console_line, PatientId};
use parking_lot::RwLock;
use tracing::error;

use super::Dispatcher;
use crate::error::{Error, Result};

/// Appends readings to one text file per label under a base directory.
///
/// A reading labeled `Saturation` lands in `<base>/Saturation.txt`. The
/// label-to-path mapping is resolved once per label and never changes for
/// the life of the dispatcher.
///
/// Each call opens the file in append mode, writes exactly one line with a
/// single write, and closes it again. No handle is cached between calls.
///
/// # Example
///
/// ```rust,no_run
/// use cardio_sdk::{Dispatcher, FileDispatcher};
///
/// let files = FileDispatcher::new("output");
/// files.output(7, 123456, "Saturation", "97%");
/// // output/Saturation.txt now ends with:
/// // Patient ID: 7, Timestamp: 123456, Label: Saturation, Data: 97%
/// ```
#[derive(Debug)]
pub struct FileDispatcher {
    base_dir: PathBuf,
    /// Label to file path; insert-if-absent, never overwritten or removed
    paths: RwLock<HashMap<String, PathBuf>>,
}

impl FileDispatcher {
    /// Create a dispatcher writing under `base_dir`.
    ///
    /// The directory is created lazily on each output call, not here.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            paths: RwLock::new(HashMap::new()),
        }
    }

    /// The directory readings are written under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the file path for a label, registering it on first use.
    ///
    /// Concurrent first calls for the same label all get the same path.
    pub fn path_for(&self, label: &str) -> PathBuf {
        // Fast path: already registered
        {
            let paths = self.paths.read();
            if let Some(path) = paths.get(label) {
                return path.clone();
            }
        }

        // Slow path: the entry API keeps the first writer's path
        let mut paths = self.paths.write();
        paths
            .entry(label.to_string())
            .or_insert_with(|| self.base_dir.join(format!("{}.txt", label)))
            .clone()
    }

    /// Number of labels seen so far.
    pub fn label_count(&self) -> usize {
        self.paths.read().len()
    }

    fn append(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) -> Result<()> {
        fs::create_dir_all(&self.base_dir).map_err(|e| {
            Error::io(
                format!("Error creating base directory {}", self.base_dir.display()),
                e,
            )
        })?;

        let path = self.path_for(label);

        let mut line = format_console_line(patient_id, timestamp_ms, label, data);
        line.push('\n');

        let context = || format!("Error writing to file {}", path.display());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(context(), e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::io(context(), e))?;

        Ok(())
    }
}

impl Dispatcher for FileDispatcher {
    fn output(&self, patient_id: PatientId, timestamp_ms: i64, label: &str, data: &str) {
        if let Err(e) = self.append(patient_id, timestamp_ms, label, data) {
            error!(error = %e, patient_id, label, "file output failed");
        }
    }
}
