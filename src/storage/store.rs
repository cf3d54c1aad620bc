use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::TimesheetError;
use crate::models::{DaysMap, Period, TimesheetDocument};

/// Durable per-(user, year, month) document storage.
///
/// Each triple maps to exactly one JSON file under the base directory:
/// `<base>/<user_id>/<year>/<month>/data.json`. Writes merge the incoming
/// partial day map into the stored document and replace the file atomically.
pub struct TimesheetStore {
    base_path: PathBuf,
}

impl TimesheetStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory holding one period's document.
    fn document_dir(&self, user_id: u64, period: Period) -> PathBuf {
        self.base_path
            .join(user_id.to_string())
            .join(period.year.to_string())
            .join(period.month.to_string())
    }

    fn document_path(&self, user_id: u64, period: Period) -> PathBuf {
        self.document_dir(user_id, period).join("data.json")
    }

    /// Reads the stored document for a period.
    ///
    /// Returns `Ok(None)` when no document exists yet. Unreadable or
    /// unparsable content is also reported as absent: the next write starts
    /// a fresh document rather than failing every request for the period.
    pub fn read(
        &self,
        user_id: u64,
        period: Period,
    ) -> Result<Option<TimesheetDocument>, TimesheetError> {
        let path = self.document_path(user_id, period);

        if !path.exists() {
            return Ok(None);
        }

        match load_document(&path) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                log::warn!(
                    "treating unreadable document {} as absent: {}",
                    path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Merges `partial` into the stored document and persists the result.
    ///
    /// Absent document: a fresh one is created with both timestamps set to
    /// now. Present: keys in `partial` overwrite, all other stored days are
    /// kept, `created_at` is preserved. The merged document replaces the old
    /// file in one rename, so a failed write leaves the prior state intact.
    pub fn write(
        &self,
        user_id: u64,
        period: Period,
        partial: &DaysMap,
    ) -> Result<TimesheetDocument, TimesheetError> {
        let dir = self.document_dir(user_id, period);
        fs::create_dir_all(&dir)?;

        let now = Utc::now();
        let doc = match self.read(user_id, period)? {
            Some(mut existing) => {
                existing.merge(partial, now);
                existing
            }
            None => TimesheetDocument::new(partial.clone(), now),
        };

        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| TimesheetError::Other(format!("document encode failed: {}", e)))?;

        let path = self.document_path(user_id, period);
        let tmp_path = dir.join("data.json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        log::info!(
            "saved timesheet user={} period={} days={}",
            user_id,
            period,
            partial.len()
        );

        Ok(doc)
    }
}

fn load_document(path: &Path) -> Result<TimesheetDocument, TimesheetError> {
    let content = fs::read_to_string(path)?;

    serde_json::from_str(&content)
        .map_err(|e| TimesheetError::CorruptDocument(e.to_string()))
}
