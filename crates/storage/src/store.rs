use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use yurei_core::Value;

use crate::error::StoreError;
use crate::record::SaveRecord;

/// Durable key/value state for one ghost, backed by a single JSON record
/// file.
#[derive(Debug, Clone)]
pub struct VariableStore {
    path: PathBuf,
}

impl VariableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        VariableStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the record file if it does not exist yet. Idempotent: an
    /// existing record (its `created_at` included) is left untouched.
    pub fn ensure_initialized(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let record = SaveRecord {
            created_at: local_timestamp()?,
            vars: BTreeMap::new(),
        };
        self.write_record(&record)
    }

    /// Loads the current variable map from disk.
    pub fn load(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        self.ensure_initialized()?;
        let record = self.read_record()?;
        Ok(record
            .vars
            .iter()
            .map(|(key, value)| (key.clone(), Value::from_json(value)))
            .collect())
    }

    /// Returns the record's `created_at` stamp, re-read from disk.
    pub fn created_at(&self) -> Result<String, StoreError> {
        self.ensure_initialized()?;
        Ok(self.read_record()?.created_at)
    }

    /// Writes a full replacement record. The `created_at` stamp is carried
    /// over from the record already on disk, so the value fixed at first
    /// initialization survives every save and process restart.
    pub fn save(&self, vars: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        self.ensure_initialized()?;
        let created_at = self.read_record()?.created_at;
        let record = SaveRecord {
            created_at,
            vars: vars
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        };
        self.write_record(&record)
    }

    fn read_record(&self) -> Result<SaveRecord, StoreError> {
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write_record(&self, record: &SaveRecord) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Current local time as RFC 3339. Falls back to UTC when the local offset
/// cannot be determined (some sandboxed environments).
fn local_timestamp() -> Result<String, StoreError> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(now.format(&Rfc3339)?)
}
