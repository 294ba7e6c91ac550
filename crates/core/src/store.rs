//! Patient record store abstraction.
//!
//! Storage belongs to the caller. Triage and insights only ever read a snapshot taken
//! through [`PatientStore`], so any backing store can be injected at the call site.

use crate::vitals::VitalSigns;
use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// A stored patient intake record.
///
/// Only `symptoms` is needed for symptom insights; the remaining fields feed population
/// statistics and default when absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default)]
    pub medical_history: Vec<String>,
}

impl PatientRecord {
    /// A record carrying only symptoms.
    pub fn with_symptoms<S: Into<String>>(symptoms: impl IntoIterator<Item = S>) -> Self {
        Self {
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Capability to append records and read a consistent snapshot.
pub trait PatientStore: Send + Sync {
    fn append(&self, record: PatientRecord) -> CoreResult<()>;

    /// Copy of all records in insertion order.
    fn snapshot(&self) -> CoreResult<Vec<PatientRecord>>;
}

/// Process-local store guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct InMemoryPatientStore {
    records: RwLock<Vec<PatientRecord>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from existing records.
    pub fn from_records(records: Vec<PatientRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Seed a store from a JSON array of patient records on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FileRead`] if the file cannot be read and
    /// [`CoreError::Deserialization`] if it is not an array of records.
    pub fn load_json(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(CoreError::FileRead)?;
        let records: Vec<PatientRecord> =
            serde_json::from_str(&contents).map_err(CoreError::Deserialization)?;
        tracing::debug!(records = records.len(), path = %path.display(), "loaded patient records");
        Ok(Self::from_records(records))
    }
}

impl PatientStore for InMemoryPatientStore {
    fn append(&self, record: PatientRecord) -> CoreResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CoreError::StoreUnavailable("patient store lock poisoned".into()))?;
        records.push(record);
        Ok(())
    }

    fn snapshot(&self) -> CoreResult<Vec<PatientRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| CoreError::StoreUnavailable("patient store lock poisoned".into()))?;
        Ok(records.clone())
    }
}
