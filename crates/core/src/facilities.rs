//! Health facility records, their store, and capacity statistics.
//!
//! Facilities are held the same way patient records are: the caller owns storage and
//! statistics are computed over a snapshot taken through [`FacilityStore`].

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// A registered health facility.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub facility_id: String,
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub facility_type: String,
    /// Total beds.
    pub capacity: u32,
    pub available_beds: u32,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub staff_count: u32,
}

impl FacilityRecord {
    /// Share of beds in use, as a percentage of capacity.
    ///
    /// `None` when the facility reports no capacity. More available beds than capacity
    /// yields a negative rate; the record is reported as given.
    pub fn utilization_rate(&self) -> Option<f64> {
        if self.capacity == 0 {
            return None;
        }
        let capacity = f64::from(self.capacity);
        Some((capacity - f64::from(self.available_beds)) / capacity * 100.0)
    }
}

/// Capability to append facility records and read a consistent snapshot.
pub trait FacilityStore: Send + Sync {
    fn append(&self, record: FacilityRecord) -> CoreResult<()>;

    /// Copy of all facilities in insertion order.
    fn snapshot(&self) -> CoreResult<Vec<FacilityRecord>>;
}

/// Process-local facility store guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct InMemoryFacilityStore {
    records: RwLock<Vec<FacilityRecord>>,
}

impl InMemoryFacilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<FacilityRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Seed a store from a JSON array of facility records on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FileRead`] if the file cannot be read and
    /// [`CoreError::Deserialization`] if it is not an array of facilities.
    pub fn load_json(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(CoreError::FileRead)?;
        let records: Vec<FacilityRecord> =
            serde_json::from_str(&contents).map_err(CoreError::Deserialization)?;
        tracing::debug!(records = records.len(), path = %path.display(), "loaded facility records");
        Ok(Self::from_records(records))
    }
}

impl FacilityStore for InMemoryFacilityStore {
    fn append(&self, record: FacilityRecord) -> CoreResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CoreError::StoreUnavailable("facility store lock poisoned".into()))?;
        records.push(record);
        Ok(())
    }

    fn snapshot(&self) -> CoreResult<Vec<FacilityRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| CoreError::StoreUnavailable("facility store lock poisoned".into()))?;
        Ok(records.clone())
    }
}

/// Capacity and staffing summary over a set of facilities.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityStatistics {
    pub total_facilities: usize,
    pub avg_capacity: f64,
    /// Mean utilization rate over facilities with a non-zero capacity; 0 when none have one.
    pub avg_utilization: f64,
    pub total_staff: u64,
}

impl FacilityStatistics {
    pub fn from_records(records: &[FacilityRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let capacity_sum: f64 = records.iter().map(|r| f64::from(r.capacity)).sum();
        let rates: Vec<f64> = records
            .iter()
            .filter_map(FacilityRecord::utilization_rate)
            .collect();
        let avg_utilization = if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };

        Self {
            total_facilities: records.len(),
            avg_capacity: capacity_sum / records.len() as f64,
            avg_utilization,
            total_staff: records.iter().map(|r| u64::from(r.staff_count)).sum(),
        }
    }
}
