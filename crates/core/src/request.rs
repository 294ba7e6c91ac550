//! Triage request model.

use crate::vitals::VitalSigns;
use serde::{Deserialize, Serialize};

/// A triage request as received from an intake surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub age: i32,
    pub gender: String,
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
}
