//! # Triage Core
//!
//! Symptom-based triage and population insights.
//!
//! This crate contains the scoring and rule logic:
//! - TF-IDF similarity of reported symptoms against the condition table
//! - urgency aggregation from condition baselines, patient age and vital signs
//! - frequency insights over a snapshot of stored patient records
//! - facility capacity statistics and headline health metrics
//!
//! **No transport concerns**: HTTP routing, persistence and request parsing belong to the
//! caller. The condition table itself lives in `triage-knowledge`.

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod facilities;
pub mod insights;
pub mod request;
pub mod service;
pub mod similarity;
pub mod store;
pub mod validation;
pub mod vitals;

pub use config::{resolve_knowledge_base_path, CoreConfig, KnowledgeSource};
pub use engine::{PredictedCondition, TriageEngine, TriageResult};
pub use error::{CoreError, CoreResult};
pub use facilities::{FacilityRecord, FacilityStatistics, FacilityStore, InMemoryFacilityStore};
pub use insights::{
    health_metrics, HealthInsight, InsightTrend, InsightsAggregator, InsightsSummary,
    UrgencyDistribution,
};
pub use request::TriageRequest;
pub use service::TriageService;
pub use similarity::{SimilarityIndex, SimilarityScore, SymptomVector};
pub use store::{InMemoryPatientStore, PatientRecord, PatientStore};
pub use vitals::{VitalChannel, VitalSigns, VitalSignsAssessor};

pub use triage_knowledge::{Condition, KnowledgeBase};
pub use triage_types::{NonEmptyText, UrgencyLevel};
