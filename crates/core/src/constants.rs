//! Constants used throughout the triage core crate.
//!
//! Scoring thresholds and rule boundaries live here so the engine and its tests agree on
//! one set of numbers.

/// Similarity at or below this value excludes a condition from results.
pub const RELEVANCE_THRESHOLD: f64 = 0.1;

/// Number of top-scoring conditions considered per request.
pub const MAX_PREDICTIONS: usize = 3;

/// Patients younger than this are escalated one urgency step.
pub const PAEDIATRIC_AGE_LIMIT: i32 = 5;

/// Patients older than this are escalated one urgency step.
pub const ELDERLY_AGE_LIMIT: i32 = 65;

/// Action added whenever the age rule fires.
pub const AGE_COMPLICATIONS_ACTION: &str = "Consider age-specific complications";

/// Number of symptoms reported by insights aggregation.
pub const TOP_SYMPTOM_LIMIT: usize = 10;

/// Average facility utilization, in percent, above which the trend reads as increasing.
pub const UTILIZATION_TREND_THRESHOLD: f64 = 70.0;

/// Environment variable naming an external knowledge-base YAML file.
pub const KNOWLEDGE_BASE_ENV_VAR: &str = "TRIAGE_KNOWLEDGE_BASE";

/// Accepted gender values for request validation.
pub const ACCEPTED_GENDERS: &[&str] = &["male", "female", "other"];

/// Exclusive lower bound for patient age in request validation, in years.
pub const MIN_AGE_EXCLUSIVE: i32 = 0;

/// Exclusive upper bound for patient age in request validation, in years.
pub const MAX_AGE_EXCLUSIVE: i32 = 120;
