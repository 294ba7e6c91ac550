//! Symptom knowledge base for triage.
//!
//! This crate owns the condition table the triage engine scores against:
//! - domain types ([`Condition`], [`KnowledgeBase`]) that are immutable once built
//! - a strict YAML wire model and translation helpers between wire and domain
//! - the bundled default table, embedded at compile time
//!
//! Scoring, urgency rules and aggregation live in `triage-core`. This crate handles the
//! table itself and its file format only.

pub mod condition;
pub mod knowledge_base;

pub use condition::Condition;
pub use knowledge_base::KnowledgeBase;

pub use triage_types::UrgencyLevel;

/// Errors returned by the `triage-knowledge` crate.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`KnowledgeError`].
pub type KnowledgeResult<T> = Result<T, KnowledgeError>;
