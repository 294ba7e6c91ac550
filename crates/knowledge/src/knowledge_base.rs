//! Knowledge base table and its YAML wire format.
//!
//! Responsibilities:
//! - Define the read-only [`KnowledgeBase`] handed to the scoring layer
//! - Define a strict wire model for serialisation/deserialisation
//! - Translate between the wire model and domain [`Condition`]s
//!
//! Notes:
//! - Table order is preserved; downstream tie-breaks depend on it
//! - The bundled table is embedded at compile time so a binary always has a default

use crate::condition::Condition;
use crate::{KnowledgeError, KnowledgeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use triage_types::UrgencyLevel;

/// The default condition table shipped with the crate.
pub const BUNDLED_KNOWLEDGE_BASE_YAML: &str = include_str!("../data/conditions.yaml");

// ============================================================================
// Public domain-level types
// ============================================================================

/// Immutable, ordered collection of [`Condition`]s.
///
/// There is no mutation API: a table is parsed or assembled once and then only read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnowledgeBase {
    conditions: Vec<Condition>,
}

impl KnowledgeBase {
    /// Assemble a table from already-built conditions.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::InvalidInput`] if two conditions share a name.
    pub fn from_conditions(conditions: Vec<Condition>) -> KnowledgeResult<Self> {
        let mut seen = HashSet::new();
        for condition in &conditions {
            if !seen.insert(condition.name()) {
                return Err(KnowledgeError::InvalidInput(format!(
                    "duplicate condition name: {}",
                    condition.name()
                )));
            }
        }
        Ok(Self { conditions })
    }

    /// The table embedded in this crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded document is itself malformed.
    pub fn bundled() -> KnowledgeResult<Self> {
        Self::parse(BUNDLED_KNOWLEDGE_BASE_YAML)
    }

    /// Read and parse a table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::Io`] if the file cannot be read, or any error from
    /// [`KnowledgeBase::parse`].
    pub fn load(path: &Path) -> KnowledgeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse a table from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface the path (e.g. `conditions[2].urgency`) of
    /// the failing field when the YAML does not match the wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError`] if:
    /// - the YAML does not match the wire schema (unknown keys, wrong types, unknown urgency),
    /// - a condition is invalid (see [`Condition::new`]),
    /// - two conditions share a name.
    pub fn parse(yaml_text: &str) -> KnowledgeResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, KnowledgeBaseWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(KnowledgeError::Translation(format!(
                    "Knowledge base schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_domain(wire)
    }

    /// Render the table as YAML text in the same shape [`KnowledgeBase::parse`] accepts.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::Translation`] if serialisation fails.
    pub fn render(&self) -> KnowledgeResult<String> {
        let wire = domain_to_wire(self);
        serde_yaml::to_string(&wire).map_err(|e| {
            KnowledgeError::Translation(format!("Failed to serialize knowledge base: {e}"))
        })
    }

    /// Conditions in table order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    /// Look a condition up by its table key.
    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct KnowledgeBaseWire {
    #[serde(default)]
    conditions: Vec<ConditionWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ConditionWire {
    name: String,
    urgency: UrgencyLevel,
    symptoms: Vec<String>,
    actions: Vec<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: KnowledgeBaseWire) -> KnowledgeResult<KnowledgeBase> {
    let conditions = wire
        .conditions
        .into_iter()
        .map(|c| Condition::new(c.name, c.urgency, c.symptoms, c.actions))
        .collect::<KnowledgeResult<Vec<_>>>()?;

    KnowledgeBase::from_conditions(conditions)
}

fn domain_to_wire(kb: &KnowledgeBase) -> KnowledgeBaseWire {
    KnowledgeBaseWire {
        conditions: kb
            .conditions
            .iter()
            .map(|c| ConditionWire {
                name: c.name().to_string(),
                urgency: c.base_urgency(),
                symptoms: c.symptoms().to_vec(),
                actions: c.actions().to_vec(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL_TABLE: &str = r#"conditions:
  - name: common_cold
    urgency: low
    symptoms: [runny nose, sore throat]
    actions: [Rest and hydration]
  - name: pneumonia
    urgency: high
    symptoms: [cough, fever]
    actions: [Chest X-ray]
"#;

    #[test]
    fn bundled_table_has_the_ten_conditions_in_order() {
        let kb = KnowledgeBase::bundled().expect("bundled table parses");
        let names: Vec<&str> = kb.iter().map(Condition::name).collect();
        assert_eq!(
            names,
            [
                "malaria",
                "typhoid",
                "common_cold",
                "pneumonia",
                "tuberculosis",
                "diarrheal_disease",
                "hypertension_crisis",
                "diabetes_complication",
                "asthma_attack",
                "migraine",
            ]
        );
    }

    #[test]
    fn bundled_table_urgencies() {
        let kb = KnowledgeBase::bundled().expect("bundled table parses");
        let urgency = |name: &str| kb.get(name).expect("present").base_urgency();

        assert_eq!(urgency("malaria"), UrgencyLevel::High);
        assert_eq!(urgency("common_cold"), UrgencyLevel::Low);
        assert_eq!(urgency("diarrheal_disease"), UrgencyLevel::Medium);
        assert_eq!(urgency("hypertension_crisis"), UrgencyLevel::Critical);
        assert_eq!(urgency("migraine"), UrgencyLevel::Medium);
    }

    #[test]
    fn bundled_malaria_entry_is_verbatim() {
        let kb = KnowledgeBase::bundled().expect("bundled table parses");
        let malaria = kb.get("malaria").expect("malaria present");
        assert_eq!(
            malaria.symptom_text(),
            "fever chills headache sweating fatigue nausea vomiting"
        );
        assert_eq!(
            malaria.actions(),
            [
                "Get immediate medical attention",
                "Blood test for confirmation",
                "Start antimalarial treatment",
            ]
        );
    }

    #[test]
    fn render_then_parse_preserves_table() {
        let kb = KnowledgeBase::bundled().expect("bundled table parses");
        let yaml = kb.render().expect("render");
        let reparsed = KnowledgeBase::parse(&yaml).expect("reparse");
        assert_eq!(kb, reparsed);
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let input = format!("{SMALL_TABLE}    severity: 3\n");
        let err = KnowledgeBase::parse(&input).expect_err("should reject unknown key");
        match err {
            KnowledgeError::Translation(msg) => assert!(msg.contains("severity")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_urgency_with_path() {
        let input = SMALL_TABLE.replace("urgency: high", "urgency: urgent");
        let err = KnowledgeBase::parse(&input).expect_err("should reject urgency");
        match err {
            KnowledgeError::Translation(msg) => assert!(msg.contains("conditions[1].urgency")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_condition_names() {
        let input = SMALL_TABLE.replace("name: pneumonia", "name: common_cold");
        let err = KnowledgeBase::parse(&input).expect_err("should reject duplicate");
        match err {
            KnowledgeError::InvalidInput(msg) => assert!(msg.contains("common_cold")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn empty_document_parses_to_empty_table() {
        let kb = KnowledgeBase::parse("conditions: []\n").expect("empty list parses");
        assert!(kb.is_empty());
        assert_eq!(kb.len(), 0);
    }

    #[test]
    fn load_reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SMALL_TABLE.as_bytes()).expect("write table");

        let kb = KnowledgeBase::load(file.path()).expect("load");
        assert_eq!(kb.len(), 2);
        assert_eq!(
            kb.get("pneumonia").expect("present").symptoms(),
            ["cough", "fever"]
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = KnowledgeBase::load(&dir.path().join("missing.yaml")).expect_err("missing");
        assert!(matches!(err, KnowledgeError::Io(_)));
    }
}
