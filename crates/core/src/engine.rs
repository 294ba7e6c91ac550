//! Triage engine.
//!
//! Orchestrates one triage request:
//! 1. score the symptom list against every condition and keep the top
//!    [`MAX_PREDICTIONS`] (stable on table order for equal scores),
//! 2. drop conditions at or below [`RELEVANCE_THRESHOLD`] and record matching symptoms,
//! 3. take the highest baseline urgency of what remains (`low` when nothing remains),
//! 4. escalate one step for very young or elderly patients,
//! 5. raise to the vital-sign urgency when that is higher,
//! 6. union the recommended actions and average the retained confidences.
//!
//! The engine owns an immutable knowledge base and similarity index and holds no other
//! state, so identical inputs always produce identical results.

use crate::constants::{
    AGE_COMPLICATIONS_ACTION, ELDERLY_AGE_LIMIT, MAX_PREDICTIONS, PAEDIATRIC_AGE_LIMIT,
    RELEVANCE_THRESHOLD,
};
use crate::similarity::{SimilarityIndex, SimilarityScore};
use crate::vitals::{VitalSigns, VitalSignsAssessor};
use crate::CoreResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use triage_knowledge::{Condition, KnowledgeBase};
use triage_types::UrgencyLevel;

/// One ranked candidate condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictedCondition {
    /// Display name of the condition, e.g. `Common Cold`.
    pub condition: String,
    /// Cosine similarity in `[0, 1]`.
    pub confidence: f64,
    /// Condition symptoms matched by the input, in the condition's own order.
    pub matching_symptoms: Vec<String>,
}

/// Outcome of a triage request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub urgency_level: UrgencyLevel,
    pub predicted_conditions: Vec<PredictedCondition>,
    /// Sorted, duplicate-free.
    pub recommended_actions: Vec<String>,
    pub confidence_score: f64,
}

#[derive(Clone, Debug)]
pub struct TriageEngine {
    knowledge_base: KnowledgeBase,
    index: SimilarityIndex,
    assessor: VitalSignsAssessor,
}

impl TriageEngine {
    /// Build the engine and its similarity index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::EmptyKnowledgeBase`] if the table has no conditions.
    pub fn new(knowledge_base: KnowledgeBase) -> CoreResult<Self> {
        let index = SimilarityIndex::build(&knowledge_base)?;
        Ok(Self {
            knowledge_base,
            index,
            assessor: VitalSignsAssessor::new(),
        })
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// Triage a symptom list.
    ///
    /// Never fails: an empty symptom list yields `low` urgency with no conditions, no
    /// actions (unless the age rule fires) and zero confidence. `gender` is accepted for
    /// interface parity and does not influence the result.
    pub fn predict_triage<S: AsRef<str>>(
        &self,
        symptoms: &[S],
        age: i32,
        gender: &str,
        vital_signs: Option<&VitalSigns>,
    ) -> TriageResult {
        let mut ranked = self.index.score(symptoms);
        // `sort_by` is stable: equal scores stay in table order.
        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        let retained: Vec<(&Condition, SimilarityScore)> = ranked
            .into_iter()
            .take(MAX_PREDICTIONS)
            .filter(|score| score.similarity > RELEVANCE_THRESHOLD)
            .filter_map(|score| {
                self.knowledge_base
                    .conditions()
                    .get(score.position)
                    .map(|condition| (condition, score))
            })
            .collect();

        let input_lower: Vec<String> = symptoms
            .iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();

        let mut urgency = UrgencyLevel::Low;
        let mut actions: BTreeSet<String> = BTreeSet::new();
        let mut predicted_conditions = Vec::with_capacity(retained.len());

        for (condition, score) in &retained {
            urgency = urgency.max(condition.base_urgency());
            actions.extend(condition.actions().iter().cloned());
            predicted_conditions.push(PredictedCondition {
                condition: condition.display_name(),
                confidence: score.similarity,
                matching_symptoms: matching_symptoms(&input_lower, condition.symptoms()),
            });
        }

        if is_age_at_risk(age) {
            urgency = urgency.escalate();
            actions.insert(AGE_COMPLICATIONS_ACTION.to_string());
        }

        if let Some(vitals) = vital_signs {
            let vital_urgency = self.assessor.assess(vitals);
            if vital_urgency > urgency {
                urgency = vital_urgency;
            }
        }

        let confidence_score = if predicted_conditions.is_empty() {
            0.0
        } else {
            predicted_conditions.iter().map(|c| c.confidence).sum::<f64>()
                / predicted_conditions.len() as f64
        };

        tracing::debug!(
            symptoms = symptoms.len(),
            age,
            gender,
            retained = predicted_conditions.len(),
            urgency = %urgency,
            "triage complete"
        );

        TriageResult {
            urgency_level: urgency,
            predicted_conditions,
            recommended_actions: actions.into_iter().collect(),
            confidence_score,
        }
    }
}

/// Whether the age rule escalates urgency.
pub fn is_age_at_risk(age: i32) -> bool {
    age < PAEDIATRIC_AGE_LIMIT || age > ELDERLY_AGE_LIMIT
}

/// Condition symptoms matched by any input symptom.
///
/// A condition symptom matches when it is a substring of an input symptom or the input is a
/// substring of it. Each condition symptom is recorded at most once, in condition order.
/// This is deliberately loose: `pain` matches both `chest pain` and `abdominal pain`.
pub fn matching_symptoms(input_lower: &[String], condition_symptoms: &[String]) -> Vec<String> {
    condition_symptoms
        .iter()
        .filter(|symptom| {
            input_lower
                .iter()
                .any(|input| input.contains(symptom.as_str()) || symptom.contains(input.as_str()))
        })
        .cloned()
        .collect()
}
