//! Condition domain model.

use crate::{KnowledgeError, KnowledgeResult};
use triage_types::{NonEmptyText, UrgencyLevel};

/// A single knowledge-base entry: a condition, the symptoms that suggest it, its baseline
/// urgency and the actions recommended when it is suspected.
///
/// Symptoms are stored trimmed and lower-cased, in table order, without duplicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    name: NonEmptyText,
    symptoms: Vec<String>,
    base_urgency: UrgencyLevel,
    actions: Vec<String>,
}

impl Condition {
    /// Build a condition, normalising its symptom and action lists.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::InvalidInput`] if the name is blank, if no symptoms or no
    /// actions remain after normalisation, or if any symptom or action is blank.
    pub fn new<S, A>(
        name: impl AsRef<str>,
        base_urgency: UrgencyLevel,
        symptoms: S,
        actions: A,
    ) -> KnowledgeResult<Self>
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let name = NonEmptyText::new(name)
            .map_err(|_| KnowledgeError::InvalidInput("condition name cannot be empty".into()))?;

        let mut normalised_symptoms: Vec<String> = Vec::new();
        for symptom in symptoms {
            let symptom = symptom.as_ref().trim().to_lowercase();
            if symptom.is_empty() {
                return Err(KnowledgeError::InvalidInput(format!(
                    "condition {name} has an empty symptom"
                )));
            }
            if !normalised_symptoms.contains(&symptom) {
                normalised_symptoms.push(symptom);
            }
        }
        if normalised_symptoms.is_empty() {
            return Err(KnowledgeError::InvalidInput(format!(
                "condition {name} must list at least one symptom"
            )));
        }

        let mut normalised_actions: Vec<String> = Vec::new();
        for action in actions {
            let action = action.as_ref().trim();
            if action.is_empty() {
                return Err(KnowledgeError::InvalidInput(format!(
                    "condition {name} has an empty action"
                )));
            }
            if !normalised_actions.iter().any(|a| a == action) {
                normalised_actions.push(action.to_string());
            }
        }
        if normalised_actions.is_empty() {
            return Err(KnowledgeError::InvalidInput(format!(
                "condition {name} must list at least one action"
            )));
        }

        Ok(Self {
            name,
            symptoms: normalised_symptoms,
            base_urgency,
            actions: normalised_actions,
        })
    }

    /// Table key, e.g. `common_cold`.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Human-facing name: underscores become spaces and each word is title-cased.
    ///
    /// `common_cold` renders as `Common Cold`.
    pub fn display_name(&self) -> String {
        self.name
            .as_str()
            .split('_')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    /// Symptoms joined by single spaces; the document scored by the similarity index.
    pub fn symptom_text(&self) -> String {
        self.symptoms.join(" ")
    }

    pub fn base_urgency(&self) -> UrgencyLevel {
        self.base_urgency
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_word_start = true;
    for ch in word.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
