//! TF-IDF vector space over the knowledge base's symptom texts.
//!
//! Each condition contributes one document: its symptoms joined by spaces. Documents are
//! tokenised into lower-cased word runs of at least two characters, weighted by raw term
//! count times smoothed inverse document frequency, and L2-normalised. Query documents are
//! projected into the same vocabulary; unseen terms carry no weight and the index is never
//! refitted after [`SimilarityIndex::build`].
//!
//! The index holds no interior mutability and is safe to share across threads.

use crate::{CoreError, CoreResult};
use std::collections::BTreeMap;
use triage_knowledge::KnowledgeBase;

/// Sparse, L2-normalised weight vector over the index vocabulary.
///
/// Entries are sorted by term id. An all-zero vector has no entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymptomVector {
    entries: Vec<(usize, f64)>,
}

impl SymptomVector {
    /// Dot product of two normalised vectors, i.e. their cosine similarity.
    pub fn cosine(&self, other: &SymptomVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        // Weights are non-negative; the clamp only absorbs rounding past 1.0.
        dot.clamp(0.0, 1.0)
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }
}

/// Similarity of one condition to a query, identified by its position in the table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityScore {
    pub position: usize,
    pub similarity: f64,
}

/// TF-IDF index built once from a [`KnowledgeBase`].
#[derive(Clone, Debug)]
pub struct SimilarityIndex {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    documents: Vec<SymptomVector>,
}

impl SimilarityIndex {
    /// Fit the vocabulary and per-condition vectors.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyKnowledgeBase`] if the table has no conditions.
    pub fn build(knowledge_base: &KnowledgeBase) -> CoreResult<Self> {
        if knowledge_base.is_empty() {
            return Err(CoreError::EmptyKnowledgeBase);
        }

        let tokenised: Vec<Vec<String>> = knowledge_base
            .iter()
            .map(|condition| tokenize(&condition.symptom_text()))
            .collect();

        // Lexicographic term ids keep the vector layout independent of table order.
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenised {
            let mut distinct: Vec<&str> = tokens.iter().map(String::as_str).collect();
            distinct.sort_unstable();
            distinct.dedup();
            for term in distinct {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n_documents = tokenised.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (term_id, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), term_id);
            idf.push(smoothed_idf(n_documents, df as f64));
        }

        let mut index = Self {
            vocabulary,
            idf,
            documents: Vec::with_capacity(tokenised.len()),
        };
        let documents = tokenised
            .iter()
            .map(|tokens| index.vectorize_tokens(tokens))
            .collect();
        index.documents = documents;

        tracing::info!(
            conditions = index.documents.len(),
            vocabulary = index.vocabulary.len(),
            "built symptom similarity index"
        );

        Ok(index)
    }

    /// Cosine similarity of the joined symptom list against every condition, in table order.
    ///
    /// An empty list (or one with no known terms) scores 0 against every condition.
    pub fn score<S: AsRef<str>>(&self, symptoms: &[S]) -> Vec<SimilarityScore> {
        let query = self.vectorize(&join_symptoms(symptoms));
        self.documents
            .iter()
            .enumerate()
            .map(|(position, document)| SimilarityScore {
                position,
                similarity: query.cosine(document),
            })
            .collect()
    }

    /// Project free text into the fitted vocabulary.
    pub fn vectorize(&self, text: &str) -> SymptomVector {
        self.vectorize_tokens(&tokenize(text))
    }

    /// The fitted vector of the condition at `position` in the table.
    pub fn document(&self, position: usize) -> Option<&SymptomVector> {
        self.documents.get(position)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    fn vectorize_tokens(&self, tokens: &[String]) -> SymptomVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&term_id) = self.vocabulary.get(token) {
                *counts.entry(term_id).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(term_id, count)| (term_id, count * self.idf[term_id]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return SymptomVector::default();
        }
        for (_, weight) in &mut entries {
            *weight /= norm;
        }

        SymptomVector { entries }
    }
}

/// `ln((1 + n) / (1 + df)) + 1`; never zero, never divides by zero.
fn smoothed_idf(n_documents: f64, document_frequency: f64) -> f64 {
    ((1.0 + n_documents) / (1.0 + document_frequency)).ln() + 1.0
}

/// Lower-case and join a symptom list into one query document.
pub(crate) fn join_symptoms<S: AsRef<str>>(symptoms: &[S]) -> String {
    symptoms
        .iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split text into lower-cased runs of word characters, keeping runs of two or more.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_knowledge::{Condition, UrgencyLevel};

    const EPSILON: f64 = 1e-9;

    fn bundled_index() -> (KnowledgeBase, SimilarityIndex) {
        let kb = KnowledgeBase::bundled().expect("bundled table");
        let index = SimilarityIndex::build(&kb).expect("index builds");
        (kb, index)
    }

    #[test]
    fn tokenizer_drops_single_characters_and_punctuation() {
        assert_eq!(tokenize("Chest X-ray, FEVER"), ["chest", "ray", "fever"]);
        assert_eq!(tokenize("  "), Vec::<String>::new());
        assert_eq!(tokenize("night_sweats"), ["night_sweats"]);
    }

    #[test]
    fn smoothed_idf_matches_formula() {
        // Term present in every document still carries weight 1.
        assert!((smoothed_idf(10.0, 10.0) - 1.0).abs() < EPSILON);
        let expected = (11.0_f64 / 2.0).ln() + 1.0;
        assert!((smoothed_idf(10.0, 1.0) - expected).abs() < EPSILON);
    }

    #[test]
    fn empty_knowledge_base_cannot_be_indexed() {
        let kb = KnowledgeBase::from_conditions(Vec::new()).expect("empty table");
        let err = SimilarityIndex::build(&kb).expect_err("empty");
        assert!(matches!(err, CoreError::EmptyKnowledgeBase));
    }

    #[test]
    fn every_condition_is_maximally_similar_to_itself() {
        let (kb, index) = bundled_index();
        for (position, condition) in kb.iter().enumerate() {
            let scores = index.score(&[condition.symptom_text()]);
            let own = scores[position].similarity;
            assert!(
                (own - 1.0).abs() < EPSILON,
                "{} self-similarity was {own}",
                condition.name()
            );
        }
    }

    #[test]
    fn scores_are_within_unit_interval() {
        let (kb, index) = bundled_index();
        let queries: [&[&str]; 4] = [
            &["fever", "chills"],
            &["chest pain", "cough", "cough", "cough"],
            &["sensitivity to light"],
            &["completely unrelated words"],
        ];
        for query in queries {
            let scores = index.score(query);
            assert_eq!(scores.len(), kb.len());
            for score in scores {
                assert!((0.0..=1.0).contains(&score.similarity));
            }
        }
    }

    #[test]
    fn empty_query_scores_zero_everywhere() {
        let (_, index) = bundled_index();
        let scores = index.score::<&str>(&[]);
        assert!(scores.iter().all(|s| s.similarity == 0.0));

        let unknown = index.score(&["xyzzy"]);
        assert!(unknown.iter().all(|s| s.similarity == 0.0));
    }

    #[test]
    fn query_is_case_insensitive() {
        let (_, index) = bundled_index();
        let lower = index.score(&["fever", "chills"]);
        let upper = index.score(&["FEVER", "Chills"]);
        assert_eq!(lower, upper);
    }

    #[test]
    fn scoring_is_bit_reproducible() {
        let (kb, first) = bundled_index();
        let second = SimilarityIndex::build(&kb).expect("rebuild");
        let query = ["cough", "fever", "chest pain"];
        let a: Vec<u64> = first.score(&query).iter().map(|s| s.similarity.to_bits()).collect();
        let b: Vec<u64> = second.score(&query).iter().map(|s| s.similarity.to_bits()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn unseen_terms_do_not_extend_vocabulary() {
        let (_, index) = bundled_index();
        let before = index.vocabulary_len();
        let _ = index.score(&["hiccups"]);
        assert_eq!(index.vocabulary_len(), before);
        assert!(!index.contains_term("hiccups"));
        assert!(index.contains_term("fever"));
    }

    #[test]
    fn rarer_terms_outweigh_common_ones() {
        let kb = KnowledgeBase::from_conditions(vec![
            Condition::new("a", UrgencyLevel::Low, ["fever rash"], ["Rest"]).expect("a"),
            Condition::new("b", UrgencyLevel::Low, ["fever cough"], ["Rest"]).expect("b"),
        ])
        .expect("table");
        let index = SimilarityIndex::build(&kb).expect("index");

        let scores = index.score(&["fever rash"]);
        assert!(scores[0].similarity > scores[1].similarity);
        assert!(scores[1].similarity > 0.0);
    }

    #[test]
    fn zero_vector_has_zero_cosine() {
        let (_, index) = bundled_index();
        let zero = index.vectorize("");
        assert!(zero.is_zero());
        let fever = index.vectorize("fever");
        assert_eq!(zero.cosine(&fever), 0.0);
        assert!((fever.cosine(&fever) - 1.0).abs() < EPSILON);
    }
}
