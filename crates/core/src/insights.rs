//! Population-level insights over a snapshot of patient records.
//!
//! Aggregation is deterministic: frequency rankings sort by descending count and break
//! ties by first appearance in the snapshot.
//!
//! The urgency distribution is reported with all four levels present but is not derived
//! from the records; it stays zero unless a caller fills it from stored triage outcomes.

use crate::constants::{TOP_SYMPTOM_LIMIT, UTILIZATION_TREND_THRESHOLD};
use crate::facilities::FacilityStatistics;
use crate::store::PatientRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use triage_types::UrgencyLevel;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomCount {
    pub symptom: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Case counts per urgency level, serialised most severe first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl UrgencyDistribution {
    pub fn count(&self, level: UrgencyLevel) -> usize {
        match level {
            UrgencyLevel::Critical => self.critical,
            UrgencyLevel::High => self.high,
            UrgencyLevel::Medium => self.medium,
            UrgencyLevel::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        UrgencyLevel::DESCENDING
            .into_iter()
            .map(|level| self.count(level))
            .sum()
    }
}

/// Demographic breakdown of the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStatistics {
    pub total_patients: usize,
    /// Mean over records that carry an age; `None` when none do.
    pub average_age: Option<f64>,
    /// Lower-cased gender values.
    pub gender_distribution: Vec<ValueCount>,
    pub location_distribution: Vec<ValueCount>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub total_cases: usize,
    pub top_symptoms: Vec<SymptomCount>,
    pub urgency_distribution: UrgencyDistribution,
    pub population: PopulationStatistics,
}

/// Stateless fold from patient records to an [`InsightsSummary`].
#[derive(Clone, Copy, Debug, Default)]
pub struct InsightsAggregator;

impl InsightsAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, records: &[PatientRecord]) -> InsightsSummary {
        let mut symptoms = FrequencyCounter::default();
        let mut genders = FrequencyCounter::default();
        let mut locations = FrequencyCounter::default();
        let mut age_sum = 0.0;
        let mut aged_records = 0usize;

        for record in records {
            for symptom in &record.symptoms {
                symptoms.add(symptom.to_lowercase());
            }
            if let Some(gender) = &record.gender {
                genders.add(gender.to_lowercase());
            }
            if let Some(location) = &record.location {
                locations.add(location.clone());
            }
            if let Some(age) = record.age {
                age_sum += f64::from(age);
                aged_records += 1;
            }
        }

        let top_symptoms = symptoms
            .ranked()
            .into_iter()
            .take(TOP_SYMPTOM_LIMIT)
            .map(|(symptom, count)| SymptomCount { symptom, count })
            .collect();

        let average_age = (aged_records > 0).then(|| age_sum / aged_records as f64);

        InsightsSummary {
            total_cases: records.len(),
            top_symptoms,
            urgency_distribution: UrgencyDistribution::default(),
            population: PopulationStatistics {
                total_patients: records.len(),
                average_age,
                gender_distribution: genders.into_value_counts(),
                location_distribution: locations.into_value_counts(),
            },
        }
    }
}

/// Direction a headline metric is moving in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightTrend {
    Stable,
    Increasing,
}

/// One headline metric for the health overview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthInsight {
    pub metric_name: String,
    pub value: f64,
    pub trend: InsightTrend,
}

impl HealthInsight {
    fn new(metric_name: &str, value: f64, trend: InsightTrend) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            value,
            trend,
        }
    }
}

/// Headline metrics over patient and facility statistics.
///
/// Patient metrics appear only when there is at least one patient, and the utilization
/// metric only when there is at least one facility.
pub fn health_metrics(
    population: &PopulationStatistics,
    facilities: &FacilityStatistics,
) -> Vec<HealthInsight> {
    let mut metrics = Vec::new();

    if population.total_patients > 0 {
        metrics.push(HealthInsight::new(
            "Total Patients",
            population.total_patients as f64,
            InsightTrend::Stable,
        ));
        metrics.push(HealthInsight::new(
            "Average Patient Age",
            population.average_age.unwrap_or(0.0),
            InsightTrend::Stable,
        ));
    }

    if facilities.total_facilities > 0 {
        let trend = if facilities.avg_utilization > UTILIZATION_TREND_THRESHOLD {
            InsightTrend::Increasing
        } else {
            InsightTrend::Stable
        };
        metrics.push(HealthInsight::new(
            "Average Facility Utilization",
            facilities.avg_utilization,
            trend,
        ));
    }

    metrics
}

/// Counts keyed by value, remembering first-seen order.
#[derive(Debug, Default)]
struct FrequencyCounter {
    order: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

impl FrequencyCounter {
    fn add(&mut self, value: String) {
        if let Some(&position) = self.positions.get(&value) {
            self.order[position].1 += 1;
        } else {
            self.positions.insert(value.clone(), self.order.len());
            self.order.push((value, 1));
        }
    }

    /// Descending by count; stable, so ties keep first-seen order.
    fn ranked(self) -> Vec<(String, usize)> {
        let mut entries = self.order;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    fn into_value_counts(self) -> Vec<ValueCount> {
        self.ranked()
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symptoms: &[&str]) -> PatientRecord {
        PatientRecord::with_symptoms(symptoms.iter().copied())
    }

    #[test]
    fn counts_symptoms_case_insensitively() {
        let records = vec![
            record(&["Fever", "cough"]),
            record(&["fever", "Headache"]),
            record(&["FEVER"]),
        ];
        let summary = InsightsAggregator::new().aggregate(&records);

        assert_eq!(summary.total_cases, 3);
        assert_eq!(
            summary.top_symptoms[0],
            SymptomCount {
                symptom: "fever".into(),
                count: 3
            }
        );
        assert_eq!(summary.top_symptoms.len(), 3);
    }

    #[test]
    fn ties_break_by_first_seen_order() {
        let records = vec![
            record(&["nausea", "cough"]),
            record(&["cough", "rash", "nausea"]),
            record(&["rash", "dizziness"]),
        ];
        let summary = InsightsAggregator::new().aggregate(&records);
        let order: Vec<(&str, usize)> = summary
            .top_symptoms
            .iter()
            .map(|s| (s.symptom.as_str(), s.count))
            .collect();

        assert_eq!(
            order,
            [("nausea", 2), ("cough", 2), ("rash", 2), ("dizziness", 1)]
        );
    }

    #[test]
    fn keeps_only_top_ten_symptoms() {
        let symptoms: Vec<String> = (0..15).map(|i| format!("symptom {i:02}")).collect();
        let records = vec![PatientRecord::with_symptoms(symptoms.clone())];
        let summary = InsightsAggregator::new().aggregate(&records);

        assert_eq!(summary.top_symptoms.len(), TOP_SYMPTOM_LIMIT);
        assert_eq!(summary.top_symptoms[0].symptom, "symptom 00");
        assert_eq!(summary.top_symptoms[9].symptom, "symptom 09");
    }

    #[test]
    fn urgency_distribution_has_all_levels_at_zero() {
        let records = vec![record(&["chest pain", "difficulty breathing"])];
        let summary = InsightsAggregator::new().aggregate(&records);

        for level in UrgencyLevel::DESCENDING {
            assert_eq!(summary.urgency_distribution.count(level), 0);
        }
        assert_eq!(summary.urgency_distribution.total(), 0);

        let json = serde_json::to_value(summary.urgency_distribution).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({"critical": 0, "high": 0, "medium": 0, "low": 0})
        );
    }

    #[test]
    fn empty_snapshot_yields_empty_summary() {
        let summary = InsightsAggregator::new().aggregate(&[]);
        assert_eq!(summary.total_cases, 0);
        assert!(summary.top_symptoms.is_empty());
        assert_eq!(summary.population.average_age, None);
        assert!(summary.population.gender_distribution.is_empty());
    }

    #[test]
    fn population_statistics() {
        let records = vec![
            PatientRecord {
                age: Some(35),
                gender: Some("Male".into()),
                location: Some("Lagos, Nigeria".into()),
                ..record(&["fever"])
            },
            PatientRecord {
                age: Some(68),
                gender: Some("female".into()),
                location: Some("Nairobi, Kenya".into()),
                ..record(&["cough"])
            },
            PatientRecord {
                age: None,
                gender: Some("male".into()),
                location: Some("Nairobi, Kenya".into()),
                ..record(&["rash"])
            },
        ];
        let population = InsightsAggregator::new().aggregate(&records).population;

        assert_eq!(population.total_patients, 3);
        let average = population.average_age.expect("two records carry an age");
        assert!((average - 51.5).abs() < 1e-12);
        assert_eq!(
            population.gender_distribution,
            [
                ValueCount {
                    value: "male".into(),
                    count: 2
                },
                ValueCount {
                    value: "female".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(population.location_distribution[0].value, "Nairobi, Kenya");
        assert_eq!(population.location_distribution[0].count, 2);
    }

    fn facility_stats(avg_utilization: f64) -> FacilityStatistics {
        FacilityStatistics {
            total_facilities: 2,
            avg_capacity: 80.0,
            avg_utilization,
            total_staff: 30,
        }
    }

    fn utilization_trend(avg_utilization: f64) -> InsightTrend {
        let metrics = health_metrics(
            &PopulationStatistics::default(),
            &facility_stats(avg_utilization),
        );
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].metric_name, "Average Facility Utilization");
        metrics[0].trend
    }

    #[test]
    fn utilization_trend_turns_increasing_above_seventy_percent() {
        assert_eq!(utilization_trend(69.9), InsightTrend::Stable);
        assert_eq!(utilization_trend(70.0), InsightTrend::Stable);
        assert_eq!(utilization_trend(70.01), InsightTrend::Increasing);
        assert_eq!(utilization_trend(95.0), InsightTrend::Increasing);
    }

    #[test]
    fn health_metrics_cover_patients_and_facilities() {
        let population = PopulationStatistics {
            total_patients: 4,
            average_age: Some(42.5),
            ..PopulationStatistics::default()
        };
        let metrics = health_metrics(&population, &facility_stats(55.0));

        let names: Vec<&str> = metrics.iter().map(|m| m.metric_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Total Patients",
                "Average Patient Age",
                "Average Facility Utilization"
            ]
        );
        assert_eq!(metrics[0].value, 4.0);
        assert_eq!(metrics[1].value, 42.5);
        assert!(metrics.iter().all(|m| m.trend == InsightTrend::Stable));
    }

    #[test]
    fn health_metrics_skip_empty_sides() {
        let none = health_metrics(
            &PopulationStatistics::default(),
            &FacilityStatistics::default(),
        );
        assert!(none.is_empty());

        let population = PopulationStatistics {
            total_patients: 1,
            average_age: None,
            ..PopulationStatistics::default()
        };
        let metrics = health_metrics(&population, &FacilityStatistics::default());
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[1].value, 0.0);
    }

    #[test]
    fn health_insight_serialises_trend_in_lowercase() {
        let json = serde_json::to_value(HealthInsight::new(
            "Average Facility Utilization",
            80.0,
            InsightTrend::Increasing,
        ))
        .expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "metric_name": "Average Facility Utilization",
                "value": 80.0,
                "trend": "increasing"
            })
        );
    }
}
