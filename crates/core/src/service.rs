//! Triage service facade.
//!
//! This is the entry point consumers hold: it is built once at startup from a
//! [`CoreConfig`] and then shared freely across threads.

use crate::engine::{TriageEngine, TriageResult};
use crate::facilities::{FacilityStatistics, FacilityStore};
use crate::insights::{health_metrics, HealthInsight, InsightsAggregator, InsightsSummary};
use crate::request::TriageRequest;
use crate::store::PatientStore;
use crate::validation::validate_triage_request;
use crate::vitals::VitalSigns;
use crate::{CoreConfig, CoreResult};
use std::sync::Arc;
use triage_knowledge::KnowledgeBase;

/// Pure triage and insight operations - no transport concerns.
#[derive(Clone, Debug)]
pub struct TriageService {
    cfg: Arc<CoreConfig>,
    engine: Arc<TriageEngine>,
}

impl TriageService {
    /// Load the configured knowledge base and build the similarity index.
    ///
    /// # Errors
    ///
    /// Returns a `CoreError` if:
    /// - the knowledge base cannot be loaded or parsed,
    /// - the knowledge base is empty.
    pub fn new(cfg: Arc<CoreConfig>) -> CoreResult<Self> {
        let knowledge_base = cfg.load_knowledge_base()?;
        Self::with_knowledge_base(cfg, knowledge_base)
    }

    /// Build the service around an already-loaded table.
    pub fn with_knowledge_base(
        cfg: Arc<CoreConfig>,
        knowledge_base: KnowledgeBase,
    ) -> CoreResult<Self> {
        let engine = TriageEngine::new(knowledge_base)?;
        Ok(Self {
            cfg,
            engine: Arc::new(engine),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// The condition table the service scores against.
    pub fn conditions(&self) -> &KnowledgeBase {
        self.engine.knowledge_base()
    }

    /// See [`TriageEngine::predict_triage`].
    pub fn predict_triage<S: AsRef<str>>(
        &self,
        symptoms: &[S],
        age: i32,
        gender: &str,
        vital_signs: Option<&VitalSigns>,
    ) -> TriageResult {
        self.engine
            .predict_triage(symptoms, age, gender, vital_signs)
    }

    /// Validate an intake request, then triage it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if the request fails intake validation.
    pub fn triage_request(&self, request: &TriageRequest) -> CoreResult<TriageResult> {
        validate_triage_request(request)?;
        Ok(self.predict_triage(
            &request.symptoms,
            request.age,
            &request.gender,
            request.vital_signs.as_ref(),
        ))
    }

    /// Aggregate insights over a snapshot of the given store.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StoreUnavailable` if the store cannot produce a snapshot.
    pub fn get_health_insights(&self, store: &dyn PatientStore) -> CoreResult<InsightsSummary> {
        let records = store.snapshot()?;
        Ok(InsightsAggregator::new().aggregate(&records))
    }

    /// Capacity and staffing statistics over a snapshot of the given facility store.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StoreUnavailable` if the store cannot produce a snapshot.
    pub fn get_facility_insights(
        &self,
        store: &dyn FacilityStore,
    ) -> CoreResult<FacilityStatistics> {
        let records = store.snapshot()?;
        Ok(FacilityStatistics::from_records(&records))
    }

    /// Headline metrics across both stores. See [`health_metrics`].
    ///
    /// # Errors
    ///
    /// Returns `CoreError::StoreUnavailable` if either store cannot produce a snapshot.
    pub fn get_health_metrics(
        &self,
        patients: &dyn PatientStore,
        facilities: &dyn FacilityStore,
    ) -> CoreResult<Vec<HealthInsight>> {
        let population = self.get_health_insights(patients)?.population;
        let facility_stats = self.get_facility_insights(facilities)?;
        Ok(health_metrics(&population, &facility_stats))
    }
}
