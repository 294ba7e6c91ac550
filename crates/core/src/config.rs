//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the triage
//! service. Library code never reads environment variables while handling a request.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;
use triage_knowledge::KnowledgeBase;

/// Where the condition table comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KnowledgeSource {
    /// The table embedded in `triage-knowledge`.
    Bundled,
    /// A YAML file on disk.
    File(PathBuf),
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    knowledge_source: KnowledgeSource,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `knowledge_base_path` of `None` selects the bundled table.
    pub fn new(knowledge_base_path: Option<PathBuf>) -> Self {
        let knowledge_source = match knowledge_base_path {
            Some(path) => KnowledgeSource::File(path),
            None => KnowledgeSource::Bundled,
        };
        Self { knowledge_source }
    }

    pub fn knowledge_source(&self) -> &KnowledgeSource {
        &self.knowledge_source
    }

    /// Load the configured knowledge base.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Knowledge`] if the table cannot be read or parsed.
    pub fn load_knowledge_base(&self) -> CoreResult<KnowledgeBase> {
        let kb = match &self.knowledge_source {
            KnowledgeSource::Bundled => KnowledgeBase::bundled()?,
            KnowledgeSource::File(path) => KnowledgeBase::load(path)?,
        };
        Ok(kb)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Resolve the knowledge-base path without reading environment variables.
///
/// A blank override counts as absent. A non-blank override must name an existing file.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] if the override does not point at a file.
pub fn resolve_knowledge_base_path(override_path: Option<PathBuf>) -> CoreResult<Option<PathBuf>> {
    let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };

    if path.is_file() {
        return Ok(Some(path));
    }

    Err(CoreError::InvalidInput(format!(
        "knowledge base override is not a readable file: {}",
        path.display()
    )))
}
