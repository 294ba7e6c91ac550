#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("knowledge base is empty; the similarity index cannot be built")]
    EmptyKnowledgeBase,
    #[error("knowledge base error: {0}")]
    Knowledge(#[from] triage_knowledge::KnowledgeError),
    #[error("patient store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize records: {0}")]
    Deserialization(serde_json::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
