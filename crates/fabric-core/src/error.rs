use thiserror::Error;

/// Top-level error type for the data fabric.
#[derive(Error, Debug)]
pub enum FabricError {
    #[error("Endpoint not found: {entity_type} {entity_id}")]
    EndpointNotFound {
        entity_type: String,
        entity_id: String,
    },

    #[error("Policy denied: {0}")]
    PolicyDenied(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown query type: {0}")]
    UnknownQueryType(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FabricError>;
