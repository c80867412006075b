use thiserror::Error;

/// Core domain errors
///
/// Validation failures are detected before any network call; upstream
/// failures carry the vendor message where it is safe to pass through.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("API key is required")]
    MissingCredential,

    #[error("Provider {id} not found")]
    UnknownProvider { id: String },

    #[error("Model {model} not found for provider {provider}")]
    UnknownModel { provider: String, model: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Response did not match the requested schema: {message}")]
    SchemaViolation { message: String },

    #[error("{provider} rejected the request: {message}")]
    UpstreamRejected { provider: String, message: String },

    #[error("{provider} is unreachable: {message}")]
    UpstreamUnavailable { provider: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn unknown_provider(id: impl Into<String>) -> Self {
        Self::UnknownProvider { id: id.into() }
    }

    pub fn unknown_model(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self::UnknownModel {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            message: message.into(),
        }
    }

    pub fn upstream_rejected(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamRejected {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn upstream_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
