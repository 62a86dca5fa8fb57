use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required URL parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object of parameter values")]
    NotAnObject,

    #[error("Unsupported HTTP method: {0}")]
    UnknownMethod(String),

    #[error("Unknown platform: {0} (expected '3ts' or 'gold')")]
    UnknownPlatform(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Catalog endpoint {endpoint} uses undeclared placeholder {{{placeholder}}}")]
    UndeclaredPlaceholder {
        endpoint: String,
        placeholder: String,
    },

    #[error("Failed to access settings at {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
