//! Error types for loading documents and profiles.

use usdm_kernel::DocumentError;

#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
