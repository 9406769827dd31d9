//! Crate-wide error type and result alias.
//!
//! Only genuinely exceptional conditions live here. The recoverable match
//! taxonomy — no candidate cleared threshold, malformed edit phrase, stale
//! control handle — is modeled with `Option`/result enums at the call sites
//! and never surfaces as an `EngineError`.

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("data pack error: {0}")]
    DataPack(String),

    #[error("chat backend error: {0}")]
    Backend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
