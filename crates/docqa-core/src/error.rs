//! Error types for the core pipeline.

use thiserror::Error;

/// Errors surfaced by the retrieval pipeline.
///
/// Most collaborator failures never reach this type: they are logged and
/// degraded at the point of call. Only conditions that leave the pipeline
/// with nothing to work on are reported here.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no document loaded")]
    NoDocument,

    #[error("unknown ranking strategy: '{0}'. Must be lexical or tfidf.")]
    UnknownStrategy(String),

    #[error("unknown language: '{0}'. Must be english or spanish.")]
    UnknownLanguage(String),
}
