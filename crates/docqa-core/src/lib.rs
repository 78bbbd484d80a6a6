//! # docqa Core
//!
//! Retrieval and context-assembly logic for docqa: text normalization,
//! entity hints, the sentence corpus, relevance ranking, context budgeting,
//! prompt chunking, and the retry dispatcher that fronts an external
//! answer generator.
//!
//! This crate performs no filesystem or network I/O. Collaborators that do
//! (generators, translators, taggers, segmenters) are traits implemented by
//! the `docqa` application crate or by tests.
//!
//! ## Pipeline
//!
//! ```text
//! raw text ──▶ segment ──▶ Corpus ─────────────┐
//!                                              ▼
//! question ──▶ normalize + entities ──▶ Ranker ──▶ budget ──▶ chunk ──▶ dispatch
//! ```

pub mod budget;
pub mod chunk;
pub mod corpus;
pub mod dispatch;
pub mod entities;
pub mod error;
pub mod language;
pub mod models;
pub mod normalize;
pub mod rank;
pub mod segment;
pub mod tfidf;
pub mod translate;

pub use error::CoreError;
