//! # docqa
//!
//! Ask questions about a single document from the command line.
//!
//! docqa loads a text, PDF, or DOCX file, splits it into sentences, and
//! answers each question with the sentences most relevant to it. An
//! external generator (Ollama or OpenAI) can optionally rewrite that
//! extracted context into a prose answer, and a LibreTranslate server can
//! translate prompts and answers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────┐   ┌───────────┐
//! │  Loader  │──▶│ docqa-core   │──▶│ Session │──▶│ Generator │
//! │ txt/pdf/ │   │ rank+budget  │   │         │   │ (HTTP)    │
//! │ docx     │   └──────────────┘   └────┬────┘   └───────────┘
//! └──────────┘                           │
//!                                        ▼
//!                                 answer + checkpoints
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docqa sentences report.pdf
//! docqa context report.pdf "Who approved the budget?"
//! docqa ask report.pdf "Who approved the budget?"
//! docqa chat report.pdf
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`extract`] | PDF and DOCX text extraction |
//! | [`loader`] | File loading and segmentation |
//! | [`generator`] | Ollama and OpenAI answer generators |
//! | [`translator`] | LibreTranslate client |
//! | [`prompt`] | Prompt templating |
//! | [`session`] | Question/answer pipeline |
//! | [`output`] | Answer checkpoint files |
//! | [`commands`] | CLI command runners |

pub mod commands;
pub mod config;
pub mod extract;
pub mod generator;
pub mod loader;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod session;
pub mod translator;
