//! # docqa CLI
//!
//! ## Usage
//!
//! ```bash
//! docqa --config ./config/docqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa ask <file> <question>` | Load, retrieve, generate (if enabled), print the answer |
//! | `docqa context <file> <question>` | Retrieval only: ranked sentences and assembled context |
//! | `docqa sentences <file>` | Print the segmented sentence corpus |
//! | `docqa chat <file>` | Load once, answer questions read line by line from stdin |
//!
//! When the config file does not exist, built-in defaults are used:
//! lexical retrieval, no generator, no translation.

use clap::{Parser, Subcommand};
use docqa::commands::{self, RetrievalOverrides};
use docqa::config;
use docqa::logging;
use docqa_core::rank::Strategy;
use std::path::PathBuf;

/// docqa: extract answers to questions from a single document.
#[derive(Parser)]
#[command(
    name = "docqa",
    about = "docqa: extract answers to questions from a single document",
    version,
    long_about = "docqa splits a text, PDF, or DOCX document into sentences, ranks them \
    against a question by keyword overlap or TF-IDF similarity, and assembles a length-bounded \
    context. An optional generator (Ollama or OpenAI) rewrites the context into an answer."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docqa.toml`. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "./config/docqa.toml")]
    config: PathBuf,

    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Ranking strategy: `lexical` or `tfidf`.
    #[arg(long, global = true)]
    strategy: Option<Strategy>,

    /// Number of sentences kept by the tfidf strategy.
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Character budget for the assembled context.
    #[arg(long, global = true)]
    max_output_length: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question about a document.
    Ask {
        /// Document to load (.txt, .md, .pdf, .docx, ...).
        file: PathBuf,
        /// The question.
        question: String,
    },

    /// Show the ranked sentences and assembled context for a question.
    Context {
        file: PathBuf,
        question: String,
        /// Print the retrieval result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the document's sentences with their indices.
    Sentences { file: PathBuf },

    /// Answer questions read from stdin, one per line, until EOF or `quit`.
    Chat { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let overrides = RetrievalOverrides {
        strategy: cli.strategy,
        top_k: cli.top_k,
        max_output_length: cli.max_output_length,
    };
    let cfg = overrides.apply(config::load_config_or_default(&cli.config)?)?;

    match cli.command {
        Commands::Ask { file, question } => {
            commands::run_ask(cfg, &file, &question)?;
        }
        Commands::Context {
            file,
            question,
            json,
        } => {
            commands::run_context(cfg, &file, &question, json)?;
        }
        Commands::Sentences { file } => {
            commands::run_sentences(cfg, &file)?;
        }
        Commands::Chat { file } => {
            commands::run_chat(cfg, &file)?;
        }
    }

    Ok(())
}
