//! Command runners behind the `docqa` subcommands.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use docqa_core::rank::Strategy;

use crate::config::{self, Config};
use crate::session::{Answer, Retrieval, Session};

/// Retrieval settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RetrievalOverrides {
    pub strategy: Option<Strategy>,
    pub top_k: Option<usize>,
    pub max_output_length: Option<usize>,
}

impl RetrievalOverrides {
    /// Apply the overrides to `config` and re-validate it.
    pub fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(strategy) = self.strategy {
            config.retrieval.strategy = strategy;
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }
        if let Some(max) = self.max_output_length {
            config.retrieval.max_output_length = max;
        }
        config::validate(&config)?;
        Ok(config)
    }
}

fn open_session(config: Config, file: &Path) -> Result<Session> {
    let mut session = Session::new(config)?;
    session.load_path(file)?;
    Ok(session)
}

pub fn run_ask(config: Config, file: &Path, question: &str) -> Result<()> {
    let session = open_session(config, file)?;
    let answer = session.ask(question)?;
    println!("{}", answer.display_text());
    Ok(())
}

pub fn run_context(config: Config, file: &Path, question: &str, json: bool) -> Result<()> {
    let session = open_session(config, file)?;
    let retrieval = session.retrieve(question)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&retrieval)?);
        return Ok(());
    }

    print_retrieval(&retrieval, session.config().retrieval.max_output_length);
    Ok(())
}

fn print_retrieval(retrieval: &Retrieval, max_output_length: usize) {
    if retrieval.candidates.is_empty() {
        println!("No results.");
        return;
    }

    for (i, c) in retrieval.candidates.iter().enumerate() {
        let marker = if retrieval.context.included.contains(&c.index) {
            ""
        } else {
            " (over budget)"
        };
        println!("{}. [{:.2}] sentence {}{}", i + 1, c.score, c.index, marker);
        println!("    \"{}\"", c.text.replace('\n', " ").trim());
    }
    println!();
    println!(
        "--- Context ({}/{} chars) ---",
        retrieval.context.used, max_output_length
    );
    print!("{}", retrieval.context.text);
}

pub fn run_sentences(config: Config, file: &Path) -> Result<()> {
    let session = open_session(config, file)?;
    for sentence in session.sentences()? {
        println!("[{}] {}", sentence.index, sentence.text.replace('\n', " "));
    }
    Ok(())
}

/// Answer one question per input line until EOF, `exit`, or `quit`.
pub fn run_chat(config: Config, file: &Path) -> Result<()> {
    let session = open_session(config, file)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    chat_loop(&session, stdin.lock(), stdout.lock())
}

pub fn chat_loop<R: BufRead, W: Write>(session: &Session, input: R, mut output: W) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read question")?;
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        let answer: Answer = session.ask(question)?;
        writeln!(output, "{}", answer.display_text())?;
        writeln!(output)?;
        output.flush()?;
    }
    Ok(())
}
