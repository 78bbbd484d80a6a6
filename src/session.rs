//! The question/answer session.
//!
//! A [`Session`] owns one loaded document plus every collaborator needed to
//! answer questions about it. Nothing is shared between sessions.
//!
//! # Loading
//!
//! With `translation.translate_document`, the extracted text is translated
//! to English chunk by chunk (and optionally written to
//! `output.translated_document_path`) before non-ASCII cleaning and
//! segmentation.
//!
//! # Answer Flow
//!
//! 1. Optionally translate the question to English, then build the
//!    [`Query`] (stems + entity hints) and rank corpus sentences.
//! 2. Assemble the ranked sentences under the character budget.
//! 3. Without a generator, the assembled context is the answer.
//! 4. Otherwise render the prompt, chunk it, optionally translate
//!    non-ASCII chunks to English, and dispatch each chunk; answered
//!    chunks are concatenated.
//! 5. Optionally refine: send the question plus the combined answer back
//!    for a final pass.
//! 6. Optionally translate the answer into the output language.
//! 7. Write the configured checkpoint files. A failed write is logged and
//!    the answer is still returned.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use docqa_core::budget::{assemble, AssembledContext};
use docqa_core::chunk::chunk;
use docqa_core::corpus::{Corpus, DocumentState};
use docqa_core::dispatch::{
    CancelToken, DispatchOutcome, Dispatcher, Generator, RetryPolicy, Sleeper,
};
use docqa_core::entities::EntityHinter;
use docqa_core::language::LanguageResources;
use docqa_core::models::{Document, Query, Sentence};
use docqa_core::normalize::Normalizer;
use docqa_core::rank::Ranker;
use docqa_core::segment::{RuleSegmenter, SentenceSegmenter};
use docqa_core::normalize::clean_non_ascii;
use docqa_core::translate::{
    translate_chunked, translate_non_ascii_chunks, translate_or_keep, Translator,
};
use serde::Serialize;

use crate::config::Config;
use crate::generator::{create_generator, generation_params};
use crate::loader::load_document;
use crate::output::write_checkpoint;
use crate::prompt::{refine_prompt, render};
use crate::translator::create_translator;

/// Shown when the generator refuses the prompt.
pub const POLICY_REJECTION_MESSAGE: &str = "The question may conflict with the answer service's \
usage policy. Please rephrase it without disallowed topics or ask something different.";

/// Shown when no sentence of the document matches the question.
pub const NO_CONTEXT_MESSAGE: &str = "No passage in the document matches the question.";

pub const CANCELLED_MESSAGE: &str = "The request was cancelled.";

/// Language questions, documents, and non-ASCII prompt chunks are
/// translated into before retrieval and generation.
const WORKING_LANGUAGE: &str = "en";

/// A ranked sentence, detached from the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentence {
    pub index: usize,
    pub score: f64,
    pub text: String,
}

/// Everything retrieval produced for one question.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    pub question: String,
    /// The question in English, when question translation is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_question: Option<String>,
    pub strategy: &'static str,
    pub keywords: Vec<String>,
    pub candidates: Vec<ScoredSentence>,
    pub context: AssembledContext,
}

impl Retrieval {
    /// The question text used for ranking and prompting.
    pub fn query_text(&self) -> &str {
        self.translated_question.as_deref().unwrap_or(&self.question)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// No generator configured; the answer is the assembled context.
    Extracted,
    /// Nothing in the document matched.
    NoContext,
    Generated,
    Rejected,
    Exhausted,
    /// The generator errored; the answer is the best text known before it.
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub status: AnswerStatus,
    pub text: String,
    /// `text` in the configured output language, when translation is on.
    pub translated: Option<String>,
    pub retrieval: Retrieval,
}

impl Answer {
    /// The text to present: the translation when there is one.
    pub fn display_text(&self) -> &str {
        self.translated.as_deref().unwrap_or(&self.text)
    }
}

pub struct Session {
    config: Config,
    normalizer: Normalizer,
    hinter: EntityHinter,
    segmenter: Box<dyn SentenceSegmenter>,
    ranker: Box<dyn Ranker>,
    generator: Option<Box<dyn Generator>>,
    translator: Box<dyn Translator>,
    dispatcher: Dispatcher,
    state: DocumentState,
}

impl Session {
    /// Build a session with the HTTP collaborators named in `config`.
    pub fn new(config: Config) -> Result<Self> {
        let generator = create_generator(&config.generator)?;
        let translator = create_translator(&config.translation)?;
        Ok(Self::with_collaborators(config, generator, translator))
    }

    /// Build a session around caller-supplied collaborators.
    pub fn with_collaborators(
        config: Config,
        generator: Option<Box<dyn Generator>>,
        translator: Box<dyn Translator>,
    ) -> Self {
        let resources = Arc::new(LanguageResources::new(config.retrieval.language));
        let policy = RetryPolicy {
            sentinel: config.generator.failure_sentinel.clone(),
            backoff: Duration::from_secs(config.generator.backoff_secs),
            max_attempts: config.generator.max_attempts,
        };
        let dispatcher = Dispatcher::new(policy, generation_params(&config.generator));
        let ranker = config.retrieval.strategy.ranker(config.retrieval.top_k);

        Self {
            normalizer: Normalizer::with_resources(resources.clone()),
            hinter: EntityHinter::heuristic(resources),
            segmenter: Box::new(RuleSegmenter::new()),
            ranker,
            generator,
            translator,
            dispatcher,
            state: DocumentState::Unloaded,
            config,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.dispatcher = self.dispatcher.with_sleeper(sleeper);
        self
    }

    pub fn with_segmenter(mut self, segmenter: Box<dyn SentenceSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Token that cancels an in-progress answer at its next backoff.
    pub fn cancel_token(&self) -> CancelToken {
        self.dispatcher.cancel_token()
    }

    /// Load a file, replacing any previously loaded document.
    pub fn load_path(&mut self, path: &Path) -> Result<&Document> {
        let document = load_document(path, self.segmenter.as_ref(), |text| {
            self.prepare_text(text)
        })?;
        self.install(document)
    }

    /// Load in-memory text, replacing any previously loaded document.
    pub fn load_text(&mut self, source: &str, text: &str) -> Result<&Document> {
        let text = self.prepare_text(text.to_string());
        let document = Document::new(source, text, self.segmenter.as_ref());
        self.install(document)
    }

    /// Translate and clean loaded text as configured.
    fn prepare_text(&self, mut text: String) -> String {
        if self.config.translation.translate_document {
            text = translate_chunked(
                self.translator.as_ref(),
                &text,
                WORKING_LANGUAGE,
                self.config.prompt.chunk_size,
            );
            if let Some(path) = &self.config.output.translated_document_path {
                checkpoint(path, &text);
            }
        }
        if self.config.retrieval.clean_non_ascii {
            text = clean_non_ascii(&text);
        }
        text
    }

    fn install(&mut self, document: Document) -> Result<&Document> {
        self.state = DocumentState::Loaded(Corpus::new(document, &self.normalizer));
        Ok(self.state.corpus()?.document())
    }

    pub fn unload(&mut self) {
        self.state = DocumentState::Unloaded;
    }

    pub fn sentences(&self) -> Result<&[Sentence]> {
        Ok(self.state.corpus()?.sentences())
    }

    /// Rank and budget sentences for `question` without generating.
    pub fn retrieve(&self, question: &str) -> Result<Retrieval> {
        let corpus = self.state.corpus()?;
        let translated_question = self.config.translation.translate_question.then(|| {
            translate_or_keep(self.translator.as_ref(), question.trim(), WORKING_LANGUAGE)
        });
        let query_text = translated_question.as_deref().unwrap_or(question);
        let query = Query::new(query_text, &self.normalizer, &self.hinter);
        let candidates = self.ranker.rank(corpus, &query);
        let context = assemble(&candidates, self.config.retrieval.max_output_length);

        tracing::debug!(
            strategy = self.ranker.name(),
            keywords = query.keywords.len(),
            entities = query.entities.len(),
            candidates = candidates.len(),
            "retrieved context"
        );

        Ok(Retrieval {
            question: question.to_string(),
            translated_question,
            strategy: self.ranker.name(),
            keywords: query.keywords.iter().map(String::from).collect(),
            candidates: candidates
                .iter()
                .map(|c| ScoredSentence {
                    index: c.index(),
                    score: c.score,
                    text: c.text().to_string(),
                })
                .collect(),
            context,
        })
    }

    /// Answer `question` against the loaded document.
    ///
    /// Fails only when no document is loaded. Collaborator failures are
    /// reflected in [`Answer::status`].
    pub fn ask(&self, question: &str) -> Result<Answer> {
        let retrieval = self.retrieve(question)?;

        let (status, text) = if retrieval.context.is_empty() {
            (AnswerStatus::NoContext, NO_CONTEXT_MESSAGE.to_string())
        } else {
            match &self.generator {
                None => (
                    AnswerStatus::Extracted,
                    retrieval.context.text.trim_end().to_string(),
                ),
                Some(generator) => self.generate_answer(
                    generator.as_ref(),
                    retrieval.query_text(),
                    &retrieval.context,
                ),
            }
        };

        let translated = self.translate_answer(&text);

        if let Some(path) = &self.config.output.response_path {
            checkpoint(path, &text);
        }
        if let (Some(path), Some(translated)) =
            (&self.config.output.translated_response_path, &translated)
        {
            checkpoint(path, translated);
        }

        tracing::info!(
            status = ?status,
            chars = text.chars().count(),
            translated = translated.is_some(),
            "answered question"
        );

        Ok(Answer {
            status,
            text,
            translated,
            retrieval,
        })
    }

    fn generate_answer(
        &self,
        generator: &dyn Generator,
        question: &str,
        context: &AssembledContext,
    ) -> (AnswerStatus, String) {
        let prompt = render(&self.config.prompt.template, question, &context.text);
        let pieces = chunk(&prompt, self.config.prompt.chunk_size);
        let pieces: Vec<String> = if self.config.prompt.translate_non_ascii {
            translate_non_ascii_chunks(self.translator.as_ref(), &pieces, WORKING_LANGUAGE)
        } else {
            pieces.into_iter().map(String::from).collect()
        };
        tracing::debug!(chunks = pieces.len(), "dispatching prompt chunks");

        let extracted = context.text.trim_end();
        let mut combined = String::new();
        let mut first_miss: Option<DispatchOutcome> = None;

        for (i, piece) in pieces.iter().enumerate() {
            let best = if combined.is_empty() {
                extracted
            } else {
                combined.as_str()
            };
            match self.dispatcher.dispatch(generator, piece, Some(best)) {
                DispatchOutcome::Answered(text) => combined.push_str(&text),
                DispatchOutcome::Cancelled => {
                    return (AnswerStatus::Cancelled, CANCELLED_MESSAGE.to_string())
                }
                DispatchOutcome::Failed { fallback, .. } => return (AnswerStatus::Failed, fallback),
                miss => {
                    tracing::warn!(chunk = i, outcome = ?miss, "prompt chunk not answered");
                    first_miss.get_or_insert(miss);
                }
            }
        }

        if combined.is_empty() {
            if let Some(miss) = first_miss {
                return unanswered(miss);
            }
        }

        if self.config.prompt.refine {
            let prompt = refine_prompt(question, &combined);
            match self.dispatcher.dispatch(generator, &prompt, Some(&combined)) {
                DispatchOutcome::Answered(text) => combined = text,
                DispatchOutcome::Rejected => {
                    return (AnswerStatus::Rejected, POLICY_REJECTION_MESSAGE.to_string())
                }
                DispatchOutcome::Cancelled => {
                    return (AnswerStatus::Cancelled, CANCELLED_MESSAGE.to_string())
                }
                other => {
                    tracing::warn!(outcome = ?other, "refine pass failed, keeping first answer")
                }
            }
        }

        (AnswerStatus::Generated, combined)
    }

    fn translate_answer(&self, text: &str) -> Option<String> {
        let target = self.config.translation.output_language.trim();
        if target.is_empty() || text.is_empty() {
            return None;
        }
        Some(translate_chunked(
            self.translator.as_ref(),
            text,
            target,
            self.config.prompt.chunk_size,
        ))
    }
}

/// Write a checkpoint file, logging instead of failing.
fn checkpoint(path: &Path, text: &str) {
    if let Err(e) = write_checkpoint(path, text) {
        tracing::warn!(path = %path.display(), "checkpoint not written: {:#}", e);
    }
}

fn unanswered(outcome: DispatchOutcome) -> (AnswerStatus, String) {
    match outcome {
        DispatchOutcome::Rejected => (AnswerStatus::Rejected, POLICY_REJECTION_MESSAGE.to_string()),
        DispatchOutcome::Exhausted { attempts } => (
            AnswerStatus::Exhausted,
            format!(
                "The answer service was still busy after {} attempts. Please ask again later.",
                attempts
            ),
        ),
        DispatchOutcome::Answered(text) => (AnswerStatus::Generated, text),
        DispatchOutcome::Failed { fallback, .. } => (AnswerStatus::Failed, fallback),
        DispatchOutcome::Cancelled => (AnswerStatus::Cancelled, CANCELLED_MESSAGE.to_string()),
    }
}
