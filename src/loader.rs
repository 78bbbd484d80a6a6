//! Document loading: read a file, extract its text, build a [`Document`].

use std::path::Path;

use anyhow::{Context, Result};
use docqa_core::models::Document;
use docqa_core::segment::SentenceSegmenter;

use crate::extract::{extract_text, BinaryFormat};

/// Pick an extractor from the file extension. `None` means plain text.
pub fn detect_format(path: &Path) -> Option<BinaryFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(BinaryFormat::Pdf),
        "docx" => Some(BinaryFormat::Docx),
        _ => None,
    }
}

/// Read the full text of `path`, extracting PDF and DOCX content.
pub fn read_text(path: &Path) -> Result<String> {
    match detect_format(path) {
        Some(format) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read document: {}", path.display()))?;
            let text = extract_text(&bytes, format)
                .with_context(|| format!("Failed to extract text from {}", path.display()))?;
            Ok(text)
        }
        None => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document as UTF-8: {}", path.display())),
    }
}

/// Load `path` into a segmented [`Document`].
///
/// `prepare` rewrites the extracted text before segmentation (translation,
/// non-ASCII cleaning).
pub fn load_document(
    path: &Path,
    segmenter: &dyn SentenceSegmenter,
    prepare: impl FnOnce(String) -> String,
) -> Result<Document> {
    let text = prepare(read_text(path)?);
    let document = Document::new(path.display().to_string(), text, segmenter);
    tracing::info!(
        source = %document.source,
        sentences = document.sentences.len(),
        fingerprint = &document.fingerprint[..12],
        "loaded document"
    );
    Ok(document)
}
