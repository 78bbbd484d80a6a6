//! Prompt templating.

const QUESTION_PLACEHOLDER: &str = "{question}";
const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Substitute `{question}` and `{context}` in `template`.
///
/// Both placeholders are replaced in one pass over the template, so braces
/// inside the question or the context are copied verbatim. Context text is
/// trimmed of its trailing separator.
pub fn render(template: &str, question: &str, context: &str) -> String {
    let question = question.trim();
    let context = context.trim_end();
    let mut out = String::with_capacity(template.len() + question.len() + context.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(QUESTION_PLACEHOLDER) {
            out.push_str(question);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
            out.push_str(context);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Second-pass prompt: the question followed by the first-pass answer.
pub fn refine_prompt(question: &str, answer: &str) -> String {
    format!("{}\n\n{}", question.trim(), answer.trim())
}
