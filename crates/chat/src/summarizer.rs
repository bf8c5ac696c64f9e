//! Query reformulation over the chat-history window.
//!
//! Retrieval quality collapses when a follow-up like "how much is too much?"
//! is searched verbatim, so when history exists the question is rewritten
//! into a standalone natural-language query by one completion call. Callers
//! must skip this step entirely when the window is empty — the original
//! question is the retrieval query then, with no service call made.

use tracing::debug;
use wellspring_core::error::ServiceError;
use wellspring_core::{CompletionClient, ModelId, Turn};

use crate::prompt::render_history;

/// Rewrite `question` as a standalone retrieval query incorporating
/// `history`. `history` must be non-empty.
pub async fn summarize(
    completion: &dyn CompletionClient,
    model: ModelId,
    history: &[Turn],
    question: &str,
) -> Result<String, ServiceError> {
    let prompt = build_prompt(history, question);
    let raw = completion.complete(model, &prompt).await?;
    let query = strip_wrapping_quotes(&raw).to_string();

    debug!(query_len = query.len(), "Reformulated retrieval query");
    Ok(query)
}

fn build_prompt(history: &[Turn], question: &str) -> String {
    format!(
        "Based on the chat history below and the question, generate a query that extends the \
         question with the chat history provided. The query should be in natural language.\n\
         Answer with only the query. Do not add any explanation.\n\
         \n\
         <chat_history>\n\
         {history}\n\
         </chat_history>\n\
         <question>\n\
         {question}\n\
         </question>",
        history = render_history(history),
        question = question,
    )
}

/// Models regularly wrap the rewritten query in quote characters; strip them
/// along with surrounding whitespace.
fn strip_wrapping_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(['"', '\''])
}
