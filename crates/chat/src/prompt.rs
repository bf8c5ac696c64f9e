//! Grounded prompt assembly.
//!
//! Every answer prompt has the same shape: a persona preamble, the fixed
//! grounding rules, and four delimited regions — chat history, retrieved
//! context, the question, and a trailing answer cue. The persona prose is a
//! deployment choice; the structure and the grounding rules are not.

use wellspring_core::{RetrievedChunk, Role, Turn};

/// Render a history window as `role: content` lines, oldest first.
pub fn render_history(history: &[Turn]) -> String {
    history
        .iter()
        .map(|t| format!("{}: {}", role_label(t.role), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Build the final instruction block sent to the completion service.
///
/// The preamble always instructs the model to (a) answer only from the
/// supplied context, (b) say when the information is unavailable instead of
/// fabricating, and (c) never reference the context or history blocks in the
/// answer. An empty history window renders as an empty region, not an
/// omitted one, so the model always sees the same structure.
pub fn assemble(
    persona: &str,
    history: &[Turn],
    chunks: &[RetrievedChunk],
    question: &str,
) -> String {
    let context = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{persona}\n\
         \n\
         Answer using only the research provided between the <context> and </context> tags, \
         considering the conversation provided between the <chat_history> and </chat_history> tags.\n\
         When answering the question contained between the <question> and </question> tags, \
         if the context does not contain the information, say so instead of inventing an answer.\n\
         \n\
         Do not mention the CONTEXT or the CHAT HISTORY in your answer.\n\
         \n\
         <chat_history>\n\
         {history}\n\
         </chat_history>\n\
         <context>\n\
         {context}\n\
         </context>\n\
         <question>\n\
         {question}\n\
         </question>\n\
         Answer:",
        persona = persona,
        history = render_history(history),
        context = context,
        question = question,
    )
}
