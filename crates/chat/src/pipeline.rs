//! The ask pipeline — one user question, start to finish.
//!
//! # Flow
//!
//! 1. Append the user turn, then take the history window (which excludes it)
//! 2. Reformulate the retrieval query over the window, or short-circuit to
//!    the raw question when the window is empty
//! 3. Retrieve chunks, filtered by the session's category selection
//! 4. Assemble the grounded prompt and make one completion call
//! 5. Resolve references and append the assistant turn
//!
//! Any service failure aborts the turn and restores the transcript to its
//! pre-question state; a failed exchange is never recorded.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use wellspring_core::error::ServiceError;
use wellspring_core::{
    CompletionClient, DocumentStore, SearchClient, SessionContext, Turn, reference_paths,
};

use crate::{prompt, references, summarizer};

/// How many chunks a retrieval call asks for by default.
pub const DEFAULT_NUM_CHUNKS: usize = 3;
/// How many prior turns feed the history window by default.
pub const DEFAULT_SLIDE_WINDOW: usize = 7;
/// Default validity of presigned reference links, in seconds.
pub const DEFAULT_URL_VALIDITY_SECS: u32 = 360;

/// The orchestration pipeline shared by every session.
pub struct ChatPipeline {
    search: Arc<dyn SearchClient>,
    completion: Arc<dyn CompletionClient>,
    store: Arc<dyn DocumentStore>,
    persona: String,
    pub(crate) num_chunks: usize,
    slide_window: usize,
    url_validity_secs: u32,
}

/// What one successful ask produces, beyond the transcript mutation.
#[derive(Debug)]
pub struct AskOutcome {
    /// The generated answer (also appended as the assistant turn).
    pub answer: String,
    /// Distinct source path → signed URL for this answer's chunks.
    pub references: BTreeMap<String, String>,
    /// The retrieval query actually used; populated only when the session's
    /// debug flag is set.
    pub retrieval_query: Option<String>,
}

impl ChatPipeline {
    /// Create a pipeline over the three backend clients.
    pub fn new(
        search: Arc<dyn SearchClient>,
        completion: Arc<dyn CompletionClient>,
        store: Arc<dyn DocumentStore>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            search,
            completion,
            store,
            persona: persona.into(),
            num_chunks: DEFAULT_NUM_CHUNKS,
            slide_window: DEFAULT_SLIDE_WINDOW,
            url_validity_secs: DEFAULT_URL_VALIDITY_SECS,
        }
    }

    /// Set how many chunks each retrieval call asks for.
    pub fn with_num_chunks(mut self, num_chunks: usize) -> Self {
        self.num_chunks = num_chunks;
        self
    }

    /// Set the history window width.
    pub fn with_slide_window(mut self, slide_window: usize) -> Self {
        self.slide_window = slide_window;
        self
    }

    /// Set the presigned-link validity.
    pub fn with_url_validity(mut self, secs: u32) -> Self {
        self.url_validity_secs = secs;
        self
    }

    pub(crate) fn persona(&self) -> &str {
        &self.persona
    }

    pub(crate) fn search_client(&self) -> &dyn SearchClient {
        self.search.as_ref()
    }

    pub(crate) fn completion_client(&self) -> &dyn CompletionClient {
        self.completion.as_ref()
    }

    /// Process one question against the session.
    ///
    /// On success exactly one user turn and one assistant turn have been
    /// appended, in that order. On failure the transcript is exactly as it
    /// was before the call.
    pub async fn ask(
        &self,
        session: &mut SessionContext,
        question: &str,
    ) -> Result<AskOutcome, ServiceError> {
        info!(session = %session.id, model = %session.model, "Processing question");

        session.append(Turn::user(question));

        match self.answer(session, question).await {
            Ok(outcome) => {
                session.append(Turn::assistant(outcome.answer.clone()));
                Ok(outcome)
            }
            Err(e) => {
                session.discard_unanswered();
                Err(e)
            }
        }
    }

    async fn answer(
        &self,
        session: &SessionContext,
        question: &str,
    ) -> Result<AskOutcome, ServiceError> {
        let history: &[Turn] = if session.use_history {
            session.window(self.slide_window)
        } else {
            &[]
        };

        // Required short-circuit: with no history there is nothing to
        // reformulate and no summarization call is made.
        let retrieval_query = if history.is_empty() {
            question.to_string()
        } else {
            summarizer::summarize(
                self.completion.as_ref(),
                session.model,
                history,
                question,
            )
            .await?
        };

        let chunks = self
            .search
            .search(&retrieval_query, &session.category, self.num_chunks)
            .await?;

        debug!(chunks = chunks.len(), "Context retrieved");

        let prompt = prompt::assemble(&self.persona, history, &chunks, question);
        let answer = self.completion.complete(session.model, &prompt).await?;

        let paths = reference_paths(&chunks);
        let urls =
            references::resolve(self.store.as_ref(), &paths, self.url_validity_secs).await?;

        info!(
            references = urls.len(),
            answer_len = answer.len(),
            "Answer generated"
        );

        Ok(AskOutcome {
            answer,
            references: urls,
            retrieval_query: session.debug.then_some(retrieval_query),
        })
    }
}
