//! Protocol generation — the secondary pipeline.
//!
//! Turns the recent conversation plus fresh per-topic retrieval into one
//! structured, multi-section protocol. Three phases run in sequence:
//! extract topics from the transcript, gather research per topic, then one
//! assembly completion. Any service failure aborts the whole operation — a
//! partial protocol is never returned.

use tracing::{debug, info};
use wellspring_core::error::ServiceError;
use wellspring_core::{ALL_CATEGORIES, CompletionClient, Role, SearchClient, SessionContext, Turn};

use crate::pipeline::ChatPipeline;

/// How many recent turns feed topic extraction (three exchanges).
const PROTOCOL_TURNS: usize = 6;

/// Literal used for the research region when no topic yielded any chunks.
const NO_RESEARCH: &str = "No specific research found.";

/// The result of a protocol request.
#[derive(Debug)]
pub enum ProtocolOutcome {
    /// The generated protocol text, ready for display.
    Generated(String),
    /// Fewer than one full exchange exists; nothing was generated and no
    /// service call was made. A user-facing hint, not an error.
    NotEnoughHistory,
}

impl ChatPipeline {
    /// Generate a protocol from the session's recent conversation.
    pub async fn generate_protocol(
        &self,
        session: &SessionContext,
    ) -> Result<ProtocolOutcome, ServiceError> {
        if session.turns().len() < 2 {
            return Ok(ProtocolOutcome::NotEnoughHistory);
        }

        let transcript = render_transcript(session.recent(PROTOCOL_TURNS));

        // Phase 1: extract topics.
        info!(session = %session.id, "Extracting protocol topics");
        let topics = self
            .completion_client()
            .complete(session.model, &topic_prompt(&transcript))
            .await?;

        // Phase 2: gather research per topic. No category filter here — the
        // topics already narrow the search.
        let mut corpus: Vec<String> = Vec::new();
        for topic in topics.split(',') {
            let topic = topic.trim();
            if topic.is_empty() {
                continue;
            }
            debug!(topic, "Retrieving protocol research");
            let chunks = self
                .search_client()
                .search(topic, ALL_CATEGORIES, self.num_chunks)
                .await?;
            corpus.extend(chunks.into_iter().map(|c| c.text));
        }

        let research = if corpus.is_empty() {
            NO_RESEARCH.to_string()
        } else {
            corpus.join("\n\n")
        };

        // Phase 3: one assembly completion.
        let protocol = self
            .completion_client()
            .complete(
                session.model,
                &assembly_prompt(self.persona(), &transcript, &research),
            )
            .await?;

        info!(protocol_len = protocol.len(), "Protocol generated");
        Ok(ProtocolOutcome::Generated(protocol))
    }
}

/// Render recent turns as a labeled Q/A transcript.
fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| {
            let label = match t.role {
                Role::User => "Q",
                Role::Assistant => "A",
            };
            format!("{label}: {}", t.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn topic_prompt(transcript: &str) -> String {
    format!(
        "Extract the main health and wellness topics from this conversation as a \
         comma-separated list:\n\
         {transcript}\n\
         Answer with only the topics, no explanation."
    )
}

fn assembly_prompt(persona: &str, transcript: &str, research: &str) -> String {
    format!(
        "{persona}\n\
         Based on this conversation and the scientific literature below, create an \
         actionable protocol.\n\
         \n\
         Conversation:\n\
         {transcript}\n\
         \n\
         Scientific literature:\n\
         {research}\n\
         \n\
         Create a detailed protocol with the following sections:\n\
         \n\
         OBJECTIVE\n\
         - Clear statement of the goal based on the conversation\n\
         \n\
         MECHANISM\n\
         - Brief explanation of the key biological mechanisms\n\
         - Reference specific research findings where possible\n\
         \n\
         PROTOCOL STEPS\n\
         - Detailed day-by-day or step-by-step instructions\n\
         - Include specific timings and durations\n\
         - Base recommendations on the literature provided\n\
         \n\
         IMPORTANT CONSIDERATIONS\n\
         - Key things to watch out for\n\
         - Common mistakes to avoid\n\
         - Contraindications from the research\n\
         \n\
         MEASURING PROGRESS\n\
         - How to track success\n\
         - What markers to monitor\n\
         - Evidence-based metrics from the literature\n\
         \n\
         Format in clean markdown with clear sections and bullet points.\n\
         Be specific with numbers, timings, and measurements where possible.\n\
         Ground all recommendations in the literature provided."
    )
}
