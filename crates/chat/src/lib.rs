//! The conversational-context assembly pipeline.
//!
//! This crate decides what goes into a single completion prompt and how the
//! result is correlated back to source documents:
//!
//! 1. Sliding chat-history window (strictly prior turns only)
//! 2. Query reformulation over that window ([`summarizer`])
//! 3. Category-filtered retrieval via the injected [`wellspring_core::SearchClient`]
//! 4. Grounded prompt assembly ([`prompt`])
//! 5. One completion call and reference resolution ([`references`])
//!
//! A secondary pipeline ([`protocol`]) turns recent conversation plus fresh
//! retrieval into a structured multi-section protocol.
//!
//! Everything here talks to the client traits from `wellspring-core`, so the
//! whole pipeline runs under test with scripted mocks and no network.

pub mod pipeline;
pub mod prompt;
pub mod protocol;
pub mod references;
pub mod summarizer;

pub use pipeline::{AskOutcome, ChatPipeline};
pub use protocol::ProtocolOutcome;

#[cfg(test)]
pub(crate) mod test_helpers;
