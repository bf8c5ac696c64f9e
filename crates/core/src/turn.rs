//! Turn and session-context domain types.
//!
//! A session owns an ordered, append-only transcript of turns plus the user's
//! current selections (model, category filter, history/debug toggles). The
//! session object is created at session start, passed explicitly into every
//! handler, cleared on explicit reset, and destroyed at session end — there
//! is no ambient global conversation state anywhere in the system.

use crate::model::ModelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The grounded assistant.
    Assistant,
}

/// A single exchange entry in a session transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who sent this turn.
    pub role: Role,

    /// The text content.
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// All state owned by one chat session: the transcript plus selections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Unique session ID.
    pub id: SessionId,

    /// Ordered transcript, oldest first.
    turns: Vec<Turn>,

    /// The completion model the user has selected.
    pub model: ModelId,

    /// Category filter applied to retrieval ("ALL" = unfiltered).
    pub category: String,

    /// Whether prior turns feed into query reformulation and the prompt.
    pub use_history: bool,

    /// Whether responses should expose the retrieval query actually used.
    pub debug: bool,

    /// When this session was created.
    pub created_at: DateTime<Utc>,

    /// When the transcript last changed.
    pub updated_at: DateTime<Utc>,
}

impl SessionContext {
    /// Create a fresh session with default selections.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            turns: Vec::new(),
            model: ModelId::default(),
            category: crate::chunk::ALL_CATEGORIES.to_string(),
            use_history: true,
            debug: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The full transcript, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append a turn to the end of the transcript.
    pub fn append(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
    }

    /// The sliding history window: up to `max_turns` turns strictly before
    /// the most recent entry.
    ///
    /// The most recent entry is the still-unanswered turn of the exchange in
    /// flight and must never leak into query reformulation or the prompt's
    /// history region. Empty and single-turn transcripts yield an empty
    /// window.
    pub fn window(&self, max_turns: usize) -> &[Turn] {
        let Some(end) = self.turns.len().checked_sub(1) else {
            return &[];
        };
        let start = end.saturating_sub(max_turns);
        &self.turns[start..end]
    }

    /// The last `max_turns` turns, most recent included.
    pub fn recent(&self, max_turns: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(max_turns);
        &self.turns[start..]
    }

    /// Drop the trailing user turn of a failed exchange.
    ///
    /// A failed completion call must leave the transcript exactly as it was
    /// before the question arrived; a half-recorded exchange would poison
    /// every later history window. No-op unless the last turn is a user turn.
    pub fn discard_unanswered(&mut self) {
        if self.turns.last().is_some_and(|t| t.role == Role::User) {
            self.turns.pop();
            self.updated_at = Utc::now();
        }
    }

    /// Empty the transcript. Selections survive a clear.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.updated_at = Utc::now();
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
