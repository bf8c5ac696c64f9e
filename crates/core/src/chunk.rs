//! Retrieved document chunks and the reference set derived from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The sentinel category meaning "do not filter retrieval by category".
pub const ALL_CATEGORIES: &str = "ALL";

/// A retrieval-unit excerpt of a source document.
///
/// Produced fresh by every search call, never persisted. The `relative_path`
/// identifies the originating document within the document stage and is what
/// the reference resolver turns into a user-facing link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The excerpt text.
    pub text: String,

    /// Path of the source document, relative to the stage root.
    pub relative_path: String,

    /// The document's category tag.
    pub category: String,
}

/// Collect the distinct source paths of a query's chunks.
///
/// Repeated paths collapse to one entry; ordering of the input is irrelevant.
pub fn reference_paths(chunks: &[RetrievedChunk]) -> BTreeSet<String> {
    chunks.iter().map(|c| c.relative_path.clone()).collect()
}
