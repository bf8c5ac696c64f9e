//! Scripted mock clients for pipeline tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use wellspring_core::error::ServiceError;
use wellspring_core::{CompletionClient, DocumentStore, ModelId, RetrievedChunk, SearchClient};

fn scripted_failure() -> ServiceError {
    ServiceError::Api {
        status_code: 503,
        message: "scripted failure".into(),
    }
}

/// A completion client that returns a queue of scripted results.
///
/// Each call pops the next entry and records the prompt it received.
/// Panics if more calls are made than results were scripted.
pub struct ScriptedCompletion {
    results: Mutex<VecDeque<Result<String, ServiceError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn replies(texts: &[&str]) -> Self {
        Self {
            results: Mutex::new(texts.iter().map(|t| Ok(t.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Scripted successes followed by one failure.
    pub fn replies_then_failure(texts: &[&str]) -> Self {
        let mut results: VecDeque<_> = texts.iter().map(|t| Ok(t.to_string())).collect();
        results.push_back(Err(scripted_failure()));
        Self {
            results: Mutex::new(results),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::replies_then_failure(&[])
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, _model: ModelId, prompt: &str) -> Result<String, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedCompletion: no scripted results left")
    }
}

/// One recorded search invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub category: String,
    pub limit: usize,
}

/// A search client that returns the same chunk set on every call.
pub struct ScriptedSearch {
    chunks: Vec<RetrievedChunk>,
    fail: bool,
    calls: Mutex<Vec<SearchCall>>,
}

impl ScriptedSearch {
    pub fn returning(chunks: Vec<RetrievedChunk>) -> Self {
        Self {
            chunks,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            chunks: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearch {
    async fn search(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedChunk>, ServiceError> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            category: category.to_string(),
            limit,
        });
        if self.fail {
            return Err(scripted_failure());
        }
        Ok(self.chunks.clone())
    }
}

/// A document store that mints deterministic URLs and records every call.
pub struct ScriptedStore {
    fail: bool,
    presigned: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            fail: false,
            presigned: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            presigned: Mutex::new(Vec::new()),
        }
    }

    pub fn presigned_calls(&self) -> Vec<String> {
        self.presigned.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn presigned_url(&self, path: &str, _validity_secs: u32) -> Result<String, ServiceError> {
        if self.fail {
            return Err(scripted_failure());
        }
        self.presigned.lock().unwrap().push(path.to_string());
        Ok(format!("https://signed.example/{path}"))
    }

    async fn list_documents(&self) -> Result<Vec<String>, ServiceError> {
        Ok(vec!["docs/sleep_guide.pdf".into()])
    }

    async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(vec!["SLEEP".into(), "HORMONES".into()])
    }
}

/// Convenience chunk constructor.
pub fn chunk(text: &str, path: &str, category: &str) -> RetrievedChunk {
    RetrievedChunk {
        text: text.into(),
        relative_path: path.into(),
        category: category.into(),
    }
}
