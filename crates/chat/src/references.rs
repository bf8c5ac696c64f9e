//! Reference resolution: distinct source paths → time-limited signed URLs.

use std::collections::{BTreeMap, BTreeSet};
use wellspring_core::error::ServiceError;
use wellspring_core::DocumentStore;

/// Resolve each distinct path to a signed URL.
///
/// Exactly one storage call per path — the input set is already
/// deduplicated. Empty input yields an empty map without touching storage.
pub async fn resolve(
    store: &dyn DocumentStore,
    paths: &BTreeSet<String>,
    validity_secs: u32,
) -> Result<BTreeMap<String, String>, ServiceError> {
    let mut urls = BTreeMap::new();
    for path in paths {
        let url = store.presigned_url(path, validity_secs).await?;
        urls.insert(path.clone(), url);
    }
    Ok(urls)
}
