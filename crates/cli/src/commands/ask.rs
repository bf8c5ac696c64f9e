//! `wellspring ask` — one question, one grounded answer, on the terminal.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use wellspring_chat::ChatPipeline;
use wellspring_config::AppConfig;
use wellspring_core::{DocumentStore, ModelId, SessionContext};
use wellspring_snowflake::{CortexSearchClient, SqlApiClient};

pub async fn run(
    config_path: &Path,
    question: &str,
    model: Option<&str>,
    category: &str,
) -> anyhow::Result<()> {
    let config = AppConfig::load_from(config_path).context("Failed to load configuration")?;

    let search = Arc::new(CortexSearchClient::from_config(&config));
    let sql = Arc::new(SqlApiClient::from_config(&config));
    let store: Arc<dyn DocumentStore> = sql.clone();

    let pipeline = ChatPipeline::new(search, sql, store, &config.persona)
        .with_num_chunks(config.retrieval.num_chunks)
        .with_slide_window(config.retrieval.slide_window)
        .with_url_validity(config.retrieval.url_validity_secs);

    let mut session = SessionContext::new();
    session.category = category.to_string();
    if let Some(model) = model {
        session.model = model
            .parse::<ModelId>()
            .with_context(|| format!("Unknown model '{model}'"))?;
    }

    let outcome = pipeline
        .ask(&mut session, question)
        .await
        .context("Backend call failed")?;

    println!("{}", outcome.answer);

    if !outcome.references.is_empty() {
        println!("\nFurther reading:");
        for (path, url) in &outcome.references {
            println!("  {path} — {url}");
        }
    }

    Ok(())
}
