//! `wellspring doctor` — configuration and connectivity checks.

use std::path::Path;
use wellspring_config::{AppConfig, ConfigError};
use wellspring_core::DocumentStore;
use wellspring_snowflake::SqlApiClient;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    println!("Wellspring doctor\n");

    let config = match AppConfig::load_from(config_path) {
        Ok(config) => {
            println!("✓ Configuration valid ({})", config_path.display());
            config
        }
        Err(ConfigError::MissingParameters { names }) => {
            println!("✗ Missing required Snowflake credentials:");
            for name in &names {
                println!("    - {name}");
            }
            println!("\nAdd them to {} or the environment.", config_path.display());
            anyhow::bail!("configuration incomplete");
        }
        Err(e) => return Err(e.into()),
    };

    println!("  account:   {}", config.snowflake.account);
    println!("  database:  {}", config.snowflake.database);
    println!("  schema:    {}", config.snowflake.schema);
    println!("  warehouse: {}", config.snowflake.warehouse);

    let store = SqlApiClient::from_config(&config);

    match store.list_categories().await {
        Ok(categories) => println!("✓ Backend reachable — {} categories", categories.len()),
        Err(e) => {
            println!("✗ Backend check failed: {e}");
            anyhow::bail!("backend unreachable");
        }
    }

    match store.list_documents().await {
        Ok(documents) => println!("✓ Document stage lists {} documents", documents.len()),
        Err(e) => println!("✗ Document stage check failed: {e}"),
    }

    Ok(())
}
