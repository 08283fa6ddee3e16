use anyhow::{Context, Result};

use crate::core::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let session = super::chat::session(config);

    let info = session
        .describe_service()
        .await
        .with_context(|| format!("Failed to describe service at {}", config.api_base_url))?;
    println!("{}", serde_json::to_string_pretty(&info)?);

    Ok(())
}
