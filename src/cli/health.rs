use anyhow::{Result, bail};

use crate::core::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let session = super::chat::session(config);

    if session.check_liveness().await {
        println!("Booking service at {} is up", config.api_base_url);
        Ok(())
    } else {
        bail!("Booking service at {} is not responding", config.api_base_url)
    }
}
