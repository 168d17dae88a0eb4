//! The rate client: asks the server for the current bid and writes it to a file.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::config::ClientConfig;

pub const OUTPUT_LABEL: &str = "Dólar: ";

/// Fetches the server's current rate and writes `Dólar: <body>` to the
/// configured output file, replacing any previous content.
///
/// Nothing is written unless the server answered 200 within the timeout.
pub async fn fetch_and_save(config: &ClientConfig) -> Result<PathBuf> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .context("Failed to create request")?;

    debug!(url = %config.server_url, timeout = ?config.timeout(), "Requesting exchange rate");
    let response = client
        .get(&config.server_url)
        .send()
        .await
        .context("Failed to fetch exchange rate")?;

    let status = response.status();
    if status != StatusCode::OK {
        bail!("Server returned non-200 status: {}", status.as_u16());
    }

    let body = response
        .bytes()
        .await
        .context("Failed to read response body")?;
    info!(body = %String::from_utf8_lossy(&body), "Received exchange rate");

    let mut contents = OUTPUT_LABEL.as_bytes().to_vec();
    contents.extend_from_slice(&body);

    let path = PathBuf::from(&config.output_path);
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    Ok(path)
}
