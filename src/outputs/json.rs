//! JSON artifacts for downstream chart and table renderers.
//!
//! Each pipeline writes one file into the JSON output directory:
//! ```text
//! json_output_dir/
//! ├── trends.json
//! ├── keywords.json
//! └── crawl.json
//! ```
//!
//! Files are rewritten on every run; nothing is read back.

use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `report` to `{json_output_dir}/{name}.json`.
///
/// Creates the directory when it is missing.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip(report), fields(json_output_dir = %json_output_dir))]
pub async fn write_report<T: Serialize>(
    report: &T,
    json_output_dir: &str,
    name: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/{}.json", json_output_dir.trim_end_matches('/'), name);
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, "Wrote JSON report");

    Ok(output_json_filename)
}
