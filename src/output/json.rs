//! JSON response output writer.
//!
//! Writes QueryResponse structs to JSON files with proper formatting.

use crate::commands::query::QueryResponse;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a query response to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `response` - Response to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_response(
    response: &QueryResponse,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing insights to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, response).map_err(OutputError::SerializationFailed)?;

    info!(
        "Insights written successfully ({} bytes)",
        std::fs::metadata(output_path).map(|m| m.len()).unwrap_or(0)
    );

    Ok(())
}

/// Serialize a response as pretty JSON
///
/// **Public** - used for stdout output
pub fn response_to_string(response: &QueryResponse) -> Result<String, OutputError> {
    serde_json::to_string_pretty(response).map_err(OutputError::SerializationFailed)
}

/// Read a response back from a JSON file
#[cfg(test)]
fn read_response(input_path: impl AsRef<Path>) -> Result<QueryResponse, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading insights from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let response: QueryResponse =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    Ok(response)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
