//! What-if document input stage.
//!
//! Reads the output of `az deployment group what-if --no-pretty-print` from a
//! file or standard input.

use crate::model::OperationResult;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use super::PipelineError;

/// Read raw content from a file, or from stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read what-if file: {}", path.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read what-if result from stdin")?;
            Ok(content)
        }
    }
}

/// Read and deserialize a what-if result with context for error messages.
pub fn read_operation_result(path: Option<&Path>, quiet: bool) -> Result<OperationResult> {
    let source = path.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    if !quiet {
        tracing::info!("Reading what-if result: {}", source);
    }

    let content = read_input(path)?;
    let result = parse_operation_result(&content).map_err(|e| PipelineError::ParseFailed {
        path: source,
        source: e,
    })?;

    if !quiet {
        tracing::info!(
            "Parsed {} resource change(s), status {}",
            result.changes.len(),
            result.status
        );
    }
    Ok(result)
}

/// Deserialize a what-if result from a string.
pub fn parse_operation_result(content: &str) -> Result<OperationResult> {
    if content.trim().is_empty() {
        anyhow::bail!("input is empty");
    }
    Ok(OperationResult::from_json(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeType;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_result() {
        let result = parse_operation_result(
            r#"{"status": "Succeeded", "changes": [{"resourceId": "x", "changeType": "Ignore"}]}"#,
        )
        .unwrap();
        assert_eq!(result.changes[0].change_type, ChangeType::Ignore);
    }

    #[test]
    fn test_parse_empty_input() {
        let err = parse_operation_result("  \n").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_read_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("whatif.json");
        std::fs::write(&path, r#"{"status": "Succeeded", "changes": []}"#).unwrap();

        let result = read_operation_result(Some(&path), true).unwrap();
        assert!(result.changes.is_empty());
    }

    #[test]
    fn test_read_invalid_document_names_source() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, r#"{"changes": "nope"}"#).unwrap();

        let err = read_operation_result(Some(&path), true).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_operation_result(Some(Path::new("/nonexistent/whatif.json")), true)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
