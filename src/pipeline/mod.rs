//! Pipeline orchestration for denoise runs.
//!
//! This module provides the read → denoise → report stages shared by the
//! CLI command handlers.

mod denoise_stage;
mod output;
mod parse;
mod report_stage;

pub use denoise_stage::run_denoise;
pub use output::{should_use_color, write_output, OutputTarget};
pub use parse::{parse_operation_result, read_input, read_operation_result};
pub use report_stage::output_report;

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or parse a what-if document
    #[error("Parse failed for {path}: {source}")]
    ParseFailed {
        path: String,
        source: anyhow::Error,
    },

    /// Rule engine construction or denoising failed
    #[error("Denoise failed: {source}")]
    DenoiseFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no actionable changes remain (or --fail-on-change not set)
    pub const SUCCESS: i32 = 0;
    /// Actionable changes remain after denoising
    pub const CHANGES_DETECTED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::CHANGES_DETECTED, 1);
        assert_eq!(exit_codes::ERROR, 2);
    }

    #[test]
    fn test_parse_failed_names_path() {
        let err = PipelineError::ParseFailed {
            path: "whatif.json".to_string(),
            source: anyhow::anyhow!("expected value"),
        };
        assert_eq!(err.to_string(), "Parse failed for whatif.json: expected value");
    }
}
