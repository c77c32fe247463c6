//! Report output stage.
//!
//! Renders the denoised result in the configured format and writes it to
//! stdout or a file.

use crate::config::DenoiseConfig;
use crate::model::OperationResult;
use crate::reports::create_reporter_with_options;
use anyhow::Result;

use super::{should_use_color, write_output, OutputTarget, PipelineError};

/// Output a denoise report to the configured destination.
///
/// Color is only used for terminal output, and never when disabled by flag
/// or `NO_COLOR`.
pub fn output_report(config: &DenoiseConfig, result: &OperationResult) -> Result<()> {
    let output_target = OutputTarget::from_option(config.output.file.clone());
    let use_color = should_use_color(config.output.no_color) && output_target.is_terminal();

    let reporter = create_reporter_with_options(config.output.format, use_color);
    let report = reporter
        .generate_report(result)
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;

    write_output(&report, &output_target, config.behavior.quiet)
}
