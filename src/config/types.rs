//! Configuration types for a denoise run.
//!
//! The rules themselves live in a rules file (see [`crate::rules::RulesConfig`]);
//! these types describe one invocation: where the document comes from, which
//! rules file to use, and how to render the result.

use crate::reports::ReportFormat;
use std::path::PathBuf;

/// Configuration for one denoise run, assembled from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct DenoiseConfig {
    /// What-if document path (stdin if not specified)
    pub input: Option<PathBuf>,
    /// Rules file path (discovered if not specified)
    pub rules_file: Option<PathBuf>,
    /// Output configuration (format, file, colors)
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl DenoiseConfig {
    /// Create a `DenoiseConfig` builder.
    pub fn builder() -> DenoiseConfigBuilder {
        DenoiseConfigBuilder::default()
    }
}

/// Builder for constructing `DenoiseConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct DenoiseConfigBuilder {
    config: DenoiseConfig,
}

impl DenoiseConfigBuilder {
    /// Set the what-if document path.
    pub fn input(mut self, input: Option<PathBuf>) -> Self {
        self.config.input = input;
        self
    }

    /// Set the rules file.
    pub fn rules_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.rules_file = file;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Enable fail-on-change mode.
    pub const fn fail_on_change(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_change = fail;
        self
    }

    /// Enable quiet mode.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Print the suppression log.
    pub const fn explain(mut self, explain: bool) -> Self {
        self.config.behavior.explain = explain;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> DenoiseConfig {
        self.config
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    pub file: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
}

/// Behavior flags for a denoise run
#[derive(Debug, Clone, Default)]
pub struct BehaviorConfig {
    /// Exit with code 1 if actionable changes remain after denoising
    pub fail_on_change: bool,
    /// Suppress non-essential output
    pub quiet: bool,
    /// Print every suppressed property change with the rule responsible
    pub explain: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = DenoiseConfig::builder()
            .input(Some(PathBuf::from("whatif.json")))
            .output_format(ReportFormat::Json)
            .fail_on_change(true)
            .explain(true)
            .build();

        assert_eq!(config.input, Some(PathBuf::from("whatif.json")));
        assert_eq!(config.output.format, ReportFormat::Json);
        assert!(config.behavior.fail_on_change);
        assert!(config.behavior.explain);
        assert!(!config.behavior.quiet);
        assert!(config.rules_file.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = DenoiseConfig::default();
        assert_eq!(config.output.format, ReportFormat::Pretty);
        assert!(!config.output.no_color);
    }
}
