//! Report generation for denoised what-if results.
//!
//! Two output formats are provided:
//! - Pretty: the `az deployment group what-if` listing, minus the noise
//! - JSON: the denoised document, ready to feed back into other tooling

mod json;
pub mod pretty;
mod types;

pub use json::JsonReporter;
pub use pretty::{ChangeSymbol, Marker, PrettyLine, PrettyReporter};
pub use types::ReportFormat;

use crate::error::{DenoiseError, ReportErrorKind};
use crate::model::OperationResult;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Cannot render resource: {0}")]
    UnrenderableResource(String),
}

impl From<ReportError> for DenoiseError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::SerializationError(message) => Self::report(
                "rendering report",
                ReportErrorKind::JsonSerializationError(message),
            ),
            ReportError::UnrenderableResource(message) => Self::report(
                "rendering report",
                ReportErrorKind::UnrenderableResource(message),
            ),
        }
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a what-if result
    fn generate_report(&self, result: &OperationResult) -> Result<String, ReportError>;

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Pretty => {
            if use_color {
                Box::new(PrettyReporter::new())
            } else {
                Box::new(PrettyReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
    }
}
