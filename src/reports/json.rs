//! JSON report generator.

use super::{ReportError, ReportFormat, ReportGenerator};
use crate::model::OperationResult;

/// Emits the denoised what-if document
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_report(&self, result: &OperationResult) -> Result<String, ReportError> {
        let mut json = if self.pretty {
            serde_json::to_string_pretty(result)
        } else {
            serde_json::to_string(result)
        }
        .map_err(|e| ReportError::SerializationError(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Change, ChangeType, PropertyChange, PropertyChangeType};

    #[test]
    fn test_json_report_round_trips() {
        let result = OperationResult::new(vec![
            Change::modify(
                "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Web/sites/app",
                vec![PropertyChange::leaf("kind", PropertyChangeType::Modify)],
            ),
            Change::new(
                "/subscriptions/S/resourceGroups/rg/providers/Microsoft.Web/sites/other",
                ChangeType::Ignore,
            ),
        ]);

        let report = JsonReporter::new().generate_report(&result).unwrap();
        assert!(report.ends_with('\n'));
        let back = OperationResult::from_json(&report).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_compact_output_is_single_line() {
        let report = JsonReporter::new()
            .pretty(false)
            .generate_report(&OperationResult::new(vec![]))
            .unwrap();
        assert_eq!(report, "{\"status\":\"Succeeded\",\"changes\":[]}\n");
    }
}
