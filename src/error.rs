//! Unified error types for whatif-denoise.
//!
//! The denoising core is deterministic, so every error here is fatal for the
//! call that produced it. Errors carry enough context (resource id, rule
//! index) to point at the offending input.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for whatif-denoise operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DenoiseError {
    /// Errors while interpreting a what-if document or resource identifier
    #[error("Failed to parse what-if input: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors while compiling or evaluating rules
    #[error("Rule evaluation failed: {context}")]
    Rule {
        context: String,
        #[source]
        source: RuleErrorKind,
    },

    /// Errors during report rendering
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error(
        "Malformed resource identifier '{id}' (expected /subscriptions/<sub>/resourceGroups/<rg>/providers/<namespace>/<type>/<name>)"
    )]
    MalformedIdentifier { id: String },

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid property change at '{path}': {reason}")]
    InvalidDelta { path: String, reason: String },
}

/// Specific rule error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RuleErrorKind {
    #[error("Invalid resourceNameRegex '{pattern}' in rule #{index}: {message}")]
    InvalidRegex {
        index: usize,
        pattern: String,
        message: String,
    },
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),

    #[error("Cannot render resource: {0}")]
    UnrenderableResource(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for whatif-denoise operations
pub type Result<T> = std::result::Result<T, DenoiseError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl DenoiseError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for an identifier that does not match the
    /// resource-group scoped pattern
    pub fn malformed_identifier(id: impl Into<String>) -> Self {
        Self::parse(
            "resource identifier",
            ParseErrorKind::MalformedIdentifier { id: id.into() },
        )
    }

    /// Create a rule error with context
    pub fn rule(context: impl Into<String>, source: RuleErrorKind) -> Self {
        Self::Rule {
            context: context.into(),
            source,
        }
    }

    /// Create a rule error for a regex that does not compile
    pub fn invalid_regex(
        index: usize,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::rule(
            "compiling rules",
            RuleErrorKind::InvalidRegex {
                index,
                pattern: pattern.into(),
                message: message.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Whether this error was caused by a malformed resource identifier
    #[must_use]
    pub const fn is_malformed_identifier(&self) -> bool {
        matches!(
            self,
            Self::Parse {
                source: ParseErrorKind::MalformedIdentifier { .. },
                ..
            }
        )
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for DenoiseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for DenoiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are prepended, so the final message reads from the
/// outermost operation inwards.
///
/// ```ignore
/// use whatif_denoise::error::ErrorContext;
///
/// let descriptor = ResourceDescriptor::parse(&change.resource_id)
///     .with_context(|| format!("denoising change #{index}"))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<DenoiseError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: DenoiseError, new_ctx: &str) -> DenoiseError {
    match err {
        DenoiseError::Parse {
            context: existing,
            source,
        } => DenoiseError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        DenoiseError::Rule {
            context: existing,
            source,
        } => DenoiseError::Rule {
            context: chain_context(new_ctx, &existing),
            source,
        },
        DenoiseError::Report {
            context: existing,
            source,
        } => DenoiseError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        DenoiseError::Io {
            path,
            message,
            source,
        } => DenoiseError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        DenoiseError::Validation(msg) => DenoiseError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
