//! Error handling for rendercell
//!
//! The error system has two layers:
//! 1. **Strongly-typed errors** for library callers: [`RenderError`] is what
//!    component logic raises, [`CellError`] is what the cache, key derivation
//!    and memoized entry points raise (wrapping [`RenderError`] transparently).
//! 2. **User-friendly messages** for the CLI: [`ErrorContext`] pairs an error
//!    message with details and an actionable suggestion, and
//!    [`user_friendly_error`] builds one from any [`anyhow::Error`].
//!
//! # Propagation
//!
//! The cache and composition layers never swallow errors. A render failure
//! surfaces to whoever invoked the render, unchanged, and nothing is stored in
//! the cache for the failed key. The only errors these layers originate
//! themselves are [`CellError::UnkeyableInput`] and
//! [`CellError::CapacityViolation`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use rendercell::core::{CellError, user_friendly_error};
//!
//! let err = CellError::CapacityViolation { requested: 0 };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display(); // colored output on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Failures raised by component render logic.
///
/// Component authors return these from [`crate::Component::render`]; arbitrary
/// failures (I/O, upstream services) go through [`RenderError::Other`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// A required input is absent (or `null`) in the bundle.
    #[error("missing input '{key}'")]
    MissingInput {
        key: String,
        /// Present keys with similar names, closest first
        suggestions: Vec<String>,
    },

    /// An input is present but has the wrong shape.
    #[error("input '{key}' must be {expected}, found {found}")]
    InvalidInput {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A template-backed component failed to parse or render.
    #[error("template '{component}' failed: {message}")]
    Template {
        component: String,
        message: String,
    },

    /// Any other failure raised by component logic.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the cache, key derivation and memoized entry points.
#[derive(Debug, Error)]
pub enum CellError {
    /// The bundle holds a value that cannot be canonicalized into a key.
    #[error("input at '{path}' cannot be used as a cache key: {reason}")]
    UnkeyableInput {
        /// Location of the value inside the bundle, e.g. `items[2].handle`
        path: String,
        reason: String,
    },

    /// A render failure, passed through unchanged.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A cache capacity that cannot be honored (zero).
    #[error("invalid cache capacity {requested}: capacity must be at least 1")]
    CapacityViolation {
        requested: usize,
    },

    /// A value that cannot be converted into an input bundle.
    #[error("invalid input bundle: {reason}")]
    InvalidBundle {
        reason: String,
    },
}

impl CellError {
    /// The render failure carried by this error, if any.
    pub fn as_render_error(&self) -> Option<&RenderError> {
        match self {
            CellError::Render(err) => Some(err),
            _ => None,
        }
    }
}

/// Error message with optional details and suggestion, for CLI display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The error message (including its cause chain)
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are displayed in green.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`CellError`], [`RenderError`], TOML parse errors and I/O errors
/// anywhere in the context chain; anything else is reported with its full
/// cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format_chain(&error);

    if let Some(cell_error) = error.downcast_ref::<CellError>() {
        return cell_error_context(cell_error, message);
    }

    if let Some(render_error) = error.downcast_ref::<RenderError>() {
        return render_error_context(render_error, message);
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(message)
            .with_suggestion("Check the TOML syntax of your rendercell config file")
            .with_details("Expected sections are [cache] (capacity, lock_policy) and [templating] (enabled)");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(message)
                .with_suggestion("Check that the file exists and the path is correct");
        }
    }

    ErrorContext::new(message)
}

fn cell_error_context(error: &CellError, message: String) -> ErrorContext {
    match error {
        CellError::UnkeyableInput { path, .. } => ErrorContext::new(message)
            .with_details(format!(
                "The memoized path needs every input to have a stable value; '{path}' only has an identity"
            ))
            .with_suggestion("Pass plain data instead, or render through the direct (non-memoized) path"),
        CellError::CapacityViolation { .. } => ErrorContext::new(message)
            .with_suggestion("Set [cache] capacity to a positive number, e.g. `capacity = 256`"),
        CellError::Render(render_error) => render_error_context(render_error, message),
        CellError::InvalidBundle { .. } => ErrorContext::new(message)
            .with_suggestion("Provide inputs as a JSON object or as key=value pairs"),
    }
}

fn render_error_context(error: &RenderError, message: String) -> ErrorContext {
    match error {
        RenderError::MissingInput { key, suggestions } => {
            let ctx = ErrorContext::new(message);
            match suggestions.first() {
                Some(closest) => ctx.with_suggestion(format!("Did you mean '{closest}'?")),
                None => ctx.with_suggestion(format!("Provide it with --set {key}=<value>")),
            }
        }
        RenderError::InvalidInput { key, expected, .. } => ErrorContext::new(message)
            .with_suggestion(format!("Pass '{key}' as {expected}")),
        RenderError::Template { .. } => ErrorContext::new(message).with_details(
            "Variables use {{ var }}, control flow uses {% %}; every variable must be present in the inputs",
        ),
        RenderError::Other(_) => ErrorContext::new(message),
    }
}

fn format_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}
