//! Core types shared across rendercell.
//!
//! - [`RenderError`] - failures raised by component render logic
//! - [`CellError`] - failures raised by key derivation, the cache and the
//!   memoized entry points
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI-facing error formatting

pub mod error;

pub use error::{CellError, ErrorContext, RenderError, user_friendly_error};
