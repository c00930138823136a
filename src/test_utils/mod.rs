//! Test utilities for rendercell.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::atomic::Ordering;
//! use rendercell::{Component, bundle};
//! use rendercell::test_utils::{CountingComponent, init_test_logging};
//!
//! init_test_logging(None);
//! let greeter = CountingComponent::formal_greeter();
//! greeter.render_plain(&bundle! { "name" => "Macron" }).unwrap();
//! assert_eq!(greeter.count(), 1);
//! ```

use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::bundle::InputBundle;
use crate::component::{Component, Instance, Nested};
use crate::components::FormalGreeter;
use crate::core::RenderError;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=rendercell=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Wraps a component and counts how many times it actually renders.
pub struct CountingComponent {
    inner: Arc<dyn Component>,
    renders: Arc<AtomicUsize>,
}

impl CountingComponent {
    pub fn new(inner: Arc<dyn Component>) -> Self {
        Self {
            inner,
            renders: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A counting [`FormalGreeter`].
    pub fn formal_greeter() -> Self {
        Self::new(Arc::new(Instance::<FormalGreeter>::new()))
    }

    /// Shared handle to the render counter; stays valid after the component
    /// is moved into a [`crate::Memoized`].
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.renders)
    }

    pub fn count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl Component for CountingComponent {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.inner.render(bundle, nested)
    }
}
