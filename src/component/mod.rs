//! The render protocol.
//!
//! Every component satisfies one contract,
//! `render(bundle, nested) -> Result<String, RenderError>`, whatever its
//! implementation strategy:
//!
//! - [`FnComponent`] - a stateless function of the bundle
//! - [`Instance`] over a [`View`] - a fresh instance built from the bundle for
//!   each render, so helper methods can read the inputs as fields
//! - [`TemplateComponent`] - a `tera` template rendered against the bundle
//!
//! Rendering is synchronous and must be a deterministic function of the
//! bundle (and nested content) for memoization to be sound. Side effects are
//! the component author's business; they are exactly what the memoized path
//! amortizes.
//!
//! # Example
//!
//! ```rust
//! use rendercell::{Component, FnComponent, Nested, bundle};
//!
//! let greeter = FnComponent::new("greeter", |bundle, _nested| {
//!     Ok(format!("<h1>Hi, {}.</h1>", bundle.require_str("name")?))
//! });
//!
//! let out = greeter.render(&bundle! { "name" => "Macron" }, Nested::none()).unwrap();
//! assert_eq!(out, "<h1>Hi, Macron.</h1>");
//! ```

mod nested;
mod template;
mod view;

use std::fmt;
use std::sync::Arc;

pub use nested::{Nested, Producer, compose};
pub use template::TemplateComponent;
pub use view::{Instance, View};

use crate::bundle::InputBundle;
use crate::core::RenderError;

/// A unit of render logic.
pub trait Component: Send + Sync {
    /// Stable name; used as the cache-key namespace by [`crate::Memoized`].
    fn name(&self) -> &str;

    /// Render `bundle`, forcing `nested` as many times as the output needs.
    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError>;

    /// Render without nested content.
    fn render_plain(&self, bundle: &InputBundle) -> Result<String, RenderError> {
        self.render(bundle, Nested::none())
    }
}

impl<T: Component + ?Sized> Component for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError> {
        (**self).render(bundle, nested)
    }
}

impl<T: Component + ?Sized> Component for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError> {
        (**self).render(bundle, nested)
    }
}

/// A stateless component backed by a function.
pub struct FnComponent<F> {
    name: String,
    render_fn: F,
}

impl<F> FnComponent<F>
where
    F: Fn(&InputBundle, Nested<'_>) -> Result<String, RenderError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, render_fn: F) -> Self {
        Self {
            name: name.into(),
            render_fn,
        }
    }
}

impl<F> Component for FnComponent<F>
where
    F: Fn(&InputBundle, Nested<'_>) -> Result<String, RenderError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError> {
        (self.render_fn)(bundle, nested)
    }
}

impl<F> fmt::Debug for FnComponent<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent").field("name", &self.name).finish_non_exhaustive()
    }
}
