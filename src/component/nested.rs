//! Deferred nested content.
//!
//! A parent component receives its nested content as a [`Nested`] thunk and
//! decides whether, and how often, to force it. Nothing is pre-rendered: the
//! child only runs when the parent calls [`Nested::render`], and it runs to
//! completion before that call returns.

use std::fmt;

use super::Component;
use crate::bundle::InputBundle;
use crate::core::RenderError;

/// Signature of a nested-content producer.
pub type Producer<'a> = dyn Fn() -> Result<String, RenderError> + 'a;

/// Zero-argument producer of nested render output, borrowed for one render.
#[derive(Clone, Copy, Default)]
pub struct Nested<'a> {
    producer: Option<&'a Producer<'a>>,
}

impl<'a> Nested<'a> {
    /// No nested content; [`Nested::render`] yields an empty string.
    #[must_use]
    pub const fn none() -> Self {
        Self { producer: None }
    }

    /// Wrap a producer closure.
    ///
    /// ```rust
    /// use rendercell::Nested;
    ///
    /// let produce = || Ok("<p>child</p>".to_string());
    /// let nested = Nested::from_fn(&produce);
    /// assert_eq!(nested.render().unwrap(), "<p>child</p>");
    /// ```
    #[must_use]
    pub fn from_fn(producer: &'a Producer<'a>) -> Self {
        Self {
            producer: Some(producer),
        }
    }

    pub fn is_present(&self) -> bool {
        self.producer.is_some()
    }

    /// Force the nested content. Each call re-runs the producer.
    pub fn render(&self) -> Result<String, RenderError> {
        match self.producer {
            Some(produce) => produce(),
            None => Ok(String::new()),
        }
    }
}

impl fmt::Debug for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nested").field("present", &self.is_present()).finish()
    }
}

/// Render `parent` with `child` as its nested content.
///
/// The child is rendered lazily, only if and when the parent forces it.
pub fn compose<P, C>(
    parent: &P,
    parent_bundle: &InputBundle,
    child: &C,
    child_bundle: &InputBundle,
) -> Result<String, RenderError>
where
    P: Component + ?Sized,
    C: Component + ?Sized,
{
    let produce = || child.render(child_bundle, Nested::none());
    parent.render(parent_bundle, Nested::from_fn(&produce))
}
