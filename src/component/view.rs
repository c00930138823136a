//! Stateful-instance components.
//!
//! A [`View`] is a struct built from the bundle at the start of every render.
//! Its fields hold the resolved inputs (defaults applied), and its helper
//! methods read them while the output is assembled. [`Instance`] adapts a
//! `View` type to the [`Component`] protocol.

use std::fmt;
use std::marker::PhantomData;

use super::{Component, Nested};
use crate::bundle::InputBundle;
use crate::core::RenderError;

/// A component whose render state is constructed from the bundle.
pub trait View: Sized {
    /// Component name.
    const NAME: &'static str;

    /// Resolve inputs from the bundle. Validation failures abort the render.
    fn from_bundle(bundle: &InputBundle) -> Result<Self, RenderError>;

    fn render(&self, nested: Nested<'_>) -> Result<String, RenderError>;
}

/// Adapter exposing a [`View`] as a [`Component`].
pub struct Instance<V> {
    _view: PhantomData<fn() -> V>,
}

impl<V: View> Instance<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self { _view: PhantomData }
    }
}

impl<V: View> Default for Instance<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Instance<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("view", &std::any::type_name::<V>()).finish()
    }
}

impl<V: View> Component for Instance<V> {
    fn name(&self) -> &str {
        V::NAME
    }

    fn render(&self, bundle: &InputBundle, nested: Nested<'_>) -> Result<String, RenderError> {
        V::from_bundle(bundle)?.render(nested)
    }
}
