//! Memoized component invocation.
//!
//! [`Memoized`] pairs a [`Component`] with a shared [`RenderCache`]. Calling it
//! derives a key from the bundle and renders only on a cache miss, so repeated
//! calls with equal bundles return the stored output without running the
//! component again.
//!
//! Keys are namespaced by the component name, so several memoized components
//! can share one cache.
//!
//! The memoized path takes no nested content: nested output is not part of the
//! key, and caching it would serve one caller's children to another. Compose
//! through the direct path ([`Component::render`]) instead.
//!
//! ```rust
//! use std::sync::Arc;
//! use rendercell::{FnComponent, Memoized, RenderCache, bundle};
//!
//! let cache = Arc::new(RenderCache::new(64).unwrap());
//! let greeter = Memoized::new(
//!     FnComponent::new("greeter", |b, _| Ok(format!("Hi {}", b.require_str("name")?))),
//!     Arc::clone(&cache),
//! );
//!
//! assert_eq!(&*greeter.call(&bundle! { "name" => "Macron" }).unwrap(), "Hi Macron");
//! assert_eq!(&*greeter.call(&bundle! { "name" => "Macron" }).unwrap(), "Hi Macron");
//! assert_eq!(cache.stats().misses, 1);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::bundle::InputBundle;
use crate::cache::RenderCache;
use crate::component::Component;
use crate::core::{CellError, RenderError};
use crate::key::KeyDeriver;

/// A component whose plain renders go through a [`RenderCache`].
pub struct Memoized<C> {
    component: C,
    cache: Arc<RenderCache>,
    deriver: KeyDeriver,
}

impl<C: Component> Memoized<C> {
    pub fn new(component: C, cache: Arc<RenderCache>) -> Self {
        let deriver = KeyDeriver::namespaced(component.name());
        Self {
            component,
            cache,
            deriver,
        }
    }

    /// Render `bundle` through the cache.
    ///
    /// Returns the same output as [`Memoized::render`] for the same bundle;
    /// the component runs at most once per distinct bundle while its entry
    /// stays cached.
    ///
    /// # Errors
    ///
    /// - [`CellError::UnkeyableInput`] if the bundle has no canonical key; the
    ///   component is not invoked.
    /// - [`CellError::Render`] with the component's error, unchanged. Nothing
    ///   is cached.
    pub fn call(&self, bundle: &InputBundle) -> Result<Arc<str>, CellError> {
        let key = self.deriver.derive_key(bundle)?;
        let output = self.cache.get_or_compute(&key, || {
            tracing::debug!("Rendering '{}' for {}", self.component.name(), key);
            self.component.render_plain(bundle)
        })?;
        Ok(output)
    }

    /// Render directly, bypassing the cache.
    pub fn render(&self, bundle: &InputBundle) -> Result<String, RenderError> {
        self.component.render_plain(bundle)
    }

    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn deriver(&self) -> &KeyDeriver {
        &self.deriver
    }
}

impl<C: Component> fmt::Debug for Memoized<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("component", &self.component.name())
            .field("cache", &self.cache)
            .finish()
    }
}
