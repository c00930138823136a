//! rendercell - composable render components with a memoizing render cache
//!
//! A component turns an immutable bundle of named inputs into a string of
//! markup. Components compose by nesting: a parent receives a lazy producer for
//! its children's output and decides if, when and how often to embed it. Any
//! component can be wrapped so that its plain renders go through a bounded,
//! thread-safe LRU cache keyed by a canonical digest of the inputs.
//!
//! # Architecture Overview
//!
//! - **Direct path**: `Component::render(bundle, nested)` renders every time.
//! - **Memoized path**: `Memoized::call(bundle)` derives a [`CacheKey`] from the
//!   bundle, returns the cached output on a hit, and renders once on a miss.
//!
//! Both paths return identical output for the same bundle. Only deterministic
//! components should be memoized.
//!
//! # Core Modules
//!
//! - [`bundle`] - [`InputBundle`] and its typed accessors
//! - [`component`] - the [`Component`] protocol, nesting and [`compose`]
//! - [`key`] - canonical cache keys ([`KeyDeriver`])
//! - [`cache`] - the bounded LRU [`RenderCache`]
//! - [`memo`] - [`Memoized`] components
//!
//! ## Supporting Modules
//!
//! - [`components`] - built-in components used by the CLI
//! - [`config`] - TOML configuration
//! - [`core`] - error types and user-facing error formatting
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rendercell::{Component, Instance, Memoized, RenderCache, bundle};
//! use rendercell::components::{FormalGreeter, Layout};
//!
//! let cache = Arc::new(RenderCache::new(128).unwrap());
//! let greeter = Memoized::new(Instance::<FormalGreeter>::new(), Arc::clone(&cache));
//!
//! let out = greeter.call(&bundle! { "name" => "Macron" }).unwrap();
//! assert_eq!(&*out, "<h1>Hi, President Macron.</h1>");
//!
//! let page = rendercell::compose(
//!     &Layout,
//!     &bundle! { "heading" => "Summit" },
//!     greeter.component(),
//!     &bundle! { "name" => "Merkel", "title" => "Chancellor" },
//! )
//! .unwrap();
//! assert_eq!(page, "<main><header>Summit</header><h1>Hi, Chancellor Merkel.</h1></main>");
//! ```

pub mod bundle;
pub mod cache;
pub mod cli;
pub mod component;
pub mod components;
pub mod config;
pub mod core;
pub mod key;
pub mod memo;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bundle::{BundleValue, InputBundle, OpaqueValue};
pub use cache::{CacheStats, LockPolicy, RenderCache};
pub use component::{
    Component, FnComponent, Instance, Nested, TemplateComponent, View, compose,
};
pub use core::{CellError, RenderError};
pub use key::{CacheKey, KeyDeriver};
pub use memo::Memoized;
