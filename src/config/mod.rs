//! Configuration management.
//!
//! Settings live in one TOML file (see [`CellConfig`] for the format and
//! location). The CLI loads it once at startup and builds its
//! [`RenderCache`](crate::RenderCache) and template components from it; library
//! users can build a [`CacheConfig`] directly instead.

mod global;

pub use global::{CacheConfig, CellConfig, TemplatingConfig};
