//! Integration test suite for rendercell
//!
//! End-to-end tests through the public API and the `rendercell` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **memoization**: memoized vs direct rendering, eviction, concurrency
//! - **composition**: nesting, laziness and error propagation across components
//! - **cli**: the `rendercell` binary (render, cache demo, config)

mod cli;
mod composition;
mod memoization;
