//! # Framegraph Core
//!
//! Engine-agnostic building blocks shared by the framegraph crates:
//!
//! - [`dag`] - adjacency-list DAG with cycle-rejecting edge insertion
//! - [`profiling`] - optional Tracy instrumentation macros

pub mod dag;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
