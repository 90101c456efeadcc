//! Foundation types for the toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`ComputeCache`] - Concurrent compute-once-per-key cache
//!
//! This module has NO dependencies on other crate modules.

mod cache;
mod range;

pub use cache::ComputeCache;
pub use range::{range_at, range_from, shift};
pub use text_size::{TextRange, TextSize};

// Re-export text-size for convenience
pub use text_size;
