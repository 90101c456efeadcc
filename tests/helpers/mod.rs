//! Shared helpers for integration tests.

pub mod expression_helpers;
pub mod workspace;
