//! Expression parser tests
//!
//! Tests for:
//! - Item, metadata and property references
//! - Invocation chains and static property functions
//! - Span coverage, offsets, idempotence and list splitting

pub mod tests_expression;
pub mod tests_properties;
