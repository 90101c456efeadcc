//! # msbuild-base
//!
//! Expression front end, document binder and reference search for MSBuild
//! project files.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost, import graph, parallel find-references
//!   ↓
//! hir       → Binder, schema, rules, resolving visitor
//!   ↓
//! syntax    → XML element/attribute tree, element and attribute roles
//!   ↓
//! parser    → Expression parser, invocation chains, type allow-list
//!   ↓
//! base      → Primitives (TextRange, TextSize, ComputeCache)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → ide)
// ============================================================================

/// Foundation types: TextRange helpers, compute-once cache
pub mod base;

/// Parser: property, item and metadata expressions
pub mod parser;

/// Syntax: XML tree with absolute spans
pub mod syntax;

/// High-level IR: bound documents, symbols, rules, visitor
pub mod hir;

/// IDE features: document host, diagnostics, find-references
pub mod ide;

// Re-export commonly needed items
pub use parser::{Expression, ExpressionNode, ParseOptions, parse};

// Re-export foundation types
pub use base::{ComputeCache, TextRange, TextSize};
