//! High-level IR (HIR): bound documents and everything that resolves them.
//!
//! ## Key Types
//!
//! - [`Binder`] / [`BoundDocument`]: elements with parsed expressions attached
//! - [`SymbolKey`] / [`SymbolInfo`]: symbol identities and descriptors
//! - [`SchemaCatalog`]: what is known about names
//! - [`ResolvingVisitor`]: the single walk behind analysis and reference search
//! - [`RuleRegistry`]: diagnostic rules keyed by symbol kind
//!
//! ## Layers
//!
//! ```text
//! XDocument                    ← INPUT: element/attribute tree
//!     │
//!     ▼
//! Binder::bind                 ← roles, parse options, expressions
//!     │
//!     ▼
//! ResolvingVisitor             ← schema lookup per occurrence
//!     │
//!     ├──▶ run_analysis        ← rules → diagnostics
//!     └──▶ run_reference_search← collector → references
//! ```

mod binder;
mod diagnostics;
mod rules;
mod schema;
mod symbols;
mod visitor;

pub use binder::{
    Binder, BoundAttribute, BoundDocument, BoundElement, BoundValue, UnescapeFn, unescape_text,
};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use rules::{
    RESERVED_PROPERTY_WRITE, RuleContext, RuleError, RuleRegistry, UNDEFINED_ITEM,
    UNKNOWN_ELEMENT,
};
pub use schema::{BuiltinSchema, DocumentSchema, LayeredSchema, SchemaCatalog};
pub use symbols::{ReferenceUsage, SymbolInfo, SymbolKey, SymbolKind, ValueKind};
pub use visitor::{
    ReferenceCollector, ReferenceSink, ResolvingVisitor, SymbolOccurrence, VisitOutcome,
    run_analysis, run_reference_search, search_with_cancellation, symbol_at,
};
