//! Diagnostics: positioned errors and warnings for project files.
//!
//! Diagnostics come from two places: structured expression errors found in
//! bound values, and the rules registered with a
//! [`RuleRegistry`](super::RuleRegistry).

use std::sync::Arc;

use text_size::TextRange;

use crate::parser::ExpressionError;
use crate::syntax::XmlError;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Byte range in the document.
    pub range: TextRange,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Errors (malformed expressions, invalid writes, XML)
/// - **W0001-W0099**: Warnings (unknown elements, undefined symbols)
pub mod codes {
    // ========================================================================
    // ERRORS (E0001-E0099)
    // ========================================================================

    /// Malformed property expression.
    pub const EXPRESSION_ERROR: &str = "E0001";
    /// Write to a reserved property.
    pub const RESERVED_PROPERTY: &str = "E0002";
    /// The document is not well-formed XML.
    pub const XML_ERROR: &str = "E0003";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// Element not valid in its position.
    pub const UNKNOWN_ELEMENT: &str = "W0001";
    /// Item read but never defined.
    pub const UNDEFINED_ITEM: &str = "W0002";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Move every diagnostic of `other` into this collector.
    pub fn append(&mut self, other: &mut DiagnosticCollector) {
        self.diagnostics.append(&mut other.diagnostics);
    }

    /// Add an expression error, spanning the text the failed reference consumed.
    pub fn expression_error(&mut self, error: &ExpressionError) {
        let mut message = error.message();
        if let Some(hint) = error.kind.hint() {
            message = format!("{message} ({hint})");
        }
        self.add(Diagnostic::error(error.range, message).with_code(codes::EXPRESSION_ERROR));
    }

    /// Add an XML reader error as an empty range at its offset.
    pub fn xml_error(&mut self, error: &XmlError) {
        let offset = text_size::TextSize::try_from(error.offset).unwrap_or_default();
        self.add(
            Diagnostic::error(TextRange::empty(offset), error.message.clone())
                .with_code(codes::XML_ERROR),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
