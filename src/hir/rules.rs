//! Diagnostic rules and their registry.
//!
//! Rules are closures keyed by the [`SymbolKind`] they inspect and run in
//! registration order. A rule that returns an error or panics is logged and
//! disabled for the lifetime of its registry; whatever it reported during the
//! failing call is discarded.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};

use rustc_hash::FxHashMap;
use text_size::TextRange;
use thiserror::Error;

use super::binder::{BoundAttribute, BoundDocument, BoundElement};
use super::diagnostics::{Diagnostic, DiagnosticCollector, codes};
use super::schema::{BuiltinSchema, SchemaCatalog};
use super::symbols::{ReferenceUsage, SymbolInfo, SymbolKey, SymbolKind};
use crate::syntax::ElementKind;

/// A fault inside a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("{0}")]
    Failed(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

/// Everything a rule may inspect about one symbol occurrence.
pub struct RuleContext<'a> {
    pub document: &'a BoundDocument,
    pub element: &'a BoundElement,
    pub parent: Option<ElementKind>,
    pub attribute: Option<&'a BoundAttribute>,
    pub key: &'a SymbolKey,
    pub info: Option<&'a SymbolInfo>,
    pub usage: ReferenceUsage,
    pub range: TextRange,
    pub schema: &'a dyn SchemaCatalog,
}

type RuleFn = dyn Fn(&RuleContext<'_>, &mut DiagnosticCollector) -> Result<(), RuleError> + Send + Sync;

struct Rule {
    id: String,
    check: Box<RuleFn>,
    disabled: AtomicBool,
}

/// Rules keyed by symbol kind.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    by_kind: FxHashMap<SymbolKind, Vec<usize>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in rules, minus the ids in `disabled`.
    pub fn with_builtin_rules<S: AsRef<str>>(disabled: &[S]) -> Self {
        let mut registry = Self::new();
        let skip = |id: &str| disabled.iter().any(|d| d.as_ref() == id);

        if !skip(UNKNOWN_ELEMENT) {
            registry.register(UNKNOWN_ELEMENT, SymbolKind::Element, unknown_element);
        }
        if !skip(UNDEFINED_ITEM) {
            registry.register(UNDEFINED_ITEM, SymbolKind::Item, undefined_item);
        }
        if !skip(RESERVED_PROPERTY_WRITE) {
            registry.register(
                RESERVED_PROPERTY_WRITE,
                SymbolKind::Property,
                reserved_property_write,
            );
        }
        registry
    }

    /// Register `check` for occurrences of symbols of `kind`.
    pub fn register<F>(&mut self, id: impl Into<String>, kind: SymbolKind, check: F)
    where
        F: Fn(&RuleContext<'_>, &mut DiagnosticCollector) -> Result<(), RuleError>
            + Send
            + Sync
            + 'static,
    {
        let index = self.rules.len();
        self.rules.push(Rule {
            id: id.into(),
            check: Box::new(check),
            disabled: AtomicBool::new(false),
        });
        self.by_kind.entry(kind).or_default().push(index);
    }

    /// Run every enabled rule for `context.key.kind`.
    pub fn run(&self, context: &RuleContext<'_>, out: &mut DiagnosticCollector) {
        let Some(indices) = self.by_kind.get(&context.key.kind) else {
            return;
        };
        for &index in indices {
            let rule = &self.rules[index];
            if rule.disabled.load(Ordering::Relaxed) {
                continue;
            }

            let mut local = DiagnosticCollector::new();
            let result = catch_unwind(AssertUnwindSafe(|| (rule.check)(context, &mut local)))
                .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));

            match result {
                Ok(()) => out.append(&mut local),
                Err(error) => {
                    tracing::error!(rule = %rule.id, %error, "diagnostic rule failed; disabling it");
                    rule.disabled.store(true, Ordering::Relaxed);
                }
            }
        }
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.rules
            .iter()
            .any(|r| r.id == id && r.disabled.load(Ordering::Relaxed))
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// BUILT-IN RULES
// ============================================================================

pub const UNKNOWN_ELEMENT: &str = "unknown-element";
pub const UNDEFINED_ITEM: &str = "undefined-item";
pub const RESERVED_PROPERTY_WRITE: &str = "reserved-property-write";

fn unknown_element(cx: &RuleContext<'_>, out: &mut DiagnosticCollector) -> Result<(), RuleError> {
    if cx.element.kind != ElementKind::Unknown {
        return Ok(());
    }
    let message = match cx.parent {
        Some(parent) => format!("element '{}' is not valid inside {:?}", cx.element.name, parent),
        None => format!("unexpected root element '{}'", cx.element.name),
    };
    out.add(Diagnostic::warning(cx.element.name_range, message).with_code(codes::UNKNOWN_ELEMENT));
    Ok(())
}

fn undefined_item(cx: &RuleContext<'_>, out: &mut DiagnosticCollector) -> Result<(), RuleError> {
    if cx.usage != ReferenceUsage::Read || cx.info.is_some() {
        return Ok(());
    }
    out.add(
        Diagnostic::warning(cx.range, format!("item '{}' is never defined", cx.key.name))
            .with_code(codes::UNDEFINED_ITEM),
    );
    Ok(())
}

fn reserved_property_write(
    cx: &RuleContext<'_>,
    out: &mut DiagnosticCollector,
) -> Result<(), RuleError> {
    if cx.usage != ReferenceUsage::Write {
        return Ok(());
    }
    let reserved = cx.info.is_some_and(|info| info.read_only)
        || BuiltinSchema::is_reserved_property(&cx.key.name);
    if reserved {
        out.add(
            Diagnostic::error(
                cx.range,
                format!("'{}' is a reserved property and cannot be set", cx.key.name),
            )
            .with_code(codes::RESERVED_PROPERTY),
        );
    }
    Ok(())
}
