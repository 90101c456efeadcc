//! Resolving visitor.
//!
//! One depth-first walk over a [`BoundDocument`]. Every symbol occurrence
//! (element, attribute, property, item, metadata, function, target, task) is
//! resolved against a [`SchemaCatalog`], offered to the rules registered for
//! its kind and to an optional [`ReferenceCollector`].
//!
//! ```text
//! element ──▶ attributes ──▶ attribute expressions ──▶ body expression ──▶ children
//! ```
//!
//! Inside an expression, a call is visited as receiver, member, then the
//! references in each argument.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use tokio_util::sync::CancellationToken;

use super::binder::{BoundAttribute, BoundDocument, BoundElement, BoundValue};
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::rules::{RuleContext, RuleRegistry};
use super::schema::{BuiltinSchema, SchemaCatalog};
use super::symbols::{ReferenceUsage, SymbolKey};
use crate::parser::ExpressionNode;
use crate::syntax::{AttributeKind, ElementKind};

/// Receives every resolved symbol occurrence.
pub trait ReferenceCollector {
    fn collect(&mut self, key: &SymbolKey, range: TextRange, usage: ReferenceUsage);
}

impl<F> ReferenceCollector for F
where
    F: FnMut(&SymbolKey, TextRange, ReferenceUsage),
{
    fn collect(&mut self, key: &SymbolKey, range: TextRange, usage: ReferenceUsage) {
        self(key, range, usage)
    }
}

/// Receives the occurrences of one searched symbol.
pub trait ReferenceSink {
    fn report_reference(&mut self, range: TextRange, usage: ReferenceUsage);
}

impl ReferenceSink for Vec<(TextRange, ReferenceUsage)> {
    fn report_reference(&mut self, range: TextRange, usage: ReferenceUsage) {
        self.push((range, usage));
    }
}

/// One occurrence of a symbol in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolOccurrence {
    pub key: SymbolKey,
    pub range: TextRange,
    pub usage: ReferenceUsage,
}

/// What a walk produced.
#[derive(Clone, Debug, Default)]
pub struct VisitOutcome {
    pub diagnostics: Vec<Diagnostic>,
    /// The walk stopped early on cancellation.
    pub cancelled: bool,
}

/// Where the walk currently is.
#[derive(Clone, Copy)]
struct Scope<'a> {
    element: &'a BoundElement,
    parent: Option<ElementKind>,
    attribute: Option<&'a BoundAttribute>,
    /// Item type that unqualified `%(Name)` refers to.
    item: Option<&'a str>,
}

/// Walks a bound document once.
pub struct ResolvingVisitor<'a> {
    document: &'a BoundDocument,
    schema: &'a dyn SchemaCatalog,
    rules: Option<&'a RuleRegistry>,
    collector: Option<&'a mut dyn ReferenceCollector>,
    cancel: Option<&'a CancellationToken>,
    diagnostics: DiagnosticCollector,
    cancelled: bool,
}

impl<'a> ResolvingVisitor<'a> {
    pub fn new(document: &'a BoundDocument, schema: &'a dyn SchemaCatalog) -> Self {
        Self {
            document,
            schema,
            rules: None,
            collector: None,
            cancel: None,
            diagnostics: DiagnosticCollector::new(),
            cancelled: false,
        }
    }

    pub fn with_rules(mut self, rules: &'a RuleRegistry) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_collector(mut self, collector: &'a mut dyn ReferenceCollector) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn with_cancellation(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn run(mut self) -> VisitOutcome {
        let document = self.document;
        for root in &document.roots {
            if !self.visit_element(root, None, None) {
                break;
            }
        }
        VisitOutcome {
            diagnostics: self.diagnostics.take(),
            cancelled: self.cancelled,
        }
    }

    /// Returns `false` once cancelled.
    fn visit_element(
        &mut self,
        element: &'a BoundElement,
        parent: Option<ElementKind>,
        item: Option<&'a str>,
    ) -> bool {
        if self.cancel.is_some_and(|c| c.is_cancelled()) {
            self.cancelled = true;
            return false;
        }

        let item = match element.kind {
            ElementKind::Item | ElementKind::ItemDefinition => Some(element.name.as_str()),
            ElementKind::Target => None,
            _ => item,
        };
        let scope = Scope {
            element,
            parent,
            attribute: None,
            item,
        };

        self.element_symbols(scope, element);

        for attribute in &element.attributes {
            self.visit_attribute(Scope { attribute: Some(attribute), ..scope }, attribute);
        }
        if let Some(value) = &element.value {
            self.visit_value(scope, value);
        }

        for child in &element.children {
            if !self.visit_element(child, Some(element.kind), item) {
                return false;
            }
        }
        true
    }

    fn element_symbols(&mut self, scope: Scope<'a>, element: &'a BoundElement) {
        let name = element.name.as_str();
        let range = element.name_range;
        match element.kind {
            ElementKind::Property => {
                self.occurrence(scope, SymbolKey::property(name), range, ReferenceUsage::Write);
            }
            ElementKind::Item => {
                self.occurrence(scope, SymbolKey::item(name), range, ReferenceUsage::Write);
            }
            ElementKind::ItemDefinition => {
                self.occurrence(scope, SymbolKey::item(name), range, ReferenceUsage::Read);
            }
            ElementKind::Metadata => {
                // The enclosing item is the scope's item type.
                let key = SymbolKey::metadata(scope.item, name);
                self.occurrence(scope, key, range, ReferenceUsage::Write);
            }
            ElementKind::Task => {
                self.occurrence(scope, SymbolKey::task(name), range, ReferenceUsage::Read);
            }
            kind => {
                self.occurrence(scope, SymbolKey::element(name), range, ReferenceUsage::Read);
                if kind == ElementKind::Target {
                    if let Some(attribute) = element.attribute(AttributeKind::Name) {
                        if let Some((name, range)) = self.trimmed(attribute.value.range) {
                            let scope = Scope { attribute: Some(attribute), ..scope };
                            self.occurrence(scope, SymbolKey::target(name), range, ReferenceUsage::Write);
                        }
                    }
                }
            }
        }
    }

    fn visit_attribute(&mut self, scope: Scope<'a>, attribute: &'a BoundAttribute) {
        let element = scope.element;
        let key = SymbolKey::attribute(&element.name, attribute.name.clone());
        self.occurrence(scope, key, attribute.name_range, ReferenceUsage::Read);

        match attribute.kind {
            AttributeKind::Metadata if element.kind == ElementKind::Item => {
                let key = SymbolKey::metadata(Some(element.name.as_str()), attribute.name.clone());
                self.occurrence(scope, key, attribute.name_range, ReferenceUsage::Write);
            }
            AttributeKind::PropertyName | AttributeKind::ItemName
                if element.kind == ElementKind::Output =>
            {
                if let Some((name, range)) = self.trimmed(attribute.value.range) {
                    let key = if attribute.kind == AttributeKind::PropertyName {
                        SymbolKey::property(name)
                    } else {
                        SymbolKey::item(name)
                    };
                    self.occurrence(scope, key, range, ReferenceUsage::Write);
                }
            }
            kind if kind.is_target_list() => {
                for node in &attribute.value.expression {
                    if let ExpressionNode::Text(text) = node {
                        if let Some((name, range)) = self.trimmed(text.range) {
                            if name != ";" {
                                self.occurrence(scope, SymbolKey::target(name), range, ReferenceUsage::Read);
                            }
                        }
                    }
                }
            }
            _ => {}
        }

        self.visit_value(scope, &attribute.value);
    }

    fn visit_value(&mut self, scope: Scope<'a>, value: &'a BoundValue) {
        for node in &value.expression {
            self.visit_node(scope, node);
        }
    }

    fn visit_node(&mut self, scope: Scope<'a>, node: &'a ExpressionNode) {
        match node {
            ExpressionNode::Text(_) => {}
            ExpressionNode::Property(property) => {
                let key = SymbolKey::property(property.name.clone());
                self.occurrence(scope, key, property.name_range, ReferenceUsage::Read);
            }
            ExpressionNode::Invocation(invocation) => {
                if let Some(target) = &invocation.target {
                    self.visit_node(scope, target);
                }
                let key = SymbolKey::function(invocation.static_type.as_deref(), invocation.name.clone());
                self.occurrence(scope, key, invocation.name_range, ReferenceUsage::Read);
                for argument in invocation.arguments.iter().flatten() {
                    for node in &argument.expression {
                        self.visit_node(scope, node);
                    }
                }
            }
            ExpressionNode::Item(item) => {
                let key = SymbolKey::item(item.name.clone());
                self.occurrence(scope, key, item.name_range, ReferenceUsage::Read);

                let inner = Scope {
                    item: Some(item.name.as_str()),
                    ..scope
                };
                for node in item.transform.iter().chain(item.separator.iter()).flatten() {
                    self.visit_node(inner, node);
                }
            }
            ExpressionNode::Metadata(metadata) => {
                if let (Some(item), Some(range)) = (&metadata.item_name, metadata.item_name_range) {
                    self.occurrence(scope, SymbolKey::item(item.clone()), range, ReferenceUsage::Read);
                }
                let item = metadata.item_name.as_deref().or(scope.item);
                let key = SymbolKey::metadata(item, metadata.metadata_name.clone());
                self.occurrence(scope, key, metadata.metadata_name_range, ReferenceUsage::Read);
            }
            ExpressionNode::Error(error) => self.diagnostics.expression_error(error),
        }
    }

    /// Resolve one occurrence and hand it to rules and the collector.
    fn occurrence(
        &mut self,
        scope: Scope<'a>,
        key: SymbolKey,
        range: TextRange,
        usage: ReferenceUsage,
    ) {
        if let Some(rules) = self.rules {
            let info = self.schema.lookup(&key);
            let context = RuleContext {
                document: self.document,
                element: scope.element,
                parent: scope.parent,
                attribute: scope.attribute,
                key: &key,
                info: info.as_ref(),
                usage,
                range,
                schema: self.schema,
            };
            rules.run(&context, &mut self.diagnostics);
        }
        if let Some(collector) = self.collector.as_mut() {
            collector.collect(&key, range, usage);
        }
    }

    /// The source text of `range` without surrounding whitespace.
    fn trimmed(&self, range: TextRange) -> Option<(SmolStr, TextRange)> {
        let text = self.document.slice(range);
        let start = text.len() - text.trim_start().len();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let start = range.start() + TextSize::of(&text[..start]);
        Some((trimmed.into(), TextRange::at(start, TextSize::of(trimmed))))
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Run every registered rule over `document`.
///
/// Structured expression errors are always reported, with or without rules.
pub fn run_analysis(
    document: &BoundDocument,
    rules: &RuleRegistry,
    schema: &dyn SchemaCatalog,
) -> Vec<Diagnostic> {
    let mut out = DiagnosticCollector::new();
    for error in &document.xml_errors {
        out.xml_error(error);
    }
    let outcome = ResolvingVisitor::new(document, schema).with_rules(rules).run();
    let mut diagnostics = out.take();
    diagnostics.extend(outcome.diagnostics);
    diagnostics
}

/// Report every occurrence of `target` in `document` to `sink`.
pub fn run_reference_search(
    document: &BoundDocument,
    target: &SymbolKey,
    sink: &mut dyn ReferenceSink,
) {
    search_with_cancellation(document, target, sink, None);
}

/// [`run_reference_search`] that stops early when `cancel` fires.
///
/// Returns `false` if the walk was cancelled.
pub fn search_with_cancellation(
    document: &BoundDocument,
    target: &SymbolKey,
    sink: &mut dyn ReferenceSink,
    cancel: Option<&CancellationToken>,
) -> bool {
    let mut filter = |key: &SymbolKey, range: TextRange, usage: ReferenceUsage| {
        if key.matches(target) {
            sink.report_reference(range, usage);
        }
    };
    let mut visitor = ResolvingVisitor::new(document, &BuiltinSchema).with_collector(&mut filter);
    if let Some(cancel) = cancel {
        visitor = visitor.with_cancellation(cancel);
    }
    !visitor.run().cancelled
}

/// The innermost symbol occurrence covering `offset`.
pub fn symbol_at(document: &BoundDocument, offset: TextSize) -> Option<SymbolOccurrence> {
    let mut best: Option<SymbolOccurrence> = None;
    let mut pick = |key: &SymbolKey, range: TextRange, usage: ReferenceUsage| {
        if !range.contains_inclusive(offset) {
            return;
        }
        let narrower = best.as_ref().is_none_or(|b| range.len() < b.range.len());
        if narrower {
            best = Some(SymbolOccurrence {
                key: key.clone(),
                range,
                usage,
            });
        }
    };
    ResolvingVisitor::new(document, &BuiltinSchema)
        .with_collector(&mut pick)
        .run();
    best
}
