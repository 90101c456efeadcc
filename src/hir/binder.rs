//! Document binder.
//!
//! Walks an [`XDocument`], gives every element and attribute its role, picks
//! parse options from that role and attaches the parsed expression to each
//! value. Literal runs are unescaped as the last step; reference and error
//! nodes are left as parsed.

use std::borrow::Cow;
use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::parser::{self, Expression, ExpressionNode, ExpressionText, ParseOptions};
use crate::syntax::{
    AttributeKind, ElementKind, XAttribute, XDocument, XElement, XText, XmlError,
};

/// Unescape routine applied to literal runs.
pub type UnescapeFn = fn(&str) -> Cow<'_, str>;

/// A document with an expression attached to every value.
#[derive(Debug, Clone)]
pub struct BoundDocument {
    pub text: Arc<str>,
    pub roots: Vec<BoundElement>,
    pub xml_errors: Vec<XmlError>,
}

#[derive(Debug, Clone)]
pub struct BoundElement {
    pub name: SmolStr,
    pub name_range: TextRange,
    pub range: TextRange,
    pub kind: ElementKind,
    /// Whether the element is nested in a `Target`.
    pub in_target: bool,
    pub attributes: Vec<BoundAttribute>,
    pub children: Vec<BoundElement>,
    /// Body of a property or metadata element.
    pub value: Option<BoundValue>,
}

#[derive(Debug, Clone)]
pub struct BoundAttribute {
    pub name: SmolStr,
    pub name_range: TextRange,
    pub kind: AttributeKind,
    pub value: BoundValue,
}

#[derive(Debug, Clone)]
pub struct BoundValue {
    /// The value as written in the source, comments left out.
    pub raw: String,
    /// From the first to the last character of the value.
    pub range: TextRange,
    pub expression: Expression,
}

impl BoundDocument {
    pub fn root(&self) -> Option<&BoundElement> {
        self.roots.first()
    }

    /// Source text covered by `range`.
    pub fn slice(&self, range: TextRange) -> &str {
        self.text.get(std::ops::Range::<usize>::from(range)).unwrap_or("")
    }

    /// Depth-first iterator over every element.
    pub fn elements(&self) -> impl Iterator<Item = &BoundElement> {
        let mut stack: Vec<&BoundElement> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

impl BoundElement {
    pub fn attribute(&self, kind: AttributeKind) -> Option<&BoundAttribute> {
        self.attributes.iter().find(|a| a.kind == kind)
    }
}

/// Binds documents with a configurable unescape routine.
#[derive(Clone, Copy)]
pub struct Binder {
    unescape: UnescapeFn,
}

impl Default for Binder {
    fn default() -> Self {
        Self {
            unescape: unescape_text,
        }
    }
}

impl Binder {
    pub fn new(unescape: UnescapeFn) -> Self {
        Self { unescape }
    }

    pub fn bind(&self, document: &XDocument) -> BoundDocument {
        let mut values = 0usize;
        let roots = document
            .roots
            .iter()
            .map(|root| self.bind_element(root, None, false, &mut values))
            .collect();

        tracing::debug!(
            values,
            xml_errors = document.errors.len(),
            "bound document"
        );

        BoundDocument {
            text: document.text.clone(),
            roots,
            xml_errors: document.errors.clone(),
        }
    }

    fn bind_element(
        &self,
        element: &XElement,
        parent: Option<ElementKind>,
        in_target: bool,
        values: &mut usize,
    ) -> BoundElement {
        let kind = ElementKind::classify(parent, &element.name);

        let attributes: Vec<BoundAttribute> = element
            .attributes
            .iter()
            .map(|attribute| {
                *values += 1;
                self.bind_attribute(attribute, kind, in_target)
            })
            .collect();

        let value = body_options(kind, in_target).and_then(|options| {
            let runs = element.text_runs()?;
            *values += 1;
            self.bind_body(&runs, options)
        });

        let children = if kind.has_opaque_content() {
            Vec::new()
        } else {
            let child_in_target = in_target || kind == ElementKind::Target;
            element
                .elements()
                .map(|child| self.bind_element(child, Some(kind), child_in_target, values))
                .collect()
        };

        BoundElement {
            name: element.name.clone(),
            name_range: element.name_range,
            range: element.range,
            kind,
            in_target,
            attributes,
            children,
            value,
        }
    }

    fn bind_attribute(
        &self,
        attribute: &XAttribute,
        element: ElementKind,
        in_target: bool,
    ) -> BoundAttribute {
        let kind = AttributeKind::classify(element, &attribute.name);
        let options = attribute_options(kind, element, in_target);
        BoundAttribute {
            name: attribute.name.clone(),
            name_range: attribute.name_range,
            kind,
            value: self.bind_value(&attribute.value, attribute.value_range, options),
        }
    }

    /// Bind the text runs of an element body as one value.
    ///
    /// Each run is parsed at its own offset, so a comment inside the body
    /// leaves a gap in the value's nodes rather than dropping the value.
    fn bind_body(&self, runs: &[XText], options: ParseOptions) -> Option<BoundValue> {
        let (first, rest) = runs.split_first()?;
        let mut value = self.bind_value(&first.value, first.range, Some(options));
        for run in rest {
            let next = self.bind_value(&run.value, run.range, Some(options));
            value.raw.push_str(&next.raw);
            value.range = value.range.cover(next.range);
            value.expression.extend(next.expression);
        }
        Some(value)
    }

    /// Parse `raw` with `options`, or keep it as one literal run for `None`.
    fn bind_value(&self, raw: &str, range: TextRange, options: Option<ParseOptions>) -> BoundValue {
        let expression = match options {
            Some(options) => {
                let mut expression = parser::parse(raw, options, range.start());
                for node in &mut expression {
                    if let ExpressionNode::Text(text) = node {
                        if let Cow::Owned(unescaped) = (self.unescape)(&text.value) {
                            text.value = unescaped;
                        }
                    }
                }
                expression
            }
            None => literal(raw, range.start()),
        };
        BoundValue {
            raw: raw.to_string(),
            range,
            expression,
        }
    }
}

/// Default unescape: XML entities, then `%XX` escapes.
pub fn unescape_text(text: &str) -> Cow<'_, str> {
    let xml = quick_xml::escape::unescape(text).unwrap_or(Cow::Borrowed(text));
    match xml {
        Cow::Borrowed(borrowed) => parser::unescape(borrowed),
        Cow::Owned(owned) => Cow::Owned(parser::unescape(&owned).into_owned()),
    }
}

fn literal(raw: &str, start: TextSize) -> Expression {
    if raw.is_empty() {
        return Vec::new();
    }
    vec![ExpressionNode::Text(ExpressionText {
        value: raw.to_string(),
        range: TextRange::at(start, TextSize::of(raw)),
    })]
}

/// Options for the body of an element, `None` if the body is not a value.
fn body_options(kind: ElementKind, in_target: bool) -> Option<ParseOptions> {
    match (kind, in_target) {
        (ElementKind::Property, false) => Some(ParseOptions::NONE),
        (ElementKind::Metadata, false) => Some(ParseOptions::NONE.with_metadata(true)),
        (ElementKind::Property | ElementKind::Metadata, true) => Some(ParseOptions::ITEMS),
        _ => None,
    }
}

/// Options for an attribute value, `None` for values that are names.
fn attribute_options(
    kind: AttributeKind,
    element: ElementKind,
    in_target: bool,
) -> Option<ParseOptions> {
    use AttributeKind as A;

    match kind {
        A::Label | A::Xmlns | A::Name | A::TaskName => None,
        A::Condition => {
            let metadata = in_target
                || matches!(
                    element,
                    ElementKind::Item | ElementKind::ItemDefinition | ElementKind::Metadata
                );
            Some(ParseOptions::ITEMS.with_metadata(metadata))
        }
        A::Include
        | A::Exclude
        | A::Remove
        | A::Update
        | A::KeepMetadata
        | A::RemoveMetadata
        | A::MatchOnMetadata
        | A::Inputs
        | A::Outputs
        | A::Returns
        | A::TaskParameter => Some(ParseOptions::ITEM_LIST),
        A::Metadata => Some(ParseOptions::ITEMS),
        kind if kind.is_target_list() => Some(ParseOptions::LIST),
        A::TreatAsLocalProperty => Some(ParseOptions::LIST),
        _ => Some(ParseOptions::NONE),
    }
}
