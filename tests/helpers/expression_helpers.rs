//! Assertion helpers for parsed expressions.

#![allow(dead_code)]

use msbuild::parser::{self, Expression, ExpressionNode, Invocation, ParseOptions, descendants};
use msbuild::{TextRange, TextSize};

/// Parse `text` as if it started at `offset` in its document.
pub fn parse_at(text: &str, options: ParseOptions, offset: u32) -> Expression {
    parser::parse(text, options, TextSize::new(offset))
}

/// Slice of `text` covered by an absolute `range`, given where `text` starts.
pub fn slice(text: &str, offset: u32, range: TextRange) -> &str {
    let start = (u32::from(range.start()) - offset) as usize;
    let end = (u32::from(range.end()) - offset) as usize;
    &text[start..end]
}

/// Render an expression back to text: literal runs verbatim, references as
/// their original text.
pub fn render(text: &str, offset: u32, expression: &[ExpressionNode]) -> String {
    expression
        .iter()
        .map(|node| match node {
            ExpressionNode::Text(t) => t.value.clone(),
            ExpressionNode::Item(item) => item.original_text.clone(),
            ExpressionNode::Metadata(metadata) => metadata.original_text.clone(),
            other => slice(text, offset, other.range()).to_string(),
        })
        .collect()
}

/// Top-level nodes tile `[offset, offset + len)` with no gaps or overlaps.
pub fn assert_span_coverage(text: &str, offset: u32, expression: &[ExpressionNode]) {
    let mut cursor = TextSize::new(offset);
    for node in expression {
        assert_eq!(
            node.start(),
            cursor,
            "gap or overlap before {:?} in {:?}",
            node,
            text
        );
        cursor = node.end();
    }
    assert_eq!(
        cursor,
        TextSize::new(offset) + TextSize::of(text),
        "nodes do not reach the end of {:?}",
        text
    );
}

/// Every node, at any depth, lies inside the parsed text.
pub fn assert_offsets_in_bounds(text: &str, offset: u32, expression: &[ExpressionNode]) {
    let bounds = TextRange::at(TextSize::new(offset), TextSize::of(text));
    for node in descendants(expression) {
        assert!(
            bounds.contains_range(node.range()),
            "{:?} escapes {:?} for {:?}",
            node.range(),
            bounds,
            text
        );
    }
}

/// Raw argument texts of a call, `None` for a member access.
pub fn argument_texts(call: &Invocation) -> Option<Vec<&str>> {
    call.arguments
        .as_ref()
        .map(|arguments| arguments.iter().map(|a| a.text.as_str()).collect())
}

/// The non-text nodes of an expression.
pub fn references(expression: &[ExpressionNode]) -> Vec<&ExpressionNode> {
    expression.iter().filter(|n| !n.is_text()).collect()
}

pub fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(TextSize::new(start), TextSize::new(end))
}
