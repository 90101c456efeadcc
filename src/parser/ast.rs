//! Expression tree produced by [`parse`](super::parse).
//!
//! Every node carries a [`TextRange`] absolute to the document the value was
//! parsed from. Sub-expressions (item transforms, separators, invocation
//! receivers and arguments) are exclusively owned by their parent node.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::errors::ExpressionErrorKind;

/// A parsed value: literal runs and references in source order.
pub type Expression = Vec<ExpressionNode>;

/// One node of a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionNode {
    Text(ExpressionText),
    Item(ItemReference),
    Metadata(MetadataReference),
    Property(PropertyReference),
    Invocation(Invocation),
    Error(ExpressionError),
}

/// A literal text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionText {
    /// The text of the run. Raw after parsing, unescaped after binding.
    pub value: String,
    pub range: TextRange,
}

/// `@(Name[->'transform'][,'separator'])`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReference {
    pub name: SmolStr,
    pub name_range: TextRange,
    /// Parsed body of the transform, metadata references allowed.
    pub transform: Option<Expression>,
    /// Parsed custom separator.
    pub separator: Option<Expression>,
    pub original_text: String,
    pub range: TextRange,
}

/// `%(name)` or `%(item.name)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataReference {
    pub item_name: Option<SmolStr>,
    pub metadata_name: SmolStr,
    pub item_name_range: Option<TextRange>,
    pub metadata_name_range: TextRange,
    pub original_text: String,
    pub range: TextRange,
}

/// `$(Name)`, or the receiver of an instance invocation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyReference {
    pub name: SmolStr,
    pub name_range: TextRange,
    /// The whole `$(Name)` for a simple reference; the name alone when the
    /// property is the receiver of an invocation.
    pub range: TextRange,
}

/// One step of an invocation chain.
///
/// Exactly one of `target` and `static_type` is set. Arguments are `None` for
/// a member access without parentheses and an empty list for `()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: Option<Box<ExpressionNode>>,
    pub static_type: Option<SmolStr>,
    pub name: SmolStr,
    pub name_range: TextRange,
    pub arguments: Option<Vec<Argument>>,
    pub range: TextRange,
}

/// One argument of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Raw text between the separators, surrounding whitespace included.
    pub text: String,
    pub range: TextRange,
    /// The argument parsed with the enclosing value's options, unsplit.
    pub expression: Expression,
}

/// A structured parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionError {
    pub kind: ExpressionErrorKind,
    /// Where the error was raised.
    pub position: TextSize,
    /// The text consumed by the failed reference.
    pub range: TextRange,
}

impl ExpressionError {
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl ExpressionNode {
    pub fn range(&self) -> TextRange {
        match self {
            ExpressionNode::Text(n) => n.range,
            ExpressionNode::Item(n) => n.range,
            ExpressionNode::Metadata(n) => n.range,
            ExpressionNode::Property(n) => n.range,
            ExpressionNode::Invocation(n) => n.range,
            ExpressionNode::Error(n) => n.range,
        }
    }

    pub fn start(&self) -> TextSize {
        self.range().start()
    }

    pub fn end(&self) -> TextSize {
        self.range().end()
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ExpressionNode::Text(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ExpressionNode::Error(_))
    }

    pub fn as_text(&self) -> Option<&ExpressionText> {
        match self {
            ExpressionNode::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&ExpressionNode> {
        match self {
            ExpressionNode::Item(item) => item
                .transform
                .iter()
                .chain(item.separator.iter())
                .flatten()
                .collect(),
            ExpressionNode::Invocation(inv) => inv
                .target
                .as_deref()
                .into_iter()
                .chain(inv.arguments.iter().flatten().flat_map(|a| &a.expression))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Innermost node whose range contains `offset` (end inclusive).
    pub fn find_at(&self, offset: TextSize) -> Option<&ExpressionNode> {
        if !self.range().contains_inclusive(offset) {
            return None;
        }
        self.children()
            .into_iter()
            .find_map(|child| child.find_at(offset))
            .or(Some(self))
    }
}

/// Innermost node of `expression` containing `offset`.
pub fn node_at(expression: &[ExpressionNode], offset: TextSize) -> Option<&ExpressionNode> {
    expression.iter().find_map(|node| node.find_at(offset))
}

/// Pre-order traversal of every node, including nested sub-expressions.
pub fn descendants(expression: &[ExpressionNode]) -> Vec<&ExpressionNode> {
    fn walk<'a>(node: &'a ExpressionNode, out: &mut Vec<&'a ExpressionNode>) {
        out.push(node);
        for child in node.children() {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for node in expression {
        walk(node, &mut out);
    }
    out
}

/// Whether any node of `expression`, at any depth, is an error.
pub fn has_errors(expression: &[ExpressionNode]) -> bool {
    descendants(expression).iter().any(|n| n.is_error())
}
