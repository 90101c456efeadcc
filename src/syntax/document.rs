//! Element/attribute tree with absolute spans.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::TextRange;

use super::reader::XmlError;

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct XDocument {
    pub text: Arc<str>,
    /// Top-level elements (normally a single `<Project>`).
    pub roots: Vec<XElement>,
    /// Reader failures; the tree holds everything read before the first one.
    pub errors: Vec<XmlError>,
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XElement {
    pub name: SmolStr,
    pub name_range: TextRange,
    /// From `<` to the end of the closing tag (or of the input if unclosed).
    pub range: TextRange,
    /// The start tag alone, `<Name ...>`.
    pub start_tag_range: TextRange,
    pub attributes: Vec<XAttribute>,
    pub children: Vec<XNode>,
    pub is_self_closing: bool,
}

/// `name="value"` on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAttribute {
    pub name: SmolStr,
    pub name_range: TextRange,
    /// Raw value between the quotes, not XML-unescaped.
    pub value: String,
    pub value_range: TextRange,
}

/// A run of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XText {
    /// Raw text as it appears in the source.
    pub value: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XNode {
    Element(XElement),
    Text(XText),
}

impl XDocument {
    /// The first top-level element.
    pub fn root(&self) -> Option<&XElement> {
        self.roots.first()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl XElement {
    /// Attribute by name, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&XAttribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn elements(&self) -> impl Iterator<Item = &XElement> {
        self.children.iter().filter_map(|child| match child {
            XNode::Element(e) => Some(e),
            XNode::Text(_) => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &XText> {
        self.children.iter().filter_map(|child| match child {
            XNode::Text(t) => Some(t),
            XNode::Element(_) => None,
        })
    }

    /// The element's character data runs if it has no child elements.
    ///
    /// Comments split a body into several runs, returned in source order. An
    /// empty element yields one empty run positioned after its start tag.
    pub fn text_runs(&self) -> Option<Vec<XText>> {
        if self.is_self_closing || self.elements().next().is_some() {
            return None;
        }
        let runs: Vec<XText> = self.texts().cloned().collect();
        if runs.is_empty() {
            return Some(vec![XText {
                value: String::new(),
                range: TextRange::empty(self.start_tag_range.end()),
            }]);
        }
        Some(runs)
    }
}
