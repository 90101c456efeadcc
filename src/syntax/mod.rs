//! Syntax layer: the XML element/attribute tree with absolute spans.
//!
//! [`XDocument::parse`] reads source text with `quick-xml`; [`ElementKind`]
//! and [`AttributeKind`] give each node its role in a project file.

mod document;
mod kinds;
mod reader;

pub use document::{XAttribute, XDocument, XElement, XNode, XText};
pub use kinds::{AttributeKind, ElementKind};
pub use reader::XmlError;
