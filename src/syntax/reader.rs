//! Builds an [`XDocument`] from source text with `quick-xml`.
//!
//! quick-xml segments the input into events; spans are recovered from the
//! reader position after each markup event. Start tags are rescanned from
//! the source so attribute value spans point at the exact bytes between the
//! quotes.
//!
//! End tags are matched against the open elements here rather than by
//! quick-xml, so a mismatch is recorded and reading goes on: an end tag that
//! names an open ancestor closes everything above it, any other name closes
//! the innermost element.

use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::Event;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::document::{XAttribute, XDocument, XElement, XNode, XText};
use crate::base::range_from;

const ORIGIN: TextSize = TextSize::new(0);

/// An XML reader failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML error at offset {offset}: {message}")]
pub struct XmlError {
    pub message: String,
    pub offset: usize,
}

impl XDocument {
    /// Read `text` into an element tree.
    ///
    /// Never fails: on malformed input the tree built so far is kept, open
    /// elements are closed at the end of the input and each failure is
    /// recorded in [`XDocument::errors`].
    pub fn parse(text: &str) -> XDocument {
        let mut builder = TreeBuilder::default();
        let mut errors = Vec::new();

        let mut reader = Reader::from_str(text);
        {
            let config = reader.config_mut();
            // End tags are matched by the tree builder.
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
        }

        // End of the last markup event; character data starts here.
        let mut last_end = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(_)) => {
                    let end = reader.buffer_position() as usize;
                    let start = tag_start(text, end);
                    builder.open(scan_start_tag(text, start, end, false));
                    last_end = end;
                }
                Ok(Event::Empty(_)) => {
                    let end = reader.buffer_position() as usize;
                    let start = tag_start(text, end);
                    builder.attach(XNode::Element(scan_start_tag(text, start, end, true)));
                    last_end = end;
                }
                Ok(Event::End(tag)) => {
                    let end = reader.buffer_position() as usize;
                    let start = tag_start(text, end);
                    let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                    if let Err(error) = builder.close_named(&name, start, end) {
                        tracing::debug!(%error, "mismatched end tag");
                        errors.push(error);
                    }
                    last_end = end;
                }
                Ok(Event::Text(raw)) => {
                    let len = raw.len();
                    let start = last_end;
                    let end = (start + len).min(text.len());
                    builder.attach(XNode::Text(XText {
                        value: text[start..end].to_string(),
                        range: range_from(ORIGIN, start, end),
                    }));
                    last_end = end;
                }
                Ok(Event::CData(_)) => {
                    let end = reader.buffer_position() as usize;
                    let start = text[..end].rfind("<![CDATA[").map_or(end, |i| i + 9);
                    let content_end = end.saturating_sub(3).max(start);
                    builder.attach(XNode::Text(XText {
                        value: text[start..content_end].to_string(),
                        range: range_from(ORIGIN, start, content_end),
                    }));
                    last_end = end;
                }
                Ok(Event::Eof) => {
                    if let Some(open) = builder.stack.last() {
                        errors.push(XmlError {
                            message: format!("element '<{}>' is never closed", open.name),
                            offset: text.len(),
                        });
                    }
                    break;
                }
                Ok(_) => {
                    last_end = reader.buffer_position() as usize;
                }
                Err(e) => {
                    let error = XmlError {
                        message: e.to_string(),
                        offset: reader.error_position() as usize,
                    };
                    tracing::debug!(%error, "XML reader stopped");
                    errors.push(error);
                    break;
                }
            }
        }

        XDocument {
            text: Arc::from(text),
            roots: builder.finish(text.len()),
            errors,
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<XElement>,
    roots: Vec<XElement>,
}

impl TreeBuilder {
    fn open(&mut self, element: XElement) {
        self.stack.push(element);
    }

    fn attach(&mut self, node: XNode) {
        match (self.stack.last_mut(), node) {
            (Some(parent), node) => parent.children.push(node),
            (None, XNode::Element(element)) => self.roots.push(element),
            // Character data outside the root element is ignored.
            (None, XNode::Text(_)) => {}
        }
    }

    /// Close the element named by the end tag at `start..end`.
    ///
    /// A name that matches no open element is taken as a misspelling and
    /// closes the innermost one.
    fn close_named(&mut self, name: &str, start: usize, end: usize) -> Result<(), XmlError> {
        let Some(open) = self.stack.last().map(|e| e.name.clone()) else {
            return Err(XmlError {
                message: format!("unexpected end tag '</{name}>'"),
                offset: start,
            });
        };
        if open == name {
            self.close(end);
            return Ok(());
        }

        if let Some(depth) = self.stack.iter().rposition(|e| e.name == name) {
            while self.stack.len() > depth + 1 {
                self.close(start);
            }
        }
        self.close(end);
        Err(XmlError {
            message: format!("expected '</{open}>', found '</{name}>'"),
            offset: start,
        })
    }

    fn close(&mut self, end: usize) {
        if let Some(mut element) = self.stack.pop() {
            element.range = range_from(ORIGIN, element.range.start().into(), end);
            self.attach(XNode::Element(element));
        }
    }

    fn finish(mut self, len: usize) -> Vec<XElement> {
        while !self.stack.is_empty() {
            self.close(len);
        }
        self.roots
    }
}

/// Start of the tag that ends at `end` (tags never contain a raw `<`).
fn tag_start(text: &str, end: usize) -> usize {
    text[..end].rfind('<').unwrap_or(0)
}

/// Build an element from the start tag `text[start..end]`.
fn scan_start_tag(text: &str, start: usize, end: usize, self_closing: bool) -> XElement {
    let tag = &text[..end];
    let bytes = tag.as_bytes();
    let is_delimiter = |b: u8| b.is_ascii_whitespace() || b == b'/' || b == b'>';

    let name_start = start + 1;
    let mut pos = name_start;
    while pos < end && !is_delimiter(bytes[pos]) {
        pos += 1;
    }
    let name_end = pos;

    let mut attributes = Vec::new();
    loop {
        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= end || bytes[pos] == b'/' || bytes[pos] == b'>' {
            break;
        }

        let attr_name_start = pos;
        while pos < end && !is_delimiter(bytes[pos]) && bytes[pos] != b'=' {
            pos += 1;
        }
        let attr_name_end = pos;
        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= end || bytes[pos] != b'=' {
            break;
        }
        pos += 1;
        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let Some(&quote) = bytes.get(pos).filter(|b| **b == b'"' || **b == b'\'') else {
            break;
        };
        let value_start = pos + 1;
        let Some(len) = tag[value_start..].find(quote as char) else {
            break;
        };
        let value_end = value_start + len;
        pos = value_end + 1;

        attributes.push(XAttribute {
            name: SmolStr::new(&tag[attr_name_start..attr_name_end]),
            name_range: range_from(ORIGIN, attr_name_start, attr_name_end),
            value: tag[value_start..value_end].to_string(),
            value_range: range_from(ORIGIN, value_start, value_end),
        });
    }

    let start_tag_range = range_from(ORIGIN, start, end);
    XElement {
        name: SmolStr::new(&tag[name_start..name_end]),
        name_range: range_from(ORIGIN, name_start, name_end),
        range: if self_closing {
            start_tag_range
        } else {
            TextRange::empty(start_tag_range.start())
        },
        start_tag_range,
        attributes,
        children: Vec::new(),
        is_self_closing: self_closing,
    }
}
