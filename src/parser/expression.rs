//! Multi-pass expression parser.
//!
//! ```text
//! text ──split on ';'──▶ segments
//!        ──@(...)─────▶ ItemReference + literal runs
//!        ──$(...)─────▶ PropertyReference / Invocation / Error + literal runs
//!        ──%(...)─────▶ MetadataReference + Text
//! ```
//!
//! Each pass only rescans the literal runs left by the previous one, and every
//! run is carried with its absolute offset, so nodes come out in source order
//! with no gaps or overlaps.

use smol_str::SmolStr;
use text_size::TextSize;

use super::allow_list::{TypeLookup, lookup_type};
use super::ast::{
    Expression, ExpressionError, ExpressionNode, ExpressionText, ItemReference, MetadataReference,
    PropertyReference,
};
use super::errors::ExpressionErrorKind;
use super::invocation::{Receiver, parse_chain};
use super::options::ParseOptions;
use super::scanner::{
    Structural, find_closing_paren, find_from, find_structural, is_valid_name,
    match_item_reference, match_metadata_reference, skip_whitespace, split_list,
    starts_with_ignore_case, trim_range,
};
use crate::base::{range_at, range_from, shift};

/// Parse one value into literal runs and typed references.
///
/// `offset` is the absolute position of `text` in its document; every range
/// in the result is absolute. Never fails: malformed property syntax becomes
/// an [`ExpressionNode::Error`] and parsing continues after it.
pub fn parse(text: &str, options: ParseOptions, offset: TextSize) -> Expression {
    let mut out = Vec::new();
    let parser = ExpressionParser { options };

    if options.split {
        let (segments, separators) = split_list(text);
        for (i, segment) in segments.into_iter().enumerate() {
            if !segment.is_empty() {
                parser.extract_items(&text[segment.clone()], shift(offset, segment.start), &mut out);
            }
            if let Some(&separator) = separators.get(i) {
                out.push(ExpressionNode::Text(ExpressionText {
                    value: ";".to_string(),
                    range: range_at(offset, separator, 1),
                }));
            }
        }
    } else {
        parser.extract_items(text, offset, &mut out);
    }

    out
}

struct ExpressionParser {
    options: ParseOptions,
}

impl ExpressionParser {
    fn extract_items(&self, text: &str, base: TextSize, out: &mut Expression) {
        if !self.options.allow_items {
            return self.extract_properties(text, base, out);
        }

        let mut literal_start = 0;
        let mut pos = 0;
        while let Some(at) = find_from(text, pos, "@(") {
            // Arguments of a function call are parsed with the call.
            if inside_property(text, at) {
                pos = at + 2;
                continue;
            }
            let Some(found) = match_item_reference(text, at) else {
                pos = at + 1;
                continue;
            };
            self.extract_properties(&text[literal_start..at], shift(base, literal_start), out);

            let transform = found.transform.as_ref().map(|r| {
                parse(&text[r.clone()], ParseOptions::TRANSFORM, shift(base, r.start))
            });
            let separator = found
                .separator
                .as_ref()
                .map(|r| parse(&text[r.clone()], ParseOptions::LIST, shift(base, r.start)));

            out.push(ExpressionNode::Item(ItemReference {
                name: SmolStr::new(&text[found.name.clone()]),
                name_range: range_from(base, found.name.start, found.name.end),
                transform,
                separator,
                original_text: text[at..found.end].to_string(),
                range: range_from(base, at, found.end),
            }));

            literal_start = found.end;
            pos = found.end;
        }
        self.extract_properties(&text[literal_start..], shift(base, literal_start), out);
    }

    fn extract_properties(&self, text: &str, base: TextSize, out: &mut Expression) {
        let mut literal_start = 0;
        let mut pos = 0;
        while let Some(at) = find_from(text, pos, "$(") {
            let (node, end) = parse_property(text, at, base, self.options);
            self.extract_metadata(&text[literal_start..at], shift(base, literal_start), out);
            out.push(node);
            literal_start = end;
            pos = end;
        }
        self.extract_metadata(&text[literal_start..], shift(base, literal_start), out);
    }

    fn extract_metadata(&self, text: &str, base: TextSize, out: &mut Expression) {
        if !self.options.allow_metadata {
            return push_text(text, base, out);
        }

        let mut literal_start = 0;
        let mut pos = 0;
        while let Some(at) = find_from(text, pos, "%(") {
            let Some(found) = match_metadata_reference(text, at) else {
                pos = at + 1;
                continue;
            };
            push_text(&text[literal_start..at], shift(base, literal_start), out);

            out.push(ExpressionNode::Metadata(MetadataReference {
                item_name: found.item.as_ref().map(|r| SmolStr::new(&text[r.clone()])),
                metadata_name: SmolStr::new(&text[found.metadata.clone()]),
                item_name_range: found.item.as_ref().map(|r| range_from(base, r.start, r.end)),
                metadata_name_range: range_from(base, found.metadata.start, found.metadata.end),
                original_text: text[at..found.end].to_string(),
                range: range_from(base, at, found.end),
            }));

            literal_start = found.end;
            pos = found.end;
        }
        push_text(&text[literal_start..], shift(base, literal_start), out);
    }
}

fn push_text(text: &str, base: TextSize, out: &mut Expression) {
    if text.is_empty() {
        return;
    }
    out.push(ExpressionNode::Text(ExpressionText {
        value: text.to_string(),
        range: range_at(base, 0, text.len()),
    }));
}

/// Parse the property reference whose `$` is at `at`.
///
/// Returns the node and the index where scanning resumes.
fn parse_property(
    text: &str,
    at: usize,
    base: TextSize,
    options: ParseOptions,
) -> (ExpressionNode, usize) {
    let inner = at + 2;

    if starts_with_ignore_case(text, inner, "Registry:") {
        // Opaque: kept as literal text, no reference node.
        let end = recover_end(text, at);
        tracing::trace!(offset = u32::from(shift(base, at)), "registry reference left opaque");
        let node = ExpressionNode::Text(ExpressionText {
            value: text[at..end].to_string(),
            range: range_from(base, at, end),
        });
        return (node, end);
    }

    let first = skip_whitespace(text, inner);
    if text[first..].starts_with('[') {
        return parse_static(text, at, first, base, options);
    }

    match find_structural(text, inner) {
        Structural::Close(close) => {
            let name_range = trim_range(text, inner..close);
            let name = &text[name_range.clone()];
            let end = close + 1;
            if !is_valid_name(name) {
                let kind = ExpressionErrorKind::InvalidPropertyName(name.into());
                return (error_node(kind, name_range.start, at, end, base), end);
            }
            let node = ExpressionNode::Property(PropertyReference {
                name: name.into(),
                name_range: range_from(base, name_range.start, name_range.end),
                range: range_from(base, at, end),
            });
            (node, end)
        }
        Structural::Dot(dot) => {
            let name_range = trim_range(text, inner..dot);
            let name = &text[name_range.clone()];
            if !is_valid_name(name) {
                let end = recover_end(text, at);
                let kind = ExpressionErrorKind::InvalidPropertyName(name.into());
                return (error_node(kind, name_range.start, at, end, base), end);
            }
            let name_range = range_from(base, name_range.start, name_range.end);
            let receiver = ExpressionNode::Property(PropertyReference {
                name: name.into(),
                name_range,
                range: name_range,
            });
            parse_chain(text, dot + 1, base, at, Receiver::Instance(receiver), options)
        }
        Structural::Open(open) => {
            let name = text[inner..open].trim();
            let end = recover_end(text, at);
            let kind = ExpressionErrorKind::MissingReceiver(name.into());
            (error_node(kind, open, at, end, base), end)
        }
        Structural::End => {
            let kind = ExpressionErrorKind::UnterminatedReference;
            (error_node(kind, at, at, text.len(), base), text.len())
        }
    }
}

/// Parse `$([Type]::Member...)` where `bracket` is the index of `[`.
fn parse_static(
    text: &str,
    at: usize,
    bracket: usize,
    base: TextSize,
    options: ParseOptions,
) -> (ExpressionNode, usize) {
    let limit = recover_end(text, at);
    let separator = find_from(text, bracket + 1, "]::").filter(|&i| i < limit);
    let Some(separator) = separator else {
        let kind = ExpressionErrorKind::ExpectedStaticMember;
        return (error_node(kind, bracket, at, limit, base), limit);
    };

    let type_name = text[bracket + 1..separator].trim();
    match lookup_type(type_name) {
        TypeLookup::Allowed(ty) => {
            parse_chain(text, separator + 3, base, at, Receiver::Static(ty), options)
        }
        TypeLookup::NeedsFullName(suggestion) => {
            let kind = ExpressionErrorKind::NeedsFullTypeName {
                name: type_name.into(),
                suggestion,
            };
            (error_node(kind, bracket, at, limit, base), limit)
        }
        TypeLookup::Unknown => {
            let kind = ExpressionErrorKind::UnknownType(type_name.into());
            (error_node(kind, bracket, at, limit, base), limit)
        }
    }
}

/// Whether `at` lies inside a `$(...)` that closes after it.
fn inside_property(text: &str, at: usize) -> bool {
    let mut pos = 0;
    while let Some(open) = find_from(text, pos, "$(").filter(|&open| open < at) {
        match find_closing_paren(text, open + 2) {
            Some(close) if close > at => return true,
            Some(close) => pos = close + 1,
            None => return false,
        }
    }
    false
}

/// Where scanning resumes after a failed reference opened at `at`: just past
/// its balancing `)`, or the end of the text.
pub(super) fn recover_end(text: &str, at: usize) -> usize {
    find_closing_paren(text, at + 2).map_or(text.len(), |close| close + 1)
}

pub(super) fn error_node(
    kind: ExpressionErrorKind,
    position: usize,
    start: usize,
    end: usize,
    base: TextSize,
) -> ExpressionNode {
    let position = shift(base, position);
    tracing::trace!(offset = u32::from(position), error = %kind, "expression error");
    ExpressionNode::Error(ExpressionError {
        kind,
        position,
        range: range_from(base, start, end),
    })
}
