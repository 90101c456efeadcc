//! Invocation chains: `$(Foo.Bar(x).Baz)` and `$([Type]::Member(args)...)`.
//!
//! A chain is built front to back; each step owns the previous step as its
//! boxed `target`, so the finished node is the last call and walking
//! `target` links leads back to the original receiver.

use std::ops::Range;

use smol_str::SmolStr;
use text_size::TextSize;

use super::allow_list::AllowedType;
use super::ast::{Argument, ExpressionNode, Invocation};
use super::errors::ExpressionErrorKind;
use super::expression::{error_node, parse, recover_end};
use super::options::ParseOptions;
use super::scanner::{Structural, find_structural, is_valid_name, skip_whitespace, trim_range};
use crate::base::{range_from, shift};

/// What the first step of a chain is applied to.
pub(crate) enum Receiver {
    /// `[Type]::`: only the first step is checked against the type's members.
    Static(&'static AllowedType),
    /// A property reference or a previous invocation.
    Instance(ExpressionNode),
}

/// Parse a chain whose first member name starts at `pos`.
///
/// `start` is the index of the `$` that opened the reference. Arguments are
/// parsed with `options`. Returns the final node and the index where
/// scanning resumes.
pub(crate) fn parse_chain(
    text: &str,
    mut pos: usize,
    base: TextSize,
    start: usize,
    receiver: Receiver,
    options: ParseOptions,
) -> (ExpressionNode, usize) {
    let mut receiver = receiver;
    // Whether `receiver` is an invocation built by this loop.
    let mut built = false;

    loop {
        let name_start = skip_whitespace(text, pos);
        let stop = find_structural(text, name_start);
        let name_end = match stop {
            Structural::Open(i) | Structural::Close(i) | Structural::Dot(i) => i,
            Structural::End => text.len(),
        };
        let name_range = trim_range(text, name_start..name_end);
        let name = &text[name_range.clone()];

        if stop == Structural::End {
            // A trailing `.` typed mid-edit ends the chain at the previous call.
            if name.is_empty() && built {
                let node = with_range(receiver, base, start, text.len());
                return (node, text.len());
            }
            let kind = if name.is_empty() {
                ExpressionErrorKind::ExpectedMemberName
            } else {
                ExpressionErrorKind::UnterminatedReference
            };
            return (
                error_node(kind, name_start, start, text.len(), base),
                text.len(),
            );
        }

        if !is_valid_name(name) {
            let end = recover_end(text, start).max(name_end);
            return (
                error_node(
                    ExpressionErrorKind::ExpectedMemberName,
                    name_start,
                    start,
                    end,
                    base,
                ),
                end,
            );
        }

        let (target, static_type) = match receiver {
            Receiver::Static(ty) => {
                if !ty.allows(name) {
                    let end = recover_end(text, start).max(name_end);
                    let kind = ExpressionErrorKind::DisallowedMember {
                        type_name: ty.name.into(),
                        member: name.into(),
                    };
                    return (error_node(kind, name_range.start, start, end, base), end);
                }
                (None, Some(SmolStr::new_static(ty.name)))
            }
            Receiver::Instance(node) => (Some(Box::new(node)), None),
        };

        let mut invocation = Invocation {
            target,
            static_type,
            name: name.into(),
            name_range: range_from(base, name_range.start, name_range.end),
            arguments: None,
            range: range_from(base, start, name_range.end),
        };

        match stop {
            Structural::Close(close) => {
                invocation.range = range_from(base, start, close + 1);
                return (ExpressionNode::Invocation(invocation), close + 1);
            }
            Structural::Dot(dot) => {
                receiver = Receiver::Instance(ExpressionNode::Invocation(invocation));
                built = true;
                pos = dot + 1;
            }
            Structural::Open(open) => {
                let Some((spans, after)) = parse_arguments(text, open + 1) else {
                    let kind = ExpressionErrorKind::UnterminatedArguments;
                    return (error_node(kind, open, start, text.len(), base), text.len());
                };
                invocation.arguments = Some(
                    spans
                        .into_iter()
                        .map(|span| argument(text, span, base, options))
                        .collect(),
                );
                invocation.range = range_from(base, start, after);

                let next = skip_whitespace(text, after);
                match text[next..].chars().next() {
                    Some(')') => {
                        invocation.range = range_from(base, start, next + 1);
                        return (ExpressionNode::Invocation(invocation), next + 1);
                    }
                    Some('.') => {
                        receiver = Receiver::Instance(ExpressionNode::Invocation(invocation));
                        built = true;
                        pos = next + 1;
                    }
                    None => {
                        invocation.range = range_from(base, start, text.len());
                        return (ExpressionNode::Invocation(invocation), text.len());
                    }
                    Some(c) => {
                        let end = recover_end(text, start).max(next + c.len_utf8());
                        let kind = ExpressionErrorKind::UnexpectedCharacter(c);
                        return (error_node(kind, next, start, end, base), end);
                    }
                }
            }
            Structural::End => unreachable!("end of input handled above"),
        }
    }
}

fn argument(text: &str, span: Range<usize>, base: TextSize, options: ParseOptions) -> Argument {
    let raw = &text[span.clone()];
    Argument {
        text: raw.to_string(),
        range: range_from(base, span.start, span.end),
        expression: parse(raw, options.with_split(false), shift(base, span.start)),
    }
}

/// Extend the range of a finished chain to `end`.
fn with_range(receiver: Receiver, base: TextSize, start: usize, end: usize) -> ExpressionNode {
    match receiver {
        Receiver::Instance(ExpressionNode::Invocation(mut invocation)) => {
            invocation.range = range_from(base, start, end);
            ExpressionNode::Invocation(invocation)
        }
        Receiver::Instance(node) => node,
        Receiver::Static(_) => error_node(
            ExpressionErrorKind::ExpectedMemberName,
            end,
            start,
            end,
            base,
        ),
    }
}

/// Parse an argument list whose `(` is just before `pos`.
///
/// Returns the span of each raw argument, surrounding whitespace included,
/// and the index just past the matching `)`, or `None` if the list is never
/// closed. Quoted regions (`'`, `"`, `` ` ``) are literal: parentheses and
/// commas inside them do not count. A blank trailing argument is discarded,
/// so `()` and `( )` yield an empty list.
pub fn parse_arguments(text: &str, pos: usize) -> Option<(Vec<Range<usize>>, usize)> {
    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut arg_start = pos;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(pos) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'(' => depth += 1,
            b')' if depth == 0 => {
                if !text[arg_start..i].trim().is_empty() {
                    arguments.push(arg_start..i);
                }
                return Some((arguments, i + 1));
            }
            b')' => depth -= 1,
            b',' if depth == 0 => {
                arguments.push(arg_start..i);
                arg_start = i + 1;
            }
            _ => {}
        }
    }
    None
}
