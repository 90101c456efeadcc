//! Low-level scanners over a single value.
//!
//! All indices are byte offsets into the local string being scanned. Every
//! structural character of the grammar is ASCII, so byte scanning never
//! splits a UTF-8 sequence at a match.

use std::ops::Range;

/// Check if a character may start a name.
#[inline]
pub fn is_name_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Check if a character may continue a name (`-` is allowed in names).
#[inline]
pub fn is_name_continue(c: char) -> bool {
    c == '-' || unicode_ident::is_xid_continue(c)
}

/// Whether the whole string is a valid name.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start) && chars.all(is_name_continue)
}

/// End of the name starting at `pos`, or `None` if no name starts there.
pub fn scan_name(text: &str, pos: usize) -> Option<usize> {
    let rest = text.get(pos..)?;
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, c)) if is_name_start(c) => {}
        _ => return None,
    }
    // `-` belongs to the name unless it starts a `->` transform arrow
    let len = chars
        .find(|&(i, c)| !is_name_continue(c) || (c == '-' && rest[i + 1..].starts_with('>')))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    Some(pos + len)
}

/// Skip whitespace starting at `pos`.
pub fn skip_whitespace(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

/// Find `needle` at or after `from`.
pub fn find_from(text: &str, from: usize, needle: &str) -> Option<usize> {
    text.get(from..)?.find(needle).map(|i| from + i)
}

/// Whether `text[pos..]` starts with `prefix`, ignoring ASCII case.
pub fn starts_with_ignore_case(text: &str, pos: usize, prefix: &str) -> bool {
    text.as_bytes()
        .get(pos..pos + prefix.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// Trim a local range of `text` to exclude surrounding whitespace.
pub fn trim_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    let start = range.start + leading;
    start..start + trimmed.len()
}

#[inline]
fn is_quote(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`')
}

/// Find the `)` closing a group whose `(` is just before `pos`.
///
/// Nested parentheses are balanced and quoted regions (`'`, `"`, `` ` ``)
/// are skipped. Returns the index of the closing `)`.
pub fn find_closing_paren(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(pos) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b if is_quote(b) => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// The first structural character at nesting level zero, from `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structural {
    Open(usize),
    Close(usize),
    Dot(usize),
    End,
}

/// Find the first of `(`, `)` or `.` starting at `pos`, skipping quoted regions.
pub fn find_structural(text: &str, pos: usize) -> Structural {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(pos) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b if is_quote(b) => quote = Some(b),
            b'(' => return Structural::Open(i),
            b')' => return Structural::Close(i),
            b'.' => return Structural::Dot(i),
            _ => {}
        }
    }
    Structural::End
}

/// Split `text` on `;` outside parentheses and quotes.
///
/// Returns the segments (possibly empty) and, between them, the index of each
/// separator. `segments.len() == separators.len() + 1`.
pub fn split_list(text: &str) -> (Vec<Range<usize>>, Vec<usize>) {
    let mut segments = Vec::new();
    let mut separators = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b if depth > 0 && is_quote(b) => quote = Some(b),
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => {
                segments.push(start..i);
                separators.push(i);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(start..text.len());
    (segments, separators)
}

/// A matched `@(Name->'transform', 'separator')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMatch {
    /// Index just past the closing `)`.
    pub end: usize,
    pub name: Range<usize>,
    /// Content between the transform quotes.
    pub transform: Option<Range<usize>>,
    /// Content between the separator quotes.
    pub separator: Option<Range<usize>>,
}

/// Match an item reference starting at `pos`, which must point at `@`.
pub fn match_item_reference(text: &str, pos: usize) -> Option<ItemMatch> {
    if !text[pos..].starts_with("@(") {
        return None;
    }
    let name_start = skip_whitespace(text, pos + 2);
    let name_end = scan_name(text, name_start)?;
    let mut cursor = skip_whitespace(text, name_end);

    let mut transform = None;
    if text[cursor..].starts_with("->") {
        let (content, next) = match_quoted(text, skip_whitespace(text, cursor + 2))?;
        transform = Some(content);
        cursor = skip_whitespace(text, next);
    }

    let mut separator = None;
    if text[cursor..].starts_with(',') {
        let (content, next) = match_quoted(text, skip_whitespace(text, cursor + 1))?;
        separator = Some(content);
        cursor = skip_whitespace(text, next);
    }

    if !text[cursor..].starts_with(')') {
        return None;
    }

    Some(ItemMatch {
        end: cursor + 1,
        name: name_start..name_end,
        transform,
        separator,
    })
}

/// Match `'...'` at `pos`; returns the content range and the index past the closing quote.
fn match_quoted(text: &str, pos: usize) -> Option<(Range<usize>, usize)> {
    if !text[pos..].starts_with('\'') {
        return None;
    }
    let close = find_from(text, pos + 1, "'")?;
    Some((pos + 1..close, close + 1))
}

/// A matched `%(name)` or `%(item.name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataMatch {
    /// Index just past the closing `)`.
    pub end: usize,
    pub item: Option<Range<usize>>,
    pub metadata: Range<usize>,
}

/// Match a metadata reference starting at `pos`, which must point at `%`.
pub fn match_metadata_reference(text: &str, pos: usize) -> Option<MetadataMatch> {
    if !text[pos..].starts_with("%(") {
        return None;
    }
    let first_start = skip_whitespace(text, pos + 2);
    let first_end = scan_name(text, first_start)?;

    let (item, metadata, cursor) = if text[first_end..].starts_with('.') {
        let second_start = first_end + 1;
        let second_end = scan_name(text, second_start)?;
        (
            Some(first_start..first_end),
            second_start..second_end,
            second_end,
        )
    } else {
        (None, first_start..first_end, first_end)
    };

    let cursor = skip_whitespace(text, cursor);
    if !text[cursor..].starts_with(')') {
        return None;
    }

    Some(MetadataMatch {
        end: cursor + 1,
        item,
        metadata,
    })
}
