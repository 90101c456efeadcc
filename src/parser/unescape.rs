//! The `%XX` escaping convention of project files.
//!
//! Any character may be written as `%` followed by two hexadecimal digits
//! (`%3B` for `;`, `%24` for `$`). Unescaping is applied to literal text runs
//! only, after parsing, so escaped delimiters never start a reference.

use std::borrow::Cow;

/// Collapse `%XX` escapes. Malformed escapes are kept verbatim.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('%') {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(decoded) = decode_pair(bytes.get(i + 1..i + 3)) {
                out.push(decoded);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    match String::from_utf8(out) {
        Ok(s) => Cow::Owned(s),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

/// Escape the characters that are significant to the expression grammar.
pub fn escape(text: &str) -> Cow<'_, str> {
    const SPECIAL: &[char] = &['%', '*', '?', '@', '$', '(', ')', ';', '\''];
    if !text.contains(SPECIAL) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            out.push_str(&format!("%{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn decode_pair(pair: Option<&[u8]>) -> Option<u8> {
    let pair = std::str::from_utf8(pair?).ok()?;
    u8::from_str_radix(pair, 16).ok()
}
