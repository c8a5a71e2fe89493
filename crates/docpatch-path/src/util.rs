//! Textual path form: `body[3].children[_key=="a1"].text`.

use std::iter::Peekable;
use std::str::Chars;

use crate::types::{PathAddress, PathSegment};
use crate::PathError;

/// Format an address in its textual form.
///
/// Plain identifiers are joined with `.`, indices render as `[3]`, keyed
/// selectors as `[_key=="id"]`, and keys that are not plain identifiers as
/// `["some key"]`. The root renders as the empty string.
pub fn format_path(path: &PathAddress) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(k) if is_plain_key(k) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
            PathSegment::Key(k) => {
                out.push('[');
                push_quoted(&mut out, k);
                out.push(']');
            }
            PathSegment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            PathSegment::Keyed(id) => {
                out.push_str("[_key==");
                push_quoted(&mut out, id);
                out.push(']');
            }
        }
    }
    out
}

/// Parse the textual form produced by [`format_path`].
///
/// # Example
///
/// ```
/// use docpatch_path::{parse_path, PathAddress};
///
/// let path = parse_path(r#"tags[_key=="x"].v"#).unwrap();
/// assert_eq!(path, PathAddress::root().key("tags").keyed("x").key("v"));
/// assert!(parse_path("tags..v").is_err());
/// ```
pub fn parse_path(input: &str) -> Result<PathAddress, PathError> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let invalid = || PathError::InvalidPath(input.to_string());

    if chars.peek().is_some_and(|c| *c != '[') {
        segments.push(PathSegment::Key(read_ident(&mut chars).ok_or_else(invalid)?));
    }
    while let Some(c) = chars.next() {
        let segment = match c {
            '.' => PathSegment::Key(read_ident(&mut chars).ok_or_else(invalid)?),
            '[' => read_bracket(&mut chars).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        segments.push(segment);
    }
    Ok(PathAddress::from_segments(segments))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if is_ident_char(first) && !first.is_ascii_digit() && first != '-' => {
            chars.all(is_ident_char)
        }
        _ => false,
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    while let Some(c) = chars.next_if(|c| is_ident_char(*c)) {
        ident.push(c);
    }
    (!ident.is_empty()).then_some(ident)
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    if chars.next()? != '"' {
        return None;
    }
    let mut s = String::new();
    loop {
        match chars.next()? {
            '\\' => s.push(chars.next()?),
            '"' => return Some(s),
            c => s.push(c),
        }
    }
}

// Called after the opening `[`; consumes through the closing `]`.
fn read_bracket(chars: &mut Peekable<Chars<'_>>) -> Option<PathSegment> {
    let segment = match *chars.peek()? {
        '"' => PathSegment::Key(read_quoted(chars)?),
        c if c.is_ascii_digit() => {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            PathSegment::Index(digits.parse().ok()?)
        }
        _ => {
            if read_ident(chars)? != "_key" || chars.next()? != '=' || chars.next()? != '=' {
                return None;
            }
            PathSegment::Keyed(read_quoted(chars)?)
        }
    };
    (chars.next()? == ']').then_some(segment)
}
