//! Small text scanners shared by the extraction grammars: comment
//! stripping, balanced-bracket bodies and top-level splitting. All of them
//! skip over quoted strings.

fn closing(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'{' => b'}',
        b'[' => b']',
        _ => open,
    }
}

/// Skip a quoted string starting at `i` (which holds the quote). Returns
/// the index just past the closing quote, or the end of input.
fn skip_quoted(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if quote != b'`' => j += 2,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn is_quote(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`')
}

/// Body between the bracket at `open_at` and its matching close, plus the
/// index just past the close. `None` when the bracket is unbalanced.
pub fn balanced(text: &str, open_at: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    let open = *bytes.get(open_at)?;
    let close = closing(open);
    if close == open {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open_at;
    while i < bytes.len() {
        let b = bytes[i];
        if is_quote(b) {
            i = skip_quoted(bytes, i);
            continue;
        }
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some((&text[open_at + 1..i], i + 1));
            }
        }
        i += 1;
    }
    None
}

/// Split on `sep` where it is not nested in brackets or quotes.
/// Pieces are trimmed and empty pieces dropped.
pub fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if is_quote(b) {
            i = skip_quoted(bytes, i);
            continue;
        }
        match b {
            b'(' | b'{' | b'[' => depth += 1,
            b')' | b'}' | b']' => depth -= 1,
            _ if b == sep && depth <= 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start.min(text.len())..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Remove comments. `line_marker` starts a comment running to the end of
/// the line (`--` for SQL, `//` for C-family code); `/* */` blocks are
/// removed in both cases. Newlines are kept so line structure survives.
pub fn strip_comments(text: &str, line_marker: &str) -> String {
    let bytes = text.as_bytes();
    let marker = line_marker.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut copied_from = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\'' || b == b'"' {
            i = skip_quoted(bytes, i);
            continue;
        }
        if bytes[i..].starts_with(marker) {
            out.push_str(&text[copied_from..i]);
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            copied_from = i;
            continue;
        }
        if bytes[i..].starts_with(b"/*") {
            out.push_str(&text[copied_from..i]);
            let end = text[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
            for _ in text[i..end].matches('\n') {
                out.push('\n');
            }
            out.push(' ');
            i = end;
            copied_from = i;
            continue;
        }
        i += 1;
    }
    out.push_str(&text[copied_from.min(text.len())..]);
    out
}

/// Strip one layer of SQL identifier quoting: backticks, double quotes or
/// square brackets.
pub fn unquote_ident(ident: &str) -> &str {
    let ident = ident.trim();
    let bytes = ident.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'`' && last == b'`')
            || (first == b'"' && last == b'"')
            || (first == b'[' && last == b']')
        {
            return &ident[1..ident.len() - 1];
        }
    }
    ident
}

/// A `@Name` or `@Name(args)` annotation/decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

impl<'a> Annotation<'a> {
    /// Name without a package qualifier.
    pub fn short_name(&self) -> &'a str {
        self.name.rsplit('.').next().unwrap_or(self.name)
    }
}

/// Split the leading annotations off a declaration, returning them and the
/// trimmed remainder.
pub fn leading_annotations(mut decl: &str) -> (Vec<Annotation<'_>>, &str) {
    let mut found = Vec::new();
    loop {
        decl = decl.trim_start();
        let Some(rest) = decl.strip_prefix('@') else {
            break;
        };
        let name_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        if name_len == 0 {
            break;
        }
        let name = &rest[..name_len];
        let after = rest[name_len..].trim_start();
        let offset = decl.len() - after.len();
        match after.starts_with('(').then(|| balanced(decl, offset)).flatten() {
            Some((args, end)) => {
                found.push(Annotation { name, args });
                decl = &decl[end..];
            }
            None => {
                found.push(Annotation { name, args: "" });
                decl = &decl[1 + name_len..];
            }
        }
    }
    (found, decl.trim())
}
