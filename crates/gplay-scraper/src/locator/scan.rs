//! Character-level scanning over JavaScript-ish literal text.

/// Returns the shortest prefix of `s` forming a complete `[…]` or `{…}`
/// literal, or `None` if `s` does not start with a bracket, the brackets are
/// mismatched, or the literal is unterminated.
///
/// Single- and double-quoted strings (with backslash escapes) are skipped so
/// brackets inside string values do not count.
pub(crate) fn balanced_literal(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if first != '[' && first != '{' {
        return None;
    }
    let mut stack: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if let Some(q) = quote {
            match c {
                '\\' => escape = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the byte offset just past `name:` where `name` is a property at the
/// top level of the object literal `obj` (which must start with `{`).
///
/// Properties nested deeper, or appearing inside strings, are ignored. Keys
/// may be bare identifiers or quoted.
pub(crate) fn top_level_property(obj: &str, name: &str) -> Option<usize> {
    let bytes = obj.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escape = false;
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if escape {
            escape = false;
            i += 1;
            continue;
        }
        if let Some(q) = quote {
            if b == b'\\' {
                escape = true;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth = depth.saturating_sub(1),
            b'"' | b'\'' if depth == 1 => {
                // Quoted key: `"data": …`
                let end = obj[i + 1..].find(char::from(b)).map(|p| i + 1 + p)?;
                if &obj[i + 1..end] == name {
                    if let Some(after) = colon_after(obj, end + 1) {
                        return Some(after);
                    }
                }
                quote = Some(b);
            }
            b'"' | b'\'' => quote = Some(b),
            _ if depth == 1 && is_ident_start(b) && !is_ident_byte(bytes[i - 1]) => {
                let start = i;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                if &obj[start..i] == name {
                    if let Some(after) = colon_after(obj, i) {
                        return Some(after);
                    }
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Skips whitespace from `from`; if the next byte is `:`, returns the offset
/// of the first non-whitespace byte after it.
fn colon_after(s: &str, from: usize) -> Option<usize> {
    let rest = &s[from..];
    let trimmed = rest.trim_start();
    let colon = trimmed.strip_prefix(':')?;
    let value = colon.trim_start();
    Some(s.len() - value.len())
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Reads a quoted string literal at the start of `s` (after optional
/// whitespace), without unescaping.
pub(crate) fn quoted_prefix(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let q = s.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = &s[1..];
    let mut escape = false;
    for (i, c) in body.char_indices() {
        if escape {
            escape = false;
        } else if c == '\\' {
            escape = true;
        } else if c == q {
            return Some(&body[..i]);
        }
    }
    None
}
