// ABOUTME: string escaping/unescaping shared by the reader and printer

/// Converts a raw Mal string literal's interior (between the quotes) into its
/// runtime value: `\n` -> newline, `\"` -> `"`, `\\` -> `\`. Any other escape
/// passes the backslash through unchanged, matching the reader's leniency.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Converts a runtime string into the escaped form used for readable
/// (`pr-str`, `prn`) printing: backslash, quote, and newline are escaped.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}
