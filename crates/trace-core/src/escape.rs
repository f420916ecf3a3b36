//! Attribute escaping for rendered trace text

/// Escape a value for use inside a double-quoted attribute.
///
/// Only `<`, `>`, `&`, `"`, CR, LF and TAB are replaced.
pub fn escape_attribute(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 10);
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&#34;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape an expression-derived value.
///
/// Expressions are often written over several lines, so whitespace is
/// collapsed first (leading and trailing runs dropped, inner runs become one
/// space) and the result is then escaped like any attribute.
pub fn escape_expression(input: &str) -> String {
    escape_attribute(&collapse_whitespace(input))
}

/// Collapse whitespace the way XML Schema's `collapse` facet does.
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for word in input.split([' ', '\t', '\n', '\r']).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
