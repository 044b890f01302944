//! Display name normalization.
//!
//! Names may carry color markup: a caret followed by a digit `0`-`7`. Two names
//! that differ only in markup belong to the same alias.

/// Strip color codes from a display name.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '^' && matches!(chars.peek(), Some('0'..='7')) {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}
