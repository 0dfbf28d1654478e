//! Command line parsing
//!
//! Splits a raw line into its verb and the text that follows it.

/// Splits `line` on the first run of whitespace.
///
/// Returns the verb (case preserved) and the remainder with its leading
/// whitespace stripped. Either part may be empty.
pub fn split_line(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((action, rest)) => (action, rest.trim_start()),
        None => (line, ""),
    }
}
