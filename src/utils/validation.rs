//! Input validation utilities

/// Longest display name a connection may register
pub const MAX_NAME_LENGTH: usize = 20;

/// A display name is 1 to 20 ASCII letters, digits or underscores.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LENGTH
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_simple_names() {
        assert!(is_valid_name("bob"));
        assert!(is_valid_name("alice_2"));
        assert!(is_valid_name("A"));
        assert!(is_valid_name("_"));
        assert!(is_valid_name("a2345678901234567890"));
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("two words"));
        assert!(!is_valid_name("bob!"));
        assert!(!is_valid_name("m-bob"));
        assert!(!is_valid_name("a23456789012345678901"));
        assert!(!is_valid_name("café"));
    }
}
