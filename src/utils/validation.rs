use anyhow::{anyhow, Result};

/// Sanity-check a submitted activation code before hitting the store.
/// Codes are opaque strings; this only rejects obviously malformed input.
pub fn validate_activation_code(code: &str) -> Result<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(anyhow!("Activation code cannot be empty"));
    }

    if code.len() > 64 {
        return Err(anyhow!("Activation code cannot be longer than 64 characters"));
    }

    if code.contains('\n') || code.contains('\r') {
        return Err(anyhow!("Activation code cannot contain line breaks"));
    }

    if code.contains(char::is_whitespace) {
        return Err(anyhow!("Activation code cannot contain spaces"));
    }

    Ok(())
}

/// Normalize a username query: strip a leading `@` and surrounding
/// whitespace. Returns an error for empty input.
pub fn normalize_username(username: &str) -> Result<String> {
    let username = username.trim().trim_start_matches('@');

    if username.is_empty() {
        return Err(anyhow!("Username cannot be empty"));
    }

    if username.len() > 64 {
        return Err(anyhow!("Username cannot be longer than 64 characters"));
    }

    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_activation_code_valid() {
        assert!(validate_activation_code("ABC123").is_ok());
        assert!(validate_activation_code("sub-2024-0042").is_ok());
        assert!(validate_activation_code("  trimmed  ").is_ok());
    }

    #[test]
    fn test_validate_activation_code_empty() {
        assert!(validate_activation_code("").is_err());
        assert!(validate_activation_code("   ").is_err());
    }

    #[test]
    fn test_validate_activation_code_too_long() {
        let long_code = "a".repeat(65);
        assert!(validate_activation_code(&long_code).is_err());

        let max_code = "a".repeat(64);
        assert!(validate_activation_code(&max_code).is_ok());
    }

    #[test]
    fn test_validate_activation_code_whitespace() {
        assert!(validate_activation_code("two words").is_err());
        assert!(validate_activation_code("line\nbreak").is_err());
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("@alice").unwrap(), "alice");
        assert_eq!(normalize_username("  bob  ").unwrap(), "bob");
        assert_eq!(normalize_username("plain").unwrap(), "plain");
    }

    #[test]
    fn test_normalize_username_empty() {
        assert!(normalize_username("").is_err());
        assert!(normalize_username("@").is_err());
        assert!(normalize_username("   ").is_err());
    }
}
