use thiserror::Error;

#[derive(Debug, Error)]
pub enum FullNameError {
    #[error("Full name must not be empty")]
    Empty,
}

/// Display name attached to an account. Whitespace-trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl TryFrom<String> for FullName {
    type Error = FullNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FullNameError::Empty);
        }
        Ok(FullName(trimmed.to_string()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let name = FullName::try_from("  Alice Liddell ".to_string()).unwrap();
        assert_eq!(name.as_ref(), "Alice Liddell");
    }

    #[test]
    fn rejects_blank_names() {
        assert!(FullName::try_from("".to_string()).is_err());
        assert!(FullName::try_from("   ".to_string()).is_err());
    }
}
