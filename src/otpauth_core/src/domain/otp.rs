use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of digits in a one-time code.
pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("OTP code must be exactly {OTP_LENGTH} digits")]
    InvalidFormat,
}

/// Which flow a pending code authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    AccountVerification,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::AccountVerification => "ACCOUNT_VERIFICATION",
            OtpPurpose::PasswordReset => "PASSWORD_RESET",
        }
    }
}

impl std::str::FromStr for OtpPurpose {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCOUNT_VERIFICATION" => Ok(OtpPurpose::AccountVerification),
            "PASSWORD_RESET" => Ok(OtpPurpose::PasswordReset),
            _ => Err(OtpError::InvalidFormat),
        }
    }
}

/// A six-digit one-time code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OtpCode(String);

impl OtpCode {
    /// Draw a fresh code uniformly from 000000-999999.
    ///
    /// The thread RNG is not a CSPRNG; that is acceptable here because codes
    /// are short-lived, single-use, and checked for global uniqueness by the
    /// enclosing generator.
    pub fn new() -> Self {
        let value: u32 = rand::rng().random_range(0..1_000_000);
        OtpCode(format!("{value:06}"))
    }

    pub fn parse(candidate: String) -> Result<Self, OtpError> {
        if candidate.len() == OTP_LENGTH && candidate.bytes().all(|b| b.is_ascii_digit()) {
            Ok(OtpCode(candidate))
        } else {
            Err(OtpError::InvalidFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OtpCode {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[test]
    fn generated_codes_are_always_six_digits() {
        for _ in 0..1_000 {
            let code = OtpCode::new();
            assert_eq!(code.as_str().len(), OTP_LENGTH);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[quickcheck]
    fn every_value_in_the_code_space_parses(value: u32) -> bool {
        let rendered = format!("{:06}", value % 1_000_000);
        OtpCode::parse(rendered.clone()).is_ok_and(|code| code.as_str() == rendered)
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_digits() {
        assert!(OtpCode::parse("12345".to_string()).is_err());
        assert!(OtpCode::parse("1234567".to_string()).is_err());
        assert!(OtpCode::parse("12a456".to_string()).is_err());
        assert!(OtpCode::parse("".to_string()).is_err());
    }

    #[test]
    fn purpose_round_trips_through_str() {
        use std::str::FromStr;

        for purpose in [OtpPurpose::AccountVerification, OtpPurpose::PasswordReset] {
            assert_eq!(OtpPurpose::from_str(purpose.as_str()).unwrap(), purpose);
        }
    }
}
