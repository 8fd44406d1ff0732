use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::otp::{OtpCode, OtpPurpose};

/// A pending one-time code for a single (account, purpose) pair.
///
/// Rotation replaces the code value and expiry in place; consumption deletes
/// the record in the same transaction as the state change it authorizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    pub id: Uuid,
    pub account_id: Uuid,
    pub purpose: OtpPurpose,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn new(
        account_id: Uuid,
        purpose: OtpPurpose,
        code: OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Self {
        VerificationCode {
            id: Uuid::new_v4(),
            account_id,
            purpose,
            code,
            expires_at,
        }
    }

    /// A code is expired only when `now` is strictly after the expiry
    /// instant; a submission at exactly `expires_at` is still accepted.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn code_expiring_at(expires_at: DateTime<Utc>) -> VerificationCode {
        VerificationCode::new(
            Uuid::new_v4(),
            OtpPurpose::AccountVerification,
            OtpCode::new(),
            expires_at,
        )
    }

    #[test]
    fn not_expired_before_the_deadline() {
        let now = Utc::now();
        let code = code_expiring_at(now + Duration::minutes(3));
        assert!(!code.is_expired(now));
    }

    #[test]
    fn the_expiry_instant_itself_is_accepted() {
        let now = Utc::now();
        let code = code_expiring_at(now);
        assert!(!code.is_expired(now));
    }

    #[test]
    fn expired_strictly_after_the_deadline() {
        let now = Utc::now();
        let code = code_expiring_at(now - Duration::seconds(1));
        assert!(code.is_expired(now));
    }
}
