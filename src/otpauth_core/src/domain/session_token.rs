use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted refresh token record. Several may coexist for one account;
/// issuing a new one does not invalidate the others.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub account_id: Uuid,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}
