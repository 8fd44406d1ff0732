use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use otpauth_core::{Email, EmailClient, OtpCode, OtpEmail};

/// Test double that records deliveries instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct MockEmailClient {
    failing: Arc<AtomicBool>,
    deliveries: Arc<Mutex<Vec<(Email, OtpEmail)>>>,
}

impl MockEmailClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn last_code(&self) -> Option<OtpCode> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|(_, email)| email.code.clone())
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send_otp_email(&self, recipient: &Email, email: &OtpEmail) -> Result<(), String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("simulated delivery failure".to_string());
        }

        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((recipient.clone(), email.clone()));

        Ok(())
    }
}
