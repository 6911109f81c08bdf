use std::sync::{Arc, Mutex};

use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;

/// Keeps sent emails in memory instead of delivering them.
///
/// Clones share the same outbox, so a test can hand one clone to the
/// application and inspect the other. Setting the transport to fail makes
/// every subsequent send return an error.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<Mutex<Vec<Email>>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Email> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Email> {
        self.outbox.lock().ok().and_then(|o| o.last().cloned())
    }

    pub fn clear(&self) {
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.clear();
        }
    }

    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut flag) = self.failing.lock() {
            *flag = failing;
        }
    }
}

#[async_trait]
impl Mailer for MemoryTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        email.validate()?;

        if self.failing.lock().map(|f| *f).unwrap_or(false) {
            return Err(MailerError::Config("Memory transport is failing".to_string()));
        }

        self.outbox
            .lock()
            .map_err(|_| MailerError::Config("Memory outbox poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}
