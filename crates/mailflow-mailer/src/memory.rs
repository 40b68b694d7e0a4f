use std::sync::Mutex;

use crate::{error::MailerError, message::EmailMessage, Mailer};

/// In-memory backend for tests: records every message instead of sending.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for MemoryMailer {
    fn name(&self) -> &str {
        "memory"
    }

    fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_messages_in_order() {
        let mailer = MemoryMailer::new();
        for i in 0..3 {
            mailer
                .send(&EmailMessage {
                    to: format!("user{i}@example.com"),
                    subject: "s".into(),
                    body: "b".into(),
                })
                .unwrap();
        }
        let sent = mailer.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].to, "user0@example.com");
        assert_eq!(sent[2].to, "user2@example.com");
    }
}
