use std::io::Write;
use std::path::PathBuf;

use tracing::debug;
use uuid::Uuid;

use crate::{error::MailerError, message::EmailMessage, Mailer};

/// Development backend: writes each message as a plain-text `.eml` file into
/// a directory instead of delivering it.
pub struct FileMailer {
    dir: PathBuf,
    from: String,
}

impl FileMailer {
    pub fn new(dir: impl Into<PathBuf>, from_address: &str) -> Result<Self, MailerError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            from: from_address.to_string(),
        })
    }
}

impl Mailer for FileMailer {
    fn name(&self) -> &str {
        "file"
    }

    fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let filename = format!(
            "{}-{}.eml",
            chrono::Utc::now().format("%Y%m%dT%H%M%S"),
            Uuid::new_v4()
        );
        let path = self.dir.join(filename);
        let mut file = std::fs::File::create(&path)?;
        write!(
            file,
            "From: {}\r\nTo: {}\r\nSubject: {}\r\n\r\n{}",
            self.from, message.to, message.subject, message.body
        )?;
        debug!(path = %path.display(), to = %message.to, "message written to outbox");
        Ok(())
    }
}
