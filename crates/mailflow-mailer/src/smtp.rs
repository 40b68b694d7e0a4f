use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use mailflow_core::config::SmtpConfig;

use crate::{error::MailerError, message::EmailMessage, Mailer};

/// SMTP delivery via lettre's blocking transport (STARTTLS relay).
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, from_address: &str) -> Result<Self, MailerError> {
        let from: Mailbox = from_address
            .parse()
            .map_err(|e| MailerError::InvalidAddress {
                address: from_address.to_string(),
                reason: format!("{e}"),
            })?;

        let mut builder = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| MailerError::Config(format!("SMTP relay {}: {e}", config.host)))?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            // Strip whitespace that sneaks in from copied app passwords.
            let clean_pass: String = pass.chars().filter(|c| !c.is_whitespace()).collect();
            builder = builder.credentials(Credentials::new(user.clone(), clean_pass));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Mailer for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| MailerError::InvalidAddress {
                address: message.to.clone(),
                reason: format!("{e}"),
            })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .body(message.body.clone())
            .map_err(|e| MailerError::Build(e.to_string()))?;

        self.transport
            .send(&email)
            .map_err(|e| MailerError::SendFailed(e.to_string()))?;
        debug!(to = %message.to, "message delivered via SMTP");
        Ok(())
    }
}
