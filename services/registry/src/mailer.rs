//! Outgoing email transport

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::info;

use crate::config::MailSettings;

/// Email delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    Address(String),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

/// A rendered email ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Sends through an SMTP relay with STARTTLS
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        credentials: Option<(String, String)>,
        from_address: &str,
    ) -> Result<Self, MailError> {
        let from = from_address
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {}", from_address, e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(port);

        if let Some((user, password)) = credentials {
            builder = builder.credentials(Credentials::new(user, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Stands in for SMTP when no relay is configured
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "SMTP not configured, email not sent");
        Ok(())
    }
}

/// Build the mailer described by `settings`
pub fn mailer_from_settings(settings: &MailSettings) -> Result<Arc<dyn Mailer>, MailError> {
    let Some(host) = &settings.smtp_host else {
        return Ok(Arc::new(LogMailer));
    };

    let credentials = match (&settings.smtp_user, &settings.smtp_password) {
        (Some(user), Some(password)) => Some((user.clone(), password.clone())),
        _ => None,
    };

    let mailer = SmtpMailer::new(host, settings.smtp_port, credentials, &settings.from_address)?;
    Ok(Arc::new(mailer))
}

fn build_message(from: &Mailbox, email: &OutgoingEmail) -> Result<Message, MailError> {
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| MailError::Address(format!("{}: {}", email.to, e)))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(email.html_body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}
