//! Mail assembly and delivery.
//!
//! Every [`OutboundMessage`] becomes one `lettre` [`Message`] with a single
//! `To` recipient and an HTML body. Delivery goes through a [`MailSender`]:
//! [`SmtpMailer`] for real runs, [`DryRunMailer`] to print instead.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::io::Write;
use tracing::{error, info, instrument};

use crate::config::{DEFAULT_SMTP_PORT, SmtpSettings};
use crate::error::MailError;
use crate::models::OutboundMessage;

impl OutboundMessage {
    /// Assemble the RFC 5322 message for this digest.
    pub fn to_message(&self) -> Result<Message, MailError> {
        let from = mailbox(self.sender())?;
        let to = mailbox(self.recipient())?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject())
            .header(ContentType::TEXT_HTML)
            .body(self.body().to_string())
            .map_err(|source| MailError::Build {
                recipient: self.recipient().to_string(),
                source,
            })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Hands assembled messages to a transport.
pub trait MailSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// SMTP relay connection details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl TryFrom<SmtpSettings> for SmtpConfig {
    type Error = MailError;

    fn try_from(settings: SmtpSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            host: settings.host.ok_or(MailError::NotConfigured("SMTP host"))?,
            port: settings.port.unwrap_or(DEFAULT_SMTP_PORT),
            username: settings.username.ok_or(MailError::NotConfigured("SMTP username"))?,
            password: settings.password.ok_or(MailError::NotConfigured("SMTP password"))?,
        })
    }
}

/// Sends through an SMTP relay using STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|source| MailError::Relay {
                host: config.host.clone(),
                source,
            })?
            .port(config.port)
            .credentials(credentials)
            .build();
        Ok(Self { transport })
    }
}

impl MailSender for SmtpMailer {
    #[instrument(level = "info", skip_all, fields(recipient = %message.recipient()))]
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = message.to_message()?;
        self.transport
            .send(email)
            .await
            .map_err(|source| MailError::Smtp {
                recipient: message.recipient().to_string(),
                source,
            })?;
        info!("Digest sent");
        Ok(())
    }
}

/// Prints each formatted message to stdout instead of sending it.
#[derive(Debug, Default)]
pub struct DryRunMailer;

impl MailSender for DryRunMailer {
    #[instrument(level = "info", skip_all, fields(recipient = %message.recipient()))]
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        print_message(&mut std::io::stdout().lock(), message)?;
        info!("Dry run: digest printed, not sent");
        Ok(())
    }
}

/// Write the formatted message, followed by a blank line, to `out`.
///
/// # Errors
///
/// Returns [`MailError::Write`] if `out` rejects the bytes, so a dry run
/// into a closed pipe is not counted as delivered.
fn print_message<W: Write>(out: &mut W, message: &OutboundMessage) -> Result<(), MailError> {
    let email = message.to_message()?;
    out.write_all(&email.formatted())
        .and_then(|()| writeln!(out))
        .and_then(|()| out.flush())
        .map_err(|source| MailError::Write {
            recipient: message.recipient().to_string(),
            source,
        })
}

/// Send every message, logging failures. Returns how many were delivered.
#[instrument(level = "info", skip_all, fields(count = messages.len()))]
pub async fn send_all<S: MailSender>(sender: &S, messages: &[OutboundMessage]) -> usize {
    let mut delivered = 0;
    for message in messages {
        match sender.send(message).await {
            Ok(()) => delivered += 1,
            Err(e) => error!(recipient = %message.recipient(), error = %e, "Failed to deliver digest"),
        }
    }
    info!(delivered, failed = messages.len() - delivered, "Finished sending digests");
    delivered
}
