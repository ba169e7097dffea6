//! Transactional mail collaborator.
//!
//! The only mail the backend sends is the password-reset link. Delivery goes
//! through a [`Mailer`]; [`SmtpMailer`] talks SMTP via lettre, [`LogMailer`]
//! only records the attempt and is used when SMTP is not configured.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::{debug, info};

/// Mail errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message build error: {0}")]
    Build(String),

    #[error("Send failed: {0}")]
    Send(String),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// SMTP settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// `Name <address>` or a bare address.
    pub from: String,
    /// Use an implicit/STARTTLS relay; plain SMTP otherwise.
    pub tls: bool,
}

/// Delivers mail over SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {e}", config.from)))?;

        let builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Build(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        }
        .port(config.port);

        let builder = if let (Some(username), Some(password)) =
            (&config.username, &config.password)
        {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            builder
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {e}", mail.to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(mail.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(mail.html),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        info!(to = %mail.to, subject = %mail.subject, "email sent");
        Ok(())
    }
}

/// Records deliveries in the log instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        info!(to = %mail.to, subject = %mail.subject, "SMTP not configured, email not sent");
        debug!(body = %mail.text, "unsent email body");
        Ok(())
    }
}

/// Render the password-reset email.
pub fn reset_email(username: &str, email: &str, reset_url: &str) -> OutgoingMail {
    let subject = "Cuisine Quest - Password Reset Request".to_string();

    let text = format!(
        "Hello {username},\n\n\
         We received a request to reset your password for your Cuisine Quest account.\n\
         Open the link below to choose a new password:\n\n\
         {reset_url}\n\n\
         This link will expire in 1 hour.\n\
         If you didn't request this password reset, you can ignore this email.\n"
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #fff5f5;">
  <div style="text-align: center; margin-bottom: 30px;">
    <h1 style="color: #ea580c; margin: 0;">Cuisine Quest</h1>
  </div>
  <div style="background: white; padding: 30px; border-radius: 10px;">
    <h2 style="color: #333;">Password Reset Request</h2>
    <p style="color: #666;">Hello <strong>{username}</strong>,</p>
    <p style="color: #666;">We received a request to reset your password for your Cuisine Quest account.
      Click the button below to create a new password:</p>
    <p style="text-align: center; margin: 30px 0;">
      <a href="{reset_url}" style="background: #ea580c; color: white; padding: 15px 30px; text-decoration: none; border-radius: 8px; font-weight: bold;">Reset My Password</a>
    </p>
    <p style="color: #666;">Or copy and paste this link into your browser:</p>
    <p style="background: #f3f4f6; padding: 10px; word-break: break-all;">{reset_url}</p>
    <p style="color: #999; font-size: 14px;">This link will expire in 1 hour.
      If you didn't request this password reset, please ignore this email.</p>
  </div>
</body>
</html>"#,
        username = escape_html(username),
        reset_url = escape_html(reset_url),
    );

    OutgoingMail {
        to: email.to_string(),
        subject,
        html,
        text,
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
