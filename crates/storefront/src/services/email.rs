//! Outgoing mail: signup passwords and payment receipts.
//!
//! Uses SMTP via lettre for delivery with Askama templates. Without SMTP
//! configuration the [`LogMailer`] records what would have been sent.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use bookshop_core::TransactionId;

use super::receipt::ReceiptDocument;
use crate::config::EmailConfig;

/// HTML template for the signup password email.
#[derive(Template)]
#[template(path = "email/password.html")]
struct PasswordEmailHtml<'a> {
    password: &'a str,
}

/// Plain text template for the signup password email.
#[derive(Template)]
#[template(path = "email/password.txt")]
struct PasswordEmailText<'a> {
    password: &'a str,
}

/// HTML template for the receipt email.
#[derive(Template)]
#[template(path = "email/receipt.html")]
struct ReceiptEmailHtml<'a> {
    shop_name: &'a str,
    transaction_id: TransactionId,
}

/// Plain text template for the receipt email.
#[derive(Template)]
#[template(path = "email/receipt.txt")]
struct ReceiptEmailText<'a> {
    shop_name: &'a str,
    transaction_id: TransactionId,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Attachment declared an unparseable content type.
    #[error("Invalid attachment content type: {0}")]
    InvalidContentType(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A file attached to an outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl From<ReceiptDocument> for MailAttachment {
    fn from(doc: ReceiptDocument) -> Self {
        Self {
            filename: doc.filename,
            content_type: doc.content_type,
            bytes: doc.bytes,
        }
    }
}

/// A rendered message ready for a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub attachment: Option<MailAttachment>,
}

impl OutgoingMail {
    /// Mail carrying a freshly generated signup password.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Template` if a template fails to render.
    pub fn password(to: &str, password: &str) -> Result<Self, EmailError> {
        Ok(Self {
            to: to.to_owned(),
            subject: "Your Password".to_owned(),
            text_body: PasswordEmailText { password }.render()?,
            html_body: PasswordEmailHtml { password }.render()?,
            attachment: None,
        })
    }

    /// Mail carrying a payment receipt as an attachment.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Template` if a template fails to render.
    pub fn receipt(
        to: &str,
        shop_name: &str,
        transaction_id: TransactionId,
        receipt: ReceiptDocument,
    ) -> Result<Self, EmailError> {
        Ok(Self {
            to: to.to_owned(),
            subject: "Your Receipt".to_owned(),
            text_body: ReceiptEmailText {
                shop_name,
                transaction_id,
            }
            .render()?,
            html_body: ReceiptEmailHtml {
                shop_name,
                transaction_id,
            }
            .render()?,
            attachment: Some(receipt.into()),
        })
    }
}

/// Something that can deliver an [`OutgoingMail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, mail: OutgoingMail) -> Result<(), EmailError>;
}

/// SMTP delivery via a STARTTLS relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    fn build_message(&self, mail: OutgoingMail) -> Result<Message, EmailError> {
        let body = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(mail.text_body),
            )
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(mail.html_body),
            );

        let builder = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(mail
                .to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(mail.to.clone()))?)
            .subject(mail.subject);

        let message = match mail.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|_| EmailError::InvalidContentType(attachment.content_type.clone()))?;
                builder.multipart(
                    MultiPart::mixed()
                        .multipart(body)
                        .singlepart(
                            Attachment::new(attachment.filename).body(attachment.bytes, content_type),
                        ),
                )?
            }
            None => builder.multipart(body)?,
        };

        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), EmailError> {
        let to = mail.to.clone();
        let subject = mail.subject.clone();
        let message = self.build_message(mail)?;

        self.transport.send(message).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Mailer for local development: logs each message and drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), EmailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            attachment = mail.attachment.as_ref().map(|a| a.filename.as_str()),
            "SMTP not configured, email not sent"
        );
        tracing::debug!(body = %mail.text_body, "Unsent email body");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn mailer() -> SmtpMailer {
        let config = EmailConfig {
            smtp_host: "smtp.shop.test".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: secrecy::SecretString::from("pw"),
            from_address: "Book Shop <orders@shop.test>".to_string(),
        };
        SmtpMailer::new(&config).unwrap()
    }

    #[test]
    fn test_password_mail_contains_password() {
        let mail = OutgoingMail::password("reader@shop.test", "Ab3dEf6hIj").unwrap();

        assert_eq!(mail.subject, "Your Password");
        assert!(mail.text_body.contains("Your password is: Ab3dEf6hIj"));
        assert!(mail.html_body.contains("Ab3dEf6hIj"));
        assert!(mail.attachment.is_none());
    }

    #[test]
    fn test_receipt_mail_attaches_document() {
        let id = TransactionId::from(Uuid::nil());
        let doc = ReceiptDocument {
            filename: "receipt.txt".to_string(),
            content_type: "text/plain; charset=utf-8".to_string(),
            bytes: b"THANK YOU".to_vec(),
        };

        let mail = OutgoingMail::receipt("reader@shop.test", "Book Shop", id, doc).unwrap();

        assert_eq!(mail.subject, "Your Receipt");
        assert!(mail.text_body.starts_with("Thank you for your purchase!"));
        assert!(mail.text_body.contains(&id.to_string()));
        assert_eq!(mail.attachment.unwrap().filename, "receipt.txt");
    }

    #[tokio::test]
    async fn test_build_message_with_attachment() {
        let doc = ReceiptDocument {
            filename: "receipt.txt".to_string(),
            content_type: "text/plain; charset=utf-8".to_string(),
            bytes: b"THANK YOU".to_vec(),
        };
        let mail =
            OutgoingMail::receipt("reader@shop.test", "Book Shop", TransactionId::generate(), doc)
                .unwrap();

        let message = mailer().build_message(mail).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Your Receipt"));
        assert!(raw.contains("receipt.txt"));
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_recipient() {
        let mail = OutgoingMail::password("not an address", "pw").unwrap();
        let err = mailer().build_message(mail).unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let mail = OutgoingMail::password("reader@shop.test", "pw").unwrap();
        assert!(LogMailer.send(mail).await.is_ok());
    }
}
