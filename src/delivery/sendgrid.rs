//! SendGrid v3 `mail/send` transport.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use super::{MailTransport, OutboundMessage, TransportError};

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Mail transport backed by the SendGrid v3 REST API.
///
/// Attachments are base64-encoded per the API contract. The returned status
/// code is SendGrid's response status (202 on acceptance).
pub struct SendGridTransport {
    api_key: String,
}

impl SendGridTransport {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

#[derive(Serialize)]
struct MailPayload<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
    attachments: Vec<SgAttachment<'a>>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SgAttachment<'a> {
    content: String,
    #[serde(rename = "type")]
    content_type: &'a str,
    filename: &'a str,
    disposition: &'a str,
}

fn payload(message: &OutboundMessage) -> MailPayload<'_> {
    MailPayload {
        personalizations: vec![Personalization {
            to: vec![EmailAddress { email: &message.to }],
        }],
        from: EmailAddress {
            email: &message.from,
        },
        subject: &message.subject,
        content: vec![Content {
            content_type: "text/plain",
            value: &message.body,
        }],
        attachments: vec![SgAttachment {
            content: BASE64.encode(&message.attachment.bytes),
            content_type: &message.attachment.mime_type,
            filename: &message.attachment.filename,
            disposition: "attachment",
        }],
    }
}

#[async_trait]
impl MailTransport for SendGridTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<u16, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError(e.to_string()))?;

        let resp = client
            .post(SENDGRID_URL)
            .bearer_auth(&self.api_key)
            .json(&payload(message))
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(resp.status().as_u16())
    }
}
