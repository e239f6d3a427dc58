//! Invoice delivery: fetch a stored document and email it as an attachment.

#[cfg(feature = "sendgrid")]
pub mod sendgrid;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use thiserror::Error;

use crate::core::{FulfillmentError, InvoiceId, Step};
use crate::store::{ArtifactStore, RecordStore, document_key};

/// Fixed body text sent with every invoice email.
pub const DISCLAIMER: &str = "Please note that the attached sample invoice is \
generated for demonstration purposes only and no payment is required.";

const PDF_MIME: &str = "application/pdf";

/// A binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// An outbound email with a single attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Attachment,
}

/// Transport-level failure (connection, serialization, ...). Non-2xx
/// responses are not transport errors — the status code is returned and
/// judged by the caller.
#[derive(Debug, Clone, Error)]
#[error("mail transport error: {0}")]
pub struct TransportError(pub String);

/// Sends an outbound message and reports the transport's HTTP-equivalent
/// status code.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<u16, TransportError>;
}

/// Fetches a stored invoice document and dispatches it to the invoice's
/// email address.
pub struct DeliveryService {
    records: Arc<dyn RecordStore>,
    artifacts: Arc<dyn ArtifactStore>,
    transport: Arc<dyn MailTransport>,
    from: String,
}

impl DeliveryService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        artifacts: Arc<dyn ArtifactStore>,
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            records,
            artifacts,
            transport,
            from: from.into(),
        }
    }

    /// Send the stored document for `id` as a PDF attachment.
    ///
    /// Success means the transport reported 2xx acceptance; anything else is
    /// a [`FulfillmentError::Delivery`]. No automatic retry.
    pub async fn send_invoice(&self, id: InvoiceId) -> Result<(), FulfillmentError> {
        let bytes = self
            .artifacts
            .get(&document_key(id))
            .await
            .map_err(|source| FulfillmentError::Artifact {
                step: Step::FetchDocument,
                source,
            })?;

        let to = self
            .records
            .email_for(id)
            .await
            .map_err(|source| FulfillmentError::Persistence {
                step: Step::LookupEmail,
                source,
            })?;

        let message = OutboundMessage {
            from: self.from.clone(),
            to,
            subject: format!("Invoice #{id}"),
            body: DISCLAIMER.to_string(),
            attachment: Attachment {
                filename: format!("invoice_{id}.pdf"),
                mime_type: PDF_MIME.to_string(),
                bytes,
            },
        };

        match self.transport.send(&message).await {
            Ok(status) if (200..300).contains(&status) => {
                info!("invoice #{id} sent to {}", message.to);
                Ok(())
            }
            Ok(status) => Err(FulfillmentError::Delivery {
                id,
                reason: format!("transport returned status {status}"),
            }),
            Err(e) => Err(FulfillmentError::Delivery {
                id,
                reason: e.to_string(),
            }),
        }
    }
}
