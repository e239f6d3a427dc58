use std::fmt;

use thiserror::Error;

use super::types::InvoiceId;

/// A single field-scoped validation violation.
///
/// Line positions are 1-based, matching the order of the submitted rows.
/// The `Display` strings are the user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// No line in the submission was complete.
    MissingLines,
    /// A line was neither fully blank nor fully filled in.
    IncompleteLine { line: usize },
    /// A non-blank line whose quantity is not numeric.
    InvalidQuantity { line: usize },
    /// A non-blank line whose rate is not numeric.
    InvalidRate { line: usize },
    /// A required scalar field was blank after trimming.
    BlankField { field: &'static str },
    /// The email address is not syntactically valid.
    InvalidEmail,
}

impl Violation {
    /// The field this violation is scoped to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingLines
            | Self::IncompleteLine { .. }
            | Self::InvalidQuantity { .. }
            | Self::InvalidRate { .. } => "lines",
            Self::BlankField { field } => field,
            Self::InvalidEmail => "email",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLines => write!(f, "Invoice data is missing."),
            Self::IncompleteLine { line } => write!(f, "Invoice line {line} is incomplete."),
            Self::InvalidQuantity { line } => {
                write!(f, "Invoice line {line} specifies a non-numeric quantity.")
            }
            Self::InvalidRate { line } => {
                write!(f, "Invoice line {line} specifies a non-numeric rate.")
            }
            Self::BlankField { field } => write!(f, "Field '{field}' must not be blank."),
            Self::InvalidEmail => write!(f, "Email address is not valid."),
        }
    }
}

/// The full set of violations found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(v: Vec<Violation>) -> Self {
        Self(v)
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Named workflow steps, so every error reports exactly where it happened
/// and which steps had already completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PersistRecord,
    RenderDocument,
    StoreDocument,
    DeleteRecord,
    DeleteDocument,
    FetchDocument,
    ListRecords,
    ListDocuments,
    LookupEmail,
    SendMessage,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersistRecord => "persist-record",
            Self::RenderDocument => "render-document",
            Self::StoreDocument => "store-document",
            Self::DeleteRecord => "delete-record",
            Self::DeleteDocument => "delete-document",
            Self::FetchDocument => "fetch-document",
            Self::ListRecords => "list-records",
            Self::ListDocuments => "list-documents",
            Self::LookupEmail => "lookup-email",
            Self::SendMessage => "send-message",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error currency of the store adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The requested record, object, or container does not exist.
    #[error("not found")]
    NotFound,
    /// Any other backend failure, with a backend-specific message.
    #[error("{0}")]
    Backend(String),
}

/// Failure from the document renderer collaborator.
#[derive(Debug, Clone, Error)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

/// Errors that can occur during fulfillment workflows.
///
/// Validation halts the workflow before any side effect. All other variants
/// halt the current step without rolling back completed ones; the
/// partial-failure variants ([`RecordWithoutDocument`] and
/// [`OrphanedDocument`]) name what succeeded and what is left behind so the
/// operator can remediate.
///
/// [`RecordWithoutDocument`]: FulfillmentError::RecordWithoutDocument
/// [`OrphanedDocument`]: FulfillmentError::OrphanedDocument
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FulfillmentError {
    /// One or more field-scoped violations; no side effects occurred.
    #[error("validation failed: {0}")]
    Validation(Violations),

    /// The record store failed at the named step.
    #[error("record store failed at {step}: {source}")]
    Persistence { step: Step, source: StoreError },

    /// The document store failed at the named step.
    #[error("document store failed at {step}: {source}")]
    Artifact { step: Step, source: StoreError },

    /// The invoice record was persisted but its document was never stored.
    /// The record is left in place for a later reconciliation sweep.
    #[error("invoice #{id} was saved but its document was not stored ({step}): {cause}")]
    RecordWithoutDocument {
        id: InvoiceId,
        step: Step,
        cause: String,
    },

    /// The invoice record was deleted but its document remains in the store.
    #[error("invoice record deleted but document '{key}' could not be removed: {source}")]
    OrphanedDocument { key: String, source: StoreError },

    /// The mail transport failed or reported a non-2xx status.
    #[error("failed to send invoice #{id}: {reason}")]
    Delivery { id: InvoiceId, reason: String },
}

impl FulfillmentError {
    /// True for errors where one store succeeded and the paired store
    /// failed, leaving the record/document invariant violated.
    pub fn is_partial_failure(&self) -> bool {
        matches!(
            self,
            Self::RecordWithoutDocument { .. } | Self::OrphanedDocument { .. }
        )
    }
}
