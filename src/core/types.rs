use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Record-store-assigned invoice identifier (unique, strictly increasing).
pub type InvoiceId = i64;

/// A single invoice line as submitted — untrusted form input, all strings.
///
/// Lines are transient: they exist only within one create request and are
/// never persisted individually.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub item: String,
    pub qty: String,
    pub rate: String,
}

/// Three-way classification of a raw line.
///
/// A blank row in the form is skipped silently; a partially filled row is a
/// validation error; only complete rows carry into totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// All three fields blank after trimming.
    Blank,
    /// Some fields blank, some not.
    Partial,
    /// No field blank.
    Complete,
}

impl RawLine {
    pub fn new(item: impl Into<String>, qty: impl Into<String>, rate: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            qty: qty.into(),
            rate: rate.into(),
        }
    }

    /// An entirely blank row, as produced by an untouched form row.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn classify(&self) -> LineClass {
        let blanks = [&self.item, &self.qty, &self.rate]
            .iter()
            .filter(|f| f.trim().is_empty())
            .count();
        match blanks {
            0 => LineClass::Complete,
            3 => LineClass::Blank,
            _ => LineClass::Partial,
        }
    }

    /// Convert a complete line into its typed form.
    ///
    /// Returns `None` for blank or partial lines and for lines whose numeric
    /// fields do not parse — callers are expected to have run validation
    /// first, which reports those cases as violations.
    pub fn to_validated(&self) -> Option<ValidatedLine> {
        if self.classify() != LineClass::Complete {
            return None;
        }
        let qty = Decimal::from_str(self.qty.trim()).ok()?;
        let rate = Decimal::from_str(self.rate.trim()).ok()?;
        Some(ValidatedLine {
            item: self.item.trim().to_string(),
            qty,
            rate,
        })
    }
}

/// The full create-request input: billing details plus the raw line set.
///
/// Constructed per request, consumed by validation, and folded into an
/// [`InvoiceRecord`] plus a rendered document on success. `address2` is the
/// only field that may be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub email: String,
    pub lines: Vec<RawLine>,
}

/// A complete line whose numeric fields parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedLine {
    pub item: String,
    pub qty: Decimal,
    pub rate: Decimal,
}

/// A validated line annotated with its subtotal (`qty * rate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub item: String,
    pub qty: Decimal,
    pub rate: Decimal,
    pub subtotal: Decimal,
}

/// Priced lines plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

/// Persisted invoice metadata, owned by the record store.
///
/// Created on successful validation and persistence, deleted explicitly or
/// during reset, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub name: String,
    pub email: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// The serializable view handed to the document renderer: the draft's
/// billing fields together with the priced lines and grand total.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentData {
    pub name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub email: String,
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

impl DocumentData {
    pub fn new(draft: &InvoiceDraft, totals: &InvoiceTotals) -> Self {
        Self {
            name: draft.name.clone(),
            address1: draft.address1.clone(),
            address2: draft.address2.clone(),
            city: draft.city.clone(),
            state: draft.state.clone(),
            postcode: draft.postcode.clone(),
            email: draft.email.clone(),
            lines: totals.lines.clone(),
            total: totals.total,
        }
    }
}
