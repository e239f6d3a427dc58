//! # rechnungslauf
//!
//! Invoice fulfillment pipeline: validation of variable-length line-item
//! input, totals computation, and the multi-step create/delete/reset
//! workflows that keep an invoice record and its rendered document in
//! best-effort agreement across two independent stores, plus email delivery
//! of stored documents.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! The stores, the renderer, and the mail transport are external
//! collaborators behind traits ([`store::RecordStore`],
//! [`store::ArtifactStore`], [`render::DocumentRenderer`],
//! [`delivery::MailTransport`]); in-memory store implementations back tests
//! and local development.
//!
//! ## Quick Start
//!
//! ```rust
//! use rechnungslauf::core::*;
//! use rust_decimal_macros::dec;
//!
//! let draft = InvoiceDraft {
//!     name: "acme".into(),
//!     address1: "1 Main St".into(),
//!     address2: String::new(),
//!     city: "Springfield".into(),
//!     state: "IL".into(),
//!     postcode: "00000".into(),
//!     email: "a@b.com".into(),
//!     lines: vec![RawLine::new("Widget", "2", "5.0")],
//! };
//!
//! assert!(validate_draft(&draft).is_empty());
//! let totals = compute_totals(&validated_lines(&draft.lines));
//! assert_eq!(totals.total, dec!(10.0));
//! ```
//!
//! The async workflows are driven through [`pipeline::Fulfillment`] and
//! [`delivery::DeliveryService`].
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `sendgrid` | reqwest-backed SendGrid v3 mail transport |

pub mod core;
pub mod delivery;
pub mod pipeline;
pub mod render;
pub mod store;

// Re-export core types at crate root for convenience
pub use crate::core::*;
