//! Document rendering seam.
//!
//! Rendering is an external collaborator: the pipeline hands over a
//! [`DocumentData`] view and receives opaque bytes. Production deployments
//! plug in an HTML-to-PDF engine; [`PlainTextRenderer`] is a dependency-free
//! stand-in for tests and local development.

use crate::core::{DocumentData, RenderError};

/// Turns invoice data into document bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, data: &DocumentData) -> Result<Vec<u8>, RenderError>;
}

/// Renders a simple textual invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, data: &DocumentData) -> Result<Vec<u8>, RenderError> {
        let mut out = String::from("INVOICE\n\n");
        out.push_str(&format!("Billed to: {}\n", data.name));
        out.push_str(&format!("{}\n", data.address1));
        if !data.address2.trim().is_empty() {
            out.push_str(&format!("{}\n", data.address2));
        }
        out.push_str(&format!(
            "{}, {} {}\n",
            data.city, data.state, data.postcode
        ));
        out.push_str(&format!("{}\n\n", data.email));
        for line in &data.lines {
            out.push_str(&format!(
                "{}  x{} @ {}  = {}\n",
                line.item, line.qty, line.rate, line.subtotal
            ));
        }
        out.push_str(&format!("\nTOTAL: {}\n", data.total));
        Ok(out.into_bytes())
    }
}
