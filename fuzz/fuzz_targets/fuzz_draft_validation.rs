#![no_main]

use libfuzzer_sys::fuzz_target;
use rechnungslauf::core::{InvoiceDraft, RawLine, validate_draft};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let draft = InvoiceDraft {
            name: s.to_string(),
            address1: s.to_string(),
            address2: s.to_string(),
            city: s.to_string(),
            state: s.to_string(),
            postcode: s.to_string(),
            email: s.to_string(),
            lines: vec![RawLine::new(s, s, s), RawLine::blank()],
        };
        // Must not panic — violations are fine, panics are bugs.
        let _ = validate_draft(&draft);
    }
});
