#![no_main]

use libfuzzer_sys::fuzz_target;
use rechnungslauf::core::{RawLine, validate_lines, validated_lines};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let lines: Vec<RawLine> = s
            .split('\n')
            .map(|row| {
                let mut fields = row.splitn(3, '|');
                RawLine::new(
                    fields.next().unwrap_or(""),
                    fields.next().unwrap_or(""),
                    fields.next().unwrap_or(""),
                )
            })
            .collect();
        // Must not panic — violations are fine, panics are bugs.
        let _ = validate_lines(&lines);
        let _ = validated_lines(&lines);
    }
});
