use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::Violation;
use super::types::{InvoiceDraft, LineClass, RawLine, ValidatedLine};

/// Validate a full draft: scalar fields plus the line set.
/// Returns every violation found, not just the first. Pure function of its
/// input — re-running it on the same draft yields identical violations.
pub fn validate_draft(draft: &InvoiceDraft) -> Vec<Violation> {
    let mut violations = Vec::new();

    // Required scalars, checked non-blank after trimming. address2 is
    // deliberately absent: it may be blank.
    let required: [(&'static str, &str); 5] = [
        ("name", &draft.name),
        ("address1", &draft.address1),
        ("city", &draft.city),
        ("state", &draft.state),
        ("postcode", &draft.postcode),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            violations.push(Violation::BlankField { field });
        }
    }

    if !is_valid_email(draft.email.trim()) {
        violations.push(Violation::InvalidEmail);
    }

    violations.extend(validate_lines(&draft.lines));
    violations
}

/// Validate the raw line set.
///
/// If no line is complete the single `MissingLines` violation is reported
/// and per-line checks are skipped. Otherwise blank lines are passed over,
/// partial lines report `IncompleteLine`, and the numeric checks on `qty`
/// and `rate` fire independently of completeness — a partial line with a
/// blank quantity yields both `IncompleteLine` and `InvalidQuantity`.
pub fn validate_lines(lines: &[RawLine]) -> Vec<Violation> {
    let complete = lines
        .iter()
        .filter(|l| l.classify() == LineClass::Complete)
        .count();
    if complete == 0 {
        return vec![Violation::MissingLines];
    }

    let mut violations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let position = i + 1;
        match line.classify() {
            LineClass::Blank => continue,
            LineClass::Partial => violations.push(Violation::IncompleteLine { line: position }),
            LineClass::Complete => {}
        }
        if !is_numeric(&line.qty) {
            violations.push(Violation::InvalidQuantity { line: position });
        }
        if !is_numeric(&line.rate) {
            violations.push(Violation::InvalidRate { line: position });
        }
    }
    violations
}

/// Typed conversion of the line set: blank lines skipped, complete lines
/// parsed. Call after [`validate_draft`] has returned no violations.
pub fn validated_lines(lines: &[RawLine]) -> Vec<ValidatedLine> {
    lines.iter().filter_map(RawLine::to_validated).collect()
}

fn is_numeric(s: &str) -> bool {
    Decimal::from_str(s.trim()).is_ok()
}

/// Minimal syntactic email check: one `@`, non-empty local part, dotted
/// domain, no whitespace. Deliverability is not our concern.
pub(crate) fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
        && !s.chars().any(char::is_whitespace)
}
