use rust_decimal::Decimal;

use super::types::{InvoiceTotals, PricedLine, ValidatedLine};

/// Compute per-line subtotals and the grand total.
///
/// `subtotal = qty * rate` using the literal values supplied; the grand
/// total is the sum over all lines. No currency rounding is applied beyond
/// ordinary decimal arithmetic. Negative quantities and rates are accepted
/// and may produce a negative total.
pub fn compute_totals(lines: &[ValidatedLine]) -> InvoiceTotals {
    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;

    for line in lines {
        let subtotal = line.qty * line.rate;
        total += subtotal;
        priced.push(PricedLine {
            item: line.item.clone(),
            qty: line.qty,
            rate: line.rate,
            subtotal,
        });
    }

    InvoiceTotals {
        lines: priced,
        total,
    }
}
