use crate::data::{Category, Error, ExpenseRecord, Position, RecordSet};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Totals per category, in `Category` order.
pub(crate) type Totals = BTreeMap<Category, Decimal>;

/// Appends a record; it gets the last position.
pub(crate) fn add(records: &mut RecordSet, record: ExpenseRecord) -> Position {
    records.push(record);
    records.len() - 1
}

/// Replaces the record at `position`, returning the one it replaced. Order is
/// preserved, so positions held by the caller stay valid.
pub(crate) fn update(
    records: &mut RecordSet,
    position: Position,
    record: ExpenseRecord,
) -> Result<ExpenseRecord, Error> {
    let len = records.len();
    let slot = records
        .get_mut(position)
        .ok_or(Error::OutOfRange { position, len })?;
    Ok(std::mem::replace(slot, record))
}

/// Removes the record at `position`. Every record after it moves down by one,
/// so any position the caller held beyond this one is now off by one.
pub(crate) fn delete(records: &mut RecordSet, position: Position) -> Result<ExpenseRecord, Error> {
    if position >= records.len() {
        return Err(Error::OutOfRange {
            position,
            len: records.len(),
        });
    }
    Ok(records.remove(position))
}

/// Single-level group-by-sum. Categories without records don't show up at all,
/// and unlisted categories are grouped by their literal name.
///
/// Amounts read back from the file aren't bounded, so a sum past `Decimal::MAX`
/// is an `Overflow` error rather than a panic.
pub(crate) fn totals_by_category(records: &[ExpenseRecord]) -> Result<Totals, Error> {
    let mut totals = Totals::new();
    for record in records {
        let total = totals.entry(record.category.clone()).or_default();
        *total = total
            .checked_add(record.amount)
            .ok_or_else(|| Error::Overflow(record.category.to_string()))?;
    }
    Ok(totals)
}

pub(crate) fn grand_total(totals: &Totals) -> Result<Decimal, Error> {
    totals
        .values()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
        .ok_or_else(|| Error::Overflow(String::from("all categories")))
}
