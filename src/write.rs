use crate::data::{ExpenseRecord, HEADER};

/// CSV exporter for a `RecordSet`. The header is written explicitly so that an
/// empty set still produces a file with the full column schema.
pub(crate) fn write_records<W: std::io::Write>(
    writer: W,
    records: &[ExpenseRecord],
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
