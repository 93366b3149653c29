use crate::data::{Error, ExpenseRecord, RecordSet};

/// CSV importer for a whole `RecordSet`. The first row must be the header;
/// columns are matched by name so their order doesn't matter when reading.
///
/// Any row that doesn't parse aborts the import: we'd rather refuse to load than
/// drop or coerce an amount without anybody noticing.
pub(crate) fn read_records<R: std::io::Read>(reader: R) -> Result<RecordSet, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut records = RecordSet::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let record: ExpenseRecord = result.map_err(|e| Error::MalformedInput {
            // header is line 1
            line: e
                .position()
                .map(|pos| pos.line())
                .unwrap_or(index as u64 + 2),
            reason: describe(&e),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// The csv crate prefixes deserialization errors with their position, which we
/// already report separately.
fn describe(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    }
}
