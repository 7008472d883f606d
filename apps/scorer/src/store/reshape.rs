use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;

use crate::errors::ScorerError;
use crate::store::{read_output, write_json, OutputMapping};

/// Flattens an output mapping into a list of records, each with its id as the
/// first field, in mapping order.
pub fn flatten(mapping: &OutputMapping) -> Result<Vec<Value>, ScorerError> {
    mapping
        .iter()
        .map(|(id, record)| {
            let fields = record
                .as_object()
                .ok_or_else(|| ScorerError::MalformedRecord { id: id.clone() })?;
            let mut flat = Map::with_capacity(fields.len() + 1);
            flat.insert("id".to_string(), Value::String(id.clone()));
            flat.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(Value::Object(flat))
        })
        .collect()
}

/// Reads an output mapping file and writes it back out as a JSON array.
/// Returns the number of records written.
pub fn flatten_file(input: &Path, output: &Path) -> Result<usize, ScorerError> {
    let mapping = read_output(input)?;
    let records = flatten(&mapping)?;
    write_json(&records, output)?;
    info!(
        "Flattened {} reports from {} records into '{}'",
        records.len(),
        mapping.len(),
        output.display()
    );
    Ok(records.len())
}
