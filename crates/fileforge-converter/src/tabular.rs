//! CSV ↔ JSON with a one-header-row contract.
//!
//! The first CSV row names the fields and must not repeat a name; later
//! rows map positionally. JSON
//! values are always strings on the way out of CSV. On the way back, the
//! first object's keys (in document order) become the header and every
//! value is quoted.

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde_json::{Map, Value};

use crate::error::ConversionError;

/// Convert CSV bytes to a pretty-printed JSON array of objects.
pub fn csv_to_json(data: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records = reader.records();
    let header = match records.next() {
        Some(row) => row?,
        None => return Err(ConversionError::EmptyTable("CSV file is empty".to_string())),
    };
    let header: Vec<String> = header.iter().map(str::to_string).collect();
    for (index, name) in header.iter().enumerate() {
        if header[..index].contains(name) {
            return Err(ConversionError::MalformedInput(format!(
                "CSV header repeats column '{name}'"
            )));
        }
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let mut object = Map::with_capacity(header.len());
        for (index, name) in header.iter().enumerate() {
            let value = record.get(index).unwrap_or("");
            object.insert(name.clone(), Value::String(value.to_string()));
        }
        rows.push(Value::Object(object));
    }

    if rows.is_empty() {
        return Err(ConversionError::EmptyTable("CSV file has no data rows".to_string()));
    }

    Ok(serde_json::to_vec_pretty(&Value::Array(rows))?)
}

/// Convert a JSON array of objects to CSV.
pub fn json_to_csv(data: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let value: Value = serde_json::from_slice(data)?;
    let Value::Array(items) = value else {
        return Err(ConversionError::MalformedInput(
            "JSON must be an array of objects".to_string(),
        ));
    };
    if items.is_empty() {
        return Err(ConversionError::EmptyTable("JSON array is empty".to_string()));
    }

    let objects = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or_else(|| {
                ConversionError::MalformedInput(format!("element {index} is not an object"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let keys: Vec<&String> = objects[0].keys().collect();

    let mut header_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    header_writer.write_record(keys.iter().map(|k| k.as_str()))?;
    let mut out = header_writer
        .into_inner()
        .map_err(|e| ConversionError::Io(e.into_error()))?;

    let mut row_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(&mut out);
    for object in &objects {
        row_writer.write_record(keys.iter().map(|key| cell_text(object.get(key.as_str()))))?;
    }
    row_writer.flush()?;
    drop(row_writer);

    Ok(out)
}

/// `null`/missing become empty; strings are unwrapped; everything else is
/// its JSON text.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn test_csv_json_csv_round_trip() {
        let json = csv_to_json(b"a,b\n1,2\n").expect("csv to json");
        let parsed: Value = serde_json::from_slice(&json).expect("parse");
        assert_eq!(parsed, serde_json::json!([{"a": "1", "b": "2"}]));

        let csv = text(json_to_csv(&json).expect("json to csv"));
        assert_eq!(csv, "a,b\n\"1\",\"2\"\n");
    }

    #[test]
    fn test_short_rows_pad_with_empty_strings() {
        let json = csv_to_json(b"name,age,city\nAda,36\n").expect("convert");
        let parsed: Value = serde_json::from_slice(&json).expect("parse");
        assert_eq!(parsed[0]["city"], "");
        assert_eq!(parsed[0]["age"], "36");
    }

    #[test]
    fn test_quoted_fields_survive() {
        let json = csv_to_json(b"quote\n\"He said \"\"hi\"\"\"\n").expect("convert");
        let parsed: Value = serde_json::from_slice(&json).expect("parse");
        assert_eq!(parsed[0]["quote"], "He said \"hi\"");

        let csv = text(json_to_csv(&json).expect("back"));
        assert_eq!(csv, "quote\n\"He said \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_header_only_csv_fails() {
        let err = csv_to_json(b"a,b\n").expect_err("must fail");
        assert!(matches!(err, ConversionError::EmptyTable(_)));
        assert!(matches!(csv_to_json(b""), Err(ConversionError::EmptyTable(_))));
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        match csv_to_json(b"id,name,id\n1,a,2\n") {
            Err(ConversionError::MalformedInput(msg)) => assert!(msg.contains("'id'")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_json_array_fails() {
        let err = json_to_csv(b"[]").expect_err("must fail");
        assert!(matches!(err, ConversionError::EmptyTable(_)));
    }

    #[test]
    fn test_json_non_array_is_malformed() {
        assert!(matches!(json_to_csv(b"{\"a\":1}"), Err(ConversionError::MalformedInput(_))));
        assert!(matches!(json_to_csv(b"[1,2]"), Err(ConversionError::MalformedInput(_))));
        assert!(matches!(json_to_csv(b"not json"), Err(ConversionError::Json(_))));
    }

    #[test]
    fn test_json_scalars_and_missing_keys() {
        let input = br#"[{"id": 1, "ok": true, "note": null}, {"id": 2.5}]"#;
        let csv = text(json_to_csv(input).expect("convert"));
        assert_eq!(csv, "id,ok,note\n\"1\",\"true\",\"\"\n\"2.5\",\"\",\"\"\n");
    }
}
