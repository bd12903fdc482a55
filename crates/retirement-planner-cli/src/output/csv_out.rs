use serde_json::{Map, Value};
use std::io;

/// Write output as CSV to stdout.
///
/// A result carrying an `items` list (acquisition reports) is written one row
/// per item, followed by a field,value block for the remaining fields such as
/// `totals`. Any other result becomes field,value rows with nested objects
/// flattened into dotted field names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, value) {
        log::error!("failed to write CSV output: {}", e);
    }
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            match result {
                Value::Object(res) => {
                    if let Some(Value::Array(items)) = res.get("items") {
                        write_array_csv(wtr, items)?;
                        let rest: Map<String, Value> = res
                            .iter()
                            .filter(|(k, _)| k.as_str() != "items")
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect();
                        if !rest.is_empty() {
                            write_fields(wtr, &rest)?;
                        }
                    } else {
                        write_fields(wtr, res)?;
                    }
                }
                other => wtr.write_record([&format_csv_value(other)])?,
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr)?,
        _ => wtr.write_record([&format_csv_value(value)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten("", map) {
        wtr.write_record([key.as_str(), &val])?;
    }
    Ok(())
}

fn flatten(prefix: &str, map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => rows.extend(flatten(&name, inner)),
            Value::Array(arr) => {
                for (i, item) in arr.iter().enumerate() {
                    let indexed = format!("{}.{}", name, i);
                    match item {
                        Value::Object(inner) => rows.extend(flatten(&indexed, inner)),
                        other => rows.push((indexed, format_csv_value(other))),
                    }
                }
            }
            other => rows.push((name, format_csv_value(other))),
        }
    }
    rows
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    if arr.is_empty() {
        return Ok(());
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        wtr.write_record(&headers)?;

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                wtr.write_record(&row)?;
            }
        }
    } else {
        for item in arr {
            wtr.write_record([&format_csv_value(item)])?;
        }
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
