use serde_json::Value;
use std::io;

/// Record arrays worth emitting as CSV, in preference order. A projection
/// yields yearly rows, a simulation yields histogram bins, a design yields
/// bill-of-quantities lines.
const RECORD_KEYS: [&str; 3] = ["yearly", "distribution", "boq"];

/// Write output as CSV to stdout. The first record array found in the
/// result becomes the CSV body; envelopes without one fall back to a
/// two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            if let Some(records) = find_records(result) {
                write_records_csv(&mut wtr, records);
            } else if let Value::Object(result_map) = result {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result_map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_records_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn find_records(result: &Value) -> Option<&Vec<Value>> {
    let map = result.as_object()?;
    for key in RECORD_KEYS {
        if let Some(Value::Array(arr)) = map.get(key) {
            if arr.first().map_or(false, Value::is_object) {
                return Some(arr);
            }
        }
    }
    None
}

fn write_records_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
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
