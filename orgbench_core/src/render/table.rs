//! Tabular text for query outcomes.
//!
//! Columns come from the first record's keys, in response order, minus the
//! service's `attributes` bookkeeping entry. Every cell is flattened to a
//! string: nested values as compact JSON, null as empty.

use serde_json::Value;

use crate::api::Record;

/// The service's per-record metadata key, excluded from rendering.
const ATTRIBUTES_KEY: &str = "attributes";

/// Column names for a result set. Empty when there are no records.
pub fn columns(records: &[Record]) -> Vec<String> {
    match records.first() {
        Some(first) => first
            .keys()
            .filter(|k| k.as_str() != ATTRIBUTES_KEY)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// Project records onto `columns`, one string cell per column. Missing
/// fields render as empty cells.
pub fn project(records: &[Record], columns: &[String]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| record.get(col).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Relationship and subquery results stay readable as compact JSON.
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}

/// Fixed-width table text. `rows` must already be projected onto
/// `columns`.
pub fn render(columns: &[String], rows: &[Vec<String>]) -> String {
    if columns.is_empty() {
        return "(no records)\n".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    render_row(&mut out, columns, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in rows {
        render_row(&mut out, row, &widths);
    }
    out
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{cell:<w$}")
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(raw: serde_json::Value) -> Record {
        match raw {
            Value::Object(map) => map,
            _ => panic!("record fixtures must be objects"),
        }
    }

    #[test]
    fn columns_drop_attributes_and_keep_order() {
        let records = vec![record(json!({
            "attributes": { "type": "Account", "url": "/x" },
            "Id": "001",
            "Name": "Acme",
        }))];
        assert_eq!(columns(&records), ["Id", "Name"]);
        assert!(columns(&[]).is_empty());
    }

    #[test]
    fn cells_flatten_scalars_nulls_and_nested_values() {
        let records = vec![record(json!({
            "Id": "001",
            "Employees": 70,
            "Parent": { "Name": "Holding" },
            "Phone": null,
        }))];
        let cols = columns(&records);
        let rows = project(&records, &cols);
        assert_eq!(rows, [["001", "70", r#"{"Name":"Holding"}"#, ""]]);
    }

    #[test]
    fn rendered_table_pads_to_the_widest_cell() {
        let cols: Vec<String> = vec!["Id".into(), "Name".into()];
        let rows = vec![
            vec!["001".to_string(), "Acme".to_string()],
            vec!["002".to_string(), "Globex Corporation".to_string()],
        ];
        let text = render(&cols, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Id  | Name");
        assert_eq!(lines[1], format!("{}-+-{}", "-".repeat(3), "-".repeat(18)));
        assert_eq!(lines[2], "001 | Acme");
        assert_eq!(lines[3], "002 | Globex Corporation");
    }

    #[test]
    fn empty_result_set_renders_a_placeholder() {
        assert_eq!(render(&[], &[]), "(no records)\n");
    }
}
