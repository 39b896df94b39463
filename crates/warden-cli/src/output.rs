//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One row of a two-column record table.
#[derive(Debug, Tabled)]
struct FieldRow {
    /// Field name
    field: String,
    /// Rendered value
    value: String,
}

/// Print a single record in the selected format.
///
/// Tables render one row per top-level field; nested arrays are joined
/// with commas.
pub fn print_record<T: Serialize>(item: &T, format: OutputFormat) {
    let value = serde_json::to_value(item).unwrap_or(Value::Null);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
        OutputFormat::Table => match value {
            Value::Object(fields) => {
                let rows: Vec<FieldRow> = fields
                    .into_iter()
                    .map(|(field, value)| FieldRow {
                        field,
                        value: render(&value),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
            other => println!("{}", render(&other)),
        },
    }
}

/// Print a success message
pub fn print_success(msg: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("✓ {msg}"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "ok": true, "message": msg })),
    }
}

/// Print an error message
pub fn print_error(code: &str, msg: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table => eprintln!("✗ {msg}"),
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::json!({ "ok": false, "code": code, "message": msg })
            );
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
