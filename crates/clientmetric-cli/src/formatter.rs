//! Output formatters for decoded frames and replayed values.

use clap::ValueEnum;
use clientmetric_proto::{Record, ReplayState};
use comfy_table::Table;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// A decoded record together with the input line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    pub line: usize,
    pub record: Record<'a>,
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format decoded records.
    fn format_records(&self, records: &[LineRecord<'_>]) -> String;

    /// Format replayed metric values.
    fn format_state(&self, state: &ReplayState) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Column values for one record: kind, wire ID, name or value.
fn record_columns(record: &Record<'_>) -> (&'static str, String, String) {
    match *record {
        Record::Name { name } => ("name", String::new(), name.to_string()),
        Record::Set { wire_id, value } => ("set", wire_id.to_string(), value.to_string()),
        Record::Increment { wire_id, delta } => {
            ("increment", wire_id.to_string(), format!("{:+}", delta))
        }
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_records(&self, records: &[LineRecord<'_>]) -> String {
        if records.is_empty() {
            return "No records".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec!["line", "record", "wire_id", "name/value"]);
        for r in records {
            let (kind, wire_id, payload) = record_columns(&r.record);
            table.add_row(vec![r.line.to_string(), kind.to_string(), wire_id, payload]);
        }
        table.to_string()
    }

    fn format_state(&self, state: &ReplayState) -> String {
        let snapshot = state.snapshot();
        let unnamed = state.unnamed();
        if snapshot.is_empty() && unnamed.is_empty() {
            return "No metrics".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec!["metric", "wire_id", "value"]);
        for (name, value) in &snapshot {
            let wire_id = state
                .wire_id_of(name)
                .map(|id| id.to_string())
                .unwrap_or_default();
            table.add_row(vec![name.clone(), wire_id, value.to_string()]);
        }
        for (wire_id, value) in &unnamed {
            table.add_row(vec!["?".to_string(), wire_id.to_string(), value.to_string()]);
        }
        table.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_records(&self, records: &[LineRecord<'_>]) -> String {
        let rows: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                let mut row = serde_json::to_value(r.record).unwrap_or_default();
                if let Some(obj) = row.as_object_mut() {
                    obj.insert("line".to_string(), r.line.into());
                }
                row
            })
            .collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_state(&self, state: &ReplayState) -> String {
        let unnamed: serde_json::Map<String, serde_json::Value> = state
            .unnamed()
            .into_iter()
            .map(|(id, value)| (id.to_string(), value.into()))
            .collect();
        serde_json::to_string_pretty(&serde_json::json!({
            "frames": state.frames(),
            "metrics": state.snapshot(),
            "unnamed": unnamed,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_records(&self, records: &[LineRecord<'_>]) -> String {
        let mut output = String::from("line,record,wire_id,name_or_value\n");
        for r in records {
            let (kind, wire_id, payload) = record_columns(&r.record);
            output.push_str(&format!("{},{},{},{}\n", r.line, kind, wire_id, payload));
        }
        output
    }

    fn format_state(&self, state: &ReplayState) -> String {
        let mut output = String::from("metric,wire_id,value\n");
        for (name, value) in state.snapshot() {
            let wire_id = state
                .wire_id_of(&name)
                .map(|id| id.to_string())
                .unwrap_or_default();
            output.push_str(&format!("{},{},{}\n", name, wire_id, value));
        }
        for (wire_id, value) in state.unnamed() {
            output.push_str(&format!(",{},{}\n", wire_id, value));
        }
        output
    }
}
