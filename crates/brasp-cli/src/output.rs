//! Rendering traces for the terminal.
use brasp_core::{ExecutionReport, InputSequence, Program, TraceTable, Value};

/// One row per trace, columns aligned under the input symbols.
///
/// ```text
///        a   b   a
/// Q_a    1   0   1
/// dist  -1   1   2
/// ```
pub fn render_table(input: &InputSequence, traces: &TraceTable) -> String {
    let header: Vec<String> = input.symbols().iter().map(char::to_string).collect();
    let rows: Vec<(&str, Vec<String>)> = traces
        .iter()
        .map(|(name, trace)| (name, trace.iter().map(format_value).collect()))
        .collect();

    let label_width = rows.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);
    let cell_width = rows
        .iter()
        .flat_map(|(_, cells)| cells.iter())
        .chain(header.iter())
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    push_row(&mut out, "", &header, label_width, cell_width);
    for (name, cells) in &rows {
        push_row(&mut out, name, cells, label_width, cell_width);
    }
    out
}

fn push_row(out: &mut String, label: &str, cells: &[String], label_width: usize, cell_width: usize) {
    let mut line = format!("{:<width$}", label, width = label_width);
    for cell in cells {
        line.push_str(&format!("  {:>width$}", cell, width = cell_width));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Integral numbers print without a fractional part, at any magnitude;
/// booleans as 1/0.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        // -0 prints as 0
        Value::Num(n) if *n == 0.0 => "0".to_string(),
        Value::Num(n) => format!("{}", n),
    }
}

/// Each operation's one-line rendering, prefixed by its kind.
pub fn render_program(program: &Program) -> String {
    program
        .operations()
        .iter()
        .map(|op| format!("{:<9} {}\n", op.kind().as_str(), op))
        .collect()
}

pub fn render_json(report: &ExecutionReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
