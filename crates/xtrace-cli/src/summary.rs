use std::cmp::Ordering;

use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use xtrace_model::{Severity, TracedIssue};

use crate::cli::OutputFormatArg;
use crate::commands::MapResult;

pub fn print_map_result(result: &MapResult) -> Result<()> {
    match result.format {
        OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(&result.run.issues)
                .context("serialize traced issues")?;
            println!("{json}");
        }
        OutputFormatArg::Table => {
            println!("Output: {}", result.raw.display());
            println!(
                "Issues: {} ({} errors, {} warnings, {} traced)",
                result.run.issues.len(),
                result.run.count(Severity::Error),
                result.run.count(Severity::Warning),
                result.run.issues.iter().filter(|issue| issue.is_traced()).count()
            );
            if !result.run.issues.is_empty() {
                println!("{}", issue_table(&result.run.issues));
            }
        }
    }
    Ok(())
}

pub fn issue_table(issues: &[TracedIssue]) -> Table {
    let mut ordered: Vec<&TracedIssue> = issues.iter().collect();
    ordered.sort_by(|a, b| {
        let severity = severity_rank(b.issue.severity).cmp(&severity_rank(a.issue.severity));
        if severity != Ordering::Equal {
            return severity;
        }
        a.issue.line.cmp(&b.issue.line)
    });

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Source"),
        header_cell("Rule"),
        header_cell("Line"),
        header_cell("Program"),
        header_cell("Element"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);

    for traced in ordered {
        let issue = &traced.issue;
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(issue.source.label()),
            optional_cell(issue.rule_id.as_deref()),
            Cell::new(issue.line),
            program_cell(traced),
            optional_cell(traced.producing_element.as_deref()),
            Cell::new(&issue.message),
        ]);
    }
    table
}

fn program_cell(traced: &TracedIssue) -> Cell {
    match (&traced.producing_file, traced.producing_line) {
        (Some(file), Some(line)) => {
            let name = file
                .file_name()
                .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
            Cell::new(format!("{name}:{line}")).fg(Color::Blue)
        }
        _ => dim_cell("-"),
    }
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(9)),
        ColumnConstraint::UpperBoundary(Width::Fixed(10)),
        ColumnConstraint::UpperBoundary(Width::Fixed(24)),
        ColumnConstraint::LowerBoundary(Width::Fixed(5)),
        ColumnConstraint::UpperBoundary(Width::Fixed(24)),
        ColumnConstraint::UpperBoundary(Width::Fixed(24)),
        ColumnConstraint::UpperBoundary(Width::Percentage(50)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::Cyan),
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 3,
        Severity::Warning => 2,
        Severity::Info => 1,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
