//! Text presentation of the user list and failure notices.

use anyhow::Context;
use client_core::FailureNotice;
use shared::domain::{UserListState, UserRecord};

const COLUMNS: [&str; 4] = ["ID", "NAME", "EMAIL", "STATUS"];
const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Renders the current state. A payload without a list view is shown as JSON
/// in either format.
pub fn render_users(state: &UserListState, format: OutputFormat) -> anyhow::Result<String> {
    match (format, state.records()) {
        (OutputFormat::Table, Some(records)) => Ok(render_table(&records)),
        _ => {
            let mut out = serde_json::to_string_pretty(state.payload())
                .context("failed to serialize user list")?;
            out.push('\n');
            Ok(out)
        }
    }
}

pub fn render_table(users: &[UserRecord]) -> String {
    if users.is_empty() {
        return "No users found.\n".to_string();
    }

    let rows: Vec<[String; 4]> = users.iter().map(table_row).collect();
    let mut widths = COLUMNS.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &COLUMNS.map(str::to_string), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

pub fn notice_line(notice: &FailureNotice) -> String {
    format!("{} ({})", notice.message, notice.reason)
}

fn table_row(user: &UserRecord) -> [String; 4] {
    let id = user
        .id_no()
        .map(str::to_string)
        .or_else(|| user.text("id"))
        .unwrap_or_else(|| EMPTY_CELL.to_string());
    let name = user
        .display_name()
        .unwrap_or_else(|| EMPTY_CELL.to_string());
    let email = user
        .text("email")
        .unwrap_or_else(|| EMPTY_CELL.to_string());
    let status = user
        .text("status")
        .unwrap_or_else(|| EMPTY_CELL.to_string());
    [id, name, email, status]
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
