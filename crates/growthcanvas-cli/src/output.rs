//! Table and JSON rendering for command output.

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub title: String,
    pub align: Align,
}

impl Column {
    pub fn left(title: impl Into<String>) -> Self {
        Self { title: title.into(), align: Align::Left }
    }

    pub fn right(title: impl Into<String>) -> Self {
        Self { title: title.into(), align: Align::Right }
    }
}

/// Render rows under a header line. Short rows are padded with empty cells.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.title.clone()));
    for row in rows {
        builder.push_record((0..columns.len()).map(|i| row.get(i).cloned().unwrap_or_default()));
    }

    let mut table = builder.build();
    table.with(Style::psql());
    for (i, column) in columns.iter().enumerate() {
        if column.align == Align::Right {
            table.modify(Columns::new(i..i + 1), Alignment::right());
        }
    }
    table.to_string()
}

pub fn print_table(columns: &[Column], rows: &[Vec<String>]) {
    println!("{}", render_table(columns, rows));
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
