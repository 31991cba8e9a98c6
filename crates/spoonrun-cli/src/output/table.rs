use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn print_table(table: Table) -> Result<()> {
    println!("{table}");
    Ok(())
}

/// Two-column table of labelled values.
pub fn key_value_table<'a>(rows: impl IntoIterator<Item = (&'a str, String)>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new("Field"), Cell::new("Value")]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}
