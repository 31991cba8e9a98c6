use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Result document of a command that only reports how the tool exited.
#[derive(Debug, Serialize)]
pub struct ExitReport<'a> {
    pub command: &'a str,
    pub exit_code: i32,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_json(&mut stdout, value)
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to render JSON output")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_report_document() {
        let mut out = Vec::new();
        let report = ExitReport {
            command: "pull ns/app",
            exit_code: 3,
        };
        write_json(&mut out, &report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["command"], "pull ns/app");
        assert_eq!(value["exit_code"], 3);
        assert!(out.ends_with(b"}\n"));
    }
}
