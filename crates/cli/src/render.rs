//! Terminal output.

use std::io::{self, Write};

use crossterm::style::Stylize;
use crudtable_executor::Response;

/// Print `response`: pretty JSON data on success, a red error summary on
/// failure.
pub fn render(out: &mut impl Write, response: &Response) -> io::Result<()> {
    if response.is_successful() {
        let data = serde_json::Value::from(response.data.clone());
        let text = serde_json::to_string_pretty(&data).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(out, "{}", text)
    } else {
        writeln!(out, "{}", response.status.as_str().red().bold())?;
        writeln!(
            out,
            "{}",
            response.error_type.as_deref().unwrap_or("Unknown").red()
        )?;
        if let Some(code) = &response.error_code {
            writeln!(out, "{}", code.as_str().red())?;
        }
        writeln!(
            out,
            "{}",
            response.error_message.as_deref().unwrap_or("").red()
        )
    }
}
