//! Terminal rendering shared by the subcommands.

use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;

const LABEL_WIDTH: usize = 16;
const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Confirmation of a completed action, on stdout.
    pub fn success(self, message: &str) {
        match self {
            Self::Text => println!("{message}"),
            Self::Json => json(&json!({ "status": "success", "message": message })),
        }
    }

    /// Failure report, on stderr. JSON mode stays a single line.
    pub fn error(self, message: &str) {
        match self {
            Self::Text => eprintln!("Error: {message}"),
            Self::Json => eprintln!("{}", json!({ "status": "error", "message": message })),
        }
    }
}

pub fn json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error: cannot encode output: {e}"),
    }
}

pub fn heading(title: &str) {
    println!("\n{title}\n{}", "-".repeat(RULE_WIDTH));
}

pub fn row(label: &str, value: &str) {
    println!("{}", render_row(label, value));
}

fn render_row(label: &str, value: &str) -> String {
    format!("  {:<width$} {value}", format!("{label}:"), width = LABEL_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_align_values() {
        assert_eq!(render_row("Phase", "anonymous"), "  Phase:           anonymous");
        assert_eq!(
            render_row("Code sent to", "a@example.com").find("a@"),
            render_row("Email", "a@example.com").find("a@")
        );
    }
}
