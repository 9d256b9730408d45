//! Rendering for `--output`.
//!
//! Topology summaries, views and profiles go through the same two
//! dispatchers so every command honours the same four formats.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Color on `auto` follows the terminal and `NO_COLOR`.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Highlight a heading when color is on.
pub fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().cyan().to_string()
    } else {
        text.to_owned()
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Render rows of `data`.
///
/// Tables are built from `to_row`; JSON serializes `data` itself, so the
/// machine formats never lose fields the table leaves out. `plain` prints
/// `id_fn` of each item, one per line.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render one item. `detail_fn` produces the human-readable form.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Write to stdout unless `--quiet` or there is nothing to say.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: String,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: "R1".into() }, Item { id: "R2".into() }]
    }

    fn render(format: &OutputFormat) -> String {
        render_list(format, &items(), |i| Row { id: i.id.clone() }, |i| i.id.clone()).unwrap()
    }

    #[test]
    fn plain_prints_one_id_per_line() {
        assert_eq!(render(&OutputFormat::Plain), "R1\nR2");
    }

    #[test]
    fn compact_json_is_single_line() {
        assert_eq!(render(&OutputFormat::JsonCompact), r#"[{"id":"R1"},{"id":"R2"}]"#);
    }

    #[test]
    fn table_has_header_and_rows() {
        let table = render(&OutputFormat::Table);
        assert!(table.contains("ID"));
        assert!(table.contains("R2"));
    }

    #[test]
    fn heading_is_plain_without_color() {
        assert_eq!(heading("Nodes", false), "Nodes");
    }
}
