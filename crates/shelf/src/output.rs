//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders catalog items in the format selected by `--output`, and state
//! transitions for `shelf watch`.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use shelf_core::{CatalogItem, FetchState};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Catalog rendering ────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Link")]
    href: String,
}

impl From<&CatalogItem> for ItemRow {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name().unwrap_or("-").to_owned(),
            price: item.price().unwrap_or_else(|| "-".into()),
            href: item.href().unwrap_or("-").to_owned(),
        }
    }
}

/// Render items in the chosen format, preserving their order.
pub fn render_items(format: OutputFormat, items: &[CatalogItem]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                return Ok("No items.".into());
            }
            let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => serde_json::to_string_pretty(items).map_err(render_err),
        OutputFormat::JsonCompact => serde_json::to_string(items).map_err(render_err),
        OutputFormat::Yaml => serde_yaml::to_string(items).map_err(render_err),
        OutputFormat::Plain => Ok(items
            .iter()
            .map(|item| item.id.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub(crate) fn render_err(e: impl std::fmt::Display) -> CliError {
    CliError::Render(e.to_string())
}

// ── Transition rendering ─────────────────────────────────────────────

/// One line describing a state, e.g. `loading  attempt 2`.
pub fn render_transition(state: &FetchState<CatalogItem>, color: bool) -> String {
    let label = format!("{:<8}", state.label());
    let label = if color {
        match state {
            FetchState::Idle => label.dimmed().to_string(),
            FetchState::Loading { .. } => label.cyan().to_string(),
            FetchState::Success { .. } => label.green().to_string(),
            FetchState::Failed { .. } => label.red().to_string(),
        }
    } else {
        label
    };

    match state {
        FetchState::Idle => label.trim_end().to_owned(),
        FetchState::Loading { attempt } => format!("{label} attempt {attempt}"),
        FetchState::Success { data } => {
            let noun = if data.len() == 1 { "item" } else { "items" };
            format!("{label} {} {noun}", data.len())
        }
        FetchState::Failed { error, attempt } => format!(
            "{label} attempt {attempt} [{}] {}",
            error.kind().as_ref(),
            error.message()
        ),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shelf_core::{ClassifiedError, ErrorKind, sample_catalog};

    use super::*;

    #[test]
    fn plain_lists_ids_in_order() {
        let items = sample_catalog();
        let out = render_items(OutputFormat::Plain, &items[..3]).unwrap();
        assert_eq!(out, "1\n2\n3");
    }

    #[test]
    fn table_shows_names_and_prices() {
        let out = render_items(OutputFormat::Table, &sample_catalog()).unwrap();
        assert!(out.contains("Earthen Bottle"));
        assert!(out.contains("48R"));
    }

    #[test]
    fn json_keeps_unknown_fields() {
        let item = CatalogItem::new(9_i64).with("name", "Tote").with("color", "navy");
        let out = render_items(OutputFormat::JsonCompact, &[item]).unwrap();
        assert_eq!(out, r#"[{"id":9,"name":"Tote","color":"navy"}]"#);
    }

    #[test]
    fn transitions_render_without_color() {
        let loading: FetchState<CatalogItem> = FetchState::Loading { attempt: 2 };
        assert_eq!(render_transition(&loading, false), "loading  attempt 2");

        let success = FetchState::Success {
            data: Arc::from(sample_catalog()),
        };
        assert_eq!(render_transition(&success, false), "success  8 items");

        let failed: FetchState<CatalogItem> = FetchState::Failed {
            error: ClassifiedError::new(ErrorKind::Timeout, "too slow", None),
            attempt: 1,
        };
        assert_eq!(
            render_transition(&failed, false),
            "failed   attempt 1 [timeout] too slow"
        );
    }
}
