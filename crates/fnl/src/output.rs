//! Output formatting helpers for the `fnl` CLI.
//!
//! Provides JSON output, table formatting, and human-readable lead display
//! in both compact (one-liner) and detailed (multi-line) formats.

use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

use funnel_core::call::Call;
use funnel_core::lead::Lead;
use funnel_core::stage::StageCatalog;

/// Whether styled output should be emitted.
///
/// Respects `NO_COLOR` and disables color when stdout is not a terminal.
pub fn supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

fn accent(s: &str) -> String {
    if supports_color() {
        s.cyan().to_string()
    } else {
        s.to_string()
    }
}

fn muted(s: &str) -> String {
    if supports_color() {
        s.dimmed().to_string()
    } else {
        s.to_string()
    }
}

pub fn bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

pub fn warn_style(s: &str) -> String {
    if supports_color() {
        s.yellow().to_string()
    } else {
        s.to_string()
    }
}

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a simple table with headers and rows.
///
/// Each row is a `Vec<String>` with columns matching the headers.
/// Column widths are computed from the data for alignment.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    // Compute column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    // Print header
    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{:<width$}", header, width = widths[i]);
    }
    let _ = writeln!(handle);

    // Print separator
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{}", "-".repeat(*width));
    }
    let _ = writeln!(handle);

    // Print rows
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                let _ = write!(handle, "  ");
            }
            if i < widths.len() {
                let _ = write!(handle, "{:<width$}", cell, width = widths[i]);
            } else {
                let _ = write!(handle, "{}", cell);
            }
        }
        let _ = writeln!(handle);
    }
}

/// Format a lead as a compact one-line string.
///
/// Format: `{id} [{stage}] {name} (@{handle}) - {hours}h in stage`
pub fn format_lead_compact(lead: &Lead) -> String {
    let handle_part = if lead.handle.is_empty() {
        String::new()
    } else {
        format!(" (@{})", lead.handle)
    };
    format!(
        "{} [{}] {}{} - {}h in stage",
        lead.id,
        accent(&lead.stage),
        lead.name,
        handle_part,
        lead.hours_in_stage(Utc::now()),
    )
}

/// Format a lead in detailed multi-line view, with its call history.
pub fn format_lead_detail(lead: &Lead, calls: &[Call], catalog: &StageCatalog) -> String {
    let mut lines = Vec::new();

    lines.push(format!("{} {}", bold(&lead.id), bold(&lead.name)));
    if !lead.handle.is_empty() {
        lines.push(format!("Handle: @{}", lead.handle));
    }

    let stage_name = catalog
        .get(&lead.stage)
        .map(|s| s.name.as_str())
        .unwrap_or(lead.stage.as_str());
    lines.push(format!("Stage: {} ({})", accent(&lead.stage), stage_name));
    lines.push(format!(
        "In stage since: {} ({}h)",
        lead.stage_entered_at.format("%Y-%m-%d %H:%M"),
        lead.hours_in_stage(Utc::now())
    ));

    lines.push(format!(
        "Created: {}",
        lead.created_at.format("%Y-%m-%d %H:%M")
    ));
    lines.push(format!(
        "Updated: {}",
        lead.updated_at.format("%Y-%m-%d %H:%M")
    ));

    if lead.converted {
        let client = lead.client_id.as_deref().unwrap_or("?");
        lines.push(format!("Converted: yes (client {})", client));
    }

    if !lead.notes.is_empty() {
        lines.push(String::new());
        lines.push("NOTES".to_string());
        lines.push(lead.notes.clone());
    }

    if !calls.is_empty() {
        lines.push(String::new());
        lines.push("CALLS".to_string());
        for call in calls {
            lines.push(format!(
                "  {} {} [{}]{}",
                call.id,
                call.scheduled_at.format("%Y-%m-%d %H:%M"),
                call.outcome,
                if call.notes.is_empty() {
                    String::new()
                } else {
                    format!(" {}", muted(&call.notes))
                }
            ));
        }
    }

    lines.join("\n")
}

/// Format a lead as a compact row for list output.
///
/// Returns a vector of column values suitable for [`output_table`].
pub fn format_lead_row(lead: &Lead) -> Vec<String> {
    vec![
        lead.id.clone(),
        lead.stage.clone(),
        format!("{}h", lead.hours_in_stage(Utc::now())),
        lead.name.clone(),
        lead.handle.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::call::CallOutcome;

    fn sample_lead() -> Lead {
        let mut lead = Lead::new("ld-a1b2c", "Marta Ruiz", "mensaje_conexion", Utc::now());
        lead.handle = "marta.r".into();
        lead
    }

    #[test]
    fn compact_format_basic() {
        let lead = sample_lead();
        let formatted = format_lead_compact(&lead);
        assert!(formatted.contains("ld-a1b2c"));
        assert!(formatted.contains("Marta Ruiz"));
        assert!(formatted.contains("@marta.r"));
    }

    #[test]
    fn detail_format_includes_sections() {
        let mut lead = sample_lead();
        lead.notes = "met at the meetup".into();
        let mut call = Call::for_lead("ca-1", &lead.id, Utc::now(), Utc::now());
        call.outcome = CallOutcome::Completed;

        let formatted = format_lead_detail(&lead, &[call], &StageCatalog::default());
        assert!(formatted.contains("NOTES"));
        assert!(formatted.contains("met at the meetup"));
        assert!(formatted.contains("CALLS"));
        assert!(formatted.contains("completed"));
        assert!(formatted.contains("Mensaje de conexión"));
    }

    #[test]
    fn row_format_columns() {
        let lead = sample_lead();
        let row = format_lead_row(&lead);
        assert_eq!(row[0], "ld-a1b2c");
        assert_eq!(row[1], "mensaje_conexion");
        assert_eq!(row[3], "Marta Ruiz");
    }

    #[test]
    fn table_output_smoke() {
        // Just ensure it doesn't panic
        let headers = &["ID", "STAGE", "NAME"];
        let rows = vec![
            vec!["ld-1".into(), "nuevo".into(), "Ana".into()],
            vec!["ld-2".into(), "propuesta_enviada".into(), "Luis".into()],
        ];
        output_table(headers, &rows);
    }
}
