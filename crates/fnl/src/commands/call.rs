//! `fnl call` -- schedule and list calls for a lead.

use anyhow::{Context, Result};

use funnel_engine::{CallWorkflow, SystemClock};
use funnel_storage::Storage;

use crate::cli::{CallArgs, CallCommands};
use crate::commands::move_cmd::parse_rfc3339;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `fnl call` command.
pub fn run(ctx: &RuntimeContext, args: &CallArgs) -> Result<()> {
    match &args.command {
        CallCommands::Add(add) => {
            let project = ctx.open_project()?;
            let at = parse_rfc3339(&add.at).context("invalid --at value")?;

            let clock = SystemClock;
            let workflow = CallWorkflow::new(&project.store, &clock);
            let call = workflow
                .create_call_with_notes(&add.lead_id, at, add.notes.as_deref().unwrap_or(""))
                .with_context(|| format!("failed to schedule call for '{}'", add.lead_id))?;

            if ctx.json {
                output_json(&call);
            } else if !ctx.quiet {
                println!(
                    "Scheduled {} for {} at {}",
                    call.id,
                    add.lead_id,
                    call.scheduled_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        CallCommands::List(list) => {
            let project = ctx.open_project()?;
            // Validate the lead exists so a typo'd ID is an error, not an
            // empty list.
            project
                .store
                .get_lead(&list.lead_id)
                .with_context(|| format!("lead '{}' not found", list.lead_id))?;
            let calls = project.store.list_calls_for_lead(&list.lead_id)?;

            if ctx.json {
                output_json(&calls);
            } else if calls.is_empty() {
                if !ctx.quiet {
                    println!("No calls for {}.", list.lead_id);
                }
            } else {
                let rows: Vec<Vec<String>> = calls
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.clone(),
                            c.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
                            c.outcome.to_string(),
                            c.notes.clone(),
                        ]
                    })
                    .collect();
                output_table(&["ID", "SCHEDULED", "OUTCOME", "NOTES"], &rows);
            }
        }
    }

    Ok(())
}
