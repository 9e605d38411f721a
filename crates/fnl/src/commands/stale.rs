//! `fnl stale` -- leads parked unconverted in a conversion stage.
//!
//! Conversion never happens automatically, so a lead can sit in a
//! conversion-required stage forever without producing a client. This view
//! makes those leads visible past a configurable threshold.

use anyhow::Result;
use chrono::Utc;

use funnel_storage::Storage;

use crate::cli::StaleArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `fnl stale` command.
pub fn run(ctx: &RuntimeContext, args: &StaleArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let threshold_days = args.days.unwrap_or(project.config.followup.stale_after_days);
    let now = Utc::now();

    let conversion_stages: Vec<String> = project
        .catalog
        .conversion_stage_ids()
        .into_iter()
        .map(String::from)
        .collect();

    let stale: Vec<_> = project
        .store
        .list_leads_in_stages(&conversion_stages)?
        .into_iter()
        .filter(|lead| lead.hours_in_stage(now) >= threshold_days * 24)
        .collect();

    if ctx.json {
        let entries: Vec<serde_json::Value> = stale
            .iter()
            .map(|lead| {
                serde_json::json!({
                    "lead": lead,
                    "days_in_stage": lead.hours_in_stage(now) / 24,
                })
            })
            .collect();
        output_json(&entries);
        return Ok(());
    }

    if stale.is_empty() {
        if !ctx.quiet {
            println!("No stale leads (threshold: {} days).", threshold_days);
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = stale
        .iter()
        .map(|lead| {
            vec![
                lead.id.clone(),
                lead.stage.clone(),
                format!("{}d", lead.hours_in_stage(now) / 24),
                lead.name.clone(),
            ]
        })
        .collect();
    output_table(&["ID", "STAGE", "PARKED", "NAME"], &rows);
    if !ctx.quiet {
        println!();
        println!("Run `fnl convert <ID>` to create the client, or move the lead out.");
    }

    Ok(())
}
