//! `fnl board` -- show the board grouped by stage, in catalog order.

use anyhow::Result;

use funnel_storage::Storage;

use crate::context::RuntimeContext;
use crate::output::{bold, format_lead_compact, output_json};

/// Execute the `fnl board` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let project = ctx.open_project()?;

    let leads = project.store.list_leads()?;

    if ctx.json {
        let columns: Vec<serde_json::Value> = project
            .catalog
            .stages()
            .iter()
            .map(|stage| {
                let in_stage: Vec<_> = leads.iter().filter(|l| l.stage == stage.id).collect();
                serde_json::json!({
                    "stage": stage.id,
                    "name": stage.name,
                    "count": in_stage.len(),
                    "leads": in_stage,
                })
            })
            .collect();
        output_json(&columns);
        return Ok(());
    }

    for stage in project.catalog.stages() {
        let in_stage: Vec<_> = leads.iter().filter(|l| l.stage == stage.id).collect();
        println!("{} ({})", bold(&stage.name), in_stage.len());
        for lead in in_stage {
            println!("  {}", format_lead_compact(lead));
        }
    }

    // Leads in stages no longer present in the catalog still exist; keep
    // them visible instead of silently dropping them from the board.
    let orphaned: Vec<_> = leads
        .iter()
        .filter(|l| !project.catalog.contains(&l.stage))
        .collect();
    if !orphaned.is_empty() {
        println!("{} ({})", bold("(unknown stage)"), orphaned.len());
        for lead in orphaned {
            println!("  {}", format_lead_compact(lead));
        }
    }

    Ok(())
}
