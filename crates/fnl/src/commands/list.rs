//! `fnl list` -- list leads on the board.

use anyhow::{Result, bail};

use funnel_storage::Storage;

use crate::cli::ListArgs;
use crate::context::RuntimeContext;
use crate::output::{format_lead_row, output_json, output_table};

/// Execute the `fnl list` command.
pub fn run(ctx: &RuntimeContext, args: &ListArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let leads = match &args.stage {
        Some(stage) => {
            if !project.catalog.contains(stage) {
                bail!("unknown stage '{}'", stage);
            }
            project.store.list_leads_in_stages(&[stage.clone()])?
        }
        None => project.store.list_leads()?,
    };

    if ctx.json {
        output_json(&leads);
        return Ok(());
    }

    if leads.is_empty() {
        if !ctx.quiet {
            println!("No leads on the board.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = leads.iter().map(format_lead_row).collect();
    output_table(&["ID", "STAGE", "IN STAGE", "NAME", "HANDLE"], &rows);

    Ok(())
}
