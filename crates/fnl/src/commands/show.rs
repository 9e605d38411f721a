//! `fnl show` -- show lead details with call history.

use anyhow::{Context, Result};

use funnel_storage::Storage;

use crate::cli::ShowArgs;
use crate::context::RuntimeContext;
use crate::output::{format_lead_detail, output_json};

/// Execute the `fnl show` command.
pub fn run(ctx: &RuntimeContext, args: &ShowArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let lead = project
        .store
        .get_lead(&args.id)
        .with_context(|| format!("lead '{}' not found", args.id))?;
    let calls = project.store.list_calls_for_lead(&lead.id)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "lead": lead,
            "calls": calls,
        }));
    } else {
        println!("{}", format_lead_detail(&lead, &calls, &project.catalog));
    }

    Ok(())
}
