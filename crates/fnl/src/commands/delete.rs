//! `fnl delete` -- delete a lead.

use anyhow::{Context, Result};

use funnel_storage::Storage;

use crate::cli::DeleteArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `fnl delete` command.
pub fn run(ctx: &RuntimeContext, args: &DeleteArgs) -> Result<()> {
    let project = ctx.open_project()?;

    project
        .store
        .delete_lead(&args.id)
        .with_context(|| format!("failed to delete lead '{}'", args.id))?;

    if ctx.json {
        output_json(&serde_json::json!({ "deleted": args.id }));
    } else if !ctx.quiet {
        println!("Deleted {}", args.id);
    }

    Ok(())
}
