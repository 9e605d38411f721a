//! `fnl convert` -- convert a lead into a client.

use anyhow::{Context, Result};

use funnel_core::client::ClientFields;
use funnel_engine::{ConversionWorkflow, SystemClock};

use crate::cli::ConvertArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `fnl convert` command.
pub fn run(ctx: &RuntimeContext, args: &ConvertArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let fields = ClientFields {
        name: args.name.clone().unwrap_or_default(),
        email: args.email.clone().unwrap_or_default(),
        phone: args.phone.clone().unwrap_or_default(),
    };

    let clock = SystemClock;
    let workflow = ConversionWorkflow::new(&project.store, &clock);
    let client = workflow
        .convert(&args.lead_id, &fields)
        .with_context(|| format!("failed to convert '{}'", args.lead_id))?;

    if ctx.json {
        output_json(&client);
    } else if !ctx.quiet {
        println!("Converted {} into client {} ({})", args.lead_id, client.id, client.name);
    }

    Ok(())
}
