//! `fnl create` -- create a new lead.

use anyhow::{Context, Result, bail};
use chrono::Utc;

use funnel_core::idgen::{self, EntityKind};
use funnel_core::lead::Lead;
use funnel_storage::{Storage, StorageError};

use crate::cli::CreateArgs;
use crate::context::RuntimeContext;
use crate::output::{format_lead_compact, output_json};

/// Execute the `fnl create` command.
pub fn run(ctx: &RuntimeContext, args: &CreateArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let stage = match &args.stage {
        Some(s) => {
            if !project.catalog.contains(s) {
                bail!("unknown stage '{}'", s);
            }
            s.clone()
        }
        None => project
            .catalog
            .entry_stage()
            .context("stage catalog is empty")?
            .to_string(),
    };

    let now = Utc::now();
    let seed = format!("{}|{}", args.name, args.handle.as_deref().unwrap_or(""));

    // Try a few nonces to dodge hash collisions.
    let mut lead = None;
    for nonce in 0..5 {
        let id = idgen::generate_id(EntityKind::Lead, &seed, now, nonce);
        let mut candidate = Lead::new(id, args.name.clone(), stage.clone(), now);
        candidate.handle = args.handle.clone().unwrap_or_default();
        candidate.notes = args.notes.clone().unwrap_or_default();

        match project.store.create_lead(&candidate) {
            Ok(()) => {
                lead = Some(candidate);
                break;
            }
            Err(StorageError::Duplicate { .. }) => continue,
            Err(e) => return Err(e).context("failed to create lead"),
        }
    }
    let lead = lead.context("failed to generate a unique lead ID")?;

    if ctx.json {
        output_json(&lead);
    } else if !ctx.quiet {
        println!("Created {}", format_lead_compact(&lead));
    }

    Ok(())
}
