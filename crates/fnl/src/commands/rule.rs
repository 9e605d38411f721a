//! `fnl rule` -- manage follow-up rules.

use anyhow::{Context, Result, bail};
use chrono::Utc;

use funnel_core::idgen::{self, EntityKind};
use funnel_core::rule::FollowUpRule;
use funnel_storage::{RuleUpdates, Storage, StorageError};

use crate::cli::{RuleArgs, RuleCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `fnl rule` command.
pub fn run(ctx: &RuntimeContext, args: &RuleArgs) -> Result<()> {
    match &args.command {
        RuleCommands::Add(add) => {
            let project = ctx.open_project()?;

            for stage in &add.stages {
                if !project.catalog.contains(stage) {
                    bail!("unknown stage '{}'", stage);
                }
            }

            let now = Utc::now();
            let seed = format!("{}|{}", add.message, add.delay_hours);

            let mut created = None;
            for nonce in 0..5 {
                let rule = FollowUpRule {
                    id: idgen::generate_id(EntityKind::Rule, &seed, now, nonce),
                    message: add.message.clone(),
                    delay_hours: add.delay_hours,
                    active: true,
                    stages: add.stages.clone(),
                    created_at: now,
                };
                match project.store.create_rule(&rule) {
                    Ok(()) => {
                        created = Some(rule);
                        break;
                    }
                    Err(StorageError::Duplicate { .. }) => continue,
                    Err(e) => return Err(e).context("failed to create rule"),
                }
            }
            let rule = created.context("failed to generate a unique rule ID")?;

            if ctx.json {
                output_json(&rule);
            } else if !ctx.quiet {
                println!(
                    "Created {} ({}h in {}): {}",
                    rule.id,
                    rule.delay_hours,
                    rule.stages.join(", "),
                    rule.message
                );
            }
        }
        RuleCommands::List => {
            let project = ctx.open_project()?;
            let rules = project.store.list_rules()?;

            if ctx.json {
                output_json(&rules);
            } else if rules.is_empty() {
                if !ctx.quiet {
                    println!("No follow-up rules.");
                }
            } else {
                let rows: Vec<Vec<String>> = rules
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.clone(),
                            if r.active { "yes" } else { "no" }.to_string(),
                            format!("{}h", r.delay_hours),
                            r.stages.join(","),
                            r.message.clone(),
                        ]
                    })
                    .collect();
                output_table(&["ID", "ACTIVE", "DELAY", "STAGES", "MESSAGE"], &rows);
            }
        }
        RuleCommands::Enable(id_args) => set_active(ctx, &id_args.id, true)?,
        RuleCommands::Disable(id_args) => set_active(ctx, &id_args.id, false)?,
        RuleCommands::Rm(id_args) => {
            let project = ctx.open_project()?;
            project
                .store
                .delete_rule(&id_args.id)
                .with_context(|| format!("failed to delete rule '{}'", id_args.id))?;
            if ctx.json {
                output_json(&serde_json::json!({ "deleted": id_args.id }));
            } else if !ctx.quiet {
                println!("Deleted {}", id_args.id);
            }
        }
    }

    Ok(())
}

fn set_active(ctx: &RuntimeContext, rule_id: &str, active: bool) -> Result<()> {
    let project = ctx.open_project()?;
    let updates = RuleUpdates {
        active: Some(active),
        ..RuleUpdates::default()
    };
    project
        .store
        .update_rule(rule_id, &updates)
        .with_context(|| format!("failed to update rule '{}'", rule_id))?;

    if ctx.json {
        output_json(&serde_json::json!({ "id": rule_id, "active": active }));
    } else if !ctx.quiet {
        println!("{} {}", if active { "Enabled" } else { "Disabled" }, rule_id);
    }
    Ok(())
}
