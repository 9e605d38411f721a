//! `fnl due` -- show follow-ups currently due.

use anyhow::{Context, Result};
use chrono::Utc;

use funnel_engine::{FollowUpScheduler, SystemClock};

use crate::cli::DueArgs;
use crate::commands::move_cmd::parse_rfc3339;
use crate::context::RuntimeContext;
use crate::output::{bold, output_json};

/// Execute the `fnl due` command.
pub fn run(ctx: &RuntimeContext, args: &DueArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let now = match &args.at {
        Some(s) => parse_rfc3339(s).context("invalid --at value")?,
        None => Utc::now(),
    };

    let clock = SystemClock;
    let scheduler = FollowUpScheduler::new(&project.store, &clock);
    let due = scheduler.due_followups(now)?;

    if ctx.json {
        let entries: Vec<serde_json::Value> = due
            .iter()
            .map(|rd| {
                serde_json::json!({
                    "rule_id": rd.rule.id,
                    "message": rd.rule.message,
                    "delay_hours": rd.rule.delay_hours,
                    "leads": rd.leads.iter().map(|l| serde_json::json!({
                        "lead_id": l.lead_id,
                        "display_name": l.display_name,
                        "elapsed_hours": l.elapsed_hours,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        output_json(&entries);
        return Ok(());
    }

    if due.is_empty() {
        if !ctx.quiet {
            println!("Nothing due.");
        }
        return Ok(());
    }

    for rule_due in &due {
        println!(
            "{} ({}h): {}",
            bold(&rule_due.rule.id),
            rule_due.rule.delay_hours,
            rule_due.rule.message
        );
        for lead in &rule_due.leads {
            println!(
                "  {} {} - {}h in stage  (fnl mark-sent {} {})",
                lead.lead_id, lead.display_name, lead.elapsed_hours, rule_due.rule.id, lead.lead_id
            );
        }
    }

    Ok(())
}
