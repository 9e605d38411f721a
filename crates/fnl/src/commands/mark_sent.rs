//! `fnl mark-sent` -- record that a rule's message was sent to a lead.

use anyhow::{Context, Result};

use funnel_engine::{AckOutcome, FollowUpScheduler, SystemClock};

use crate::cli::MarkSentArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `fnl mark-sent` command.
pub fn run(ctx: &RuntimeContext, args: &MarkSentArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let clock = SystemClock;
    let scheduler = FollowUpScheduler::new(&project.store, &clock);
    let outcome = scheduler
        .mark_sent(&args.rule_id, &args.lead_id)
        .with_context(|| {
            format!(
                "failed to mark '{}' sent for '{}'",
                args.rule_id, args.lead_id
            )
        })?;

    if ctx.json {
        output_json(&serde_json::json!({
            "rule_id": args.rule_id,
            "lead_id": args.lead_id,
            "status": match outcome {
                AckOutcome::Acknowledged => "acknowledged",
                AckOutcome::AlreadyAcknowledged => "already_acknowledged",
            },
        }));
    } else if !ctx.quiet {
        match outcome {
            AckOutcome::Acknowledged => {
                println!("Marked {} sent for {}", args.rule_id, args.lead_id);
            }
            AckOutcome::AlreadyAcknowledged => {
                println!(
                    "Already marked sent for this stage entry ({} / {})",
                    args.rule_id, args.lead_id
                );
            }
        }
    }

    Ok(())
}
