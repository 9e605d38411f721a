//! `fnl move` -- move a lead to another stage via the transition engine.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use funnel_engine::{SystemClock, TransitionEngine, TransitionOutcome};

use crate::cli::MoveArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, warn_style};

/// Execute the `fnl move` command.
pub fn run(ctx: &RuntimeContext, args: &MoveArgs) -> Result<()> {
    let project = ctx.open_project()?;

    let call_at = args
        .call_at
        .as_deref()
        .map(parse_rfc3339)
        .transpose()
        .context("invalid --call-at value")?;

    let clock = SystemClock;
    let engine = TransitionEngine::new(&project.store, &project.catalog, &clock);

    let outcome = engine
        .transition(&args.id, &args.stage, call_at)
        .with_context(|| format!("failed to move '{}' to '{}'", args.id, args.stage))?;

    match outcome {
        TransitionOutcome::Committed => {
            if ctx.json {
                output_json(&serde_json::json!({
                    "status": "committed",
                    "lead_id": args.id,
                    "stage": args.stage,
                }));
            } else if !ctx.quiet {
                println!("Moved {} to {}", args.id, args.stage);
            }
        }
        TransitionOutcome::PendingConversion(snapshot) => {
            if ctx.json {
                output_json(&serde_json::json!({
                    "status": "pending_conversion",
                    "lead": snapshot,
                }));
            } else if !ctx.quiet {
                println!("Moved {} to {}", args.id, args.stage);
                println!(
                    "{}",
                    warn_style(&format!(
                        "Conversion pending: run `fnl convert {}` to create the client.",
                        snapshot.id
                    ))
                );
            }
        }
    }

    Ok(())
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("'{}' is not a valid RFC 3339 timestamp", s))
}
