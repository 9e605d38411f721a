//! Clap CLI definitions for the `fnl` command.
//!
//! This module defines the complete CLI structure using clap 4 derive macros.

use clap::{Args, Parser, Subcommand};

/// fnl -- Pipeline lead tracker.
///
/// Leads move through a staged funnel board; stage changes run their
/// required workflows (calls, conversion) and follow-up rules fire on
/// leads that sit too long in one place.
#[derive(Parser, Debug)]
#[command(
    name = "fnl",
    about = "Pipeline lead tracker",
    long_about = "Leads move through a staged funnel board. Stage changes run their required workflows (calls, conversion) and follow-up rules fire on leads that sit too long in one place.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Database path (default: auto-discover .funnel/funnel.db).
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Actor name for audit trail (default: $FNL_ACTOR, git user.name, $USER).
    #[arg(long, global = true, env = "FNL_ACTOR")]
    pub actor: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // ===== Setup =====
    /// Initialize a funnel project in the current directory.
    Init(InitArgs),

    // ===== Working with leads =====
    /// Create a new lead.
    #[command(alias = "new")]
    Create(CreateArgs),

    /// Show lead details with its call history.
    #[command(alias = "view")]
    Show(ShowArgs),

    /// List leads on the board.
    List(ListArgs),

    /// Show the board grouped by stage.
    Board,

    /// Move a lead to another stage.
    #[command(name = "move")]
    MoveCmd(MoveArgs),

    /// Delete a lead.
    Delete(DeleteArgs),

    // ===== Workflows =====
    /// Manage calls for a lead.
    Call(CallArgs),

    /// Convert a lead into a client.
    Convert(ConvertArgs),

    // ===== Follow-ups =====
    /// Manage follow-up rules.
    Rule(RuleArgs),

    /// Show follow-ups currently due.
    Due(DueArgs),

    /// Record that a rule's message was sent to a lead.
    #[command(name = "mark-sent")]
    MarkSent(MarkSentArgs),

    /// Show leads parked in a conversion stage without converting.
    Stale(StaleArgs),

    // ===== Misc =====
    /// Print version information.
    Version,
}

/// Arguments for `fnl init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Re-initialize even if a database already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `fnl create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Display name of the lead.
    pub name: String,

    /// Social handle or other contact reference.
    #[arg(long)]
    pub handle: Option<String>,

    /// Free-form notes.
    #[arg(long)]
    pub notes: Option<String>,

    /// Initial stage (default: the first catalog stage).
    #[arg(long)]
    pub stage: Option<String>,
}

/// Arguments for `fnl show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Lead ID.
    pub id: String,
}

/// Arguments for `fnl list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show leads in this stage.
    #[arg(long)]
    pub stage: Option<String>,
}

/// Arguments for `fnl move`.
#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Lead ID.
    pub id: String,

    /// Target stage identifier.
    pub stage: String,

    /// Scheduled call time (RFC 3339), required when the target stage
    /// requires a call.
    #[arg(long)]
    pub call_at: Option<String>,
}

/// Arguments for `fnl delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Lead ID.
    pub id: String,
}

/// Arguments for `fnl call`.
#[derive(Args, Debug)]
pub struct CallArgs {
    #[command(subcommand)]
    pub command: CallCommands,
}

/// Subcommands of `fnl call`.
#[derive(Subcommand, Debug)]
pub enum CallCommands {
    /// Schedule a call for a lead.
    Add(CallAddArgs),

    /// List calls for a lead, most recent first.
    List(CallListArgs),
}

/// Arguments for `fnl call add`.
#[derive(Args, Debug)]
pub struct CallAddArgs {
    /// Lead ID.
    pub lead_id: String,

    /// Scheduled time (RFC 3339).
    #[arg(long)]
    pub at: String,

    /// Notes for the call.
    #[arg(long)]
    pub notes: Option<String>,
}

/// Arguments for `fnl call list`.
#[derive(Args, Debug)]
pub struct CallListArgs {
    /// Lead ID.
    pub lead_id: String,
}

/// Arguments for `fnl convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Lead ID.
    pub lead_id: String,

    /// Client name (default: the lead's name).
    #[arg(long)]
    pub name: Option<String>,

    /// Client email.
    #[arg(long)]
    pub email: Option<String>,

    /// Client phone.
    #[arg(long)]
    pub phone: Option<String>,
}

/// Arguments for `fnl rule`.
#[derive(Args, Debug)]
pub struct RuleArgs {
    #[command(subcommand)]
    pub command: RuleCommands,
}

/// Subcommands of `fnl rule`.
#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// Create a follow-up rule.
    Add(RuleAddArgs),

    /// List all follow-up rules.
    List,

    /// Activate a rule.
    Enable(RuleIdArgs),

    /// Deactivate a rule without deleting it.
    Disable(RuleIdArgs),

    /// Delete a rule.
    Rm(RuleIdArgs),
}

/// Arguments for `fnl rule add`.
#[derive(Args, Debug)]
pub struct RuleAddArgs {
    /// Message shown to the operator when the rule fires.
    pub message: String,

    /// Hours a lead must sit in an applicable stage before the rule fires.
    #[arg(long)]
    pub delay_hours: i64,

    /// Stage this rule applies to (repeatable).
    #[arg(long = "stage", required = true)]
    pub stages: Vec<String>,
}

/// Rule-ID-only arguments (`enable`, `disable`, `rm`).
#[derive(Args, Debug)]
pub struct RuleIdArgs {
    /// Rule ID.
    pub id: String,
}

/// Arguments for `fnl due`.
#[derive(Args, Debug)]
pub struct DueArgs {
    /// Evaluate dueness as of this time (RFC 3339) instead of now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for `fnl mark-sent`.
#[derive(Args, Debug)]
pub struct MarkSentArgs {
    /// Rule ID.
    pub rule_id: String,

    /// Lead ID.
    pub lead_id: String,
}

/// Arguments for `fnl stale`.
#[derive(Args, Debug)]
pub struct StaleArgs {
    /// Days a lead must sit unconverted in a conversion stage
    /// (default: followup.stale-after-days from config).
    #[arg(long)]
    pub days: Option<i64>,
}
