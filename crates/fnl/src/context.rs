//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds all the state a command handler needs:
//! resolved database path, actor name, and global flags. [`Project`] is the
//! opened form -- store, config, and stage catalog together.

use std::env;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};

use funnel_config::{FunnelConfig, find_funnel_dir, load_config};
use funnel_core::stage::StageCatalog;
use funnel_storage::SqliteStore;

use crate::cli::GlobalArgs;

/// Name of the database file inside `.funnel/`.
pub const DB_FILE_NAME: &str = "funnel.db";

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Explicit database file path from `--db`, if given.
    pub db_path: Option<PathBuf>,

    /// Actor name for audit trail.
    pub actor: String,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

/// An opened funnel project: store plus configuration.
pub struct Project {
    pub store: SqliteStore,
    pub config: FunnelConfig,
    pub catalog: StageCatalog,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// Resolves the actor name with the priority chain:
    /// `--actor` flag > `FNL_ACTOR` env > `git config user.name` > `$USER` > `"unknown"`.
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        let actor = resolve_actor(global.actor.as_deref());

        let db_path = global.db.as_ref().map(PathBuf::from);

        Self {
            db_path,
            actor,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// Open the project: locate `.funnel/`, load config, open the database.
    ///
    /// With `--db` the database file is used directly and the config is
    /// loaded from its parent directory when that happens to be a
    /// `.funnel/` directory.
    pub fn open_project(&self) -> Result<Project> {
        let (db_path, funnel_dir) = match &self.db_path {
            Some(p) => (p.clone(), p.parent().map(PathBuf::from)),
            None => {
                let cwd = env::current_dir().context("failed to get current directory")?;
                let dir = find_funnel_dir(&cwd)
                    .context("no funnel project found. Run 'fnl init' to create one.")?;
                (dir.join(DB_FILE_NAME), Some(dir))
            }
        };

        if !db_path.exists() {
            bail!(
                "no funnel database found at {}\nHint: run 'fnl init' to create one",
                db_path.display()
            );
        }

        let config = match funnel_dir {
            Some(ref dir) => load_config(dir).context("failed to load config")?,
            None => FunnelConfig::default(),
        };
        let catalog = config.stage_catalog().context("invalid stage catalog")?;

        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("failed to open database: {}", db_path.display()))?;

        Ok(Project {
            store,
            config,
            catalog,
        })
    }
}

/// Resolves the actor name using the priority chain.
///
/// Priority: explicit flag > FNL_ACTOR env > git config user.name > USER env > "unknown".
fn resolve_actor(flag_value: Option<&str>) -> String {
    // 1. Explicit flag value
    if let Some(actor) = flag_value {
        if !actor.is_empty() {
            return actor.to_string();
        }
    }

    // 2. FNL_ACTOR env
    if let Ok(actor) = env::var("FNL_ACTOR") {
        if !actor.is_empty() {
            return actor;
        }
    }

    // 3. git config user.name
    if let Ok(output) = Command::new("git").args(["config", "user.name"]).output() {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    // 4. USER env (Unix) or USERNAME env (Windows)
    if let Ok(user) = env::var("USER").or_else(|_| env::var("USERNAME")) {
        if !user.is_empty() {
            return user;
        }
    }

    // 5. Fallback
    "unknown".to_string()
}
