//! `fnl init` -- initialize a funnel project in the current directory.

use std::env;
use std::fs;

use anyhow::{Context, Result, bail};

use funnel_config::{FunnelConfig, save_config};
use funnel_storage::{SqliteStore, Storage};

use crate::cli::InitArgs;
use crate::context::{DB_FILE_NAME, RuntimeContext};
use crate::output::output_json;

/// Default gitignore content for the `.funnel` directory.
const GITIGNORE_CONTENT: &str = "# Funnel database files
*.db
*.db-journal
*.db-wal
*.db-shm
";

/// Execute the `fnl init` command.
pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;

    let funnel_dir = cwd.join(".funnel");
    let db_path = funnel_dir.join(DB_FILE_NAME);

    // Safety guard: check for existing data unless --force
    if !args.force && db_path.exists() {
        bail!(
            "Found existing database at {}\n\n\
            This workspace is already initialized.\n\n\
            To use the existing database:\n  \
            Just run fnl commands normally (e.g., fnl board)\n\n\
            Or use --force to re-initialize.",
            db_path.display()
        );
    }

    fs::create_dir_all(&funnel_dir)
        .with_context(|| format!("failed to create directory: {}", funnel_dir.display()))?;

    // Create .gitignore
    let gitignore_path = funnel_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE_CONTENT).with_context(|| {
            format!("failed to create .gitignore: {}", gitignore_path.display())
        })?;
    }

    // Write the default config so the stage catalog is visible and editable.
    let config_path = funnel_dir.join("config.yaml");
    if !config_path.exists() {
        let mut config = FunnelConfig::default();
        if ctx.actor != "unknown" {
            config.actor = Some(ctx.actor.clone());
        }
        save_config(&funnel_dir, &config).context("failed to write default config")?;
    }

    // Opening the store creates the schema.
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to create database: {}", db_path.display()))?;
    store.set_config("init_actor", &ctx.actor)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "database": db_path.display().to_string(),
            "config": config_path.display().to_string(),
        }));
    } else if !ctx.quiet {
        println!();
        println!("funnel initialized successfully!");
        println!();
        println!("  Database: {}", db_path.display());
        println!("  Config:   {}", config_path.display());
        println!();
        println!("Run `fnl create \"Lead name\"` to add your first lead.");
        println!();
    }

    Ok(())
}
