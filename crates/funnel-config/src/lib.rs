//! Configuration management for the funnel tracker.
//!
//! This crate handles loading and saving `.funnel/config.yaml` files,
//! discovering `.funnel/` directories in the filesystem, and providing
//! typed access to funnel configuration values, including the pipeline
//! stage catalog.

pub mod config;
pub mod funnel_dir;

pub use config::{
    ConfigError, FollowUpConfig, FunnelConfig, StageConfig, load_config, save_config,
};
pub use funnel_dir::{ensure_funnel_dir, find_funnel_dir, find_funnel_dir_or_error};
