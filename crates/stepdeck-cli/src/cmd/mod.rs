//! Command handlers for the `sd` binary.

pub mod case;
pub mod completions;
pub mod init;
pub mod project;
pub mod step;
pub mod version;

use crate::actor;
use crate::config;
use crate::output::{CliError, OutputMode, render_error};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub(crate) use stepdeck_core::db::open_store;

/// Open the project's store, honoring `--store` and the config override.
pub(crate) fn open_project_store(
    project_root: &Path,
    store_flag: Option<&Path>,
) -> Result<Connection> {
    let cli_config = config::load(project_root)?;
    let path = config::resolve_store_path(project_root, store_flag, &cli_config);
    open_store(&path).with_context(|| format!("open store at {}", path.display()))
}

/// Resolve the actor for a mutating command, rendering the failure in the
/// active output mode before bailing.
pub(crate) fn require_actor(
    project_root: &Path,
    actor_flag: Option<&str>,
    output: OutputMode,
) -> Result<String> {
    let cli_config = config::load(project_root)?;
    match actor::require_actor(actor_flag, cli_config.actor.default.as_deref()) {
        Ok(resolved) => Ok(resolved),
        Err(missing) => {
            render_error(
                output,
                &CliError::new(missing.code, &missing.message)
                    .with_hint("Set --actor, STEPDECK_ACTOR, or USER"),
            )?;
            anyhow::bail!("{}", missing.message);
        }
    }
}
