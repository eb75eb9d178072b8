//! `sd init` — initialize a stepdeck project in the current directory.

use crate::config::{STEPDECK_DIR, STORE_FILE};
use crate::output::{OutputMode, render_success};
use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitArgs {}

pub fn run_init(_args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let stepdeck_dir = project_root.join(STEPDECK_DIR);
    std::fs::create_dir_all(&stepdeck_dir)
        .with_context(|| format!("create {}", stepdeck_dir.display()))?;

    let config_path = stepdeck_dir.join("config.toml");
    if !config_path.exists() {
        std::fs::write(
            &config_path,
            "# stepdeck project configuration\n\
             #\n\
             # [store]\n\
             # path = \".stepdeck/stepdeck.sqlite3\"\n\
             #\n\
             # [actor]\n\
             # default = \"qa-team\"\n",
        )
        .with_context(|| format!("write {}", config_path.display()))?;
    }

    // Opening the store applies the schema migrations.
    let store_path = stepdeck_dir.join(STORE_FILE);
    super::open_store(&store_path)?;

    info!(store = %store_path.display(), "initialized stepdeck project");
    render_success(output, &format!("Initialized stepdeck in {}", stepdeck_dir.display()))
}
