//! `sd project` — create and list projects.

use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::Path;
use stepdeck_core::coordinator;
use stepdeck_core::db::store;

#[derive(Args, Debug)]
pub struct ProjectAddArgs {
    /// Name of the new project.
    #[arg(short, long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ProjectListArgs {}

pub fn run_project_add(
    args: &ProjectAddArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::create_project(&mut conn, &args.name, &actor) {
        Ok(project) => render(output, &project, |project, w| {
            writeln!(w, "Created project {} ({})", project.id, project.name)
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_project_list(
    _args: &ProjectListArgs,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let conn = super::open_project_store(project_root, store_flag)?;

    match store::list_projects(&conn) {
        Ok(projects) => render(output, &projects, |projects, w| {
            for project in projects {
                writeln!(w, "{:>6}  {}", project.id, project.name)?;
            }
            Ok(())
        }),
        Err(error) => crate::output::fail(output, error),
    }
}
