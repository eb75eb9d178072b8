//! `sd version` — snapshot a test case and browse its history.

use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use stepdeck_core::model::{CaseVersion, StepVersion};
use stepdeck_core::version;

#[derive(Args, Debug)]
pub struct VersionCreateArgs {
    /// Test case id to snapshot.
    #[arg(short, long)]
    pub case: i64,
}

#[derive(Args, Debug)]
pub struct VersionListArgs {
    /// Owning test case id.
    #[arg(short, long)]
    pub case: i64,
}

#[derive(Args, Debug)]
pub struct VersionShowArgs {
    /// Owning test case id (versions of other cases are not visible).
    #[arg(short, long)]
    pub case: i64,

    /// Version id to retrieve.
    pub version_id: i64,
}

/// JSON shape for a version plus its frozen steps.
#[derive(Debug, Serialize)]
struct VersionWithSteps {
    #[serde(flatten)]
    version: CaseVersion,
    steps: Vec<StepVersion>,
}

fn render_version(output: OutputMode, version: CaseVersion, steps: Vec<StepVersion>) -> Result<()> {
    let payload = VersionWithSteps { version, steps };
    render(output, &payload, |payload, w| {
        writeln!(
            w,
            "Version {} of case {} ({}) — {} steps",
            payload.version.id,
            payload.version.case_id,
            payload.version.name,
            payload.steps.len()
        )?;
        for step in &payload.steps {
            let flag = if step.disabled { " (disabled)" } else { "" };
            writeln!(w, "{:>4}  {}{}", step.position, step.action, flag)?;
        }
        Ok(())
    })
}

pub fn run_version_create(
    args: &VersionCreateArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match version::create_version(&mut conn, args.case, &actor) {
        Ok((snapshot, steps)) => render_version(output, snapshot, steps),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_version_list(
    args: &VersionListArgs,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let conn = super::open_project_store(project_root, store_flag)?;

    match version::list_versions(&conn, args.case) {
        Ok(versions) => render(output, &versions, |versions, w| {
            for entry in versions {
                writeln!(
                    w,
                    "{:>6}  {}  by {} at {}us",
                    entry.id, entry.name, entry.created_by, entry.created_at_us
                )?;
            }
            Ok(())
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_version_show(
    args: &VersionShowArgs,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let conn = super::open_project_store(project_root, store_flag)?;

    match version::get_version(&conn, args.case, args.version_id) {
        Ok((snapshot, steps)) => render_version(output, snapshot, steps),
        Err(error) => crate::output::fail(output, error),
    }
}
