//! `sd step` — manage a test case's ordered steps.

use crate::output::{OutputMode, render, render_success};
use crate::validate::parse_assignments;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::Path;
use stepdeck_core::coordinator;
use stepdeck_core::db::store;
use stepdeck_core::model::NewStep;

#[derive(Args, Debug)]
pub struct StepAddArgs {
    /// Owning test case id.
    #[arg(short, long)]
    pub case: i64,

    /// Step action, e.g. `click` or `fill`.
    #[arg(short, long)]
    pub action: String,

    /// Input data for the action.
    #[arg(short, long)]
    pub data: Option<String>,

    /// Expected outcome.
    #[arg(short, long)]
    pub expected: Option<String>,

    /// Target element selector.
    #[arg(short, long)]
    pub selector: Option<String>,

    /// Generated code payload attached to the step.
    #[arg(long)]
    pub code: Option<String>,
}

#[derive(Args, Debug)]
pub struct StepListArgs {
    /// Owning test case id.
    #[arg(short, long)]
    pub case: i64,
}

#[derive(Args, Debug)]
pub struct StepCloneArgs {
    /// Project id at the root of the ancestry chain.
    #[arg(short, long)]
    pub project: i64,

    /// Owning test case id.
    #[arg(short, long)]
    pub case: i64,

    /// Source step id.
    pub step_id: i64,
}

#[derive(Args, Debug)]
pub struct StepReorderArgs {
    /// Owning test case id.
    #[arg(short, long)]
    pub case: i64,

    /// Position assignment as repeated ID:POSITION pairs.
    #[arg(value_name = "ID:POSITION", required = true)]
    pub pairs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct StepDeleteArgs {
    /// Owning test case id.
    #[arg(short, long)]
    pub case: i64,

    /// Step ids to delete.
    #[arg(value_name = "STEP_ID", required = true)]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct StepMoveArgs {
    /// Step id to move.
    pub step_id: i64,

    /// New position (no sibling renumbering; collisions are the caller's
    /// responsibility).
    pub position: i64,
}

pub fn run_step_add(
    args: &StepAddArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    let content = NewStep {
        action: args.action.clone(),
        data: args.data.clone(),
        expected: args.expected.clone(),
        selector: args.selector.clone(),
        generated_code: args.code.clone(),
    };
    match coordinator::create_step(&mut conn, args.case, &content, &actor) {
        Ok(step) => render(output, &step, |step, w| {
            writeln!(
                w,
                "Created step {} ({}) at position {}",
                step.id, step.action, step.position
            )
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_step_list(
    args: &StepListArgs,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let conn = super::open_project_store(project_root, store_flag)?;

    let listing =
        store::get_case(&conn, args.case).and_then(|_| store::list_steps(&conn, args.case));
    match listing {
        Ok(steps) => render(output, &steps, |steps, w| {
            for step in steps {
                let flag = if step.disabled { " (disabled)" } else { "" };
                writeln!(
                    w,
                    "{:>4}  {:>6}  {}{}",
                    step.position, step.id, step.action, flag
                )?;
            }
            Ok(())
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_step_clone(
    args: &StepCloneArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::clone_step(&mut conn, args.project, args.case, args.step_id, &actor) {
        Ok(clone) => render(output, &clone, |clone, w| {
            writeln!(
                w,
                "Cloned step {} -> {} at position {}",
                args.step_id, clone.id, clone.position
            )
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_step_reorder(
    args: &StepReorderArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let assignment = parse_assignments(&args.pairs)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::reorder_steps(&mut conn, args.case, &assignment, &actor) {
        Ok(()) => render_success(
            output,
            &format!("Reordered {} steps in case {}", assignment.len(), args.case),
        ),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_step_delete(
    args: &StepDeleteArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::bulk_delete_steps(&mut conn, args.case, &args.ids, &actor) {
        Ok(deleted) => render_success(
            output,
            &format!("Deleted {deleted} steps from case {}", args.case),
        ),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_step_move(
    args: &StepMoveArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::set_step_position(&mut conn, args.step_id, args.position, &actor) {
        Ok(()) => render_success(
            output,
            &format!("Moved step {} to position {}", args.step_id, args.position),
        ),
        Err(error) => crate::output::fail(output, error),
    }
}
