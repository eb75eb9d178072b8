//! `sd case` — manage a project's ordered test cases.

use crate::output::{OutputMode, render, render_success};
use crate::validate::parse_assignments;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::Path;
use stepdeck_core::coordinator;
use stepdeck_core::db::store;

#[derive(Args, Debug)]
pub struct CaseAddArgs {
    /// Owning project id.
    #[arg(short, long)]
    pub project: i64,

    /// Name of the new test case.
    #[arg(short, long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct CaseListArgs {
    /// Owning project id.
    #[arg(short, long)]
    pub project: i64,
}

#[derive(Args, Debug)]
pub struct CaseCloneArgs {
    /// Owning project id.
    #[arg(short, long)]
    pub project: i64,

    /// Source test case id.
    pub case_id: i64,
}

#[derive(Args, Debug)]
pub struct CaseReorderArgs {
    /// Owning project id.
    #[arg(short, long)]
    pub project: i64,

    /// Position assignment as repeated ID:POSITION pairs.
    #[arg(value_name = "ID:POSITION", required = true)]
    pub pairs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CaseDeleteArgs {
    /// Owning project id.
    #[arg(short, long)]
    pub project: i64,

    /// Test case id to delete.
    pub case_id: i64,
}

pub fn run_case_add(
    args: &CaseAddArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::create_case(&mut conn, args.project, &args.name, &actor) {
        Ok(case) => render(output, &case, |case, w| {
            writeln!(
                w,
                "Created case {} ({}) at position {}",
                case.id, case.name, case.position
            )
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_case_list(
    args: &CaseListArgs,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let conn = super::open_project_store(project_root, store_flag)?;

    let listing = store::get_project(&conn, args.project)
        .and_then(|_| store::list_cases(&conn, args.project));
    match listing {
        Ok(cases) => render(output, &cases, |cases, w| {
            for case in cases {
                writeln!(w, "{:>4}  {:>6}  {}", case.position, case.id, case.name)?;
            }
            Ok(())
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_case_clone(
    args: &CaseCloneArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::clone_case(&mut conn, args.project, args.case_id, &actor) {
        Ok(clone) => render(output, &clone, |clone, w| {
            writeln!(
                w,
                "Cloned case {} -> {} ({}) at position {}",
                args.case_id, clone.id, clone.name, clone.position
            )
        }),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_case_reorder(
    args: &CaseReorderArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let assignment = parse_assignments(&args.pairs)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::reorder_cases(&mut conn, args.project, &assignment, &actor) {
        Ok(()) => render_success(
            output,
            &format!("Reordered {} cases in project {}", assignment.len(), args.project),
        ),
        Err(error) => crate::output::fail(output, error),
    }
}

pub fn run_case_delete(
    args: &CaseDeleteArgs,
    actor_flag: Option<&str>,
    output: OutputMode,
    store_flag: Option<&Path>,
    project_root: &Path,
) -> Result<()> {
    let actor = super::require_actor(project_root, actor_flag, output)?;
    let mut conn = super::open_project_store(project_root, store_flag)?;

    match coordinator::delete_case(&mut conn, args.project, args.case_id, &actor) {
        Ok(()) => render_success(output, &format!("Deleted case {}", args.case_id)),
        Err(error) => crate::output::fail(output, error),
    }
}

#[cfg(test)]
mod tests {
    use super::{CaseAddArgs, CaseReorderArgs};
    use clap::Parser;

    #[test]
    fn case_add_args_parse() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CaseAddArgs,
        }
        let wrapper = Wrapper::parse_from(["test", "--project", "3", "--name", "Login"]);
        assert_eq!(wrapper.args.project, 3);
        assert_eq!(wrapper.args.name, "Login");
    }

    #[test]
    fn case_reorder_requires_at_least_one_pair() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CaseReorderArgs,
        }
        assert!(Wrapper::try_parse_from(["test", "--project", "3"]).is_err());

        let wrapper = Wrapper::parse_from(["test", "--project", "3", "2:1", "1:2"]);
        assert_eq!(wrapper.args.pairs, vec!["2:1", "1:2"]);
    }
}
