#![forbid(unsafe_code)]

mod actor;
mod cmd;
mod config;
mod output;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "stepdeck: ordered test-case and step manager with versioning",
    long_about = None
)]
struct Cli {
    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Actor identity recorded on mutations (skips env resolution).
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Path to the store database (overrides config).
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    fn actor_flag(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    fn store_flag(&self) -> Option<&std::path::Path> {
        self.store.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Initialize a stepdeck project",
        long_about = "Initialize a stepdeck project in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    sd init\n\n    # Emit machine-readable output\n    sd init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(about = "Manage projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    #[command(about = "Manage a project's ordered test cases")]
    Case {
        #[command(subcommand)]
        command: CaseCommand,
    },

    #[command(about = "Manage a test case's ordered steps")]
    Step {
        #[command(subcommand)]
        command: StepCommand,
    },

    #[command(about = "Snapshot test cases and browse version history")]
    Version {
        #[command(subcommand)]
        command: VersionCommand,
    },

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    sd completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    #[command(
        about = "Create a project",
        after_help = "EXAMPLES:\n    sd project add --name \"Web checkout\""
    )]
    Add(cmd::project::ProjectAddArgs),

    #[command(about = "List projects")]
    List(cmd::project::ProjectListArgs),
}

#[derive(Subcommand, Debug)]
enum CaseCommand {
    #[command(
        about = "Create a test case at the end of the project's list",
        after_help = "EXAMPLES:\n    sd case add --project 1 --name \"Login flow\""
    )]
    Add(cmd::case::CaseAddArgs),

    #[command(about = "List a project's cases in display order")]
    List(cmd::case::CaseListArgs),

    #[command(
        about = "Clone a case (and its steps) to the end of the list",
        after_help = "EXAMPLES:\n    sd case clone --project 1 4"
    )]
    Clone(cmd::case::CaseCloneArgs),

    #[command(
        about = "Apply an explicit position assignment to the project's cases",
        after_help = "EXAMPLES:\n    # Put case 3 first, then 1, then 2\n    sd case reorder --project 1 3:1 1:2 2:3"
    )]
    Reorder(cmd::case::CaseReorderArgs),

    #[command(about = "Delete a case and renumber the remaining ones")]
    Delete(cmd::case::CaseDeleteArgs),
}

#[derive(Subcommand, Debug)]
enum StepCommand {
    #[command(
        about = "Create a step at the end of the case's list",
        after_help = "EXAMPLES:\n    sd step add --case 2 --action fill --selector '#email' --data user@example.com"
    )]
    Add(cmd::step::StepAddArgs),

    #[command(about = "List a case's steps in display order")]
    List(cmd::step::StepListArgs),

    #[command(
        about = "Clone a step to the end of its case (clone is always enabled)",
        after_help = "EXAMPLES:\n    sd step clone --project 1 --case 2 14"
    )]
    Clone(cmd::step::StepCloneArgs),

    #[command(
        about = "Apply an explicit position assignment to the case's steps",
        after_help = "EXAMPLES:\n    # Swap the first two steps of case 2\n    sd step reorder --case 2 8:2 7:1"
    )]
    Reorder(cmd::step::StepReorderArgs),

    #[command(about = "Delete steps and renumber the survivors")]
    Delete(cmd::step::StepDeleteArgs),

    #[command(
        about = "Move one step without renumbering its siblings",
        long_about = "Move one step to an absolute position without renumbering its \
                      siblings. Lower-guarantee than reorder: avoiding position \
                      collisions is up to the caller."
    )]
    Move(cmd::step::StepMoveArgs),
}

#[derive(Subcommand, Debug)]
enum VersionCommand {
    #[command(
        about = "Snapshot a case and its steps as an immutable version",
        after_help = "EXAMPLES:\n    sd version create --case 2"
    )]
    Create(cmd::version::VersionCreateArgs),

    #[command(about = "List a case's versions, newest first")]
    List(cmd::version::VersionListArgs),

    #[command(
        about = "Show one version with its frozen step order",
        after_help = "EXAMPLES:\n    sd version show --case 2 17"
    )]
    Show(cmd::version::VersionShowArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STEPDECK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("stepdeck=info,warn"));

    let format = env::var("STEPDECK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();
    let project_root = std::env::current_dir()?;

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),

        Commands::Project { command } => match command {
            ProjectCommand::Add(args) => cmd::project::run_project_add(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            ProjectCommand::List(args) => {
                cmd::project::run_project_list(args, output, cli.store_flag(), &project_root)
            }
        },

        Commands::Case { command } => match command {
            CaseCommand::Add(args) => cmd::case::run_case_add(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            CaseCommand::List(args) => {
                cmd::case::run_case_list(args, output, cli.store_flag(), &project_root)
            }
            CaseCommand::Clone(args) => cmd::case::run_case_clone(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            CaseCommand::Reorder(args) => cmd::case::run_case_reorder(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            CaseCommand::Delete(args) => cmd::case::run_case_delete(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
        },

        Commands::Step { command } => match command {
            StepCommand::Add(args) => cmd::step::run_step_add(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            StepCommand::List(args) => {
                cmd::step::run_step_list(args, output, cli.store_flag(), &project_root)
            }
            StepCommand::Clone(args) => cmd::step::run_step_clone(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            StepCommand::Reorder(args) => cmd::step::run_step_reorder(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            StepCommand::Delete(args) => cmd::step::run_step_delete(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            StepCommand::Move(args) => cmd::step::run_step_move(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
        },

        Commands::Version { command } => match command {
            VersionCommand::Create(args) => cmd::version::run_version_create(
                args,
                cli.actor_flag(),
                output,
                cli.store_flag(),
                &project_root,
            ),
            VersionCommand::List(args) => {
                cmd::version::run_version_list(args, output, cli.store_flag(), &project_root)
            }
            VersionCommand::Show(args) => {
                cmd::version::run_version_show(args, output, cli.store_flag(), &project_root)
            }
        },

        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["sd", "--json", "project", "list"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["sd", "project", "list", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn default_output_is_human() {
        let cli = Cli::parse_from(["sd", "project", "list"]);
        assert!(!cli.json);
        assert!(!cli.output_mode().is_json());
    }

    #[test]
    fn actor_flag_parsed() {
        let cli = Cli::parse_from(["sd", "--actor", "qa-bot", "project", "list"]);
        assert_eq!(cli.actor_flag(), Some("qa-bot"));
    }

    #[test]
    fn store_flag_parsed() {
        let cli = Cli::parse_from(["sd", "--store", "/tmp/x.db", "project", "list"]);
        assert_eq!(
            cli.store_flag(),
            Some(std::path::Path::new("/tmp/x.db"))
        );
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["sd", "init"],
            vec!["sd", "project", "add", "--name", "x"],
            vec!["sd", "project", "list"],
            vec!["sd", "case", "add", "--project", "1", "--name", "x"],
            vec!["sd", "case", "list", "--project", "1"],
            vec!["sd", "case", "clone", "--project", "1", "2"],
            vec!["sd", "case", "reorder", "--project", "1", "2:1"],
            vec!["sd", "case", "delete", "--project", "1", "2"],
            vec!["sd", "step", "add", "--case", "1", "--action", "click"],
            vec!["sd", "step", "list", "--case", "1"],
            vec!["sd", "step", "clone", "--project", "1", "--case", "1", "2"],
            vec!["sd", "step", "reorder", "--case", "1", "2:1"],
            vec!["sd", "step", "delete", "--case", "1", "2"],
            vec!["sd", "step", "move", "2", "5"],
            vec!["sd", "version", "create", "--case", "1"],
            vec!["sd", "version", "list", "--case", "1"],
            vec!["sd", "version", "show", "--case", "1", "2"],
            vec!["sd", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?} — error: {:?}",
                args,
                result.err()
            );
        }
    }

    #[test]
    fn read_only_commands_work_without_actor() {
        let cli = Cli::parse_from(["sd", "case", "list", "--project", "1"]);
        assert!(cli.actor_flag().is_none());
    }

    #[test]
    fn mutating_commands_accept_actor_flag() {
        let cli = Cli::parse_from([
            "sd", "--actor", "me", "case", "add", "--project", "1", "--name", "t",
        ]);
        assert_eq!(cli.actor_flag(), Some("me"));

        let cli = Cli::parse_from(["sd", "--actor", "me", "step", "move", "2", "5"]);
        assert_eq!(cli.actor_flag(), Some("me"));
    }
}
