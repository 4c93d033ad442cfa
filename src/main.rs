use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use gitlet::error::GitletError;
use gitlet::repo::Repository;

#[derive(Debug, Parser)]
#[command(name = "gitlet")]
#[command(about = "A local, content-addressed version control system", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new repository in the current directory
    Init,

    /// Stage a file for the next commit
    Add { file: String },

    /// Record the staged changes as a new commit
    Commit { message: String },

    /// Unstage a file, or stage a tracked file for removal
    Rm { file: String },

    /// Show the first-parent history of the current branch
    Log,

    /// Show every commit in the store
    GlobalLog,

    /// Print the ids of all commits with the given message
    Find { message: String },

    /// Show branches, staged changes, and working-tree differences
    Status,

    /// Restore a file from the head commit, or from a given commit
    Restore {
        commit_id: Option<String>,
        /// The file to restore, after `--`
        #[arg(last = true)]
        file: Vec<String>,
    },

    /// Create a branch at the current head commit
    Branch { name: String },

    /// Switch to another branch
    Switch { name: String },

    /// Delete a branch pointer
    RmBranch { name: String },

    /// Move the current branch to a commit and check it out
    Reset { commit_id: String },

    /// Merge a branch into the current one
    Merge { branch: String },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_usage_error(err),
    };

    if let Err(err) = run(cli.command) {
        // Every error is one line on stdout; the process still exits 0.
        println!("{err}");
    }
    ExitCode::SUCCESS
}

/// Maps argument-parsing failures onto the command surface's literal
/// messages. Help and version requests keep clap's own rendering.
fn report_usage_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
        }
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            println!("{}", GitletError::EmptyCommand);
        }
        ErrorKind::InvalidSubcommand => println!("{}", GitletError::UnknownCommand),
        _ => println!("{}", GitletError::IncorrectOperands),
    }
    ExitCode::SUCCESS
}

fn run(command: Commands) -> Result<()> {
    if let Commands::Init = command {
        Repository::init()?;
        return Ok(());
    }

    let repo = Repository::discover()?;
    match command {
        Commands::Init => unreachable!("handled before repository lookup"),
        Commands::Add { file } => repo.add(&file),
        Commands::Commit { message } => repo.commit(&message),
        Commands::Rm { file } => repo.rm(&file),
        Commands::Log => repo.log(),
        Commands::GlobalLog => repo.global_log(),
        Commands::Find { message } => repo.find(&message),
        Commands::Status => repo.status(),
        Commands::Restore { commit_id, file } => {
            let [file] = file.as_slice() else {
                return Err(GitletError::IncorrectOperands.into());
            };
            repo.restore(commit_id.as_deref(), file)
        }
        Commands::Branch { name } => repo.branch(&name),
        Commands::Switch { name } => repo.switch(&name),
        Commands::RmBranch { name } => repo.rm_branch(&name),
        Commands::Reset { commit_id } => repo.reset(&commit_id),
        Commands::Merge { branch } => repo.merge(&branch),
    }
}
