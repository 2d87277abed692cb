//! Purpose: `rollcall` CLI entry point.
//! Role: Binary crate root; parses args, then hands off to the interactive session.
//! Invariants: Login failure and unrecognized roles exit 0 (session outcomes, not errors).
//! Invariants: Fatal errors map to exit codes via `core::error::to_exit_code`.
//! Invariants: Fatal errors are human text on a terminal stderr, a JSON envelope when piped.
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::aot::Shell;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use rollcall::core::error::{to_exit_code, Error};

mod shell;
mod store_paths;

#[derive(Parser)]
#[command(
    name = "rollcall",
    version,
    about = "Role-gated student roster over plain text files",
    long_about = r#"Manages a student-records file and a credentials file through one
login session. Admins get full CRUD on students and accounts; students get
read access and their own password.

Stores are newline-delimited text: `username password role` and
`roll|name|mark`. Updates and deletes rewrite the file through a sibling
temp file."#,
    after_help = r#"EXAMPLES
  $ rollcall                       # log in, then use the menu
  $ rollcall --dir ./demo shell    # keep the stores in ./demo
  $ rollcall completion zsh

NOTES
  - A missing credentials file is seeded with admin/admin and student/student.
  - Default store directory: ~/.rollcall (override with --dir)"#
)]
struct Cli {
    #[arg(
        long,
        help = "Store directory for the credential and student files (default: ~/.rollcall)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Log in and run the interactive menu session (the default)")]
    Shell,
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let dir = cli.dir.unwrap_or_else(store_paths::default_store_dir);

    let result = match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell::run(&dir),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "rollcall", &mut io::stdout());
            Ok(0)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("rollcall: error: {err}");
    } else {
        let envelope = json!({
            "error": {
                "kind": format!("{:?}", err.kind()),
                "message": err.to_string(),
            }
        });
        eprintln!("{envelope}");
    }
}
