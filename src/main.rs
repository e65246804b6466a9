mod builtins;
mod env;
mod error;
mod eval;
mod printer;
mod reader;
mod repl;
mod string_codec;
mod value;

use clap::Parser;

/// A tree-walking interpreter for Mal (Make-A-Lisp).
#[derive(Parser, Debug)]
#[command(name = "mal")]
#[command(version)]
#[command(about = "A tree-walking interpreter for Mal (Make-A-Lisp)")]
struct CliArgs {
    /// Use a plain buffered-stdin line reader instead of the interactive
    /// line editor (for deterministic testing).
    #[arg(long = "stdin")]
    stdin: bool,

    /// Source file to execute. If omitted, starts the REPL.
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Arguments bound to `*ARGV*` inside the running program.
    #[arg(value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> std::process::ExitCode {
    let cli = CliArgs::parse();
    let env = repl::root_environment();
    repl::bind_argv(&env, &cli.args);

    match cli.file {
        Some(path) => match repl::run_file(&path, &env) {
            Ok(()) => std::process::ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::ExitCode::FAILURE
            }
        },
        None => {
            if cli.stdin {
                repl::run_interactive_stdin(&env);
            } else {
                repl::run_interactive(&env);
            }
            std::process::ExitCode::SUCCESS
        }
    }
}
