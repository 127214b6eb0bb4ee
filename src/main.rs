mod commands;

use std::env;
use std::io::{self, Write};

use clap::{Parser, Subcommand};
use commands::repl::ReplArgs;
use commands::run::RunArgs;
use rewind_bf::logging::init_logging;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [--debug|-d] "<code>"      # Run Brainfuck code (args are concatenated)
  {0} run  [--debug|-d] --file <PATH> # Run Brainfuck code streamed from a file
  {0} repl [--bare|--editor]          # Start a Brainfuck REPL (read-eval-print loop)

Global options:
  --verbose, -v   Log interpreter diagnostics to stderr (RUST_LOG overrides)

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "rbf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Log interpreter diagnostics to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Repl(ReplArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("rbf"));

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => commands::run::run(&program, args),
        Command::Repl(args) => commands::repl::run(&program, args),
    };

    let _ = io::stdout().flush();
    std::process::exit(code);
}
