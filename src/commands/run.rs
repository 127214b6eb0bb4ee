use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};

use clap::Args;
use rewind_bf::cli_util::print_execution_error;
use rewind_bf::config::file_config;
use rewind_bf::{BrainfuckReader, ExecutionError, InterpreterConfig, SliceSource, StreamSource};
use tracing::debug;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Enable the `#` command, which prints the cells around the pointer to stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// Feed `,` from PATH instead of stdin
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<String>,

    /// Write `.` output to PATH instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<String>,

    /// Refuse to grow the tape beyond N cells (fallback RBF_MAX_TAPE_CELLS; default unlimited)
    #[arg(long = "max-tape-cells", value_name = "N")]
    pub max_tape_cells: Option<usize>,

    /// Concatenated Brainfuck code parts; may start with `-`
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        input,
        output,
        max_tape_cells,
        code,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    // Resolve configuration: flags -> env -> config file -> defaults
    let mut config: InterpreterConfig = file_config().interpreter.clone().apply_env();
    if debug {
        config.debug = true;
    }
    if max_tape_cells.is_some() {
        config.max_tape_cells = max_tape_cells.filter(|&n| n > 0);
    }

    let input: Box<dyn Read> = match input {
        Some(path) => match File::open(&path) {
            Ok(f) => Box::new(io::BufReader::new(f)),
            Err(e) => return fail(program, &format!("failed to open input file {path}: {e}")),
        },
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match output {
        Some(path) => match File::create(&path) {
            Ok(f) => Box::new(BufWriter::new(f)),
            Err(e) => return fail(program, &format!("failed to create output file {path}: {e}")),
        },
        None => Box::new(io::stdout().lock()),
    };

    let mut bf = BrainfuckReader::with_config(config, input, output);
    debug!(config = ?bf.config(), "resolved interpreter config");

    let result = match &file {
        Some(path) => {
            let source = match File::open(path).and_then(StreamSource::new) {
                Ok(s) => s,
                Err(e) => return fail(program, &format!("failed to read code file: {e}")),
            };
            bf.run(source)
        }
        None => bf.run(SliceSource::from(code.join("").as_str())),
    };
    drop(bf);

    match result {
        Ok(()) => 0,
        Err(err) => {
            report(program, file.as_deref(), &code.join(""), &err);
            1
        }
    }
}

/// Print `err` with the program text around the failing instruction.
fn report(program: &str, file: Option<&str>, inline: &str, err: &ExecutionError) {
    // The file is only read back for context once something went wrong.
    let text = match file {
        Some(path) => fs::read(path).unwrap_or_default(),
        None => inline.as_bytes().to_vec(),
    };
    print_execution_error(Some(program), &text, err);
}

fn fail(program: &str, msg: &str) -> i32 {
    eprintln!("{program}: {msg}");
    let _ = io::stderr().flush();
    1
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,   -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --input,  -i <PATH>  Feed `,` from PATH instead of stdin
  --output, -o <PATH>  Write `.` output to PATH instead of stdout
  --debug,  -d         Enable the `#` command (prints the cells around the pointer to stderr)
  --max-tape-cells <N> Refuse to grow the tape beyond N cells
  --help,   -h         Show this help

Notes:
- Input (`,`) reads a single byte; on EOF the current cell is set to 0.
- Characters outside of Brainfuck's ><+-.,[] are comments and are ignored.
- The tape starts with 1000 cells and grows to the right as needed;
  moving left of the first cell is an error.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
