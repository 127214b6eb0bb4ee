//! The interpreter loop.
//!
//! Features and behaviors:
//! - Memory tape of 1000 zeroed cells by default, doubling on demand to the right.
//! - Moving left from cell 0 is an error.
//! - Input `,` reads a single byte; on end of input the current cell is set to 0.
//! - Output `.` writes the raw byte of the current cell.
//! - Loops are resolved while reading: `[` pushes a bookmark of its own
//!   position and `]` seeks back to it, so the program is never compiled or
//!   indexed. A `[` on a zero cell switches to skip mode, where commands are
//!   read but not executed until the matching `]`.
//! - Any character outside the command set is a comment.
//!
//! Quick start:
//!
//! ```
//! use rewind_bf::{BrainfuckReader, SliceSource};
//!
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let mut out = Vec::new();
//! let mut bf = BrainfuckReader::new(std::io::empty(), &mut out);
//! bf.run(SliceSource::from(code)).expect("program should run");
//! drop(bf);
//! assert_eq!(out, b"Hello World!\n");
//! ```

use std::io::{self, Read, Write};

use tracing::{debug, trace};

use crate::config::{DEBUG_COMMAND, InterpreterConfig};
use crate::error::{ExecutionError, Storage, UnmatchedBracketKind};
use crate::jump_stack::{JumpStack, StackError};
use crate::source::{Bookmark, ProgramSource};
use crate::tape::{Tape, TapeError};

/// Cells shown on each side of the current cell by the debug command.
const SNAPSHOT_RADIUS: usize = 3;

/// Runs Brainfuck programs against an input source and an output sink.
///
/// Each call to [`BrainfuckReader::run`] starts with a fresh tape and an empty
/// jump stack; nothing carries over between runs except the I/O handles.
pub struct BrainfuckReader<I, O> {
    config: InterpreterConfig,
    input: I,
    output: O,
    debug_sink: Box<dyn Write>,
}

/// Tape and jump stack for one run.
#[derive(Debug)]
struct Machine {
    tape: Tape,
    jumps: JumpStack,
}

impl Machine {
    fn new(config: &InterpreterConfig) -> Result<Self, ExecutionError> {
        let tape = Tape::new(config.initial_tape_cells, config.max_tape_cells).map_err(|e| tape_error(e, 0))?;
        let jumps = JumpStack::new(config.initial_stack_depth).map_err(|e| stack_error(e, 0))?;
        Ok(Self { tape, jumps })
    }
}

impl<I: Read, O: Write> BrainfuckReader<I, O> {
    /// Create an interpreter with the default configuration.
    pub fn new(input: I, output: O) -> Self {
        Self::with_config(InterpreterConfig::default(), input, output)
    }

    pub fn with_config(config: InterpreterConfig, input: I, output: O) -> Self {
        Self {
            config,
            input,
            output,
            debug_sink: Box::new(io::stderr()),
        }
    }

    /// Send debug snapshots somewhere other than stderr.
    pub fn set_debug_sink<W: Write + 'static>(&mut self, sink: W) {
        self.debug_sink = Box::new(sink);
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Give back the input and output handles.
    pub fn into_parts(self) -> (I, O) {
        (self.input, self.output)
    }

    /// Execute the program read from `source` until it ends or fails.
    ///
    /// Returns `Ok(())` on success or the first [`ExecutionError`] met. Output
    /// written before a failure stays written.
    pub fn run<S: ProgramSource>(&mut self, mut source: S) -> Result<(), ExecutionError> {
        debug!(start = source.position().offset(), debug = self.config.debug, "run started");
        let mut machine = Machine::new(&self.config)?;
        let result = self.execute(&mut source, &mut machine);
        let flushed = self.output.flush().map_err(|e| ExecutionError::Io {
            ip: offset(source.position()),
            source: e,
        });
        match &result {
            Ok(()) => debug!(cells = machine.tape.len(), "run finished"),
            Err(e) => debug!(error = %e, "run halted"),
        }
        result.and(flushed)
    }

    fn execute<S: ProgramSource>(&mut self, source: &mut S, machine: &mut Machine) -> Result<(), ExecutionError> {
        let Machine { tape, jumps } = machine;

        loop {
            let here = source.position();
            let ip = offset(here);
            let Some(byte) = source.next_byte().map_err(|e| ExecutionError::Io { ip, source: e })? else {
                break;
            };
            let skipping = jumps.is_skipping();

            match byte {
                b'>' if !skipping => tape.move_right().map_err(|e| tape_error(e, ip))?,
                b'<' if !skipping => tape.move_left().map_err(|e| tape_error(e, ip))?,
                b'+' if !skipping => tape.increment(),
                b'-' if !skipping => tape.decrement(),
                b'.' if !skipping => tape
                    .output(&mut self.output)
                    .map_err(|e| ExecutionError::Io { ip, source: e })?,
                b',' if !skipping => tape
                    .input(&mut self.input)
                    .map_err(|e| ExecutionError::Io { ip, source: e })?,
                b'[' => {
                    // Pushed even while skipping so depth tracks nesting.
                    jumps.push(here).map_err(|e| stack_error(e, ip))?;
                    if !skipping && tape.current() == 0 {
                        trace!(ip, "skipping loop body");
                        jumps.begin_skip();
                    }
                }
                b']' => {
                    jumps.end_skip_at_top();
                    let target = jumps.pop().map_err(|e| stack_error(e, ip))?;
                    if tape.current() != 0 {
                        source
                            .seek(target)
                            .map_err(|e| ExecutionError::Io { ip, source: e })?;
                    }
                }
                DEBUG_COMMAND if self.config.debug && !skipping => {
                    write_snapshot(tape, &mut self.debug_sink).map_err(|e| ExecutionError::Io { ip, source: e })?;
                }
                _ => {}
            }
        }

        if let Some(open) = jumps.top() {
            return Err(ExecutionError::UnmatchedBrackets {
                ip: offset(open),
                kind: UnmatchedBracketKind::Open,
            });
        }
        Ok(())
    }
}

/// Print the current cell and [`SNAPSHOT_RADIUS`] cells on each side.
///
/// Reads only; cells past the allocated end print as zero and are not created.
pub fn write_snapshot<W: Write + ?Sized>(tape: &Tape, sink: &mut W) -> io::Result<()> {
    let ptr = tape.pointer();
    writeln!(sink, "tape @ {ptr} ({} cells allocated)", tape.len())?;
    for index in ptr as isize - SNAPSHOT_RADIUS as isize..=(ptr + SNAPSHOT_RADIUS) as isize {
        let marker = if index == ptr as isize { '>' } else { ' ' };
        if index < 0 {
            writeln!(sink, "{marker} [{:>6}] ---", "-")?;
            continue;
        }
        let value = tape.peek(index as usize);
        let shown = value as char;
        if shown.is_ascii_graphic() || shown == ' ' {
            writeln!(sink, "{marker} [{index:>6}] {value:>3} '{shown}'")?;
        } else {
            writeln!(sink, "{marker} [{index:>6}] {value:>3}")?;
        }
    }
    sink.flush()
}

fn offset(bookmark: Bookmark) -> usize {
    usize::try_from(bookmark.offset()).unwrap_or(usize::MAX)
}

fn tape_error(err: TapeError, ip: usize) -> ExecutionError {
    match err {
        TapeError::Alloc { requested } => ExecutionError::Alloc { storage: Storage::Tape, requested },
        TapeError::LeftBound => ExecutionError::LeftBound { ip },
    }
}

fn stack_error(err: StackError, ip: usize) -> ExecutionError {
    match err {
        StackError::Alloc { requested } => ExecutionError::Alloc { storage: Storage::JumpStack, requested },
        StackError::Empty => ExecutionError::UnmatchedBrackets {
            ip,
            kind: UnmatchedBracketKind::Close,
        },
    }
}
