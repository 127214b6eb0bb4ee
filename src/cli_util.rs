use std::io::{self, IsTerminal, Write};

use crate::config::file_config;
use crate::error::{ExecutionError, Storage};

/// Pretty-print an [`ExecutionError`] with caret positioning.
/// If `program` is `Some("rbf")`, prefix messages with "rbf: ..." for CLI run mode.
pub fn print_execution_error(program: Option<&str>, code: &[u8], err: &ExecutionError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    let msg = match err {
        ExecutionError::Alloc { storage: Storage::Tape, requested } => {
            format!("Runtime error: could not grow the tape to {requested} cells")
        }
        ExecutionError::Alloc { storage: Storage::JumpStack, requested } => {
            format!("Runtime error: could not grow the jump stack to {requested} entries")
        }
        ExecutionError::LeftBound { .. } => "Runtime error: the program went past the start of the tape".to_string(),
        ExecutionError::UnmatchedBrackets { kind, .. } => format!("Parse error: unmatched bracket {kind}"),
        ExecutionError::Io { source, .. } => format!("I/O error: {source}"),
    };
    let msg = prefix_program(&msg);

    match err.ip() {
        Some(ip) => print_error_with_context(&msg, code, ip),
        None => {
            eprintln!("{}", styled(&msg));
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction offset and a caret context window.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    eprintln!("{} at instruction {pos}", styled(prefix));
    let (window, caret) = context_window(code, pos);
    eprintln!("  {window}");
    eprintln!("  {caret}");
    let _ = io::stderr().flush();
}

/// Short slice of `code` around byte offset `pos` on one line, and a caret line beneath it.
fn context_window(code: &[u8], pos: usize) -> (String, String) {
    const WINDOW: usize = 32;

    let pos = pos.min(code.len());
    let start = pos.saturating_sub(WINDOW);
    let end = (pos + WINDOW + 1).min(code.len());

    // Non-printing bytes would shift the caret, so show them as spaces.
    let window: String = code[start..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { ' ' })
        .collect();

    let mut caret = " ".repeat(pos - start);
    caret.push('^');
    (window.trim_end().to_string(), caret)
}

fn styled(msg: &str) -> String {
    if io::stderr().is_terminal() {
        file_config().colors.error.bold().paint(msg).to_string()
    } else {
        msg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_sits_under_position() {
        let (window, caret) = context_window(b"++\n+<", 4);
        assert_eq!(window, "++ +<");
        assert_eq!(caret, "    ^");
    }

    #[test]
    fn window_is_clamped_around_long_programs() {
        let code = "+".repeat(100);
        let (window, caret) = context_window(code.as_bytes(), 60);
        assert_eq!(window.len(), 65);
        assert_eq!(caret.len(), 33);
    }

    #[test]
    fn position_at_end_of_code_is_clamped() {
        let (window, caret) = context_window(b"[", 1);
        assert_eq!(window, "[");
        assert_eq!(caret, " ^");
    }
}
