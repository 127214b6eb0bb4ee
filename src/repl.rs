use std::env;
use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Style;
use reedline::{DefaultPrompt, DefaultPromptSegment, Highlighter, HistoryItem, Signal, StyledText};
use tracing::debug;

use crate::config::{Colors, InterpreterConfig, file_config};
use crate::{BrainfuckReader, SliceSource, bf_only, cli_util};

pub fn repl_loop(config: &InterpreterConfig) -> io::Result<()> {
    let mut editor = init_line_editor()?;

    loop {
        let Some(submission) = read_submission_interactive(&mut editor)? else {
            // EOF or editor closed. End the session cleanly to avoid hanging when stdin is closed
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        execute_submission(&submission, config);

        // Test hook: if RBF_REPL_ONCE=1, exit after one execution
        if env::var("RBF_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{
        EditCommand, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent, default_emacs_keybindings,
    };

    // Enter inserts a newline; Ctrl+D (or Ctrl+Z on Windows) submits the buffer.
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Edit(vec![EditCommand::InsertNewline]));
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('z'), ReedlineEvent::Submit);

    // Up/down move within the current multiline buffer; Alt/Ctrl+Up/Down browse history.
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Down, ReedlineEvent::NextHistory);

    let history = reedline::FileBackedHistory::new(1_000).map_err(|e| io::Error::other(e.to_string()))?;

    let editor = Reedline::create()
        .with_highlighter(Box::new(BrainfuckHighlighter::new(&file_config().colors)))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    Ok(editor)
}

/// Collect everything up to EOF as one submission; `None` if there was nothing.
pub fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => buffer.push_str(&line),
            Err(_) => return None,
        }
    }

    if buffer.is_empty() { None } else { Some(buffer) }
}

fn read_submission_interactive(editor: &mut reedline::Reedline) -> io::Result<Option<String>> {
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic("rbf".to_string()), DefaultPromptSegment::Empty);

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            // One history item per submitted program
            if !buffer.trim().is_empty() {
                let _ = editor.history_mut().save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => Ok(None),
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

/// Executes a single Brainfuck program contained in `submission`.
/// - Program output goes to stdout.
/// - Errors are printed concisely to stderr.
/// - A newline is always written to stdout after execution (success or error)
///   so that the prompt begins at column 0 on the next iteration.
///
/// Submissions without a single command are skipped.
pub fn execute_submission(submission: &str, config: &InterpreterConfig) {
    if bf_only(submission, config.debug).is_empty() {
        return;
    }

    let mut bf = BrainfuckReader::with_config(config.clone(), io::stdin().lock(), io::stdout().lock());
    if let Err(err) = bf.run(SliceSource::from(submission)) {
        debug!(error = %err, "submission failed");
        cli_util::print_execution_error(None, submission.as_bytes(), &err);
        let _ = io::stderr().flush();
    }
    let (_, mut stdout) = bf.into_parts();
    let _ = writeln!(stdout);
    let _ = stdout.flush();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

/// Pick the REPL mode: flag, then `RBF_REPL_MODE`, then whether stdin is a TTY.
pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    resolve_mode(flag, env::var("RBF_REPL_MODE").ok().as_deref(), io::stdin().is_terminal())
}

fn resolve_mode(flag: ModeFlagOverride, env_mode: Option<&str>, stdin_is_tty: bool) -> Result<ReplMode, String> {
    let editor = |hint: &str| {
        if stdin_is_tty {
            Ok(ReplMode::Editor)
        } else {
            Err(format!("cannot start editor: stdin is not a TTY (use {hint})"))
        }
    };

    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => return editor("--bare or RBF_REPL_MODE=bare"),
        ModeFlagOverride::None => {}
    }

    if let Some(val) = env_mode {
        return match val.trim().to_ascii_lowercase().as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => editor("RBF_REPL_MODE=bare"),
            _ => Err(format!("invalid RBF_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if stdin_is_tty { Ok(ReplMode::Editor) } else { Ok(ReplMode::Bare) }
}

/// Read stdin to EOF and run it once. `,` sees end of input, since stdin is already drained.
pub fn execute_bare_once(config: &InterpreterConfig) -> io::Result<()> {
    let mut locked = io::BufReader::new(io::stdin().lock());
    let submission = read_submission(&mut locked);
    drop(locked);
    if let Some(s) = submission {
        execute_submission(&s, config);
    }
    Ok(())
}

/// Colors each command character by its role; everything else is dimmed as a comment.
struct BrainfuckHighlighter {
    map_gt: Style,
    map_lt: Style,
    map_plus: Style,
    map_minus: Style,
    map_dot: Style,
    map_comma: Style,
    map_bracket: Style,
    map_debug: Style,
    map_other: Style,
}

impl BrainfuckHighlighter {
    fn new(colors: &Colors) -> Self {
        Self {
            map_gt: Style::new().fg(colors.op_right).bold(),
            map_lt: Style::new().fg(colors.op_left).bold(),
            map_plus: Style::new().fg(colors.op_inc).bold(),
            map_minus: Style::new().fg(colors.op_dec).bold(),
            map_dot: Style::new().fg(colors.op_output).bold(),
            map_comma: Style::new().fg(colors.op_input).bold(),
            map_bracket: Style::new().fg(colors.op_bracket).bold(),
            map_debug: Style::new().fg(colors.op_debug).italic(),
            map_other: Style::new().fg(colors.non_bf),
        }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        match ch {
            '>' => self.map_gt,
            '<' => self.map_lt,
            '+' => self.map_plus,
            '-' => self.map_minus,
            '.' => self.map_dot,
            ',' => self.map_comma,
            '[' | ']' => self.map_bracket,
            '#' => self.map_debug,
            _ => self.map_other,
        }
    }

    /// Split `line` into runs of equally styled characters.
    fn runs(&self, line: &str) -> Vec<(Style, String)> {
        let mut out: Vec<(Style, String)> = Vec::new();
        for ch in line.chars() {
            let style = self.style_for(ch);
            match out.last_mut() {
                Some((s, buf)) if *s == style => buf.push(ch),
                _ => out.push((style, ch.to_string())),
            }
        }
        out
    }
}

impl Highlighter for BrainfuckHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        for run in self.runs(line) {
            out.push(run);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_submission_reads_until_eof_multiple_lines() {
        let input = b"+++\n>+.\n";
        let mut cursor = Cursor::new(&input[..]);
        let got = read_submission(&mut cursor);
        assert_eq!(got.as_deref(), Some("+++\n>+.\n"));
    }

    #[test]
    fn read_submission_empty_returns_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_submission(&mut cursor).is_none());
    }

    #[test]
    fn flag_overrides_env() {
        assert_eq!(resolve_mode(ModeFlagOverride::Bare, Some("editor"), true), Ok(ReplMode::Bare));
    }

    #[test]
    fn editor_requires_tty() {
        assert!(resolve_mode(ModeFlagOverride::Editor, None, false).is_err());
        assert!(resolve_mode(ModeFlagOverride::None, Some("editor"), false).is_err());
        assert_eq!(resolve_mode(ModeFlagOverride::Editor, None, true), Ok(ReplMode::Editor));
    }

    #[test]
    fn env_mode_and_auto_detect() {
        assert_eq!(resolve_mode(ModeFlagOverride::None, Some(" BARE "), true), Ok(ReplMode::Bare));
        assert!(resolve_mode(ModeFlagOverride::None, Some("fancy"), true).is_err());
        assert_eq!(resolve_mode(ModeFlagOverride::None, None, true), Ok(ReplMode::Editor));
        assert_eq!(resolve_mode(ModeFlagOverride::None, None, false), Ok(ReplMode::Bare));
    }

    #[test]
    fn highlighter_groups_runs() {
        let h = BrainfuckHighlighter::new(&Colors::default());
        let runs = h.runs("++[-]ab");
        let texts: Vec<&str> = runs.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, ["++", "[", "-", "]", "ab"]);
    }
}
