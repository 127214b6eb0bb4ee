//! Interpreter and REPL configuration.
//!
//! Values come from, in increasing priority: built-in defaults, the user file
//! `rbf.toml` in the XDG config home, and `RBF_*` environment variables. The
//! command line overrides all of them in `main`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use nu_ansi_term::Color;
use tracing::{debug, warn};

use crate::jump_stack::DEFAULT_STACK_DEPTH;
use crate::tape::DEFAULT_TAPE_CELLS;
use crate::theme::catppuccin::Mocha;

/// The command that prints a snapshot of the tape when debugging is enabled.
pub const DEBUG_COMMAND: u8 = b'#';

/// Knobs for a single interpreter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Cells allocated when the tape is created.
    pub initial_tape_cells: usize,
    /// Bookmarks the jump stack has room for before it first grows.
    pub initial_stack_depth: usize,
    /// Upper bound on tape growth; `None` means limited only by memory.
    pub max_tape_cells: Option<usize>,
    /// Whether [`DEBUG_COMMAND`] is recognized.
    pub debug: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            initial_tape_cells: DEFAULT_TAPE_CELLS,
            initial_stack_depth: DEFAULT_STACK_DEPTH,
            max_tape_cells: None,
            debug: false,
        }
    }
}

impl InterpreterConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_tape_cells(mut self, max: Option<usize>) -> Self {
        self.max_tape_cells = max;
        self
    }

    /// Apply `RBF_DEBUG` and `RBF_MAX_TAPE_CELLS` on top of `self`.
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = env::var("RBF_DEBUG") {
            match parse_bool(&v) {
                Some(b) => self.debug = b,
                None => warn!(value = %v, "ignoring invalid RBF_DEBUG"),
            }
        }
        if let Ok(v) = env::var("RBF_MAX_TAPE_CELLS") {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.max_tape_cells = Some(n),
                _ => warn!(value = %v, "ignoring invalid RBF_MAX_TAPE_CELLS"),
            }
        }
        self
    }

    fn apply_section(&mut self, section: &HashMap<String, String>) {
        for (key, value) in section {
            let applied = match key.as_str() {
                "debug" => parse_bool(value).map(|b| self.debug = b),
                "initial_tape_cells" => parse_count(value).map(|n| self.initial_tape_cells = n),
                "initial_stack_depth" => parse_count(value).map(|n| self.initial_stack_depth = n),
                "max_tape_cells" => parse_count(value).map(|n| self.max_tape_cells = Some(n)),
                _ => {
                    warn!(key = %key, "unknown key in [interpreter]");
                    Some(())
                }
            };
            if applied.is_none() {
                warn!(key = %key, value = %value, "ignoring invalid value in [interpreter]");
            }
        }
    }
}

/// Highlight palette for the REPL editor.
#[derive(Debug, Clone)]
pub struct Colors {
    pub op_right: Color,   // '>'
    pub op_left: Color,    // '<'
    pub op_inc: Color,     // '+'
    pub op_dec: Color,     // '-'
    pub op_output: Color,  // '.'
    pub op_input: Color,   // ','
    pub op_bracket: Color, // '[' and ']'
    pub op_debug: Color,   // '#'
    pub non_bf: Color,
    pub error: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            op_right: Mocha::SKY,
            op_left: Mocha::TEAL,
            op_inc: Mocha::GREEN,
            op_dec: Mocha::RED,
            op_output: Mocha::YELLOW,
            op_input: Mocha::PEACH,
            op_bracket: Mocha::MAUVE,
            op_debug: Mocha::BLUE,
            non_bf: Mocha::SURFACE2,
            error: Mocha::RED,
        }
    }
}

impl Colors {
    fn apply_section(&mut self, section: &HashMap<String, String>) {
        let colors = self;

        macro_rules! set {
            ($field:ident, $key:literal) => {
                if let Some(v) = section.get($key) {
                    match parse_color(v) {
                        Some(c) => colors.$field = c,
                        None => warn!(key = $key, value = %v, "ignoring invalid color"),
                    }
                }
            };
        }

        set!(op_right, "op_right");
        set!(op_left, "op_left");
        set!(op_inc, "op_inc");
        set!(op_dec, "op_dec");
        set!(op_output, "op_output");
        set!(op_input, "op_input");
        set!(op_bracket, "op_bracket");
        set!(op_debug, "op_debug");
        set!(non_bf, "non_bf");
        set!(error, "error");
    }
}

/// Everything read from `rbf.toml`.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    pub interpreter: InterpreterConfig,
    pub colors: Colors,
}

impl FileConfig {
    /// Parse the contents of a config file. Unknown sections are ignored.
    pub fn parse(content: &str) -> Self {
        let sections = parse_sections(content);
        let mut cfg = Self::default();
        if let Some(s) = sections.get("interpreter") {
            cfg.interpreter.apply_section(s);
        }
        if let Some(s) = sections.get("colors") {
            cfg.colors.apply_section(s);
        }
        cfg
    }
}

static FILE_CONFIG: OnceLock<FileConfig> = OnceLock::new();

/// The user's file configuration, loaded once.
pub fn file_config() -> &'static FileConfig {
    FILE_CONFIG.get_or_init(|| load_from_toml().unwrap_or_default())
}

fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("rbf.toml");
    Some(path)
}

fn load_from_toml() -> Option<FileConfig> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    debug!(path = %path.display(), "loaded config file");
    Some(FileConfig::parse(&content))
}

/// Very small TOML subset: `[section]` headers and `key = value` pairs, with
/// optional double quotes around values and `#` comment lines.
fn parse_sections(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = Some(line[1..line.len() - 1].trim().to_string());
            continue;
        }
        let Some(section) = current.as_ref() else { continue };
        if let Some((key, raw)) = line.split_once('=') {
            let raw = raw.trim();
            let value = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.to_string());
        }
    }

    sections
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_count(value: &str) -> Option<usize> {
    value.trim().replace('_', "").parse::<usize>().ok().filter(|&n| n > 0)
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        return None;
    }

    Some(match s.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "purple" | "magenta" => Color::Purple,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGray,
        "lightred" | "light_red" => Color::LightRed,
        "lightgreen" | "light_green" => Color::LightGreen,
        "lightblue" | "light_blue" => Color::LightBlue,
        "lightpurple" | "light_purple" | "lightmagenta" | "light_magenta" => Color::LightPurple,
        "lightcyan" | "light_cyan" => Color::LightCyan,
        "lightgray" | "light_gray" | "gray" | "grey" => Color::LightGray,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interpreter_section() {
        let cfg = FileConfig::parse(
            "# comment\n[interpreter]\ndebug = true\ninitial_tape_cells = 2_000\nmax_tape_cells = \"4096\"\n",
        );
        assert!(cfg.interpreter.debug);
        assert_eq!(cfg.interpreter.initial_tape_cells, 2000);
        assert_eq!(cfg.interpreter.initial_stack_depth, DEFAULT_STACK_DEPTH);
        assert_eq!(cfg.interpreter.max_tape_cells, Some(4096));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let cfg = FileConfig::parse("[interpreter]\ninitial_tape_cells = zero\ndebug = maybe\n");
        assert_eq!(cfg.interpreter, InterpreterConfig::default());
    }

    #[test]
    fn keys_outside_sections_are_ignored() {
        let cfg = FileConfig::parse("debug = true\n[other]\ndebug = true\n");
        assert!(!cfg.interpreter.debug);
    }

    #[test]
    fn parses_colors() {
        let cfg = FileConfig::parse("[colors]\nop_inc = \"#010203\"\nop_dec = cyan\nop_left = nope\n");
        assert_eq!(cfg.colors.op_inc, Color::Rgb(1, 2, 3));
        assert_eq!(cfg.colors.op_dec, Color::Cyan);
        assert_eq!(cfg.colors.op_left, Colors::default().op_left);
    }
}
