use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::OnceLock;

use regex::Regex;

const SGR_PATTERN: &str = r"\x1b\[([0-9;]*)m";

static SGR_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_sgr_regex() -> &'static Regex {
    SGR_REGEX.get_or_init(|| Regex::new(SGR_PATTERN).expect("valid regex pattern"))
}

/// Foreground colours of SGR codes 30-36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl AnsiColor {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            30 => AnsiColor::Black,
            31 => AnsiColor::Red,
            32 => AnsiColor::Green,
            33 => AnsiColor::Yellow,
            34 => AnsiColor::Blue,
            35 => AnsiColor::Magenta,
            36 => AnsiColor::Cyan,
            _ => return None,
        })
    }
}

impl Display for AnsiColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        f.write_str(match self {
            AnsiColor::Black => "black",
            AnsiColor::Red => "red",
            AnsiColor::Green => "green",
            AnsiColor::Yellow => "yellow",
            AnsiColor::Blue => "blue",
            AnsiColor::Magenta => "magenta",
            AnsiColor::Cyan => "cyan",
        })
    }
}

/// Remove SGR escape sequences, returning the clean text and the first
/// foreground colour they selected.
pub fn strip_ansi(text: &str) -> (String, Option<AnsiColor>) {
    let regex = get_sgr_regex();
    if !text.contains('\x1b') {
        return (text.to_string(), None);
    }

    let color = regex
        .captures_iter(text)
        .flat_map(|captures| {
            captures
                .get(1)
                .map(|params| params.as_str().to_string())
                .unwrap_or_default()
                .split(';')
                .filter_map(|code| code.parse::<u8>().ok())
                .collect::<Vec<_>>()
        })
        .find_map(AnsiColor::from_code);

    (regex.replace_all(text, "").into_owned(), color)
}
