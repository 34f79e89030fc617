use crate::log_view::ansi::{AnsiColor, strip_ansi};

#[test]
fn given_colored_text_when_stripped_then_clean_text_and_color() {
    let (text, color) = strip_ansi("\x1b[31mSEVERE: boom\x1b[0m");

    assert_eq!(text, "SEVERE: boom");
    assert_eq!(color, Some(AnsiColor::Red));
}

#[test]
fn given_bold_and_color_codes_when_stripped_then_color_found() {
    let (text, color) = strip_ansi("\x1b[1;36mready\x1b[m");

    assert_eq!(text, "ready");
    assert_eq!(color, Some(AnsiColor::Cyan));
}

#[test]
fn given_plain_text_when_stripped_then_unchanged_without_color() {
    assert_eq!(strip_ansi("INFO: ok"), (String::from("INFO: ok"), None));
}

#[test]
fn given_codes_outside_range_when_mapped_then_none() {
    assert_eq!(AnsiColor::from_code(37), None);
    assert_eq!(AnsiColor::from_code(30), Some(AnsiColor::Black));
    assert_eq!(AnsiColor::from_code(35), Some(AnsiColor::Magenta));
}
