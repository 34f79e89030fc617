use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use regex::Regex;

const STACK_FRAME_PATTERN: &str =
    r"^\s*at\s+((?:[\w$]+[./])*[\w$]+)\.([\w$<>]+)\(([^:()]+):(\d+)\)";

static STACK_FRAME_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_stack_frame_regex() -> &'static Regex {
    STACK_FRAME_REGEX.get_or_init(|| Regex::new(STACK_FRAME_PATTERN).expect("valid regex pattern"))
}

/// Something a viewer can do with a recognised line, such as opening the
/// referenced source location.
pub trait LineAction: Debug + Send + Sync {
    fn label(&self) -> String;
}

/// Inspects one rendered line and optionally attaches a [`LineAction`].
pub trait Recognizer: Send + Sync {
    fn recognize(&self, line: &str) -> Option<Arc<dyn LineAction>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub class_name: String,
    pub method: String,
    pub file: String,
    pub line: u32,
}

impl LineAction for SourceLocation {
    fn label(&self) -> String {
        format!("{}:{} ({}.{})", self.file, self.line, self.class_name, self.method)
    }
}

/// Recognises Java stack frames: `at pkg.Class.method(File.java:42)`.
#[derive(Debug, Default, Clone)]
pub struct StackFrameRecognizer;

impl StackFrameRecognizer {
    pub fn parse(line: &str) -> Option<SourceLocation> {
        let captures = get_stack_frame_regex().captures(line)?;
        Some(SourceLocation {
            class_name: captures.get(1)?.as_str().to_string(),
            method: captures.get(2)?.as_str().to_string(),
            file: captures.get(3)?.as_str().to_string(),
            line: captures.get(4)?.as_str().parse().ok()?,
        })
    }
}

impl Recognizer for StackFrameRecognizer {
    fn recognize(&self, line: &str) -> Option<Arc<dyn LineAction>> {
        Self::parse(line).map(|location| Arc::new(location) as Arc<dyn LineAction>)
    }
}
