use crate::log_view::LogFilter;

use models::LogRecord;

/// Position inside `[#|timestamp|level|version|logger|threadinfo|message|#]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    OpenBracket,
    OpenHash,
    Timestamp,
    Level,
    Version,
    Logger,
    ThreadInfo,
    Message,
    ClosePipe,
    CloseHash,
}

#[derive(Debug, Default)]
struct PendingRecord {
    timestamp: String,
    level: String,
    version: String,
    logger: String,
    thread_info: String,
    message: String,
    /// A chunk of this record was already emitted.
    emitted: bool,
}

impl PendingRecord {
    fn chunk(&mut self) -> LogRecord {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let mut message = std::mem::take(&mut self.message);
        message.push('\n');

        let record = LogRecord {
            timestamp: non_empty(&self.timestamp),
            level: non_empty(&self.level),
            version: non_empty(&self.version),
            logger: non_empty(&self.logger),
            thread_info: non_empty(&self.thread_info),
            message,
            multiline: self.emitted,
        };
        self.emitted = true;
        record
    }
}

/// Character-driven parser of the bracketed server.log record format.
///
/// Anything that does not turn out to be a record passes through as plain
/// text, one line at a time.
#[derive(Debug)]
pub struct BracketedFilter {
    state: State,
    plain: String,
    record: PendingRecord,
}

impl Default for BracketedFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl BracketedFilter {
    pub fn new() -> Self {
        Self {
            state: State::Text,
            plain: String::new(),
            record: PendingRecord::default(),
        }
    }

    fn take_plain(&mut self) -> Option<LogRecord> {
        if self.plain.is_empty() {
            return None;
        }
        Some(LogRecord::plain(std::mem::take(&mut self.plain)))
    }

    fn field(&mut self) -> Option<&mut String> {
        match self.state {
            State::Timestamp => Some(&mut self.record.timestamp),
            State::Level => Some(&mut self.record.level),
            State::Version => Some(&mut self.record.version),
            State::Logger => Some(&mut self.record.logger),
            State::ThreadInfo => Some(&mut self.record.thread_info),
            _ => None,
        }
    }

    /// Header characters consumed since `[#|`. Fields never hold `|`, so
    /// joining them restores the input exactly.
    fn raw_header(&self) -> String {
        let fields = [
            &self.record.timestamp,
            &self.record.level,
            &self.record.version,
            &self.record.logger,
            &self.record.thread_info,
        ];
        let seen = match self.state {
            State::Timestamp => 1,
            State::Level => 2,
            State::Version => 3,
            State::Logger => 4,
            _ => 5,
        };
        let joined: Vec<&str> = fields[..seen].iter().map(|field| field.as_str()).collect();
        format!("[#|{}", joined.join("|"))
    }

    fn next_field(state: State) -> State {
        match state {
            State::Timestamp => State::Level,
            State::Level => State::Version,
            State::Version => State::Logger,
            State::Logger => State::ThreadInfo,
            _ => State::Message,
        }
    }

    fn text(&mut self, c: char) -> Option<LogRecord> {
        match c {
            '[' => {
                self.state = State::OpenBracket;
                None
            }
            '\n' => {
                if self.plain.is_empty() {
                    return None;
                }
                self.plain.push('\n');
                self.take_plain()
            }
            _ => {
                self.plain.push(c);
                None
            }
        }
    }

    fn message(&mut self, c: char) -> Option<LogRecord> {
        match c {
            '|' => {
                self.state = State::ClosePipe;
                None
            }
            '\n' => Some(self.record.chunk()),
            _ => {
                self.record.message.push(c);
                None
            }
        }
    }
}

impl LogFilter for BracketedFilter {
    fn process(&mut self, c: char) -> Option<LogRecord> {
        if c == '\r' {
            return None;
        }

        match self.state {
            State::Text => self.text(c),
            State::OpenBracket => {
                if c == '#' {
                    self.state = State::OpenHash;
                    return None;
                }
                self.plain.push('[');
                self.state = State::Text;
                self.text(c)
            }
            State::OpenHash => {
                if c == '|' {
                    self.state = State::Timestamp;
                    self.record = PendingRecord::default();
                    return self.take_plain();
                }
                self.plain.push_str("[#");
                self.state = State::Text;
                self.text(c)
            }
            State::Timestamp | State::Level | State::Version | State::Logger | State::ThreadInfo => {
                if c == '|' {
                    self.state = Self::next_field(self.state);
                } else if let Some(field) = self.field() {
                    field.push(c);
                }
                None
            }
            State::Message => self.message(c),
            State::ClosePipe => {
                if c == '#' {
                    self.state = State::CloseHash;
                    return None;
                }
                self.record.message.push('|');
                self.state = State::Message;
                self.message(c)
            }
            State::CloseHash => {
                if c == ']' {
                    self.state = State::Text;
                    let mut record = std::mem::take(&mut self.record);
                    if record.emitted && record.message.is_empty() {
                        return None;
                    }
                    return Some(record.chunk());
                }
                self.record.message.push_str("|#");
                self.state = State::Message;
                self.message(c)
            }
        }
    }

    fn flush(&mut self) -> Option<LogRecord> {
        match self.state {
            State::Text => self.take_plain(),
            State::OpenBracket => {
                self.state = State::Text;
                self.plain.push('[');
                self.take_plain()
            }
            State::OpenHash => {
                self.state = State::Text;
                self.plain.push_str("[#");
                self.take_plain()
            }
            State::Message | State::ClosePipe | State::CloseHash => {
                self.state = State::Text;
                let mut record = std::mem::take(&mut self.record);
                if record.emitted && record.message.is_empty() {
                    return None;
                }
                Some(record.chunk())
            }
            State::Timestamp | State::Level | State::Version | State::Logger | State::ThreadInfo => {
                let raw = self.raw_header();
                self.state = State::Text;
                self.record = PendingRecord::default();
                self.plain.push_str(&raw);
                self.take_plain()
            }
        }
    }
}
