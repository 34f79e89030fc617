//! Server log parsing and following.
//!
//! Bytes from a log file or a process stream are decoded, fed character by
//! character through a [`LogFilter`], enriched by the [`LinePipeline`] and
//! handed to a [`LogSink`].

pub mod ansi;
pub mod bracketed;
pub mod fetcher;
pub mod line_filter;
pub mod pipeline;
pub mod recognizer;

use crate::config::LogConfig;
use crate::error::log_view::LogViewError;
use crate::process::ServerProcess;

use bracketed::BracketedFilter;
use fetcher::{FileFollower, pump_file, pump_stream};
use line_filter::LineStreamFilter;
use pipeline::{LinePipeline, LogSink};
use recognizer::{Recognizer, StackFrameRecognizer};

use models::LogRecord;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::task::JoinHandle;

/// Incremental parser from characters to [`LogRecord`]s.
pub trait LogFilter: Send {
    /// Consume one character; returns a record when one is complete.
    fn process(&mut self, c: char) -> Option<LogRecord>;

    /// Emit whatever is buffered once the source has ended.
    fn flush(&mut self) -> Option<LogRecord>;

    fn process_str(&mut self, text: &str) -> Vec<LogRecord> {
        text.chars().filter_map(|c| self.process(c)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `[#|...|#]` records of server.log.
    Bracketed,
    /// Plain `LEVEL: message` lines of process output.
    Lines,
}

impl FilterKind {
    pub fn build(self) -> Box<dyn LogFilter> {
        match self {
            FilterKind::Bracketed => Box::new(BracketedFilter::new()),
            FilterKind::Lines => Box::new(LineStreamFilter::new()),
        }
    }
}

pub enum LogSource {
    File {
        path: PathBuf,
        from_start: bool,
        filter: FilterKind,
    },
    Stdout(ChildStdout),
    Stderr(ChildStderr),
}

/// Per-instance set of running log readers.
pub struct LogViewManager {
    readers: Mutex<HashMap<String, Vec<JoinHandle<()>>>>,
    sink: Arc<dyn LogSink>,
    pipeline: LinePipeline,
    read_delay: Duration,
}

impl LogViewManager {
    pub fn new(sink: Arc<dyn LogSink>, config: &LogConfig) -> Self {
        Self::with_recognizers(sink, config, vec![Arc::new(StackFrameRecognizer)])
    }

    pub fn with_recognizers(
        sink: Arc<dyn LogSink>,
        config: &LogConfig,
        recognizers: Vec<Arc<dyn Recognizer>>,
    ) -> Self {
        Self {
            readers: Mutex::new(HashMap::new()),
            sink,
            pipeline: LinePipeline::new(recognizers, config.max_recognized_line_len),
            read_delay: config.read_delay(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<JoinHandle<()>>>> {
        self.readers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn(&self, instance: &str, source: LogSource) -> JoinHandle<()> {
        let name = instance.to_string();
        let pipeline = self.pipeline.clone();
        let sink = Arc::clone(&self.sink);

        match source {
            LogSource::File {
                path,
                from_start,
                filter,
            } => tokio::spawn(pump_file(
                name,
                FileFollower::new(path, from_start),
                filter.build(),
                pipeline,
                sink,
                self.read_delay,
            )),
            LogSource::Stdout(stdout) => tokio::spawn(pump_stream(
                name,
                "stdout",
                stdout,
                FilterKind::Lines.build(),
                pipeline,
                sink,
            )),
            LogSource::Stderr(stderr) => tokio::spawn(pump_stream(
                name,
                "stderr",
                stderr,
                FilterKind::Lines.build(),
                pipeline,
                sink,
            )),
        }
    }

    /// Replace the readers of `instance` with readers of `sources`.
    pub fn start(&self, instance: &str, sources: Vec<LogSource>) -> usize {
        self.stop(instance);

        let handles = sources
            .into_iter()
            .map(|source| self.spawn(instance, source))
            .collect::<Vec<_>>();
        let count = handles.len();

        // A concurrent start may have inserted between stop and here.
        let replaced = self.lock().insert(instance.to_string(), handles);
        for handle in replaced.iter().flatten() {
            handle.abort();
        }
        debug!("Started {count} log reader(s) for '{instance}'");
        count
    }

    /// Read the piped output of a freshly launched server.
    pub fn attach_process(&self, instance: &str, process: &ServerProcess) -> usize {
        let (stdout, stderr) = process.take_output();
        let sources = stdout
            .map(LogSource::Stdout)
            .into_iter()
            .chain(stderr.map(LogSource::Stderr))
            .collect();
        self.start(instance, sources)
    }

    pub fn follow_file(&self, instance: &str, path: impl Into<PathBuf>, from_start: bool) -> usize {
        let path = path.into();
        info!("Following log {} for '{instance}'", path.display());
        self.start(
            instance,
            vec![LogSource::File {
                path,
                from_start,
                filter: FilterKind::Bracketed,
            }],
        )
    }

    /// Render the current content of `path` once, without following it.
    /// Returns the number of lines handed to the sink.
    pub async fn read_file(&self, instance: &str, path: impl Into<PathBuf>) -> Result<usize, LogViewError> {
        let mut follower = FileFollower::new(path, true);
        let text = follower.read_delta().await?;

        let mut filter = FilterKind::Bracketed.build();
        let mut records = filter.process_str(&text);
        records.extend(filter.flush());

        for record in &records {
            self.sink.line(instance, self.pipeline.render(record));
        }
        Ok(records.len())
    }

    /// Number of readers of `instance` that are still running.
    pub fn active_readers(&self, instance: &str) -> usize {
        self.lock()
            .get(instance)
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or_default()
    }

    pub fn stop(&self, instance: &str) -> bool {
        let Some(handles) = self.lock().remove(instance) else {
            return false;
        };
        for handle in &handles {
            handle.abort();
        }
        debug!("Stopped {} log reader(s) for '{instance}'", handles.len());
        true
    }

    pub fn stop_all(&self) {
        let all = self.lock().drain().collect::<Vec<_>>();
        for (instance, handles) in all {
            for handle in handles {
                handle.abort();
            }
            debug!("Stopped log readers for '{instance}'");
        }
    }
}

impl Drop for LogViewManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}
