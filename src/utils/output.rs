//! Shared output files: the error log and the running summary file.
//!
//! Both are written from many document tasks at once. Every write takes the
//! file's mutex and emits a whole line (or entry) before releasing it, so
//! concurrent appends never interleave.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a half-written line behind
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

#[derive(Debug)]
enum LogSink {
    File(File),
    Memory(Vec<String>),
    Discard,
}

/// Append-only error log: one `"<timestamp> - <message>"` line per failure
#[derive(Debug)]
pub struct ErrorLog {
    sink: Mutex<LogSink>,
}

impl ErrorLog {
    /// Create (or truncate) the log file at `path`
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            sink: Mutex::new(LogSink::File(file)),
        })
    }

    /// Keep log lines in memory, for tests
    pub fn in_memory() -> Self {
        Self {
            sink: Mutex::new(LogSink::Memory(Vec::new())),
        }
    }

    /// Drop every log line
    pub fn discard() -> Self {
        Self {
            sink: Mutex::new(LogSink::Discard),
        }
    }

    /// Record a failure
    pub fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::warn!("{}", message);

        let line = format!("{} - {}\n", timestamp(), message);
        let mut sink = lock(&self.sink);
        match &mut *sink {
            LogSink::File(file) => {
                if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
                    tracing::error!("Failed to write error log: {}", e);
                }
            }
            LogSink::Memory(lines) => lines.push(line),
            LogSink::Discard => {}
        }
    }

    /// Lines captured by an in-memory log (empty for other sinks)
    pub fn lines(&self) -> Vec<String> {
        match &*lock(&self.sink) {
            LogSink::Memory(lines) => lines.clone(),
            _ => Vec::new(),
        }
    }
}

/// The running summary file
///
/// Entries are appended as documents finish; the bibliography is appended
/// once at the end, in ordinal order.
#[derive(Debug)]
pub struct SummaryFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl SummaryFile {
    /// Create (or truncate) the summary file at `path`
    pub fn create(path: &Path) -> io::Result<Self> {
        File::create(path)?;
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Append one `"<summary> <citation>"` entry followed by a blank line
    pub fn append_entry(&self, entry: &str) -> io::Result<()> {
        let mut file = lock(&self.file);
        file.write_all(format!("{}\n\n", entry).as_bytes())?;
        file.flush()
    }

    /// Append the bibliography header and one line per entry
    pub fn append_bibliography<'a, I>(&self, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut block = String::from("\nBibliography:\n");
        for line in lines {
            block.push_str(line.trim());
            block.push('\n');
        }

        let mut file = lock(&self.file);
        file.write_all(block.as_bytes())?;
        file.flush()
    }

    /// Read the whole file back
    pub fn read_back(&self) -> io::Result<String> {
        let _guard = lock(&self.file);
        fs::read_to_string(&self.path)
    }
}

/// Replace the final review document in a single write
pub fn write_review(path: &Path, review: &str) -> io::Result<()> {
    fs::write(path, review)
}
