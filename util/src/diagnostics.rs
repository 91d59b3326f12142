//! A diagnostics sink threaded explicitly through the core, instead of a
//! process-global logger. Mirrors the severity ladder of a typical EDA
//! front-end: `ignore` is silently dropped, `note`/`remark` are informational,
//! `warning` flags a suspicious but recoverable condition, `error` and
//! `fatal` report conditions the caller should treat as failed.

use std::fmt;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagLevel {
    Ignore,
    Note,
    Remark,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for DiagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagLevel::Ignore => "ignore",
            DiagLevel::Note => "note",
            DiagLevel::Remark => "remark",
            DiagLevel::Warning => "warning",
            DiagLevel::Error => "error",
            DiagLevel::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// A sink that recoverable and informational conditions are reported to.
/// The core never aborts on a recoverable condition; it reports and
/// continues (see spec §7).
pub trait Diagnostics {
    fn report(&self, level: DiagLevel, msg: &str);

    fn note(&self, msg: &str) {
        self.report(DiagLevel::Note, msg);
    }

    fn remark(&self, msg: &str) {
        self.report(DiagLevel::Remark, msg);
    }

    fn warning(&self, msg: &str) {
        self.report(DiagLevel::Warning, msg);
    }

    fn error(&self, msg: &str) {
        self.report(DiagLevel::Error, msg);
    }

    fn fatal(&self, msg: &str) {
        self.report(DiagLevel::Fatal, msg);
    }
}

/// Default sink: forwards to the `log` crate at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, level: DiagLevel, msg: &str) {
        match level {
            DiagLevel::Ignore => {}
            DiagLevel::Note => log::info!("{msg}"),
            DiagLevel::Remark => log::debug!("{msg}"),
            DiagLevel::Warning => log::warn!("{msg}"),
            DiagLevel::Error | DiagLevel::Fatal => log::error!("{msg}"),
        }
    }
}

/// A sink that discards everything; useful in tests where log output is noise.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn report(&self, _level: DiagLevel, _msg: &str) {}
}

/// A sink that records every report, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    pub records: std::sync::Mutex<Vec<(DiagLevel, String)>>,
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, level: DiagLevel, msg: &str) {
        self.records.lock().unwrap().push((level, msg.to_string()));
    }
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, level: DiagLevel) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}
