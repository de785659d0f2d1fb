//! Logging capability handed to the reconciliation engines.
//!
//! The engines never touch a global logger; they report through a
//! [`LogSink`]. The CLI installs [`TracingSink`], tests use an in-memory sink.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Per-record findings of the match engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    NoPrimaryFound {
        tabn: String,
        vidop: String,
        datan: String,
        datok: String,
        expected: String,
    },
    AmbiguousPrimary {
        tabn: String,
        vidop: String,
        datan: String,
        datok: String,
        expected: String,
    },
    SumNotNumeric {
        tabn: String,
        vidop: String,
        summa: String,
        summaval: String,
    },
    Uncovered {
        tabn: String,
        vidop: String,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Uncovered { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn tabn(&self) -> &str {
        match self {
            Self::NoPrimaryFound { tabn, .. }
            | Self::AmbiguousPrimary { tabn, .. }
            | Self::SumNotNumeric { tabn, .. }
            | Self::Uncovered { tabn, .. } => tabn,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tab number {} - ", self.tabn())?;
        match self {
            Self::NoPrimaryFound { vidop, datan, datok, expected, .. } => write!(
                f,
                "payment code {vidop}, period {datan} to {datok} has no primary payment code {expected}"
            ),
            Self::AmbiguousPrimary { vidop, datan, datok, expected, .. } => write!(
                f,
                "payment code {vidop}, period {datan} to {datok} has more than one primary payment code {expected}"
            ),
            Self::SumNotNumeric { vidop, summa, summaval, .. } => write!(
                f,
                "payment code {vidop}: accumulated sum or allowance amount is not a number {summa:?} {summaval:?}"
            ),
            Self::Uncovered { vidop, .. } => write!(f, "unprocessed payment code {vidop}"),
        }
    }
}

pub trait LogSink {
    fn log(&mut self, severity: Severity, message: &str);

    fn info(&mut self, message: &str) {
        self.log(Severity::Info, message);
    }

    fn warn(&mut self, message: &str) {
        self.log(Severity::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.log(Severity::Error, message);
    }

    fn critical(&mut self, message: &str) {
        self.log(Severity::Critical, message);
    }

    fn report(&mut self, diagnostic: &Diagnostic) {
        self.log(diagnostic.severity(), &diagnostic.to_string());
    }
}

/// Forwards everything to the `tracing` subscriber installed by [`crate::logging`].
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
            Severity::Critical => tracing::error!(critical = true, "{message}"),
        }
    }
}

/// Keeps every message and diagnostic in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub messages: Vec<(Severity, String)>,
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
impl MemorySink {
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|(_, m)| m.contains(needle))
    }
}

#[cfg(test)]
impl LogSink for MemorySink {
    fn log(&mut self, severity: Severity, message: &str) {
        self.messages.push((severity, message.to_string()));
    }

    fn report(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
        self.log(diagnostic.severity(), &diagnostic.to_string());
    }
}
