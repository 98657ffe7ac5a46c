//! Recoverable anomalies reported while interpreting input
//!
//! Nothing in the geometry core is fatal: malformed input is dropped or replaced by a
//! default at the point of detection and reported to a [`Diagnostics`] sink. Sinks only
//! observe, they never change what gets built.
use std::fmt;

/// Broad classification of an [`Anomaly`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    /// Unparsable number, unknown command letter, invalid attribute or style value
    MalformedInput,
    /// Command has fewer arguments than its arity requires
    InsufficientArguments,
    /// Nothing to build from (empty path data, degenerate shape)
    EmptyOrMissingData,
}

/// Single recoverable anomaly
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Letter that is not a path command, it is skipped with its arguments
    UnknownCommand { op: char, offset: usize },
    /// Token which is not a valid number
    InvalidNumber { token: String, offset: usize },
    /// Numbers found before the first command
    OrphanArguments { count: usize },
    /// Incomplete trailing group of arguments was dropped
    InsufficientArguments {
        op: char,
        expected: usize,
        found: usize,
    },
    /// Arguments passed to a command which takes none
    TrailingArguments { op: char, count: usize },
    /// Path data is empty or contains only separators
    EmptyPathData,
    /// Style declaration value could not be interpreted
    InvalidStyleValue { key: String, value: String },
    /// Element attribute is invalid or missing
    InvalidAttribute { name: &'static str, reason: String },
    /// External tessellator rejected the contour
    TessellationFailed { reason: String },
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyKind {
        use Anomaly::*;
        match self {
            UnknownCommand { .. }
            | InvalidNumber { .. }
            | OrphanArguments { .. }
            | TrailingArguments { .. }
            | InvalidStyleValue { .. }
            | InvalidAttribute { .. } => AnomalyKind::MalformedInput,
            InsufficientArguments { .. } => AnomalyKind::InsufficientArguments,
            EmptyPathData | TessellationFailed { .. } => AnomalyKind::EmptyOrMissingData,
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Anomaly::*;
        match self {
            UnknownCommand { op, offset } => {
                write!(f, "unknown path command '{}' at offset {}", op, offset)
            }
            InvalidNumber { token, offset } => {
                write!(f, "invalid number {:?} at offset {}", token, offset)
            }
            OrphanArguments { count } => {
                write!(f, "{} argument(s) before the first command", count)
            }
            InsufficientArguments {
                op,
                expected,
                found,
            } => write!(
                f,
                "command '{}' expects groups of {} argument(s), {} left over",
                op, expected, found
            ),
            TrailingArguments { op, count } => {
                write!(f, "command '{}' takes no arguments, {} ignored", op, count)
            }
            EmptyPathData => write!(f, "empty path data"),
            InvalidStyleValue { key, value } => {
                write!(f, "invalid value {:?} for style property '{}'", value, key)
            }
            InvalidAttribute { name, reason } => {
                write!(f, "invalid attribute '{}': {}", name, reason)
            }
            TessellationFailed { reason } => write!(f, "tessellation failed: {}", reason),
        }
    }
}

/// Receiver of recoverable anomalies
pub trait Diagnostics {
    fn report(&mut self, anomaly: Anomaly);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, anomaly: Anomaly) {
        (**self).report(anomaly)
    }
}

/// Discards all anomalies
impl Diagnostics for () {
    fn report(&mut self, _anomaly: Anomaly) {}
}

/// Collects all anomalies
impl Diagnostics for Vec<Anomaly> {
    fn report(&mut self, anomaly: Anomaly) {
        self.push(anomaly)
    }
}

/// Logs anomalies with `tracing` at warning level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&mut self, anomaly: Anomaly) {
        tracing::warn!(kind = ?anomaly.kind(), "[anomaly] {}", anomaly);
    }
}
