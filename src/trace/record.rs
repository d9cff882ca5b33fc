//! Complete-call records

/// One complete syscall as reconstructed from the trace.
///
/// Argument and result text are kept raw; syscall-specific grammar is
/// decoded later, by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    /// Pid label from the trace line (0 for single-process traces).
    pub pid: u64,

    /// Syscall name as written in the trace.
    pub syscall: String,

    /// Raw comma-delimited argument text, without the enclosing parens.
    pub args: String,

    /// Raw result text; its first whitespace-delimited token is the
    /// primary value.
    pub result: String,

    /// The raw line this record came from, kept for diagnostics and for
    /// the live-mapping history.
    pub source_line: String,
}
