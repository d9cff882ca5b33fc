//! # memtrace
//!
//! Reconstructs per-process and aggregate memory-usage timelines from the
//! textual output of a syscall tracer.
//!
//! ## Pipeline
//!
//! 1. **Line reconciliation**: interleaved and unfinished/resumed lines
//!    become complete single-call records
//! 2. **Call interpretation**: `brk`/`mmap`/`mremap`/`munmap` grammar is
//!    decoded into typed memory operations
//! 3. **Accounting**: per-pid and aggregate heap/mapped/vm totals, plus a
//!    shared table of live mappings for unbalanced-release detection
//!
//! The run is one strictly sequential scan: each line's effect is fully
//! applied before the next line is read, because later release/move calls
//! must observe the mapping state left by earlier creations.
//!
//! ## Usage Example
//!
//! ```
//! use memtrace::{Analyzer, AnalyzerOptions};
//!
//! let mut analyzer = Analyzer::new(AnalyzerOptions::default());
//! analyzer.consume_line("brk(NULL) = 0x600000")?;
//! analyzer.consume_line("brk(0x601000) = 0x601000")?;
//! assert_eq!(analyzer.engine().totals().heap_max(), 4096);
//! # Ok::<(), memtrace::TraceError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod accounting;
pub mod interpret;
pub mod report;
pub mod trace;

pub use accounting::{AccountingEngine, AggregateStats, LiveMappings, ProcessStats};
pub use interpret::MemOp;
pub use trace::{LineReconciler, TraceRecord};

use thiserror::Error;
use tracing::debug;

/// Errors raised while parsing or interpreting a trace.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Line matched none of the recognized trace line shapes.
    #[error("line did not parse: {0}")]
    UnparseableLine(String),

    /// A resumed call arrived with no unfinished call pending for its pid.
    #[error("resumed call for pid {0} without a pending unfinished call")]
    OrphanResume(u64),

    /// A complete record named a syscall outside the recognized set.
    #[error("unknown system call {name} '{args}'")]
    UnknownSyscall {
        /// Syscall name as written in the trace.
        name: String,
        /// Raw argument text, for the error message.
        args: String,
    },

    /// A numeric literal was not `NULL`, hex, octal, or decimal.
    #[error("malformed numeric literal '{0}'")]
    MalformedNumeric(String),

    /// An argument list had too few fields for its syscall.
    #[error("malformed {syscall} arguments '{args}'")]
    MalformedArguments {
        /// Which syscall's grammar was violated.
        syscall: &'static str,
        /// The offending argument text.
        args: String,
    },
}

/// Policy knobs for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerOptions {
    /// Skip unparseable lines and unrecognized syscalls instead of
    /// failing on them.
    pub ignore_unknown: bool,

    /// Count every mapping toward mapped bytes, not only writable ones.
    /// Read-only maps are excluded by default: they are file-backed code,
    /// not allocator-owned usage.
    pub count_all: bool,
}

/// Single-pass trace analyzer.
///
/// Feeds raw lines through reconciliation, interpretation, and accounting
/// in order; the engine is inspectable at any point between lines.
#[derive(Debug)]
pub struct Analyzer {
    options: AnalyzerOptions,
    reconciler: LineReconciler,
    engine: AccountingEngine,
}

impl Analyzer {
    /// Create an analyzer for one run.
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            reconciler: LineReconciler::new(),
            engine: AccountingEngine::new(options.count_all),
        }
    }

    /// Feed the next raw line of the trace.
    ///
    /// Returns the completed record when the line (possibly joined with a
    /// buffered unfinished call) formed one — including records whose
    /// syscall was unrecognized but tolerated, so callers can still count
    /// and echo them. Returns `Ok(None)` for lines that only filled the
    /// pending buffer, or that were skipped under tolerance.
    pub fn consume_line(&mut self, line: &str) -> Result<Option<TraceRecord>, TraceError> {
        let record = match self.reconciler.accept(line) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(None),
            Err(err) if self.options.ignore_unknown => {
                debug!(%err, "skipping unparseable line");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        self.engine.touch(record.pid);
        match interpret::interpret(&record) {
            Ok(Some(op)) => self.engine.apply(record.pid, op, &record.source_line),
            Ok(None) => {}
            Err(err) if self.options.ignore_unknown => {
                debug!(%err, "ignoring call");
            }
            Err(err) => return Err(err),
        }

        Ok(Some(record))
    }

    /// The accounting engine with all per-process and aggregate state.
    pub fn engine(&self) -> &AccountingEngine {
        &self.engine
    }

    /// The options this run was configured with.
    pub fn options(&self) -> AnalyzerOptions {
        self.options
    }
}
