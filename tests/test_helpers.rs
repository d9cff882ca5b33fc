//! Test helper functions for running analyzers over literal trace text

#![allow(dead_code)]

use memtrace::{Analyzer, AnalyzerOptions, TraceError};

/// Options with tolerance enabled.
pub fn tolerant() -> AnalyzerOptions {
    AnalyzerOptions {
        ignore_unknown: true,
        ..Default::default()
    }
}

/// Options counting every mapping, writable or not.
pub fn count_all() -> AnalyzerOptions {
    AnalyzerOptions {
        count_all: true,
        ..Default::default()
    }
}

/// Feed every line through a fresh analyzer, in order.
pub fn analyze(options: AnalyzerOptions, lines: &[&str]) -> Result<Analyzer, TraceError> {
    let mut analyzer = Analyzer::new(options);
    for line in lines {
        analyzer.consume_line(line)?;
    }
    Ok(analyzer)
}

/// Like `analyze`, but panics on the first error.
pub fn analyze_ok(options: AnalyzerOptions, lines: &[&str]) -> Analyzer {
    analyze(options, lines).expect("trace should analyze cleanly")
}
