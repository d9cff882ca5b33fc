//! Reconciliation tests: interleaved, unfinished, and resumed lines

use memtrace::{Analyzer, AnalyzerOptions, TraceError};
mod test_helpers;
use test_helpers::*;

#[test]
fn unfinished_then_resumed_reconstructs_the_call() {
    let mut analyzer = Analyzer::new(AnalyzerOptions::default());

    let buffered = analyzer
        .consume_line(
            "123 mmap(NULL, 4096, PROT_READ|PROT_WRITE, MAP_PRIVATE|MAP_ANONYMOUS, -1, 0 <unfinished ...>",
        )
        .unwrap();
    assert!(buffered.is_none());

    let record = analyzer
        .consume_line("123 <... mmap resumed> ) = 0x7f0000")
        .unwrap()
        .expect("resumed line should complete the call");

    assert_eq!(record.pid, 123);
    assert_eq!(record.syscall, "mmap");
    assert!(record.result.starts_with("0x7f0000"));

    // Same accounting effect as if the call had appeared on one line.
    assert_eq!(analyzer.engine().totals().mapped(), 4096);
}

#[test]
fn pending_calls_are_buffered_per_pid() {
    let mut analyzer = Analyzer::new(AnalyzerOptions::default());

    analyzer
        .consume_line("1 brk(NULL <unfinished ...>")
        .unwrap();
    analyzer
        .consume_line("2 mmap(NULL, 8192, PROT_READ|PROT_WRITE, MAP_PRIVATE, -1, 0 <unfinished ...>")
        .unwrap();

    // Pid 2 resumes first; pid 1's buffer is untouched.
    let record = analyzer
        .consume_line("2 <... mmap resumed> ) = 0x7f2000")
        .unwrap()
        .expect("pid 2 should complete");
    assert_eq!(record.pid, 2);

    let record = analyzer
        .consume_line("1 <... brk resumed> ) = 0x600000")
        .unwrap()
        .expect("pid 1 should complete");
    assert_eq!(record.pid, 1);
    assert_eq!(record.syscall, "brk");
}

#[test]
fn second_unfinished_call_overwrites_the_first() {
    let mut analyzer = Analyzer::new(AnalyzerOptions::default());

    analyzer
        .consume_line("7 brk(NULL <unfinished ...>")
        .unwrap();
    analyzer
        .consume_line("7 munmap(0x7f0000, 4096 <unfinished ...>")
        .unwrap();

    let record = analyzer
        .consume_line("7 <... munmap resumed> ) = 0")
        .unwrap()
        .expect("latest pending call should win");
    assert_eq!(record.syscall, "munmap");
}

#[test]
fn resumed_without_pending_call_is_an_error() {
    let mut analyzer = Analyzer::new(AnalyzerOptions::default());
    assert!(matches!(
        analyzer.consume_line("9 <... mmap resumed> ) = 0x7f0000"),
        Err(TraceError::OrphanResume(9))
    ));
}

#[test]
fn missing_pid_defaults_to_process_zero() {
    let analyzer = analyze_ok(
        AnalyzerOptions::default(),
        &["brk(NULL) = 0x600000", "brk(0x601000) = 0x601000"],
    );
    let (pid, ps) = analyzer.engine().processes().next().unwrap();
    assert_eq!(pid, 0);
    assert_eq!(ps.heap(), 4096);
}

#[test]
fn unparseable_line_aborts_without_tolerance() {
    let result = analyze(
        AnalyzerOptions::default(),
        &["brk(NULL) = 0x600000", "+++ exited with 0 +++"],
    );
    assert!(matches!(result, Err(TraceError::UnparseableLine(_))));
}

#[test]
fn tolerance_skips_unparseable_lines_and_keeps_accounting() {
    let analyzer = analyze_ok(
        tolerant(),
        &[
            "brk(NULL) = 0x600000",
            "--- SIGCHLD {si_signo=SIGCHLD} ---",
            "brk(0x601000) = 0x601000",
        ],
    );
    assert_eq!(analyzer.engine().totals().heap(), 4096);
}
