use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use memtrace::{report, Analyzer, AnalyzerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "memtrace",
    about = "Reconstruct per-process memory usage timelines from a syscall trace log"
)]
struct Cli {
    /// Trace file captured from the syscall tracer.
    trace_file: PathBuf,

    /// Ignore unknown lines and system calls.
    #[arg(long)]
    ignore_unknown: bool,

    /// Print details for all subprocesses.
    #[arg(long)]
    verbose: bool,

    /// Include read-only maps in the count.
    #[arg(long)]
    all: bool,

    /// Display current counts as well.
    #[arg(long)]
    current: bool,

    /// Display unbalanced mmap/munmap calls.
    #[arg(long)]
    unbalanced: bool,

    /// Print debugging information.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut analyzer = Analyzer::new(AnalyzerOptions {
        ignore_unknown: cli.ignore_unknown,
        count_all: cli.all,
    });

    let reader = BufReader::new(File::open(&cli.trace_file).with_context(|| {
        format!("failed to open trace file {}", cli.trace_file.display())
    })?);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut records = 0usize;

    for line in reader.lines() {
        let line = line.context("failed to read trace line")?;
        let Some(record) = analyzer.consume_line(&line)? else {
            continue;
        };
        records += 1;

        if cli.debug {
            writeln!(
                out,
                "{:?}",
                (record.pid, &record.syscall, &record.args, &record.result)
            )?;
            let totals = analyzer.engine().totals();
            report::write_report(
                &mut out,
                &format!("cur_{records}"),
                totals.heap(),
                totals.mapped(),
                totals.vm(),
            )?;
            report::write_report(
                &mut out,
                &format!("max_{records}"),
                totals.heap_max(),
                totals.mapped_max(),
                totals.vm_max(),
            )?;
        }
    }

    if cli.verbose {
        for (pid, ps) in analyzer.engine().processes() {
            if cli.current {
                report::write_report(
                    &mut out,
                    &format!("cur_{pid}"),
                    ps.heap(),
                    ps.mapped(),
                    ps.vm(),
                )?;
            }
            report::write_report(
                &mut out,
                &format!("max_{pid}"),
                ps.heap_max(),
                ps.mapped_max(),
                ps.vm_max(),
            )?;
        }
    }

    let totals = analyzer.engine().totals();
    if cli.current {
        report::write_report(&mut out, "current", totals.heap(), totals.mapped(), totals.vm())?;
    }
    report::write_report(
        &mut out,
        "max",
        totals.heap_max(),
        totals.mapped_max(),
        totals.vm_max(),
    )?;

    if cli.unbalanced {
        report::write_unbalanced(&mut out, analyzer.engine().mappings())?;
    }

    Ok(())
}
