//! Report rendering
//!
//! Fixed-width report lines pairing raw byte counts with binary-scaled
//! (multiple-of-1024) renderings, plus the unbalanced-mappings listing.

use std::io::{self, Write};

use crate::accounting::LiveMappings;

const SUFFIXES: [char; 9] = [' ', 'k', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Render `value` scaled by powers of `multiple` with three significant
/// digits and a suffix. Zero renders as `"0 "`; the unscaled suffix is a
/// space so columns stay aligned.
pub fn scaled(value: i64, multiple: f64) -> String {
    if value == 0 {
        return "0 ".to_string();
    }
    let sign = if value < 0 { "-" } else { "" };
    let mut nb = (value as f64).abs();
    for suffix in SUFFIXES {
        if nb < multiple {
            return format!("{sign}{}{suffix}", three_digits(nb));
        }
        nb /= multiple;
    }
    format!("{sign}{}Y", three_digits(nb))
}

/// Three significant digits, trailing zeros trimmed.
fn three_digits(x: f64) -> String {
    let mut s = if x >= 100.0 {
        format!("{x:.0}")
    } else if x >= 10.0 {
        format!("{x:.1}")
    } else {
        format!("{x:.2}")
    };
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// Render one report line for `title` (truncated to ten characters).
pub fn report_line(title: &str, heap: i64, mapped: i64, vm: i64) -> String {
    let title: String = title.chars().take(10).collect();
    format!(
        "{:>10}: heap {:>10} {:>8} mmap {:>10} {:>8} vm {:>10} {:>8}",
        title,
        heap,
        paren(heap),
        mapped,
        paren(mapped),
        vm,
        paren(vm),
    )
}

fn paren(value: i64) -> String {
    format!("({})", scaled(value, 1024.0))
}

/// Write one report line.
pub fn write_report<W: Write>(
    w: &mut W,
    title: &str,
    heap: i64,
    mapped: i64,
    vm: i64,
) -> io::Result<()> {
    writeln!(w, "{}", report_line(title, heap, mapped, vm))
}

/// Write every surviving mapping with the full history of the lines that
/// created and moved it.
pub fn write_unbalanced<W: Write>(w: &mut W, mappings: &LiveMappings) -> io::Result<()> {
    writeln!(w, "Unbalanced: ")?;
    for (addr, history) in mappings.iter() {
        let mut lines = history.iter();
        if let Some(first) = lines.next() {
            writeln!(w, "0x{addr:16x} {first}")?;
        }
        for line in lines {
            writeln!(w, "{:19}{line}", "")?;
        }
    }
    Ok(())
}
