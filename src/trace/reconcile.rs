//! Line reconciliation
//!
//! A tracer following more than one thread interleaves output, splitting a
//! slow call into an `<unfinished ...>` line and a later `<... name
//! resumed>` line. The reconciler buffers unfinished prefixes per pid and
//! stitches the resumed suffix back on, so downstream stages only ever see
//! complete calls.

use std::collections::HashMap;

use super::record::TraceRecord;
use crate::TraceError;

/// Rebuilds complete single-call records from raw trace lines.
#[derive(Debug, Default)]
pub struct LineReconciler {
    /// At most one in-flight call per pid; a second unfinished line for the
    /// same pid replaces the first.
    pending: HashMap<u64, String>,
}

impl LineReconciler {
    /// Create a reconciler with an empty pending buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next raw line of the trace.
    ///
    /// Returns `Ok(None)` when the line only filled the pending buffer,
    /// `Ok(Some(record))` when a complete call was formed. Lines matching
    /// no recognized shape fail; the caller decides whether tolerance
    /// applies.
    pub fn accept(&mut self, line: &str) -> Result<Option<TraceRecord>, TraceError> {
        if let Some((pid, prefix)) = match_unfinished(line) {
            self.pending.insert(pid, format!("{pid} {prefix}"));
            return Ok(None);
        }

        if let Some((pid, suffix)) = match_resumed(line) {
            let buffered = self
                .pending
                .remove(&pid)
                .ok_or(TraceError::OrphanResume(pid))?;
            let synthetic = format!("{buffered}{suffix}");
            return match parse_complete(&synthetic, line) {
                Some(record) => Ok(Some(record)),
                None => Err(TraceError::UnparseableLine(synthetic)),
            };
        }

        match parse_complete(line, line) {
            Some(record) => Ok(Some(record)),
            None => Err(TraceError::UnparseableLine(line.to_string())),
        }
    }

    /// Number of pids with a buffered unfinished call.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }
}

/// Split an optional leading pid off a line.
///
/// A leading digit run counts as a pid only when followed by whitespace;
/// otherwise the whole line is returned untouched and the pid defaults
/// to 0.
fn split_pid(line: &str) -> (u64, &str) {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return (0, line);
    }
    let rest = &line[digits..];
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return (0, line);
    }
    match line[..digits].parse() {
        Ok(pid) => (pid, trimmed),
        Err(_) => (0, line),
    }
}

/// `[pid] prefix <unfinished ...>` — returns the pid and the call prefix.
fn match_unfinished(line: &str) -> Option<(u64, &str)> {
    let body = line
        .trim_end()
        .strip_suffix("<unfinished ...>")?
        .strip_suffix(' ')?;
    Some(split_pid(body))
}

/// `[pid] <... name resumed> suffix` — returns the pid and the suffix.
fn match_resumed(line: &str) -> Option<(u64, &str)> {
    let (pid, rest) = split_pid(line.trim_end());
    let rest = rest.strip_prefix("<... ")?;
    let name = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name == 0 {
        return None;
    }
    let suffix = rest[name..].strip_prefix(" resumed> ")?;
    Some((pid, suffix))
}

/// `[pid] name(args) = result` — the complete-call shape.
///
/// `text` is what gets parsed (possibly a synthetic join of an unfinished
/// prefix and a resumed suffix); `source_line` is the raw line recorded
/// for diagnostics.
fn parse_complete(text: &str, source_line: &str) -> Option<TraceRecord> {
    let (pid, rest) = split_pid(text.trim_end());

    let name_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];

    let body = rest[name_len..].trim_start().strip_prefix('(')?;
    let (args, after) = scan_args(body)?;
    let result = after.trim_start().strip_prefix('=')?;

    Some(TraceRecord {
        pid,
        syscall: name.to_string(),
        args: args.trim().to_string(),
        result: result.trim().to_string(),
        source_line: source_line.trim_end().to_string(),
    })
}

/// Scan to the parenthesis closing the argument list, tolerating nested
/// parentheses, and return the argument text and the remainder.
fn scan_args(body: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, b) in body.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' if depth == 0 => return Some((&body[..i], &body[i + 1..])),
            b')' => depth -= 1,
            _ => {}
        }
    }
    None
}
