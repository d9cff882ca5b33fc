//! Numeric-literal decoding shared by all syscall handlers
//!
//! Tracers print pointers and results in a mix of conventions: `NULL`,
//! `0x`-prefixed hex, `0`-prefixed octal, and plain decimal.

use crate::TraceError;

/// Decode one numeric literal as a tracer prints it.
///
/// `"NULL"` is zero; `0x…` is hexadecimal; a leading `0` followed by more
/// digits is octal; anything else (including negatives) is decimal.
pub fn decode(text: &str) -> Result<i64, TraceError> {
    let s = text.trim();
    if s == "NULL" {
        return Ok(0);
    }
    if let Some(hex) = s.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16)
            .map(|v| v as i64)
            .map_err(|_| TraceError::MalformedNumeric(s.to_string()));
    }
    if s.len() > 1 && s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit()) {
        return i64::from_str_radix(s, 8)
            .map_err(|_| TraceError::MalformedNumeric(s.to_string()));
    }
    s.parse::<i64>()
        .map_err(|_| TraceError::MalformedNumeric(s.to_string()))
}

/// Split argument text on top-level commas.
///
/// Commas inside one level of parentheses, brackets, or braces (strace
/// renders structs and arrays inline) do not split. Fields are trimmed.
pub fn split_args(args: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in args.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                fields.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(args[start..].trim());
    fields
}
