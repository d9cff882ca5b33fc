//! Call interpretation
//!
//! Decodes the argument/result grammar of the four memory-management
//! syscalls into typed operations. Everything else a trace contains —
//! thousands of reads, writes, futexes — is deliberately outside the
//! recognized set.

use crate::trace::{decode, split_args, TraceRecord};
use crate::TraceError;

/// Decoded memory effect of one complete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemOp {
    /// `brk(addr) = brk`: a query (`addr == 0`) reports the break, a set
    /// form moves it.
    Brk {
        /// Requested break address, 0 for the query form.
        addr: i64,
        /// Break address reported by the kernel.
        brk: i64,
    },
    /// A successful `mmap`.
    Mmap {
        /// Base address of the new region (the call result).
        addr: i64,
        /// Region length in bytes.
        length: i64,
        /// Whether `prot` included `PROT_WRITE`.
        writable: bool,
    },
    /// A successful `mremap`.
    Mremap {
        /// Address the region lived at before the move.
        old_addr: i64,
        /// Size before the move.
        old_size: i64,
        /// Size after the move.
        new_size: i64,
        /// Address the region lives at now (the call result).
        new_addr: i64,
    },
    /// A successful `munmap`.
    Munmap {
        /// Base address of the released region.
        addr: i64,
        /// Released length in bytes.
        length: i64,
    },
}

/// Decode one record into its memory effect.
///
/// Recognized calls that change nothing (a failed mmap/mremap/munmap,
/// result −1) decode to `Ok(None)`. Unrecognized syscall names are an
/// error; the caller decides whether tolerance applies.
pub fn interpret(record: &TraceRecord) -> Result<Option<MemOp>, TraceError> {
    match record.syscall.as_str() {
        "brk" => decode_brk(record).map(Some),
        "mmap" => decode_mmap(record),
        "mremap" => decode_mremap(record),
        "munmap" => decode_munmap(record),
        _ => Err(TraceError::UnknownSyscall {
            name: record.syscall.clone(),
            args: record.args.clone(),
        }),
    }
}

/// First whitespace-delimited token of the result text, decoded.
fn primary_result(record: &TraceRecord) -> Result<i64, TraceError> {
    decode(record.result.split_whitespace().next().unwrap_or(""))
}

fn decode_brk(record: &TraceRecord) -> Result<MemOp, TraceError> {
    Ok(MemOp::Brk {
        addr: decode(&record.args)?,
        brk: decode(&record.result)?,
    })
}

fn decode_mmap(record: &TraceRecord) -> Result<Option<MemOp>, TraceError> {
    let addr = primary_result(record)?;
    if addr == -1 {
        return Ok(None);
    }
    let fields = split_args(&record.args);
    let (length, prot) = match fields.as_slice() {
        // addr, length, prot, flags, fd, offset — only length and prot
        // matter here; the tail is passed through untouched.
        [_, length, prot, ..] => (*length, *prot),
        _ => {
            return Err(TraceError::MalformedArguments {
                syscall: "mmap",
                args: record.args.clone(),
            })
        }
    };
    let writable = prot.split('|').any(|flag| flag.trim() == "PROT_WRITE");
    Ok(Some(MemOp::Mmap {
        addr,
        length: decode(length)?,
        writable,
    }))
}

fn decode_mremap(record: &TraceRecord) -> Result<Option<MemOp>, TraceError> {
    let new_addr = primary_result(record)?;
    if new_addr == -1 {
        return Ok(None);
    }
    let fields = split_args(&record.args);
    let (old_addr, old_size, new_size) = match fields.as_slice() {
        [old_addr, old_size, new_size, ..] => (*old_addr, *old_size, *new_size),
        _ => {
            return Err(TraceError::MalformedArguments {
                syscall: "mremap",
                args: record.args.clone(),
            })
        }
    };
    Ok(Some(MemOp::Mremap {
        old_addr: decode(old_addr)?,
        old_size: decode(old_size)?,
        new_size: decode(new_size)?,
        new_addr,
    }))
}

fn decode_munmap(record: &TraceRecord) -> Result<Option<MemOp>, TraceError> {
    if primary_result(record)? == -1 {
        return Ok(None);
    }
    let fields = split_args(&record.args);
    let (addr, length) = match fields.as_slice() {
        [addr, length, ..] => (*addr, *length),
        _ => {
            return Err(TraceError::MalformedArguments {
                syscall: "munmap",
                args: record.args.clone(),
            })
        }
    };
    Ok(Some(MemOp::Munmap {
        addr: decode(addr)?,
        length: decode(length)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(syscall: &str, args: &str, result: &str) -> TraceRecord {
        TraceRecord {
            pid: 0,
            syscall: syscall.to_string(),
            args: args.to_string(),
            result: result.to_string(),
            source_line: format!("{syscall}({args}) = {result}"),
        }
    }

    #[test]
    fn brk_decodes_query_and_set_forms() {
        let op = interpret(&record("brk", "NULL", "0x600000")).unwrap();
        assert_eq!(op, Some(MemOp::Brk { addr: 0, brk: 0x600000 }));

        let op = interpret(&record("brk", "0x601000", "0x601000")).unwrap();
        assert_eq!(
            op,
            Some(MemOp::Brk { addr: 0x601000, brk: 0x601000 })
        );
    }

    #[test]
    fn mmap_reads_protection_flags() {
        let op = interpret(&record(
            "mmap",
            "NULL, 8192, PROT_READ|PROT_WRITE, MAP_PRIVATE|MAP_ANONYMOUS, -1, 0",
            "0x7f0000",
        ))
        .unwrap();
        assert_eq!(
            op,
            Some(MemOp::Mmap { addr: 0x7f0000, length: 8192, writable: true })
        );

        let op = interpret(&record(
            "mmap",
            "NULL, 8192, PROT_READ, MAP_PRIVATE, 3, 0",
            "0x7f2000",
        ))
        .unwrap();
        assert_eq!(
            op,
            Some(MemOp::Mmap { addr: 0x7f2000, length: 8192, writable: false })
        );
    }

    #[test]
    fn failed_calls_decode_to_nothing() {
        let op = interpret(&record(
            "mmap",
            "NULL, 8192, PROT_READ|PROT_WRITE, MAP_PRIVATE, -1, 0",
            "-1 ENOMEM (Cannot allocate memory)",
        ))
        .unwrap();
        assert_eq!(op, None);

        let op = interpret(&record("munmap", "0x7f0000, 8192", "-1 EINVAL (Invalid argument)")).unwrap();
        assert_eq!(op, None);
    }

    #[test]
    fn unknown_syscall_is_an_error() {
        assert!(matches!(
            interpret(&record("open", "\"/etc/passwd\", O_RDONLY", "3")),
            Err(TraceError::UnknownSyscall { .. })
        ));
    }

    #[test]
    fn short_argument_lists_are_malformed() {
        assert!(matches!(
            interpret(&record("munmap", "0x7f0000", "0")),
            Err(TraceError::MalformedArguments { syscall: "munmap", .. })
        ));
    }
}
