//! Memory accounting across processes
//!
//! Applies decoded syscall effects to the owning pid's totals and folds
//! each change into the session-wide aggregate as a delta, keeping the
//! bookkeeping O(1) per call regardless of process count.

mod mappings;
mod process;

pub use mappings::LiveMappings;
pub use process::ProcessStats;

use std::collections::BTreeMap;

use crate::interpret::MemOp;

/// Session-wide totals summed over every traced pid.
///
/// Current values are maintained as deltas of per-process changes; the
/// maxima are running maxima of the aggregate itself, not sums of
/// per-process maxima.
#[derive(Debug, Default)]
pub struct AggregateStats {
    heap: i64,
    mapped: i64,
    vm: i64,
    heap_max: i64,
    mapped_max: i64,
    vm_max: i64,
}

impl AggregateStats {
    /// Current heap bytes across all processes.
    pub fn heap(&self) -> i64 {
        self.heap
    }

    /// Peak aggregate heap bytes.
    pub fn heap_max(&self) -> i64 {
        self.heap_max
    }

    /// Current mapped bytes across all processes.
    pub fn mapped(&self) -> i64 {
        self.mapped
    }

    /// Peak aggregate mapped bytes.
    pub fn mapped_max(&self) -> i64 {
        self.mapped_max
    }

    /// Current virtual-memory bytes across all processes.
    pub fn vm(&self) -> i64 {
        self.vm
    }

    /// Peak aggregate virtual-memory bytes.
    pub fn vm_max(&self) -> i64 {
        self.vm_max
    }

    fn roll_max(&mut self) {
        self.heap_max = self.heap_max.max(self.heap);
        self.mapped_max = self.mapped_max.max(self.mapped);
        self.vm_max = self.vm_max.max(self.vm);
    }
}

/// Accounting engine: per-pid state, the shared live-mapping table, and
/// the aggregate.
#[derive(Debug, Default)]
pub struct AccountingEngine {
    count_all: bool,
    processes: BTreeMap<u64, ProcessStats>,
    mappings: LiveMappings,
    totals: AggregateStats,
}

impl AccountingEngine {
    /// Create an engine. `count_all` widens the mmap policy from writable
    /// regions to every region.
    pub fn new(count_all: bool) -> Self {
        Self {
            count_all,
            ..Self::default()
        }
    }

    /// Ensure state exists for `pid`, creating it on first reference.
    ///
    /// Every complete record registers its pid, even when the call turns
    /// out to have no memory effect, so reports list every process seen.
    pub fn touch(&mut self, pid: u64) {
        self.processes.entry(pid).or_default();
    }

    /// Apply one decoded call to `pid`'s totals and fold the change into
    /// the aggregate.
    pub fn apply(&mut self, pid: u64, op: MemOp, source_line: &str) {
        let ps = self.processes.entry(pid).or_default();
        let (heap, mapped, vm) = (ps.heap(), ps.mapped(), ps.vm());

        match op {
            MemOp::Brk { addr, brk } => ps.brk(addr, brk),
            MemOp::Mmap { addr, length, writable } => {
                let counted = self.count_all || writable;
                ps.mmap(addr, length, counted, &mut self.mappings, source_line);
            }
            MemOp::Mremap {
                old_addr,
                old_size,
                new_size,
                new_addr,
            } => ps.mremap(
                old_addr,
                old_size,
                new_size,
                new_addr,
                &mut self.mappings,
                source_line,
            ),
            MemOp::Munmap { addr, length } => ps.munmap(addr, length, &mut self.mappings),
        }

        self.totals.heap += ps.heap() - heap;
        self.totals.mapped += ps.mapped() - mapped;
        self.totals.vm += ps.vm() - vm;
        self.totals.roll_max();
    }

    /// Aggregate totals.
    pub fn totals(&self) -> &AggregateStats {
        &self.totals
    }

    /// Per-process states in pid order.
    pub fn processes(&self) -> impl Iterator<Item = (u64, &ProcessStats)> + '_ {
        self.processes.iter().map(|(pid, ps)| (*pid, ps))
    }

    /// The shared live-mapping table.
    pub fn mappings(&self) -> &LiveMappings {
        &self.mappings
    }
}
