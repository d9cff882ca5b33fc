//! Per-process memory totals

use super::mappings::LiveMappings;

/// Running heap/mapped/vm totals for one traced pid.
///
/// `vm` is always `heap + mapped`, recomputed after every mutation; the
/// `*_max` fields are running maxima and never decrease.
#[derive(Debug, Default)]
pub struct ProcessStats {
    /// Break address established by the first query-form `brk`.
    heap_base: Option<i64>,
    /// Most recently reported break address.
    heap_cur: i64,

    heap: i64,
    heap_max: i64,
    mapped: i64,
    mapped_max: i64,
    vm: i64,
    vm_max: i64,
}

impl ProcessStats {
    /// Fresh state for a newly seen pid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current heap bytes.
    pub fn heap(&self) -> i64 {
        self.heap
    }

    /// Peak heap bytes.
    pub fn heap_max(&self) -> i64 {
        self.heap_max
    }

    /// Current mapped bytes.
    pub fn mapped(&self) -> i64 {
        self.mapped
    }

    /// Peak mapped bytes.
    pub fn mapped_max(&self) -> i64 {
        self.mapped_max
    }

    /// Current virtual-memory bytes (heap + mapped).
    pub fn vm(&self) -> i64 {
        self.vm
    }

    /// Peak virtual-memory bytes.
    pub fn vm_max(&self) -> i64 {
        self.vm_max
    }

    fn update_vm(&mut self) {
        self.vm = self.heap + self.mapped;
        self.vm_max = self.vm_max.max(self.vm);
    }

    /// Apply a `brk` call: the query form (`addr == 0`) establishes the
    /// baseline, the set form moves the break and resizes the heap
    /// relative to it.
    ///
    /// A set form seen before any query also establishes the baseline, so
    /// a trace captured mid-run starts at zero instead of a bogus offset.
    pub fn brk(&mut self, addr: i64, brk: i64) {
        if addr == 0 {
            self.heap_base = Some(brk);
            self.heap_cur = brk;
        } else {
            self.heap_cur = brk;
            let base = *self.heap_base.get_or_insert(brk);
            self.heap = brk - base;
            self.heap_max = self.heap_max.max(self.heap);
        }
        self.update_vm();
    }

    /// Apply a successful `mmap`. `counted` reflects the mapping policy
    /// (writable regions, or everything when counting all); uncounted
    /// regions leave the totals and the table untouched.
    pub fn mmap(
        &mut self,
        addr: i64,
        length: i64,
        counted: bool,
        mappings: &mut LiveMappings,
        line: &str,
    ) {
        if counted {
            self.mapped += length;
            self.mapped_max = self.mapped_max.max(self.mapped);
            mappings.record(addr, line);
        }
        self.update_vm();
    }

    /// Apply a successful `mremap`. A move of a region the table never
    /// tracked (created read-only, say) stays untracked.
    pub fn mremap(
        &mut self,
        old_addr: i64,
        old_size: i64,
        new_size: i64,
        new_addr: i64,
        mappings: &mut LiveMappings,
        line: &str,
    ) {
        let Some(history) = mappings.remove(old_addr) else {
            return;
        };
        self.mapped += new_size - old_size;
        self.mapped_max = self.mapped_max.max(self.mapped);
        mappings.transfer(new_addr, history, line);
        self.update_vm();
    }

    /// Apply a successful `munmap`. Untracked addresses release nothing.
    pub fn munmap(&mut self, addr: i64, length: i64, mappings: &mut LiveMappings) {
        if mappings.remove(addr).is_some() {
            self.mapped -= length;
        }
        self.update_vm();
    }
}
