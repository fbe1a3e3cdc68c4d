// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reference collaborator implementations used by this crate's own test
//! suite (§0). A real tracer supplies its own `SyscallTable`/`TraceEvent`/
//! path types; these exist only so `syscall_set`, `filter`, `action` and
//! `context` have something concrete to parse and evaluate against.

use std::collections::HashMap;

use crate::collab::{PathMatcher, PathSelector, Semantic, SyscallTable, TraceEvent};
use crate::error::Result;
use crate::flags::{QualFlags, SyscallFlags};

struct Entry {
    name: Option<&'static str>,
    flags: SyscallFlags,
    semantic: Option<Semantic>,
}

/// A single-personality syscall table with just enough entries to drive
/// the scenarios in §8: `open`/`openat`/`close`/`unlink` flagged
/// `TRACE_FILE`, `read`/`write` flagged `TRACE_DESC`, and the two
/// message-queue syscalls that are *not* flagged `TRACE_DESC` but still
/// carry a descriptor in argument 0.
pub struct FakeSyscallTable {
    entries: HashMap<usize, Entry>,
    nsyscalls: usize,
    pub read_nr: usize,
    pub write_nr: usize,
    pub open_nr: usize,
    pub openat_nr: usize,
    pub close_nr: usize,
    pub unlink_nr: usize,
    pub mq_timedsend_nr: usize,
    pub mq_timedreceive_nr: usize,
}

impl Default for FakeSyscallTable {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert(0, Entry { name: Some("read"), flags: SyscallFlags::TRACE_DESC, semantic: None });
        entries.insert(1, Entry { name: Some("write"), flags: SyscallFlags::TRACE_DESC, semantic: None });
        entries.insert(2, Entry { name: Some("open"), flags: SyscallFlags::TRACE_FILE.union(SyscallFlags::TRACE_DESC), semantic: None });
        entries.insert(3, Entry { name: Some("close"), flags: SyscallFlags::TRACE_FILE.union(SyscallFlags::TRACE_DESC), semantic: None });
        entries.insert(5, Entry { name: Some("unlink"), flags: SyscallFlags::TRACE_FILE, semantic: None });
        entries.insert(257, Entry { name: Some("openat"), flags: SyscallFlags::TRACE_FILE.union(SyscallFlags::TRACE_DESC), semantic: None });
        entries.insert(243, Entry { name: Some("mq_timedsend"), flags: SyscallFlags::empty(), semantic: Some(Semantic::MqTimedSend) });
        entries.insert(244, Entry { name: Some("mq_timedreceive"), flags: SyscallFlags::empty(), semantic: Some(Semantic::MqTimedReceive) });

        FakeSyscallTable {
            entries,
            nsyscalls: 300,
            read_nr: 0,
            write_nr: 1,
            open_nr: 2,
            openat_nr: 257,
            close_nr: 3,
            unlink_nr: 5,
            mq_timedsend_nr: 243,
            mq_timedreceive_nr: 244,
        }
    }
}

impl SyscallTable for FakeSyscallTable {
    fn personalities(&self) -> usize {
        1
    }

    fn nsyscalls(&self, _personality: usize) -> usize {
        self.nsyscalls
    }

    fn name(&self, _personality: usize, nr: usize) -> Option<&str> {
        self.entries.get(&nr).and_then(|e| e.name)
    }

    fn flags(&self, _personality: usize, nr: usize) -> SyscallFlags {
        self.entries.get(&nr).map(|e| e.flags).unwrap_or(SyscallFlags::empty())
    }

    fn semantic(&self, _personality: usize, nr: usize) -> Option<Semantic> {
        self.entries.get(&nr).and_then(|e| e.semantic)
    }
}

/// A minimal `TraceEvent` backed by a fixed argument vector.
pub struct FakeEvent {
    nr: usize,
    personality: usize,
    args: Vec<u64>,
    qual: QualFlags,
    pub injected: Vec<crate::inject::InjectOpts>,
}

impl FakeEvent {
    pub fn new(nr: usize, personality: usize, args: Vec<u64>) -> Self {
        FakeEvent { nr, personality, args, qual: QualFlags::empty(), injected: Vec::new() }
    }
}

impl TraceEvent for FakeEvent {
    fn syscall_number(&self) -> usize {
        self.nr
    }

    fn personality(&self) -> usize {
        self.personality
    }

    fn arg(&self, index: usize) -> u64 {
        self.args.get(index).copied().unwrap_or(0)
    }

    fn qual_flags_mut(&mut self) -> &mut QualFlags {
        &mut self.qual
    }

    fn qual_flags(&self) -> QualFlags {
        self.qual
    }

    fn record_injection(&mut self, opts: crate::inject::InjectOpts) {
        self.injected.push(opts);
    }
}

/// A trivial path set: `select` records literal strings, `matches` tests
/// the event's syscall number against a caller-supplied association. Real
/// path tracing (glob/subpath semantics) lives entirely in the tracer;
/// this is only enough to exercise `inject_path_tracing` (§4.8).
#[derive(Default)]
pub struct FakePathSet {
    selected: Vec<String>,
}

impl PathSelector for FakePathSet {
    fn select(&mut self, pattern: &str) -> Result<()> {
        self.selected.push(pattern.to_string());
        Ok(())
    }
}

impl PathMatcher for FakePathSet {
    fn matches(&self, _event: &dyn TraceEvent) -> bool {
        !self.selected.is_empty()
    }
}
