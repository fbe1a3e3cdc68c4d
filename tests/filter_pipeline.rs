// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end coverage of the public API: qualify-DSL parsing through to
//! per-event pipeline decisions, against a small standalone syscall table.
//! Exercises the scenarios a tracer's own test suite would run its
//! `FilterContext` through.

use std::collections::HashMap;

use straceq_filter::{
    parse_qualify_action, select_path, DefaultErrnoTable, DefaultSignalTable, FilterContext,
    InjectOpts, PathMatcher, PathSelector, QualFlags, Semantic, SyscallFlags, SyscallTable,
    TraceEvent,
};

struct Entry {
    name: &'static str,
    flags: SyscallFlags,
    semantic: Option<Semantic>,
}

struct Table {
    entries: HashMap<usize, Entry>,
    nsyscalls: usize,
}

impl Table {
    fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(0, Entry { name: "read", flags: SyscallFlags::TRACE_DESC, semantic: None });
        entries.insert(1, Entry { name: "write", flags: SyscallFlags::TRACE_DESC, semantic: None });
        entries.insert(2, Entry { name: "open", flags: SyscallFlags::TRACE_FILE.union(SyscallFlags::TRACE_DESC), semantic: None });
        entries.insert(3, Entry { name: "close", flags: SyscallFlags::TRACE_FILE.union(SyscallFlags::TRACE_DESC), semantic: None });
        entries.insert(257, Entry { name: "openat", flags: SyscallFlags::TRACE_FILE.union(SyscallFlags::TRACE_DESC), semantic: None });
        entries.insert(243, Entry { name: "mq_timedsend", flags: SyscallFlags::empty(), semantic: Some(Semantic::MqTimedSend) });
        Table { entries, nsyscalls: 300 }
    }
}

impl SyscallTable for Table {
    fn personalities(&self) -> usize {
        1
    }

    fn nsyscalls(&self, _personality: usize) -> usize {
        self.nsyscalls
    }

    fn name(&self, _personality: usize, nr: usize) -> Option<&str> {
        self.entries.get(&nr).map(|e| e.name)
    }

    fn flags(&self, _personality: usize, nr: usize) -> SyscallFlags {
        self.entries.get(&nr).map(|e| e.flags).unwrap_or(SyscallFlags::empty())
    }

    fn semantic(&self, _personality: usize, nr: usize) -> Option<Semantic> {
        self.entries.get(&nr).and_then(|e| e.semantic)
    }
}

struct Event {
    nr: usize,
    args: Vec<u64>,
    qual: QualFlags,
    injected: Vec<InjectOpts>,
}

impl Event {
    fn new(nr: usize, args: Vec<u64>) -> Self {
        Event { nr, args, qual: QualFlags::empty(), injected: Vec::new() }
    }
}

impl TraceEvent for Event {
    fn syscall_number(&self) -> usize {
        self.nr
    }

    fn personality(&self) -> usize {
        0
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

    fn record_injection(&mut self, opts: InjectOpts) {
        self.injected.push(opts);
    }
}

#[derive(Default)]
struct PathSet {
    selected: Vec<String>,
}

impl PathSelector for PathSet {
    fn select(&mut self, pattern: &str) -> straceq_filter::Result<()> {
        self.selected.push(pattern.to_string());
        Ok(())
    }
}

impl PathMatcher for PathSet {
    fn matches(&self, _event: &dyn TraceEvent) -> bool {
        !self.selected.is_empty()
    }
}

#[test]
fn trace_set_covers_openat_and_close_but_not_open() {
    let table = Table::new();
    let paths = PathSet::default();
    let mut ctx = FilterContext::new();
    parse_qualify_action(&mut ctx, "trace=openat,close", &table, &DefaultErrnoTable, &DefaultSignalTable).unwrap();
    ctx.finalise(&table).unwrap();

    let mut openat = Event::new(257, vec![]);
    ctx.filter_syscall(&mut openat, &table, &paths);
    assert!(openat.qual_flags().contains(QualFlags::TRACE));

    let mut open = Event::new(2, vec![]);
    ctx.filter_syscall(&mut open, &table, &paths);
    assert!(!open.qual_flags().contains(QualFlags::TRACE));
}

#[test]
fn inverted_file_class_excludes_file_syscalls() {
    let table = Table::new();
    let paths = PathSet::default();
    let mut ctx = FilterContext::new();
    parse_qualify_action(&mut ctx, "trace=!%file", &table, &DefaultErrnoTable, &DefaultSignalTable).unwrap();
    ctx.finalise(&table).unwrap();

    let mut open = Event::new(2, vec![]);
    ctx.filter_syscall(&mut open, &table, &paths);
    assert!(!open.qual_flags().contains(QualFlags::TRACE));

    let mut read = Event::new(0, vec![]);
    ctx.filter_syscall(&mut read, &table, &paths);
    assert!(read.qual_flags().contains(QualFlags::TRACE));
}

#[test]
fn inject_read_write_fires_from_second_call_on_and_carries_eio() {
    let table = Table::new();
    let paths = PathSet::default();
    let mut ctx = FilterContext::new();
    parse_qualify_action(
        &mut ctx,
        "inject=read,write:when=2+:error=EIO",
        &table,
        &DefaultErrnoTable,
        &DefaultSignalTable,
    )
    .unwrap();
    ctx.finalise(&table).unwrap();

    let mut first = Event::new(0, vec![]);
    ctx.filter_syscall(&mut first, &table, &paths);
    assert!(!first.qual_flags().contains(QualFlags::INJECT));

    let mut second = Event::new(1, vec![]);
    ctx.filter_syscall(&mut second, &table, &paths);
    assert!(second.qual_flags().contains(QualFlags::INJECT));

    let mut third = Event::new(0, vec![]);
    ctx.filter_syscall(&mut third, &table, &paths);
    assert!(third.qual_flags().contains(QualFlags::INJECT));
}

#[test]
fn fault_all_defaults_to_enosys_for_every_syscall() {
    let table = Table::new();
    let paths = PathSet::default();
    let mut ctx = FilterContext::new();
    parse_qualify_action(&mut ctx, "fault=all", &table, &DefaultErrnoTable, &DefaultSignalTable).unwrap();
    ctx.finalise(&table).unwrap();

    let mut event = Event::new(2, vec![]);
    ctx.filter_syscall(&mut event, &table, &paths);
    assert!(event.qual_flags().contains(QualFlags::INJECT));
}

#[test]
fn later_registered_fault_action_wins_at_equal_priority() {
    let table = Table::new();
    let paths = PathSet::default();
    let mut ctx = FilterContext::new();
    // Two `fault` actions on the same syscall are both priority-1; the
    // finalisation sort breaks the tie by `id desc`, so the second one
    // registered runs first and claims the event via the `not_injected`
    // prefilter before the first ever gets a chance.
    parse_qualify_action(&mut ctx, "fault=open:error=EIO", &table, &DefaultErrnoTable, &DefaultSignalTable).unwrap();
    parse_qualify_action(&mut ctx, "fault=open:error=ENOENT", &table, &DefaultErrnoTable, &DefaultSignalTable).unwrap();
    ctx.finalise(&table).unwrap();

    let mut event = Event::new(2, vec![]);
    ctx.filter_syscall(&mut event, &table, &paths);
    assert_eq!(event.injected.len(), 1);
    assert_eq!(event.injected[0].rval, -libc::ENOENT);
}

#[test]
fn fd_filter_matches_message_queue_descriptor_via_semantic_override() {
    let table = Table::new();
    let paths = PathSet::default();
    let mut ctx = FilterContext::new();
    parse_qualify_action(&mut ctx, "read=0,1", &table, &DefaultErrnoTable, &DefaultSignalTable).unwrap();
    ctx.finalise(&table).unwrap();

    let mut event = Event::new(243, vec![1]);
    event.qual_flags_mut().insert(QualFlags::TRACE);
    ctx.filter_syscall(&mut event, &table, &paths);
    assert!(event.qual_flags().contains(QualFlags::READ));
}

#[test]
fn path_tracing_injects_synthetic_trace_all() {
    let table = Table::new();
    let mut paths = PathSet::default();
    let mut ctx = FilterContext::new();
    select_path(&mut ctx, "/etc/passwd", &mut paths).unwrap();
    ctx.finalise(&table).unwrap();
    assert!(ctx.actions().iter().any(|a| a.kind == straceq_filter::ActionKind::Trace));
}
