// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! C6: `FilterAction` and the static action-type catalogue (§4.8).
//!
//! The "static action-type table" of the original (name, priority,
//! qualifier bit, argument parser, prefilter, apply) is expressed as
//! `ActionKind`, a closed enum whose methods are the per-arm associated
//! capabilities the Design Notes (§9) ask for instead of a table of raw
//! function pointers.

use crate::bool_expr::BoolExpression;
use crate::collab::{PathMatcher, SyscallTable, TraceEvent};
use crate::filter::Filter;
use crate::flags::QualFlags;
use crate::inject::InjectOpts;

/// One row of the action-type catalogue in §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Trace,
    Inject,
    Fault,
    Read,
    Write,
    Raw,
    Abbrev,
    Verbose,
}

impl ActionKind {
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "trace" => Self::Trace,
            "inject" => Self::Inject,
            "fault" => Self::Fault,
            "read" => Self::Read,
            "write" => Self::Write,
            "raw" => Self::Raw,
            "abbrev" => Self::Abbrev,
            "verbose" => Self::Verbose,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Inject => "inject",
            Self::Fault => "fault",
            Self::Read => "read",
            Self::Write => "write",
            Self::Raw => "raw",
            Self::Abbrev => "abbrev",
            Self::Verbose => "verbose",
        }
    }

    /// Priority 0 is highest (§4.8 table).
    pub fn priority(self) -> u8 {
        match self {
            Self::Trace => 0,
            Self::Inject | Self::Fault => 1,
            Self::Read | Self::Write | Self::Raw | Self::Abbrev | Self::Verbose => 2,
        }
    }

    pub fn qual_flag(self) -> QualFlags {
        match self {
            Self::Trace => QualFlags::TRACE,
            Self::Inject | Self::Fault => QualFlags::INJECT,
            Self::Read => QualFlags::READ,
            Self::Write => QualFlags::WRITE,
            Self::Raw => QualFlags::RAW,
            Self::Abbrev => QualFlags::ABBREV,
            Self::Verbose => QualFlags::VERBOSE,
        }
    }

    /// Only `inject`/`fault` take an argument string; every other type
    /// always resolves to the single shared action for that type
    /// (§4.8 `find_or_add_action`).
    pub fn takes_args(self) -> bool {
        matches!(self, Self::Inject | Self::Fault)
    }

    /// `not_injected` for inject/fault, `is_traced` for the dump actions,
    /// no prefilter for `trace` itself (§4.8 table).
    fn passes_prefilter(self, event: &dyn TraceEvent) -> bool {
        match self {
            Self::Trace => true,
            Self::Inject | Self::Fault => !event.qual_flags().contains(QualFlags::INJECT),
            Self::Read | Self::Write | Self::Raw | Self::Abbrev | Self::Verbose => {
                event.qual_flags().contains(QualFlags::TRACE)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum PrivateData {
    #[default]
    None,
    Inject(InjectOpts),
}

/// `(id, type, expression, filters[], private_data)` (§3/§4.8). `id` is
/// assigned once on append and never reused; it is the tie-breaker the
/// finalisation sort (§4.8) uses to make later-declared actions of equal
/// priority win.
#[derive(Debug, Clone)]
pub struct FilterAction {
    pub id: u64,
    pub kind: ActionKind,
    pub expr: BoolExpression,
    pub filters: Vec<Filter>,
    pub private: PrivateData,
    match_count: u32,
}

impl FilterAction {
    pub fn new(id: u64, kind: ActionKind) -> Self {
        FilterAction {
            id,
            kind,
            expr: BoolExpression::new(),
            filters: Vec::new(),
            private: PrivateData::None,
            match_count: 0,
        }
    }

    pub fn nfilters(&self) -> usize {
        self.filters.len()
    }

    /// Appends a filter and folds it into the expression as a new AND
    /// leaf, the effect of `create_filter` + `set_qualify_mode(action, 1)`
    /// in the original qualify front-end (§4.10).
    pub fn add_filter_qualified(&mut self, filter: Filter) {
        self.filters.push(filter);
        self.expr.set_qualify_mode(self.filters.len(), 1);
    }

    /// Runs the prefilter, then every attached filter, then the
    /// expression; applies the action's effect if it evaluates true
    /// (§4.11).
    pub fn run(
        &mut self,
        event: &mut dyn TraceEvent,
        table: &dyn SyscallTable,
        path: &dyn PathMatcher,
        scratch: &mut Vec<bool>,
    ) {
        if !self.kind.passes_prefilter(event) {
            return;
        }
        scratch.clear();
        scratch.extend(self.filters.iter().map(|f| f.run(event, table, path)));
        if self.expr.evaluate(scratch) {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: &mut dyn TraceEvent) {
        match self.kind {
            ActionKind::Inject | ActionKind::Fault => {
                let opts = match &self.private {
                    PrivateData::Inject(opts) => *opts,
                    PrivateData::None => return,
                };
                self.match_count += 1;
                let first = opts.first as u32;
                let step = opts.step as u32;
                let fires = if step == 0 {
                    self.match_count == first
                } else {
                    self.match_count >= first && (self.match_count - first) % step == 0
                };
                if fires {
                    *event.qual_flags_mut() |= QualFlags::INJECT;
                    event.record_injection(opts);
                }
            }
            _ => {
                *event.qual_flags_mut() |= self.kind.qual_flag();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::QualFlags;
    use crate::testutil::{FakeEvent, FakePathSet, FakeSyscallTable};

    #[test]
    fn inject_fires_on_when_f_plus_s_sequence() {
        let table = FakeSyscallTable::default();
        let path = FakePathSet::default();
        let mut action = FilterAction::new(0, ActionKind::Inject);
        action.add_filter_qualified(Filter::parse_syscall("read", true, &table).unwrap());
        action.private = PrivateData::Inject(InjectOpts {
            first: 3,
            step: 2,
            rval: -5,
            signo: 0,
            initialised: true,
        });

        let mut scratch = Vec::new();
        let mut fire_counts = Vec::new();
        for i in 1..=7u32 {
            let mut event = FakeEvent::new(table.read_nr, 0, vec![]);
            action.run(&mut event, &table, &path, &mut scratch);
            if event.qual_flags().contains(QualFlags::INJECT) {
                fire_counts.push(i);
            }
        }
        assert_eq!(fire_counts, vec![3, 5, 7]);
    }

    #[test]
    fn not_injected_prefilter_blocks_second_inject_action_same_event() {
        let table = FakeSyscallTable::default();
        let path = FakePathSet::default();
        let mut action = FilterAction::new(0, ActionKind::Fault);
        action.add_filter_qualified(Filter::parse_syscall("read", true, &table).unwrap());
        action.private = PrivateData::Inject(InjectOpts {
            first: 1,
            step: 1,
            rval: -5,
            signo: 0,
            initialised: true,
        });
        let mut scratch = Vec::new();
        let mut event = FakeEvent::new(table.read_nr, 0, vec![]);
        event.qual_flags_mut().insert(QualFlags::INJECT);
        action.run(&mut event, &table, &path, &mut scratch);
        // match_count must not have advanced: the prefilter rejected before
        // the expression (and therefore the counter) was ever touched.
        assert_eq!(action.match_count, 0);
    }

    #[test]
    fn dump_actions_require_trace_bit_first() {
        let table = FakeSyscallTable::default();
        let path = FakePathSet::default();
        let mut action = FilterAction::new(0, ActionKind::Abbrev);
        action.add_filter_qualified(Filter::parse_syscall("read", true, &table).unwrap());
        let mut scratch = Vec::new();

        let mut untraced = FakeEvent::new(table.read_nr, 0, vec![]);
        action.run(&mut untraced, &table, &path, &mut scratch);
        assert!(!untraced.qual_flags().contains(QualFlags::ABBREV));

        let mut traced = FakeEvent::new(table.read_nr, 0, vec![]);
        traced.qual_flags_mut().insert(QualFlags::TRACE);
        action.run(&mut traced, &table, &path, &mut scratch);
        assert!(traced.qual_flags().contains(QualFlags::ABBREV));
    }
}
