// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! C9: the process-wide filtering state (§3 "Process-wide state") plus the
//! per-event pipeline driver (§4.11). Bundled into one owned struct per
//! the Design Notes (§9) instruction to avoid scattered global mutables,
//! so a test (or an embedding tracer that wants more than one filter
//! pipeline) can instantiate more than one independently.

use crate::action::{ActionKind, FilterAction};
use crate::collab::{PathMatcher, SignalTable, SyscallTable, TraceEvent};
use crate::error::Result;
use crate::filter::Filter;
use crate::flags::QualFlags;
use crate::generic_set;
use crate::names::resolve_signal;
use crate::number_set::NumberSet;

#[derive(Debug)]
pub struct FilterContext {
    actions: Vec<FilterAction>,
    next_id: u64,
    /// Bits an event gets OR'd with before any action runs; a bit is
    /// cleared the first time an action of that type is registered and
    /// never set again (§4.8 `add_action`).
    default_flags: QualFlags,
    pub signal_set: NumberSet,
    tracing_paths: bool,
    scratch: Vec<bool>,
    finalised: bool,
}

impl Default for FilterContext {
    fn default() -> Self {
        FilterContext {
            actions: Vec::new(),
            next_id: 0,
            default_flags: QualFlags::default(),
            signal_set: NumberSet::new(),
            tracing_paths: false,
            scratch: Vec::new(),
            finalised: false,
        }
    }
}

impl FilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_flags(&self) -> QualFlags {
        self.default_flags
    }

    pub fn actions(&self) -> &[FilterAction] {
        &self.actions
    }

    /// Unconditionally appends a new action of `kind`, clearing that
    /// type's bit from `default_flags` on first registration.
    fn add_action(&mut self, kind: ActionKind) -> &mut FilterAction {
        self.default_flags.remove(kind.qual_flag());
        let id = self.next_id;
        self.next_id += 1;
        self.actions.push(FilterAction::new(id, kind));
        self.actions.last_mut().expect("just pushed")
    }

    /// `find_or_add_action` (§4.8): reuses the existing action for
    /// argumentless types, always appends for `inject`/`fault`.
    pub fn find_or_add_action(&mut self, kind: ActionKind) -> &mut FilterAction {
        if !kind.takes_args() {
            if let Some(i) = self.actions.iter().position(|a| a.kind == kind) {
                return &mut self.actions[i];
            }
        }
        self.add_action(kind)
    }

    /// Records that path tracing (`-P`) was requested; the pattern itself
    /// is expected to already have been pushed into the shared path set
    /// via the tracer's own `PathSelector`, outside the qualify DSL (§1:
    /// path selection is an external collaborator).
    pub fn request_path_tracing(&mut self) {
        self.tracing_paths = true;
    }

    /// Finalises registration (§4.8): injects a synthetic `trace=all` plus
    /// a `path` filter on the trace action if path tracing was requested,
    /// sorts actions by `(priority asc, id desc)`, and sizes the scratch
    /// buffer. Must be called once, after all qualify-DSL parsing and
    /// before the first `filter_syscall` call.
    pub fn finalise(&mut self, table: &dyn SyscallTable) -> Result<()> {
        if self.tracing_paths {
            if !self.actions.iter().any(|a| a.kind == ActionKind::Trace) {
                let all = Filter::parse_syscall("all", true, table)?;
                self.add_action(ActionKind::Trace).add_filter_qualified(all);
            }
            let action = self.find_or_add_action(ActionKind::Trace);
            action.add_filter_qualified(Filter::parse_path());
        }

        self.actions
            .sort_by(|a, b| a.kind.priority().cmp(&b.kind.priority()).then(b.id.cmp(&a.id)));

        let max_filters = self.actions.iter().map(FilterAction::nfilters).max().unwrap_or(0);
        self.scratch = Vec::with_capacity(max_filters);
        self.finalised = true;
        Ok(())
    }

    /// Replaces the signal set wholesale from `main_part` (`signal=`/`s=`
    /// always resets rather than unions, per the original `qualify_signals`).
    pub fn set_signals(&mut self, main_part: &str, signals: &dyn SignalTable) -> Result<()> {
        self.signal_set = generic_set::parse(main_part, true, "signal", |token| {
            resolve_signal(token, signals).map(|n| n as i64)
        })?;
        Ok(())
    }

    /// The pipeline driver (§4.11): OR `default_flags` into the event,
    /// then run every action in finalised order.
    pub fn filter_syscall(&mut self, event: &mut dyn TraceEvent, table: &dyn SyscallTable, path: &dyn PathMatcher) {
        debug_assert!(self.finalised, "finalise() must run before filter_syscall()");
        *event.qual_flags_mut() |= self.default_flags;
        let scratch = &mut self.scratch;
        for action in &mut self.actions {
            action.run(event, table, path, scratch);
        }
    }
}
