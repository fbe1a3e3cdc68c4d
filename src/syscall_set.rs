// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! C2: parses one comma-separated filter list into a per-personality
//! `NumberSet` array — numeric, regex, class (`%file`, `desc`, ...), name,
//! `all`, `none`, `?` (ignore-unknown) and `!` (invert) tokens (§4.2).

use regex::Regex;

use crate::collab::SyscallTable;
use crate::error::{FilterError, Result};
use crate::flags::SyscallFlags;
use crate::number_set::NumberSet;

/// One `NumberSet` per personality the supplied `SyscallTable` reports.
/// All entries share identical `invert` state after parsing (§3): every
/// `!` flips each personality's slot in lockstep.
#[derive(Debug, Clone, Default)]
pub struct PerPersonalitySyscallSet {
    sets: Vec<NumberSet>,
}

impl PerPersonalitySyscallSet {
    pub fn get(&self, personality: usize) -> Option<&NumberSet> {
        self.sets.get(personality)
    }
}

const CLASSES: &[(&str, SyscallFlags, bool)] = &[
    // (name, flags, qualify_mode_only)
    ("desc", SyscallFlags::TRACE_DESC, true),
    ("file", SyscallFlags::TRACE_FILE, true),
    ("memory", SyscallFlags::TRACE_MEMORY, true),
    ("process", SyscallFlags::TRACE_PROCESS, true),
    ("signal", SyscallFlags::TRACE_SIGNAL, true),
    ("ipc", SyscallFlags::TRACE_IPC, true),
    ("network", SyscallFlags::TRACE_NETWORK, true),
    ("%desc", SyscallFlags::TRACE_DESC, false),
    ("%file", SyscallFlags::TRACE_FILE, false),
    ("%memory", SyscallFlags::TRACE_MEMORY, false),
    ("%process", SyscallFlags::TRACE_PROCESS, false),
    ("%signal", SyscallFlags::TRACE_SIGNAL, false),
    ("%ipc", SyscallFlags::TRACE_IPC, false),
    ("%network", SyscallFlags::TRACE_NETWORK, false),
    ("%stat", SyscallFlags::TRACE_STAT, false),
    ("%lstat", SyscallFlags::TRACE_LSTAT, false),
    ("%fstat", SyscallFlags::TRACE_FSTAT, false),
    ("%%stat", SyscallFlags::TRACE_STAT_LIKE, false),
    ("%statfs", SyscallFlags::TRACE_STATFS, false),
    ("%fstatfs", SyscallFlags::TRACE_FSTATFS, false),
    ("%%statfs", SyscallFlags::TRACE_STATFS_LIKE, false),
];

fn lookup_class(s: &str, qualify_mode: bool) -> Option<SyscallFlags> {
    for &(name, flags, qualify_only) in CLASSES {
        if qualify_only && !qualify_mode {
            continue;
        }
        if name == s {
            return Some(flags);
        }
    }
    None
}

fn parse_number(s: &str, table: &dyn SyscallTable, out: &mut PerPersonalitySyscallSet) -> bool {
    let Ok(n) = s.parse::<usize>() else { return false };
    let mut done = false;
    for p in 0..table.personalities() {
        if n >= table.nsyscalls(p) {
            continue;
        }
        out.sets[p].add(n);
        done = true;
    }
    done
}

fn parse_regex(pattern: &str, table: &dyn SyscallTable, out: &mut PerPersonalitySyscallSet) -> Result<bool> {
    let re = Regex::new(pattern).map_err(|e| FilterError::Regex {
        op: "compile",
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut found = false;
    for p in 0..table.personalities() {
        for i in 0..table.nsyscalls(p) {
            let Some(name) = table.name(p, i) else { continue };
            if re.is_match(name) {
                out.sets[p].add(i);
                found = true;
            }
        }
    }
    Ok(found)
}

fn parse_class(token: &str, qualify_mode: bool, table: &dyn SyscallTable, out: &mut PerPersonalitySyscallSet) -> bool {
    let Some(class) = lookup_class(token, qualify_mode) else { return false };
    for p in 0..table.personalities() {
        for i in 0..table.nsyscalls(p) {
            if table.name(p, i).is_none() {
                continue;
            }
            if table.flags(p, i).contains(class) {
                out.sets[p].add(i);
            }
        }
    }
    true
}

fn parse_name(token: &str, table: &dyn SyscallTable, out: &mut PerPersonalitySyscallSet) -> bool {
    let mut found = false;
    for p in 0..table.personalities() {
        for i in 0..table.nsyscalls(p) {
            if table.name(p, i) == Some(token) {
                out.sets[p].add(i);
                found = true;
            }
        }
    }
    found
}

/// Token parser (§4.2): strips `?` prefixes, then tries number, regex,
/// class, then plain name in that order.
fn parse_token(token: &str, qualify_mode: bool, table: &dyn SyscallTable, out: &mut PerPersonalitySyscallSet) -> Result<bool> {
    let stripped = token.trim_start_matches('?');
    let ignore_fail = stripped.len() != token.len();

    let matched = if stripped.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        parse_number(stripped, table, out)
    } else if let Some(rest) = stripped.strip_prefix('/') {
        parse_regex(rest, table, out)?
    } else {
        parse_class(stripped, qualify_mode, table, out) || parse_name(stripped, table, out)
    };

    if !matched && ignore_fail {
        log::debug!("ignoring unresolvable syscall token '{}'", stripped);
    }
    Ok(matched || ignore_fail)
}

/// Parses `str` (one comma-separated list, optionally qualify-mode) into a
/// fresh `PerPersonalitySyscallSet` (§4.2).
pub fn parse(str: &str, qualify_mode: bool, table: &dyn SyscallTable) -> Result<PerPersonalitySyscallSet> {
    let mut out = PerPersonalitySyscallSet {
        sets: vec![NumberSet::new(); table.personalities()],
    };

    let mut s = str;
    if qualify_mode {
        while let Some(rest) = s.strip_prefix('!') {
            for set in &mut out.sets {
                set.invert_flip();
            }
            s = rest;
        }
    }

    if s == "none" {
        return Ok(out);
    }
    if s == "all" {
        for set in &mut out.sets {
            set.invert_flip();
        }
        return Ok(out);
    }

    let mut done = false;
    for token in s.split(',') {
        done = parse_token(token, qualify_mode, table, &mut out)?;
        if !done {
            return Err(FilterError::InvalidSyscall(token.to_string()));
        }
    }
    if !done {
        return Err(FilterError::InvalidSyscall(str.to_string()));
    }

    Ok(out)
}
