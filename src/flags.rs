// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Syscall class bits and per-event qualification bits.
//!
//! `SyscallFlags` is the flag word the `SyscallTable` collaborator attaches
//! to every syscall number; `%class` tokens in the filter DSL (§4.2) select
//! syscalls whose flags are a superset of a class's bits. `QualFlags` is the
//! mutable per-event mask that action `apply` hooks set (§4.11); the core
//! only flips bits in it, it never interprets them.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SyscallFlags: u32 {
        const TRACE_DESC         = 1 << 0;
        const TRACE_FILE         = 1 << 1;
        const TRACE_MEMORY       = 1 << 2;
        const TRACE_PROCESS      = 1 << 3;
        const TRACE_SIGNAL       = 1 << 4;
        const TRACE_IPC          = 1 << 5;
        const TRACE_NETWORK      = 1 << 6;
        const TRACE_STAT         = 1 << 7;
        const TRACE_LSTAT        = 1 << 8;
        const TRACE_FSTAT        = 1 << 9;
        const TRACE_STATFS       = 1 << 10;
        const TRACE_FSTATFS      = 1 << 11;
        /// Either of `stat`, `lstat`, `fstat`, `statx`, ... (the `%%stat` class).
        const TRACE_STAT_LIKE    = 1 << 12;
        /// Either of `statfs`, `fstatfs`, ... (the `%%statfs` class).
        const TRACE_STATFS_LIKE  = 1 << 13;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QualFlags: u32 {
        const TRACE   = 1 << 0;
        const INJECT  = 1 << 1;
        const READ    = 1 << 2;
        const WRITE   = 1 << 3;
        const RAW     = 1 << 4;
        const ABBREV  = 1 << 5;
        const VERBOSE = 1 << 6;
    }
}

impl Default for QualFlags {
    /// All qualifier bits set, matching `DEFAULT_QUAL_FLAGS` in the original:
    /// every action type is "on" for events until the first explicit action
    /// of that type is registered (see `FilterContext::default_flags`).
    fn default() -> Self {
        QualFlags::all()
    }
}
