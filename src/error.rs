// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fatal, startup-time parse errors (§7). Runtime evaluation has no
//! fallible operations, so `FilterError` only ever appears from the parser
//! entry points in `syscall_set`, `generic_set`, `inject`, `action` and
//! `qualify`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid system call '{0}'")]
    InvalidSyscall(String),

    #[error("invalid {kind} '{token}'")]
    InvalidToken { kind: &'static str, token: String },

    #[error("invalid filter action '{0}'")]
    InvalidAction(String),

    #[error("invalid filter '{0}'")]
    InvalidFilter(String),

    #[error("invalid {description} argument '{args}'")]
    InvalidInjectArgs {
        description: &'static str,
        args: String,
    },

    #[error("regex {op} failed for pattern '{pattern}': {message}")]
    Regex {
        op: &'static str,
        pattern: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, FilterError>;
