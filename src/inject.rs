// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! C7: parses `when=F[+S]`, `error=`, `retval=`, `signal=` tokens into an
//! injection specification (§4.9).

use crate::collab::{ErrnoTable, SignalTable};
use crate::error::{FilterError, Result};
use crate::names::resolve_signal;

/// Sentinel for "no explicit return value requested yet". Chosen well
/// outside both the valid `retval=` range (`0..=i32::MAX`) and the valid
/// `error=` range (`-MAX_ERRNO_VALUE..=-1`), same role as
/// `INJECT_OPTS_RVAL_DEFAULT` in the original.
pub const RVAL_DEFAULT: i32 = i32::MIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectOpts {
    pub first: u16,
    pub step: u16,
    pub rval: i32,
    pub signo: u8,
    pub initialised: bool,
}

impl Default for InjectOpts {
    fn default() -> Self {
        InjectOpts {
            first: 1,
            step: 1,
            rval: RVAL_DEFAULT,
            signo: 0,
            initialised: false,
        }
    }
}

/// Parses one `when=`/`error=`/`retval=`/`signal=` token. Returns `Ok(true)`
/// on a recognised token, `Ok(false)` on one this function does not (or, in
/// `fault_only` mode, must not) recognise — at which point the caller stops
/// scanning, exactly as the original's token loop breaks on the first
/// `parse_inject_token` failure and leaves `init` false.
fn parse_token(
    token: &str,
    opts: &mut InjectOpts,
    fault_only: bool,
    errnos: &dyn ErrnoTable,
    signals: &dyn SignalTable,
) -> bool {
    if let Some(val) = token.strip_prefix("when=") {
        let (first_str, rest) = match val.split_once('+') {
            Some((f, s)) => (f, Some(s)),
            None => (val, None),
        };
        let Ok(first) = first_str.parse::<u32>() else { return false };
        if !(1..=0xffff).contains(&first) {
            return false;
        }
        opts.first = first as u16;
        opts.step = match rest {
            None => 0,
            Some("") => 1,
            Some(s) => {
                let Ok(step) = s.parse::<u32>() else { return false };
                if !(1..=0xffff).contains(&step) {
                    return false;
                }
                step as u16
            }
        };
        true
    } else if let Some(val) = token.strip_prefix("error=") {
        if opts.rval != RVAL_DEFAULT {
            return false;
        }
        let errno = val
            .parse::<i32>()
            .ok()
            .filter(|&n| (1..=errnos.max_errno()).contains(&n))
            .or_else(|| errnos.value_of(val));
        match errno {
            Some(n) if n >= 1 => {
                opts.rval = -n;
                true
            }
            _ => false,
        }
    } else if !fault_only {
        if let Some(val) = token.strip_prefix("retval=") {
            if opts.rval != RVAL_DEFAULT {
                return false;
            }
            match val.parse::<i32>() {
                Ok(n) if n >= 0 => {
                    opts.rval = n;
                    true
                }
                _ => false,
            }
        } else if let Some(val) = token.strip_prefix("signal=") {
            match resolve_signal(val, signals) {
                Some(n) if n >= 1 => {
                    opts.signo = n;
                    true
                }
                _ => false,
            }
        } else {
            false
        }
    } else {
        false
    }
}

/// Parses the full `args` string (`:`-separated in qualify mode, `;`
/// otherwise) into an `InjectOpts`. On any malformed/forbidden/duplicate
/// token, or on completing the scan without `rval`/`signo` set (outside
/// `fault` syntax, where the default is `-ENOSYS`), returns
/// `FilterError::InvalidInjectArgs` — the original folds every one of
/// these outcomes into the same "invalid fault/inject argument" message.
pub fn parse(
    args: &str,
    fault_only: bool,
    qualify_mode: bool,
    errnos: &dyn ErrnoTable,
    signals: &dyn SignalTable,
) -> Result<InjectOpts> {
    let description = if fault_only { "fault" } else { "inject" };
    let delim = if qualify_mode { ':' } else { ';' };
    let mut opts = InjectOpts::default();

    if !args.is_empty() {
        for token in args.split(delim) {
            if !parse_token(token, &mut opts, fault_only, errnos, signals) {
                return Err(FilterError::InvalidInjectArgs {
                    description,
                    args: args.to_string(),
                });
            }
        }
    }

    if opts.rval == RVAL_DEFAULT && opts.signo == 0 {
        if fault_only {
            opts.rval = -libc::ENOSYS;
        } else {
            return Err(FilterError::InvalidInjectArgs {
                description,
                args: args.to_string(),
            });
        }
    }
    opts.initialised = true;
    Ok(opts)
}
