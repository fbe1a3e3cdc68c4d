// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! C3: the same token-list shell as the syscall-set parser, but backed by
//! exactly one `NumberSet` and a caller-supplied `resolve(token) -> i64`
//! (§4.3). Used for file descriptors (`fd=`) and, together with
//! `names::resolve_signal`, for the signal set (`signal=`).

use crate::error::{FilterError, Result};
use crate::number_set::NumberSet;

/// Accepts a plain unsigned decimal, nothing else. The `fd` filter's
/// resolver (§4.6: `resolve = parse_unsigned`).
pub fn resolve_unsigned(token: &str) -> Option<i64> {
    token.parse::<i64>().ok().filter(|&n| n >= 0)
}

/// Parses `str` into a single `NumberSet` via `resolve`, failing with a
/// diagnostic naming `kind` ("descriptor", "signal", ...) on the first
/// token `resolve` rejects.
pub fn parse(str: &str, qualify_mode: bool, kind: &'static str, resolve: impl Fn(&str) -> Option<i64>) -> Result<NumberSet> {
    let mut set = NumberSet::new();

    let mut s = str;
    if qualify_mode {
        while let Some(rest) = s.strip_prefix('!') {
            set.invert_flip();
            s = rest;
        }
    }

    if s == "none" {
        return Ok(set);
    }
    if s == "all" {
        set.invert_flip();
        return Ok(set);
    }

    let mut resolved = false;
    for token in s.split(',') {
        let stripped = token.trim_start_matches('?');
        let ignore_fail = stripped.len() != token.len();

        match resolve(stripped) {
            Some(n) if n >= 0 => {
                set.add(n as usize);
                resolved = true;
            }
            _ if ignore_fail => {
                log::debug!("ignoring unresolvable {} token '{}'", kind, stripped);
                resolved = true;
            }
            _ => {
                return Err(FilterError::InvalidToken {
                    kind,
                    token: token.to_string(),
                });
            }
        }
    }
    if !resolved {
        return Err(FilterError::InvalidToken {
            kind,
            token: str.to_string(),
        });
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_descriptors() {
        let set = parse("0,1,2", true, "descriptor", resolve_unsigned).unwrap();
        assert!(set.contains(0));
        assert!(set.contains(2));
        assert!(!set.contains(3));
    }

    #[test]
    fn rejects_unresolvable_token() {
        assert!(parse("not_a_number", true, "descriptor", resolve_unsigned).is_err());
        assert!(parse("?not_a_number", true, "descriptor", resolve_unsigned).is_ok());
    }

    #[test]
    fn all_and_none_behave_like_syscall_set() {
        let none = parse("none", true, "descriptor", resolve_unsigned).unwrap();
        assert!(!none.contains(0));
        let all = parse("all", true, "descriptor", resolve_unsigned).unwrap();
        assert!(all.contains(0));
    }
}
