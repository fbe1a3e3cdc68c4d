// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! §4.4/§4.5: signal and errno name resolution, plus a reference
//! `SignalTable`/`ErrnoTable` pair (`DefaultSignalTable`/`DefaultErrnoTable`)
//! built from the `libc` name tables so the rest of the crate (and its own
//! tests) has something concrete to resolve against. A tracer with its
//! own richer name tables is expected to supply its own implementation.

use crate::collab::{ErrnoTable, SignalTable};

/// Resolves a signal token: decimal `0..=max_signal`, or a case-insensitive
/// name with an optional `SIG` prefix. Returns `None` on no match, mirroring
/// `sigstr_to_uint` returning `-1`.
pub fn resolve_signal(token: &str, table: &dyn SignalTable) -> Option<u8> {
    if token.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return token.parse::<u32>().ok().and_then(|n| {
            if n <= table.max_signal() as u32 {
                Some(n as u8)
            } else {
                None
            }
        });
    }

    let stripped = strip_sig_prefix(token);
    for signo in 0..=table.max_signal() {
        let Some(name) = table.name(signo) else { continue };
        let name = strip_sig_prefix(name);
        if name.eq_ignore_ascii_case(stripped) {
            return Some(signo);
        }
    }
    None
}

fn strip_sig_prefix(s: &str) -> &str {
    if s.len() > 3 && s[..3].eq_ignore_ascii_case("SIG") {
        &s[3..]
    } else {
        s
    }
}

/// Case-insensitive errno name lookup. Numeric errno tokens are resolved
/// by the caller (`inject.rs`) before falling back to this table, matching
/// the original's `error=` handling order.
pub fn resolve_errno_name(token: &str, table: &dyn ErrnoTable) -> Option<i32> {
    table.value_of(token)
}

macro_rules! signal_table {
    ($( $name:ident ),* $(,)?) => {
        &[ $( (stringify!($name), libc::$name as u8) ),* ]
    };
}

const SIGNALS: &[(&str, u8)] = signal_table!(
    SIGHUP, SIGINT, SIGQUIT, SIGILL, SIGTRAP, SIGABRT, SIGBUS, SIGFPE, SIGKILL,
    SIGUSR1, SIGSEGV, SIGUSR2, SIGPIPE, SIGALRM, SIGTERM, SIGCHLD, SIGCONT,
    SIGSTOP, SIGTSTP, SIGTTIN, SIGTTOU, SIGURG, SIGXCPU, SIGXFSZ, SIGVTALRM,
    SIGPROF, SIGWINCH, SIGIO, SIGSYS,
);

/// Reference `SignalTable` built from `libc`'s signal constants.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSignalTable;

impl SignalTable for DefaultSignalTable {
    fn name(&self, signo: u8) -> Option<&str> {
        SIGNALS.iter().find(|&&(_, n)| n == signo).map(|&(name, _)| name)
    }

    fn max_signal(&self) -> u8 {
        64
    }
}

macro_rules! errno_table {
    ($( $name:ident ),* $(,)?) => {
        &[ $( (stringify!($name), libc::$name) ),* ]
    };
}

const ERRNOS: &[(&str, i32)] = errno_table!(
    EPERM, ENOENT, ESRCH, EINTR, EIO, ENXIO, E2BIG, ENOEXEC, EBADF, ECHILD,
    EAGAIN, ENOMEM, EACCES, EFAULT, EBUSY, EEXIST, EXDEV, ENODEV, ENOTDIR,
    EISDIR, EINVAL, ENFILE, EMFILE, ENOTTY, ETXTBSY, EFBIG, ENOSPC, ESPIPE,
    EROFS, EMLINK, EPIPE, EDOM, ERANGE, ENOSYS, ENOTEMPTY, ELOOP,
    ENAMETOOLONG, ETIMEDOUT, ECONNREFUSED, ECONNRESET, ENOTCONN, EALREADY,
    EINPROGRESS, EADDRINUSE, EADDRNOTAVAIL, ENETUNREACH, ENETDOWN,
    EHOSTUNREACH, ENOTSOCK, EMSGSIZE, EPROTOTYPE, ENOPROTOOPT,
    EPROTONOSUPPORT, EOPNOTSUPP, ENOBUFS, EISCONN, EOVERFLOW, EBADMSG,
    EIDRM, ENOMSG, EMULTIHOP, EPROTO, ECANCELED, EOWNERDEAD,
    ENOTRECOVERABLE,
);

/// Reference `ErrnoTable` built from `libc`'s errno constants.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrnoTable;

impl ErrnoTable for DefaultErrnoTable {
    fn value_of(&self, name: &str) -> Option<i32> {
        ERRNOS
            .iter()
            .find(|&&(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, v)| v)
    }

    fn max_errno(&self) -> i32 {
        4095
    }
}
