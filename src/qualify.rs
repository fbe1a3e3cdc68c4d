// Copyright The strace-rs Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! C8: the qualify-DSL front-end (§4.10). Accepts one `ACTION=MAIN[:ARGS]`
//! specification — the body of a single `-e`-style qualify option — and
//! folds it into a `FilterContext`: finds or appends the named action,
//! builds the appropriate filter primitive from `MAIN`, and, for
//! `inject`/`fault`, parses `ARGS` into the action's private `InjectOpts`.
//! `signal=` is the one keyword that does not name an action at all; it
//! replaces the process-wide signal set used elsewhere by the tracer.

use crate::action::{ActionKind, PrivateData};
use crate::collab::{ErrnoTable, PathSelector, SignalTable, SyscallTable};
use crate::context::FilterContext;
use crate::error::{FilterError, Result};
use crate::filter::Filter;
use crate::inject;

/// Every recognised keyword and its short alias, mapped to a canonical
/// name (§4.10).
const ALIASES: &[(&str, &str)] = &[
    ("trace", "trace"),
    ("t", "trace"),
    ("abbrev", "abbrev"),
    ("a", "abbrev"),
    ("verbose", "verbose"),
    ("v", "verbose"),
    ("raw", "raw"),
    ("x", "raw"),
    ("signal", "signal"),
    ("signals", "signal"),
    ("s", "signal"),
    ("read", "read"),
    ("reads", "read"),
    ("r", "read"),
    ("write", "write"),
    ("writes", "write"),
    ("w", "write"),
    ("fault", "fault"),
    ("inject", "inject"),
];

fn canonical(name: &str) -> Option<&'static str> {
    ALIASES.iter().find(|&&(alias, _)| alias == name).map(|&(_, canon)| canon)
}

/// Parses one `ACTION=MAIN[:ARGS]` specification and applies it to `ctx`.
/// A specification with no `=` defaults `MAIN` to `all`, matching a bare
/// `-e trace` meaning "trace everything".
pub fn parse_qualify_action(
    ctx: &mut FilterContext,
    spec: &str,
    table: &dyn SyscallTable,
    errnos: &dyn ErrnoTable,
    signals: &dyn SignalTable,
) -> Result<()> {
    let (name, body) = spec.split_once('=').unwrap_or((spec, "all"));
    let canon = canonical(name).ok_or_else(|| FilterError::InvalidAction(spec.to_string()))?;

    match canon {
        "signal" => {
            ctx.set_signals(body, signals)?;
            log::debug!("signal set replaced by '{}'", body);
            Ok(())
        }
        "trace" | "abbrev" | "verbose" | "raw" => {
            let kind = match canon {
                "trace" => ActionKind::Trace,
                "abbrev" => ActionKind::Abbrev,
                "verbose" => ActionKind::Verbose,
                "raw" => ActionKind::Raw,
                _ => unreachable!(),
            };
            let filter = Filter::parse_syscall(body, true, table)?;
            ctx.find_or_add_action(kind).add_filter_qualified(filter);
            log::debug!("registered {} filter '{}'", kind.name(), body);
            Ok(())
        }
        "read" | "write" => {
            let kind = if canon == "read" { ActionKind::Read } else { ActionKind::Write };
            let filter = Filter::parse_fd(body, true)?;
            ctx.find_or_add_action(kind).add_filter_qualified(filter);
            log::debug!("registered {} filter '{}'", kind.name(), body);
            Ok(())
        }
        "inject" | "fault" => {
            let fault_only = canon == "fault";
            let kind = if fault_only { ActionKind::Fault } else { ActionKind::Inject };
            let (main, args) = body.split_once(':').unwrap_or((body, ""));
            let filter = Filter::parse_syscall(main, true, table)?;
            let opts = inject::parse(args, fault_only, true, errnos, signals)?;

            let action = ctx.find_or_add_action(kind);
            action.add_filter_qualified(filter);
            action.private = PrivateData::Inject(opts);
            log::debug!("registered {} filter '{}' with opts {:?}", kind.name(), main, opts);
            Ok(())
        }
        _ => unreachable!(),
    }
}

/// Registers a path pattern for `-P`-style path tracing (§4.6/§4.8). Not
/// part of the `ACTION=MAIN` grammar itself: the tracer's option parser
/// calls this directly for each `-P PATH` it sees.
pub fn select_path(ctx: &mut FilterContext, pattern: &str, selector: &mut dyn PathSelector) -> Result<()> {
    selector.select(pattern)?;
    ctx.request_path_tracing();
    Ok(())
}
