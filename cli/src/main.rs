// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # ipfold CLI Entry Point
//!
//! Responsibilities:
//!
//! 1. **Capability probes**: `--has-compare` / `--has-reduce` answer and
//!    exit before anything else runs, so wrapper scripts can feature-test
//!    cheaply.
//! 2. **Global state setup**: initializes the `tracing` subscriber and
//!    translates the parsed flags into the internal `Config`.
//! 3. **Command dispatch**: routes execution to the matching module in
//!    `commands/`; a bare invocation is a union of stdin.
//! 4. **Error boundary**: any error propagated up from a mode is logged to
//!    stderr here and converted into a nonzero `ExitCode`.

mod commands;
mod terminal;

use std::process::ExitCode;

use ipfold_common::{config::Config, error, utils::timing::StageTimer};

use crate::commands::{
    CommandLine, Commands, compare, complement, count, intersect, reduce, union,
};

fn main() -> ExitCode {
    let cmd = match CommandLine::parse_args() {
        Ok(cmd) => cmd,
        Err(err) => {
            let failed = err.use_stderr();
            let _ = err.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if cmd.has_compare || cmd.has_reduce {
        eprintln!("yes, compare and reduce are present.");
        return ExitCode::SUCCESS;
    }

    terminal::init_logging(cmd.verbosity);
    let cfg = Config::from(&cmd);
    let mut timer = StageTimer::start();

    let result = match &cmd.command {
        None => union::run(&[], &cfg, &mut timer),
        Some(Commands::Union { files }) => union::run(files, &cfg, &mut timer),
        Some(Commands::Intersect { files }) => intersect::run(files, &cfg, &mut timer),
        Some(Commands::Complement { files, remove }) => {
            complement::run(files, remove, &cfg, &mut timer)
        }
        Some(Commands::Compare { files }) => compare::all(files, &cfg, &mut timer),
        Some(Commands::CompareFirst { files }) => compare::first(files, &cfg, &mut timer),
        Some(Commands::CompareNext { files, with }) => {
            compare::next(files, with, &cfg, &mut timer)
        }
        Some(Commands::CountUnique { files }) => count::merged(files, &cfg, &mut timer),
        Some(Commands::CountUniqueAll { files }) => count::each(files, &cfg, &mut timer),
        Some(Commands::Reduce { files, .. }) => reduce::run(files, &cfg, &mut timer),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    };

    timer.report();

    exit_code
}
