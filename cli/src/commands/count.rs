// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::io::{self, Write};

use ipfold_common::{config::Config, utils::timing::StageTimer};
use ipfold_core::{loader, ops};

/// Record and unique-address counts of the union of all sources.
pub fn merged(files: &[String], cfg: &Config, timer: &mut StageTimer) -> anyhow::Result<()> {
    let sets = loader::load_all(files, cfg)?;
    timer.mark_loaded();

    let mut merged = ops::union_all(sets, "combined");
    let unique_ips = merged.unique_ips();
    timer.mark_computed();

    let mut out = io::stdout().lock();
    if cfg.header {
        writeln!(out, "entries,unique_ips")?;
    }
    writeln!(out, "{},{unique_ips}", merged.lines())?;
    Ok(())
}

/// Per-source record and unique-address counts.
pub fn each(files: &[String], cfg: &Config, timer: &mut StageTimer) -> anyhow::Result<()> {
    let mut sets = loader::load_all(files, cfg)?;
    timer.mark_loaded();

    for set in &mut sets {
        set.optimize();
    }
    timer.mark_computed();

    let mut out = io::stdout().lock();
    if cfg.header {
        writeln!(out, "name,entries,unique_ips")?;
    }
    for set in &mut sets {
        let ips = set.unique_ips();
        writeln!(out, "{},{},{}", set.name(), set.lines(), ips)?;
    }
    Ok(())
}
