// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The three CSV comparison modes. Each row relates two sets through the
//! size of their intersection; `combined_ips` is derived as
//! `ips1 + ips2 - common_ips`, which equals the size of the union without
//! materializing it. The `entries` columns carry the accepted-record
//! counts of the inputs.

use std::io::{self, Write};

use anyhow::bail;
use ipfold_common::{config::Config, utils::timing::StageTimer};
use ipfold_common::models::ipset::IpSet;
use ipfold_core::{loader, ops};

const PAIR_HEADER: &str = "name1,name2,entries1,entries2,ips1,ips2,combined_ips,common_ips";

fn pair_row<W: Write>(out: &mut W, a: &mut IpSet, b: &mut IpSet) -> anyhow::Result<()> {
    let mut common = ops::intersect(a, b);
    let common_ips = common.unique_ips();
    let a_ips = a.unique_ips();
    let b_ips = b.unique_ips();
    writeln!(
        out,
        "{},{},{},{},{},{},{},{}",
        a.name(),
        b.name(),
        a.lines(),
        b.lines(),
        a_ips,
        b_ips,
        a_ips + b_ips - common_ips,
        common_ips
    )?;
    Ok(())
}

/// Every source against every other source.
pub fn all(files: &[String], cfg: &Config, timer: &mut StageTimer) -> anyhow::Result<()> {
    let mut sets = loader::load_all(files, cfg)?;
    if sets.len() < 2 {
        bail!("at least two sources are needed to compare");
    }
    timer.mark_loaded();

    let mut out = io::stdout().lock();
    if cfg.header {
        writeln!(out, "{PAIR_HEADER}")?;
    }
    for i in 0..sets.len() {
        let (left, right) = sets.split_at_mut(i + 1);
        let a = &mut left[i];
        for b in right.iter_mut() {
            pair_row(&mut out, a, b)?;
        }
    }
    timer.mark_computed();
    Ok(())
}

/// The first source against each of the others. Rows name the other set;
/// its own totals need no row of their own.
pub fn first(files: &[String], cfg: &Config, timer: &mut StageTimer) -> anyhow::Result<()> {
    let mut sets = loader::load_all(files, cfg)?;
    timer.mark_loaded();

    let Some((first, rest)) = sets.split_first_mut() else {
        bail!("at least two sources are needed to compare");
    };
    if rest.is_empty() {
        bail!("at least two sources are needed to compare");
    }

    let mut out = io::stdout().lock();
    if cfg.header {
        writeln!(out, "name,entries,unique_ips,common_ips")?;
    }
    for set in rest.iter_mut() {
        let mut common = ops::intersect(set, first);
        let set_ips = set.unique_ips();
        let common_ips = common.unique_ips();
        writeln!(
            out,
            "{},{},{},{}",
            set.name(),
            set.lines(),
            set_ips,
            common_ips
        )?;
    }
    timer.mark_computed();
    Ok(())
}

/// Every source of the first group against every source of the second.
pub fn next(
    files: &[String],
    with: &[String],
    cfg: &Config,
    timer: &mut StageTimer,
) -> anyhow::Result<()> {
    let mut firsts = loader::load_all(files, cfg)?;
    let mut seconds = loader::load_all(with, cfg)?;
    timer.mark_loaded();

    let mut out = io::stdout().lock();
    if cfg.header {
        writeln!(out, "{PAIR_HEADER}")?;
    }
    for a in &mut firsts {
        for b in &mut seconds {
            pair_row(&mut out, a, b)?;
        }
    }
    timer.mark_computed();
    Ok(())
}
