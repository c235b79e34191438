// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::io;

use anyhow::bail;
use ipfold_common::{config::Config, utils::timing::StageTimer};
use ipfold_core::{cidr::PrefixPlan, loader, ops, output};

pub fn run(files: &[String], cfg: &Config, timer: &mut StageTimer) -> anyhow::Result<()> {
    let sets = loader::load_all(files, cfg)?;
    timer.mark_loaded();

    let mut iter = sets.into_iter();
    let (Some(mut first), Some(mut second)) = (iter.next(), iter.next()) else {
        bail!("at least two sources are needed to find their common addresses");
    };

    let mut common = ops::intersect(&mut first, &mut second);
    for mut set in iter {
        common = ops::intersect(&mut common, &mut set);
    }
    timer.mark_computed();

    let plan = PrefixPlan::from_restrictions(cfg.prefixes.as_deref(), cfg.min_prefix);
    let mut out = io::stdout().lock();
    output::print_set(&mut out, &mut common, &plan, cfg)?;
    Ok(())
}
