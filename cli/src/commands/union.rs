// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::io;

use ipfold_common::{config::Config, utils::timing::StageTimer};
use ipfold_core::{cidr::PrefixPlan, loader, ops, output};

pub fn run(files: &[String], cfg: &Config, timer: &mut StageTimer) -> anyhow::Result<()> {
    let sets = loader::load_all(files, cfg)?;
    timer.mark_loaded();

    let mut merged = ops::union_all(sets, "combined");
    merged.optimize();
    timer.mark_computed();

    let plan = PrefixPlan::from_restrictions(cfg.prefixes.as_deref(), cfg.min_prefix);
    let mut out = io::stdout().lock();
    output::print_set(&mut out, &mut merged, &plan, cfg)?;
    Ok(())
}
