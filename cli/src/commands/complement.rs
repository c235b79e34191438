// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::io;

use ipfold_common::{config::Config, utils::timing::StageTimer};
use ipfold_core::{cidr::PrefixPlan, loader, ops, output};

/// Union of `files`, minus the addresses of every `remove` source.
pub fn run(
    files: &[String],
    remove: &[String],
    cfg: &Config,
    timer: &mut StageTimer,
) -> anyhow::Result<()> {
    let sets = loader::load_all(files, cfg)?;
    let mut removals = loader::load_all(remove, cfg)?;
    timer.mark_loaded();

    let name = sets
        .first()
        .map(|s| s.name().to_string())
        .unwrap_or_else(|| "complement".to_string());
    let mut kept = ops::union_all(sets, &name);
    for removal in &mut removals {
        kept = ops::exclude(&mut kept, removal);
    }
    timer.mark_computed();

    let plan = PrefixPlan::from_restrictions(cfg.prefixes.as_deref(), cfg.min_prefix);
    let mut out = io::stdout().lock();
    output::print_set(&mut out, &mut kept, &plan, cfg)?;
    Ok(())
}
