// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Prefix Reduction
//!
//! Some packet classifiers pay per distinct prefix length, not per entry.
//! [`reduce`] disables prefix lengths in a [`PrefixPlan`] so that a later
//! decomposition pass emits fewer distinct lengths, accepting a bounded
//! growth in the number of blocks: folding `k` blocks of prefix `i` into
//! prefix `j > i` yields `k * 2^(j-i)` blocks, a net increase of
//! `k * (2^(j-i) - 1)`. The greedy loop always folds the cheapest such
//! pair next.
//!
//! The reducer prints nothing and does not alter the set; its only output
//! is the mutated plan.

use ipfold_common::models::ipset::IpSet;
use ipfold_common::verbose;

use crate::cidr::{PrefixPlan, Splitter};
use crate::errors::CoreError;

/// Disable prefixes in `plan` while the projected block count stays within
/// `max(baseline * factor / 100, min_entries)`. `factor` is a percentage;
/// 120 allows one fifth of growth.
pub fn reduce(
    set: &mut IpSet,
    plan: &mut PrefixPlan,
    factor: u64,
    min_entries: u64,
) -> Result<(), CoreError> {
    set.optimize();

    // Baseline pass: how many blocks each prefix contributes under the
    // current plan.
    let mut splitter = Splitter::counting(plan);
    for iv in set.intervals() {
        splitter.split_interval(iv)?;
    }
    let mut counters = splitter.into_counters();

    let mut total: u64 = 0;
    let mut initial = 0usize;
    verbose!("counting prefixes in {}", set.name());
    for (p, &count) in counters.iter().enumerate() {
        if count > 0 {
            verbose!("prefix /{p} counts {count} entries");
            total += count;
            initial += 1;
        } else {
            // An absent prefix cannot be folded away; drop it from the
            // search space up front.
            plan.disable(p as u8);
        }
    }
    verbose!("total {total} entries generated");

    let acceptable = (total * factor / 100).max(min_entries);
    verbose!("acceptable is to reach {acceptable} entries by reducing prefixes");

    let mut eliminated = 0usize;
    while total < acceptable {
        // Cheapest fold: an enabled, populated prefix and the nearest
        // populated longer one. Farther targets are strictly worse, so
        // only the nearest is considered.
        let mut best: Option<(u8, u8, u64)> = None;
        for i in 0..32u8 {
            if counters[i as usize] == 0 || !plan.is_enabled(i) {
                continue;
            }
            let Some(j) = (i + 1..=32).find(|&j| counters[j as usize] > 0) else {
                continue;
            };
            let increase = counters[i as usize] * ((1u64 << (j - i)) - 1);
            if best.is_none_or(|(_, _, min)| increase < min) {
                best = Some((i, j, increase));
            }
        }

        let Some((from, to, increase)) = best else {
            verbose!("nothing more to reduce");
            break;
        };

        if total + increase > acceptable {
            verbose!(
                "cannot increase total {total} by {increase}, above acceptable {acceptable}"
            );
            break;
        }

        counters[to as usize] += counters[from as usize] << (to - from);
        counters[from as usize] = 0;
        plan.disable(from);
        total += increase;
        eliminated += 1;
        verbose!(
            "folded prefix /{from} into /{to}, total is now {total} (increased by {increase})"
        );
    }

    verbose!(
        "eliminated {eliminated} out of {initial} prefixes ({} remain in the final set)",
        initial - eliminated
    );

    Ok(())
}
