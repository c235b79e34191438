// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Rendering of a set to stdout: CIDR blocks, raw ranges, expanded single
//! addresses, or the binary snapshot. Singletons and networks carry
//! separately configurable prefix/suffix strings so the two can be routed
//! into different downstream consumers.

use std::io::{self, Write};
use std::net::Ipv4Addr;

use ipfold_common::config::{Config, OutputFormat, PrintStyle};
use ipfold_common::models::interval::{Interval, PREFIX_MAX};
use ipfold_common::models::ipset::IpSet;
use ipfold_common::verbose;

use crate::cidr::{PrefixPlan, Splitter};
use crate::errors::CoreError;
use crate::snapshot;

fn write_single<W: Write>(out: &mut W, style: &PrintStyle, addr: u32) -> io::Result<()> {
    writeln!(
        out,
        "{}{}{}",
        style.prefix_ips,
        Ipv4Addr::from(addr),
        style.suffix_ips
    )
}

fn write_range<W: Write>(out: &mut W, style: &PrintStyle, iv: &Interval) -> io::Result<()> {
    if iv.addr == iv.broadcast {
        return write_single(out, style, iv.addr);
    }
    writeln!(
        out,
        "{}{}-{}{}",
        style.prefix_nets,
        Ipv4Addr::from(iv.addr),
        Ipv4Addr::from(iv.broadcast),
        style.suffix_nets
    )
}

/// Print `set` in the configured format. Normalizes the set first; every
/// format renders the canonical intervals. Write failures propagate (a
/// broken stdout must stop the run).
pub fn print_set<W: Write>(
    out: &mut W,
    set: &mut IpSet,
    plan: &PrefixPlan,
    cfg: &Config,
) -> Result<(), CoreError> {
    set.optimize();
    verbose!("printing {}", set.name());

    match cfg.format {
        OutputFormat::Binary => {
            snapshot::save(out, set)?;
        }

        OutputFormat::Cidr => {
            let style = &cfg.style;
            let mut total: u64 = 0;
            let mut sink = |addr: u32, prefix: u8| -> io::Result<()> {
                if prefix < PREFIX_MAX {
                    writeln!(
                        out,
                        "{}{}/{}{}",
                        style.prefix_nets,
                        Ipv4Addr::from(addr),
                        prefix,
                        style.suffix_nets
                    )
                } else {
                    write_single(out, style, addr)
                }
            };
            let mut splitter = Splitter::emitting(plan, &mut sink);
            for iv in set.intervals() {
                total += splitter.split_interval(iv)?;
            }

            let counters = splitter.into_counters();
            let mut prefixes = 0usize;
            for (p, &count) in counters.iter().enumerate() {
                if count > 0 {
                    verbose!("prefix /{p} counts {count} entries");
                    prefixes += 1;
                }
            }
            verbose!(
                "totals: {} lines read, {} distinct ranges, {prefixes} prefixes, \
                 {total} CIDRs printed, {} unique IPs",
                set.lines(),
                set.entries(),
                set.unique_ips_hint()
            );
        }

        OutputFormat::Ranges => {
            for iv in set.intervals() {
                write_range(out, &cfg.style, iv)?;
            }
        }

        OutputFormat::Singles => {
            for iv in set.intervals() {
                for addr in iv.addr..=iv.broadcast {
                    write_single(out, &cfg.style, addr)?;
                }
            }
        }
    }

    Ok(())
}
