// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # CIDR Decomposition
//!
//! [`Splitter::split`] covers an arbitrary address interval with the
//! smallest number of CIDR blocks drawn from the enabled prefix lengths,
//! by binary recursion over the prefix tree. Worst case is the interval
//! `0.0.0.1-255.255.255.254` with everything enabled: 62 blocks out of at
//! most 125 calls, recursion depth at most 33.
//!
//! All pass state lives in the [`Splitter`] value itself (per-prefix
//! counters plus an optional emit sink), so decompositions are reentrant
//! and the reducer can run counting passes without touching any output
//! path.

use std::io;

use ipfold_common::models::interval::{Interval, PREFIX_MAX, broadcast, set_bit};

use crate::errors::CoreError;

/// Which prefix lengths the decomposer may emit. Prefix 32 can never be
/// disabled; a range is always expressible as single addresses.
#[derive(Debug, Clone)]
pub struct PrefixPlan {
    enabled: [bool; 33],
}

impl Default for PrefixPlan {
    fn default() -> Self {
        Self {
            enabled: [true; 33],
        }
    }
}

impl PrefixPlan {
    /// Every prefix enabled.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a plan from the user's restrictions: an explicit allow-list
    /// sets the enabled set directly, then `min_prefix` disables every
    /// prefix shorter than it. Prefix 32 stays enabled through both.
    pub fn from_restrictions(prefixes: Option<&[u8]>, min_prefix: Option<u8>) -> Self {
        let mut plan = match prefixes {
            Some(list) => {
                let mut enabled = [false; 33];
                for &p in list {
                    if p <= PREFIX_MAX {
                        enabled[p as usize] = true;
                    }
                }
                Self { enabled }
            }
            None => Self::all(),
        };

        if let Some(min) = min_prefix {
            for p in 0..min.min(PREFIX_MAX) {
                plan.enabled[p as usize] = false;
            }
        }

        plan.enabled[PREFIX_MAX as usize] = true;
        plan
    }

    pub fn is_enabled(&self, prefix: u8) -> bool {
        self.enabled[prefix as usize]
    }

    pub fn disable(&mut self, prefix: u8) {
        if prefix < PREFIX_MAX {
            self.enabled[prefix as usize] = false;
        }
    }
}

/// Sink receiving each emitted block as `(network, prefix)`.
pub type EmitSink<'a> = &'a mut dyn FnMut(u32, u8) -> io::Result<()>;

/// One decomposition pass: counters per emitted prefix, and optionally a
/// sink that renders the blocks. Without a sink the pass only counts,
/// which is what the reducer needs.
pub struct Splitter<'a> {
    plan: &'a PrefixPlan,
    counters: [u64; 33],
    sink: Option<EmitSink<'a>>,
}

impl<'a> Splitter<'a> {
    pub fn counting(plan: &'a PrefixPlan) -> Self {
        Self {
            plan,
            counters: [0; 33],
            sink: None,
        }
    }

    pub fn emitting(plan: &'a PrefixPlan, sink: EmitSink<'a>) -> Self {
        Self {
            plan,
            counters: [0; 33],
            sink: Some(sink),
        }
    }

    /// Blocks emitted so far, by prefix length.
    pub fn counters(&self) -> &[u64; 33] {
        &self.counters
    }

    pub fn into_counters(self) -> [u64; 33] {
        self.counters
    }

    /// Decompose one interval. Equivalent to `split(0, 0, lo, hi)`.
    pub fn split_interval(&mut self, iv: &Interval) -> Result<u64, CoreError> {
        self.split(0, 0, iv.addr, iv.broadcast)
    }

    /// Cover `[lo, hi]`, which must lie inside the block `base/prefix`,
    /// with blocks drawn from the enabled prefixes. Returns the number of
    /// blocks emitted.
    pub fn split(&mut self, base: u32, prefix: u8, lo: u32, hi: u32) -> Result<u64, CoreError> {
        if prefix > PREFIX_MAX {
            return Err(CoreError::InvalidPrefix(prefix));
        }

        let bc = broadcast(base, prefix);
        if lo < base || hi > bc {
            return Err(CoreError::SplitBounds {
                lo,
                hi,
                base,
                prefix,
                bc,
            });
        }

        if lo == base && hi == bc && self.plan.is_enabled(prefix) {
            self.emit(base, prefix)?;
            return Ok(1);
        }

        let child = prefix + 1;
        let lower = base;
        let upper = set_bit(base, child, true);

        if hi < upper {
            return self.split(lower, child, lo, hi);
        }
        if lo >= upper {
            return self.split(upper, child, lo, hi);
        }

        let n = self.split(lower, child, lo, broadcast(lower, child))?;
        Ok(n + self.split(upper, child, upper, hi)?)
    }

    fn emit(&mut self, addr: u32, prefix: u8) -> Result<(), CoreError> {
        self.counters[prefix as usize] += 1;
        if let Some(sink) = self.sink.as_mut() {
            sink(addr, prefix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr(s: &str) -> u32 {
        u32::from(s.parse::<Ipv4Addr>().unwrap())
    }

    fn split_to_blocks(plan: &PrefixPlan, lo: u32, hi: u32) -> Vec<(String, u8)> {
        let mut blocks = Vec::new();
        let mut sink = |a: u32, p: u8| -> io::Result<()> {
            blocks.push((Ipv4Addr::from(a).to_string(), p));
            Ok(())
        };
        let mut splitter = Splitter::emitting(plan, &mut sink);
        splitter.split(0, 0, lo, hi).unwrap();
        blocks
    }

    #[test]
    fn exact_block_emits_once() {
        let plan = PrefixPlan::all();
        let blocks = split_to_blocks(&plan, addr("10.0.0.0"), addr("10.0.0.255"));
        assert_eq!(blocks, vec![("10.0.0.0".to_string(), 24)]);
    }

    #[test]
    fn hole_punched_range_matches_known_cover() {
        // 10.0.0.0/24 minus 10.0.0.128-10.0.0.200.
        let plan = PrefixPlan::all();
        let mut blocks = split_to_blocks(&plan, addr("10.0.0.0"), addr("10.0.0.127"));
        blocks.extend(split_to_blocks(&plan, addr("10.0.0.201"), addr("10.0.0.255")));
        assert_eq!(
            blocks,
            vec![
                ("10.0.0.0".to_string(), 25),
                ("10.0.0.201".to_string(), 32),
                ("10.0.0.202".to_string(), 31),
                ("10.0.0.204".to_string(), 30),
                ("10.0.0.208".to_string(), 28),
                ("10.0.0.224".to_string(), 27),
            ]
        );
    }

    #[test]
    fn worst_case_interval_yields_62_blocks() {
        let plan = PrefixPlan::all();
        let mut splitter = Splitter::counting(&plan);
        let n = splitter
            .split(0, 0, addr("0.0.0.1"), addr("255.255.255.254"))
            .unwrap();
        assert_eq!(n, 62);
        assert_eq!(splitter.counters().iter().sum::<u64>(), 62);
        // Two blocks of every prefix from /2 to /32.
        assert_eq!(splitter.counters()[0], 0);
        assert_eq!(splitter.counters()[1], 0);
        for p in 2..=32 {
            assert_eq!(splitter.counters()[p], 2, "prefix {p}");
        }
    }

    #[test]
    fn full_space_is_one_block() {
        let plan = PrefixPlan::all();
        let mut splitter = Splitter::counting(&plan);
        assert_eq!(splitter.split(0, 0, 0, u32::MAX).unwrap(), 1);
        assert_eq!(splitter.counters()[0], 1);
    }

    #[test]
    fn disabled_prefix_splits_deeper() {
        let plan = PrefixPlan::from_restrictions(None, Some(25));
        let blocks = split_to_blocks(&plan, addr("10.0.0.0"), addr("10.0.0.255"));
        assert_eq!(
            blocks,
            vec![
                ("10.0.0.0".to_string(), 25),
                ("10.0.0.128".to_string(), 25),
            ]
        );
    }

    #[test]
    fn allow_list_plans_keep_32() {
        let plan = PrefixPlan::from_restrictions(Some(&[24]), None);
        assert!(plan.is_enabled(24));
        assert!(plan.is_enabled(32));
        assert!(!plan.is_enabled(23));

        // A /23 under this plan becomes two /24s.
        let blocks = split_to_blocks(&plan, addr("10.0.0.0"), addr("10.0.1.255"));
        assert_eq!(
            blocks,
            vec![
                ("10.0.0.0".to_string(), 24),
                ("10.0.1.0".to_string(), 24),
            ]
        );
    }

    #[test]
    fn min_prefix_composes_with_allow_list() {
        let plan = PrefixPlan::from_restrictions(Some(&[20, 24]), Some(24));
        assert!(!plan.is_enabled(20));
        assert!(plan.is_enabled(24));
        assert!(plan.is_enabled(32));
    }

    #[test]
    fn out_of_range_limits_are_an_error() {
        let plan = PrefixPlan::all();
        let mut splitter = Splitter::counting(&plan);
        let err = splitter
            .split(addr("10.0.0.0"), 24, addr("10.0.1.0"), addr("10.0.1.5"))
            .unwrap_err();
        assert!(matches!(err, CoreError::SplitBounds { .. }));
    }

    #[test]
    fn sink_errors_propagate() {
        let plan = PrefixPlan::all();
        let mut sink = |_a: u32, _p: u8| -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        };
        let mut splitter = Splitter::emitting(&plan, &mut sink);
        let err = splitter.split(0, 0, 0, 255).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
