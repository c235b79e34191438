// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # IP Set Model
//!
//! An [`IpSet`] is a named, growable sequence of address intervals together
//! with the bookkeeping the reporting modes need: how many input records
//! were accepted and how many distinct addresses the set covers.
//!
//! ## The `optimized` invariant
//!
//! When `optimized` is true the intervals are in strictly ascending order
//! by start address, pairwise disjoint, and no two consecutive intervals
//! are adjacent. Every algebraic operation requires this form; appends
//! maintain it opportunistically (sorted input never pays for a sort) and
//! [`IpSet::optimize`] restores it otherwise.

use crate::models::interval::Interval;
use crate::verbose;

/// A set of IPv4 addresses held as coalesced intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpSet {
    name: String,
    lines: u64,
    unique_ips: u64,
    optimized: bool,
    intervals: Vec<Interval>,
}

impl IpSet {
    /// Create an empty set. An empty set is trivially in canonical form,
    /// so appends of already-sorted input coalesce as they arrive.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: 0,
            unique_ips: 0,
            optimized: true,
            intervals: Vec::new(),
        }
    }

    /// Rebuild a set from snapshot fields, trusting them as written.
    pub fn from_snapshot_parts(
        name: impl Into<String>,
        intervals: Vec<Interval>,
        lines: u64,
        unique_ips: u64,
        optimized: bool,
    ) -> Self {
        Self {
            name: name.into(),
            lines,
            unique_ips,
            optimized,
            intervals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of intervals currently stored.
    pub fn entries(&self) -> usize {
        self.intervals.len()
    }

    /// Number of input records accepted into this set. Operational counter;
    /// it survives coalescing and is summed by the set operations.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn set_lines(&mut self, lines: u64) {
        self.lines = lines;
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Append one interval, counting it as one accepted record.
    ///
    /// While the set is in canonical form, an interval that starts exactly
    /// one past the tail extends the tail in place, one that starts after
    /// the tail is appended as-is, and anything else drops the canonical
    /// flag until the next [`IpSet::optimize`].
    pub fn push(&mut self, iv: Interval) {
        self.lines += 1;
        self.unique_ips += iv.width();

        if self.optimized {
            if let Some(last) = self.intervals.last_mut() {
                match last.broadcast.checked_add(1) {
                    Some(next) if iv.addr == next => {
                        last.broadcast = iv.broadcast;
                        return;
                    }
                    _ if iv.addr > last.broadcast => {}
                    _ => self.optimized = false,
                }
            }
        }

        self.intervals.push(iv);
    }

    /// Append every interval of `other`, keeping the result denormalized.
    /// Accepted-record counts are summed.
    pub fn extend_from(&mut self, other: &IpSet) {
        self.intervals.extend_from_slice(&other.intervals);
        self.lines += other.lines;
        self.optimized = false;
    }

    /// Restore canonical form: sort, then coalesce overlapping and
    /// adjacent intervals. Idempotent; `lines` is preserved and
    /// `unique_ips` recomputed.
    pub fn optimize(&mut self) {
        if self.optimized {
            return;
        }

        verbose!("optimizing {} ({} entries)", self.name, self.intervals.len());

        // Wider ranges first among equal starts, so the sweep below only
        // ever extends forward.
        self.intervals
            .sort_by(|a, b| a.addr.cmp(&b.addr).then(b.broadcast.cmp(&a.broadcast)));

        let old = std::mem::take(&mut self.intervals);
        let mut merged: Vec<Interval> = Vec::with_capacity(old.len());
        let mut unique: u64 = 0;

        let mut iter = old.into_iter();
        if let Some(first) = iter.next() {
            let mut lo = first.addr;
            let mut hi = first.broadcast;

            for iv in iter {
                if iv.broadcast <= hi {
                    continue;
                }
                if hi.checked_add(1).is_none_or(|next| iv.addr <= next) {
                    hi = iv.broadcast;
                    continue;
                }
                let done = Interval::new(lo, hi);
                unique += done.width();
                merged.push(done);
                lo = iv.addr;
                hi = iv.broadcast;
            }

            let tail = Interval::new(lo, hi);
            unique += tail.width();
            merged.push(tail);
        }

        self.intervals = merged;
        self.unique_ips = unique;
        self.optimized = true;
    }

    /// Count of distinct addresses. Only canonical storage counts each
    /// address once, so this normalizes first when needed.
    pub fn unique_ips(&mut self) -> u64 {
        self.optimize();
        self.unique_ips
    }

    /// Current value of the distinct-address counter without normalizing.
    /// Exact when the set is optimized, an upper bound otherwise.
    pub fn unique_ips_hint(&self) -> u64 {
        self.unique_ips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(lo: u32, hi: u32) -> Interval {
        Interval::new(lo, hi)
    }

    #[test]
    fn push_coalesces_adjacent_tail() {
        let mut set = IpSet::new("t");
        set.push(iv(0, 3));
        set.push(iv(4, 7));
        assert!(set.is_optimized());
        assert_eq!(set.entries(), 1);
        assert_eq!(set.intervals(), &[iv(0, 7)]);
        assert_eq!(set.lines(), 2);
    }

    #[test]
    fn push_keeps_sorted_gapped_input_optimized() {
        let mut set = IpSet::new("t");
        set.push(iv(0, 3));
        set.push(iv(10, 12));
        assert!(set.is_optimized());
        assert_eq!(set.entries(), 2);
    }

    #[test]
    fn push_out_of_order_clears_flag() {
        let mut set = IpSet::new("t");
        set.push(iv(10, 12));
        set.push(iv(0, 3));
        assert!(!set.is_optimized());
        assert_eq!(set.entries(), 2);
    }

    #[test]
    fn duplicate_address_counts_once() {
        let mut set = IpSet::new("t");
        let a = u32::from(std::net::Ipv4Addr::new(1, 2, 3, 4));
        set.push(Interval::single(a));
        set.push(Interval::single(a));
        assert_eq!(set.lines(), 2);
        assert_eq!(set.unique_ips(), 1);
        assert_eq!(set.entries(), 1);
    }

    #[test]
    fn optimize_merges_overlaps_and_adjacency() {
        let mut set = IpSet::new("t");
        set.push(iv(20, 30));
        set.push(iv(0, 5));
        set.push(iv(4, 10));
        set.push(iv(11, 12));
        set.optimize();
        assert_eq!(set.intervals(), &[iv(0, 12), iv(20, 30)]);
        assert_eq!(set.unique_ips(), 13 + 11);
        assert_eq!(set.lines(), 4);
    }

    #[test]
    fn optimize_is_idempotent() {
        let mut set = IpSet::new("t");
        set.push(iv(50, 60));
        set.push(iv(0, 100));
        set.optimize();
        let snapshot = set.clone();
        set.optimize();
        assert_eq!(set, snapshot);
    }

    #[test]
    fn optimize_handles_space_end() {
        let mut set = IpSet::new("t");
        set.push(iv(u32::MAX - 1, u32::MAX));
        set.push(iv(0, 10));
        set.optimize();
        assert_eq!(set.entries(), 2);
        assert_eq!(set.unique_ips(), 13);
    }

    #[test]
    fn extend_from_sums_lines() {
        let mut a = IpSet::new("a");
        a.push(iv(0, 1));
        let mut b = IpSet::new("b");
        b.push(iv(0, 1));
        b.push(iv(5, 6));
        a.extend_from(&b);
        assert!(!a.is_optimized());
        assert_eq!(a.lines(), 3);
        assert_eq!(a.entries(), 3);
        assert_eq!(a.unique_ips(), 4);
    }
}
