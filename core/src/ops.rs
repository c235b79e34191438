// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Set Operations
//!
//! Intersection and difference are single-pass two-pointer walks over
//! canonical sets, linear in the number of intervals. Union is
//! concatenation plus lazy normalization, which keeps the hot appending
//! path branch-free and lets one sort amortize any number of inputs.
//!
//! Inputs are normalized on demand; results come out normalized. Every
//! operation returns a freshly owned set and leaves its inputs' contents
//! untouched.

use ipfold_common::models::interval::Interval;
use ipfold_common::models::ipset::IpSet;
use ipfold_common::verbose;

/// Addresses present in both sets. The result is named `common` and its
/// accepted-record counter is the sum of the inputs'.
pub fn intersect(a: &mut IpSet, b: &mut IpSet) -> IpSet {
    a.optimize();
    b.optimize();
    verbose!("finding common addresses of {} and {}", a.name(), b.name());

    let mut out = IpSet::new("common");
    let xs = a.intervals();
    let ys = b.intervals();
    let (mut i, mut j) = (0, 0);

    while i < xs.len() && j < ys.len() {
        let x = xs[i];
        let y = ys[j];

        if x.addr > y.broadcast {
            j += 1;
            continue;
        }
        if y.addr > x.broadcast {
            i += 1;
            continue;
        }

        out.push(Interval::new(
            x.addr.max(y.addr),
            x.broadcast.min(y.broadcast),
        ));
        if x.broadcast <= y.broadcast {
            i += 1;
        }
        if y.broadcast <= x.broadcast {
            j += 1;
        }
    }

    out.set_lines(a.lines() + b.lines());
    out
}

/// Addresses of `a` not present in `b`. The result keeps `a`'s name.
pub fn exclude(a: &mut IpSet, b: &mut IpSet) -> IpSet {
    a.optimize();
    b.optimize();
    verbose!("removing addresses of {} from {}", b.name(), a.name());

    let mut out = IpSet::new(a.name().to_string());
    let xs = a.intervals();
    let ys = b.intervals();
    let (mut i, mut j) = (0, 0);
    // Start of the not-yet-consumed part of xs[i].
    let mut la = xs.first().map_or(0, |x| x.addr);

    while i < xs.len() && j < ys.len() {
        let ha = xs[i].broadcast;
        let y = ys[j];

        if la > y.broadcast {
            j += 1;
            continue;
        }
        if y.addr > ha {
            out.push(Interval::new(la, ha));
            i += 1;
            if i < xs.len() {
                la = xs[i].addr;
            }
            continue;
        }

        if la < y.addr {
            out.push(Interval::new(la, y.addr - 1));
            la = y.addr;
        }

        if ha <= y.broadcast {
            i += 1;
            if i < xs.len() {
                la = xs[i].addr;
            }
            if ha == y.broadcast {
                j += 1;
            }
        } else {
            la = y.broadcast + 1;
            j += 1;
        }
    }

    if i < xs.len() {
        out.push(Interval::new(la, xs[i].broadcast));
        for x in &xs[i + 1..] {
            out.push(*x);
        }
    }

    out.set_lines(a.lines() + b.lines());
    out
}

/// Concatenate any number of sets into one, renamed `name`. The result is
/// left denormalized; consumers normalize lazily.
pub fn union_all(sets: Vec<IpSet>, name: &str) -> IpSet {
    let mut iter = sets.into_iter();
    let mut root = iter.next().unwrap_or_else(|| IpSet::new(name));
    root.set_name(name);
    for s in iter {
        root.extend_from(&s);
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr(s: &str) -> u32 {
        u32::from(s.parse::<Ipv4Addr>().unwrap())
    }

    fn set(ranges: &[(&str, &str)]) -> IpSet {
        let mut s = IpSet::new("test");
        for (lo, hi) in ranges {
            s.push(Interval::new(addr(lo), addr(hi)));
        }
        s
    }

    #[test]
    fn union_of_adjacent_blocks_coalesces() {
        let a = set(&[("10.0.0.0", "10.0.0.3")]);
        let b = set(&[("10.0.0.4", "10.0.0.7")]);
        let mut u = union_all(vec![a, b], "combined");
        u.optimize();
        assert_eq!(
            u.intervals(),
            &[Interval::new(addr("10.0.0.0"), addr("10.0.0.7"))]
        );
        assert_eq!(u.lines(), 2);
    }

    #[test]
    fn intersect_basic_overlap() {
        let mut a = set(&[("10.0.0.0", "10.0.0.255")]);
        let mut b = set(&[("10.0.0.128", "10.0.1.10")]);
        let mut c = intersect(&mut a, &mut b);
        assert_eq!(
            c.intervals(),
            &[Interval::new(addr("10.0.0.128"), addr("10.0.0.255"))]
        );
        assert_eq!(c.unique_ips(), 128);
        assert_eq!(c.name(), "common");
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let mut a = set(&[("1.0.0.0", "1.0.0.255")]);
        let mut b = set(&[("2.0.0.0", "2.0.0.255")]);
        let c = intersect(&mut a, &mut b);
        assert!(c.is_empty());
    }

    #[test]
    fn intersect_splits_against_holes() {
        let mut a = set(&[("10.0.0.0", "10.0.0.10")]);
        let mut b = set(&[("10.0.0.0", "10.0.0.3"), ("10.0.0.6", "10.0.0.10")]);
        let c = intersect(&mut a, &mut b);
        assert_eq!(
            c.intervals(),
            &[
                Interval::new(addr("10.0.0.0"), addr("10.0.0.3")),
                Interval::new(addr("10.0.0.6"), addr("10.0.0.10")),
            ]
        );
        assert!(c.is_optimized());
    }

    #[test]
    fn exclude_carves_a_hole() {
        let mut a = set(&[("10.0.0.0", "10.0.0.255")]);
        let mut b = set(&[("10.0.0.128", "10.0.0.200")]);
        let c = exclude(&mut a, &mut b);
        assert_eq!(
            c.intervals(),
            &[
                Interval::new(addr("10.0.0.0"), addr("10.0.0.127")),
                Interval::new(addr("10.0.0.201"), addr("10.0.0.255")),
            ]
        );
    }

    #[test]
    fn exclude_self_is_empty() {
        let mut a = set(&[("10.0.0.0", "10.0.0.255"), ("1.1.1.1", "1.1.1.1")]);
        let mut b = a.clone();
        let c = exclude(&mut a, &mut b);
        assert!(c.is_empty());
    }

    #[test]
    fn exclude_nothing_returns_all() {
        let mut a = set(&[("10.0.0.0", "10.0.0.255")]);
        let mut b = IpSet::new("empty");
        let c = exclude(&mut a, &mut b);
        assert_eq!(c.intervals(), a.intervals());
    }

    #[test]
    fn exclude_flushes_trailing_intervals() {
        let mut a = set(&[
            ("1.0.0.0", "1.0.0.9"),
            ("2.0.0.0", "2.0.0.9"),
            ("3.0.0.0", "3.0.0.9"),
        ]);
        let mut b = set(&[("1.0.0.5", "1.0.0.9")]);
        let c = exclude(&mut a, &mut b);
        assert_eq!(
            c.intervals(),
            &[
                Interval::new(addr("1.0.0.0"), addr("1.0.0.4")),
                Interval::new(addr("2.0.0.0"), addr("2.0.0.9")),
                Interval::new(addr("3.0.0.0"), addr("3.0.0.9")),
            ]
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_interval() -> impl Strategy<Value = Interval> {
            (0u32..4096, 0u32..96)
                .prop_map(|(lo, w)| Interval::new(lo, lo.saturating_add(w)))
        }

        fn any_set() -> impl Strategy<Value = IpSet> {
            prop::collection::vec(any_interval(), 0..32).prop_map(|ivs| {
                let mut s = IpSet::new("prop");
                for iv in ivs {
                    s.push(iv);
                }
                s
            })
        }

        fn assert_canonical(s: &IpSet) {
            assert!(s.is_optimized());
            for w in s.intervals().windows(2) {
                assert!(w[0].broadcast as u64 + 1 < w[1].addr as u64);
            }
        }

        fn covered_by(inner: &Interval, outer: &IpSet) -> bool {
            outer
                .intervals()
                .iter()
                .any(|o| o.addr <= inner.addr && inner.broadcast <= o.broadcast)
        }

        proptest! {
            #[test]
            fn optimize_is_idempotent(mut s in any_set()) {
                s.optimize();
                let once = s.clone();
                s.optimize();
                prop_assert_eq!(once, s);
            }

            #[test]
            fn results_are_canonical(mut a in any_set(), mut b in any_set()) {
                let common = intersect(&mut a, &mut b);
                assert_canonical(&common);
                let diff = exclude(&mut a, &mut b);
                assert_canonical(&diff);
            }

            #[test]
            fn intersection_is_contained(mut a in any_set(), mut b in any_set()) {
                let common = intersect(&mut a, &mut b);
                for iv in common.intervals() {
                    prop_assert!(covered_by(iv, &a));
                    prop_assert!(covered_by(iv, &b));
                }
            }

            #[test]
            fn inclusion_exclusion(mut a in any_set(), mut b in any_set()) {
                let mut common = intersect(&mut a, &mut b);
                let mut union = union_all(vec![a.clone(), b.clone()], "u");
                prop_assert_eq!(
                    union.unique_ips(),
                    a.unique_ips() + b.unique_ips() - common.unique_ips()
                );
            }

            #[test]
            fn difference_identities(mut a in any_set()) {
                let mut self_copy = a.clone();
                let gone = exclude(&mut a, &mut self_copy);
                prop_assert!(gone.is_empty());

                let mut empty = IpSet::new("empty");
                let kept = exclude(&mut a, &mut empty);
                prop_assert_eq!(kept.intervals(), a.intervals());
            }

            #[test]
            fn difference_plus_intersection_partitions(mut a in any_set(), mut b in any_set()) {
                let mut common = intersect(&mut a, &mut b);
                let mut diff = exclude(&mut a, &mut b);
                prop_assert_eq!(
                    a.unique_ips(),
                    common.unique_ips() + diff.unique_ips()
                );
            }
        }
    }
}
