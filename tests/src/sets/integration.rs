// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

#![cfg(test)]

use std::io::Cursor;

use ipfold_common::config::{Config, OutputFormat};
use ipfold_common::models::ipset::IpSet;
use ipfold_core::cidr::PrefixPlan;
use ipfold_core::resolver::LazyResolver;
use ipfold_core::{loader, ops, output, reduce, snapshot};

fn load_text(name: &str, text: &str, cfg: &Config) -> IpSet {
    let mut resolver = LazyResolver::new();
    loader::load_from_reader(name, &mut Cursor::new(text), cfg, &mut resolver).unwrap()
}

fn render(set: &mut IpSet, plan: &PrefixPlan, cfg: &Config) -> Vec<u8> {
    let mut buf = Vec::new();
    output::print_set(&mut buf, set, plan, cfg).unwrap();
    buf
}

fn render_cidr(set: &mut IpSet, plan: &PrefixPlan) -> String {
    String::from_utf8(render(set, plan, &Config::default())).unwrap()
}

#[test]
fn union_of_adjacent_cidrs_prints_one_block() {
    let cfg = Config::default();
    let set = load_text("a", "10.0.0.0/30\n10.0.0.4/30\n", &cfg);
    let mut merged = ops::union_all(vec![set], "combined");
    assert_eq!(render_cidr(&mut merged, &PrefixPlan::all()), "10.0.0.0/29\n");

    let ranges_cfg = Config {
        format: OutputFormat::Ranges,
        ..Config::default()
    };
    let text = render(&mut merged, &PrefixPlan::all(), &ranges_cfg);
    assert_eq!(String::from_utf8(text).unwrap(), "10.0.0.0-10.0.0.7\n");
}

#[test]
fn cidr_print_and_reparse_round_trips() {
    let cfg = Config::default();
    let mut original = load_text(
        "a",
        "10.0.0.0/24\n192.168.1.5 - 192.168.3.77\n1.2.3.4\n200.1.1.128/255.255.255.128\n",
        &cfg,
    );
    original.optimize();

    let text = render_cidr(&mut original, &PrefixPlan::all());
    let mut reparsed = load_text("b", &text, &cfg);
    reparsed.optimize();

    assert_eq!(reparsed.intervals(), original.intervals());
}

#[test]
fn complement_splits_into_known_blocks() {
    let cfg = Config::default();
    let mut a = load_text("a", "10.0.0.0/24\n", &cfg);
    let mut b = load_text("b", "10.0.0.128-10.0.0.200\n", &cfg);
    let mut diff = ops::exclude(&mut a, &mut b);

    assert_eq!(
        render_cidr(&mut diff, &PrefixPlan::all()),
        "10.0.0.0/25\n\
         10.0.0.201\n\
         10.0.0.202/31\n\
         10.0.0.204/30\n\
         10.0.0.208/28\n\
         10.0.0.224/27\n"
    );
}

#[test]
fn identical_single_host_sets_compare_as_one() {
    let cfg = Config::default();
    let mut a = load_text("a", "1.1.1.1\n", &cfg);
    let mut b = load_text("b", "1.1.1.1\n", &cfg);
    let mut common = ops::intersect(&mut a, &mut b);

    let common_ips = common.unique_ips();
    let combined_ips = a.unique_ips() + b.unique_ips() - common_ips;
    assert_eq!(common_ips, 1);
    assert_eq!(combined_ips, 1);
}

#[test]
fn binary_snapshot_survives_print_and_reload() {
    let cfg = Config::default();
    let mut original = load_text("a", "10.0.0.0/22\n172.16.0.1-172.16.4.200\n9.9.9.9\n", &cfg);

    let binary_cfg = Config {
        format: OutputFormat::Binary,
        ..Config::default()
    };
    let bytes = render(&mut original, &PrefixPlan::all(), &binary_cfg);

    // print_set normalized the set before writing.
    assert!(original.is_optimized());

    let mut resolver = LazyResolver::new();
    let reloaded =
        loader::load_from_reader("a", &mut Cursor::new(&bytes), &cfg, &mut resolver).unwrap();
    assert_eq!(reloaded, original);
    assert!(reloaded.is_optimized());
}

#[test]
fn reduction_respects_cap_and_loses_nothing() {
    let cfg = Config::default();
    let mut set = load_text(
        "a",
        "10.0.0.0/24\n\
         10.0.2.0/26\n\
         10.0.3.0/28\n\
         10.0.4.16/30\n\
         10.9.9.9\n\
         10.9.9.11\n\
         172.16.0.0-172.16.0.100\n",
        &cfg,
    );
    set.optimize();

    let mut baseline_plan = PrefixPlan::all();
    let baseline = render_cidr(&mut set, &baseline_plan).lines().count() as u64;

    reduce::reduce(&mut set, &mut baseline_plan, 130, 4).unwrap();
    let reduced_text = render_cidr(&mut set, &baseline_plan);
    let reduced = reduced_text.lines().count() as u64;

    let cap = (baseline * 130 / 100).max(4);
    assert!(reduced <= cap, "{reduced} blocks, cap {cap}");

    // The reduced decomposition still covers exactly the same addresses.
    let mut reparsed = load_text("b", &reduced_text, &cfg);
    reparsed.optimize();
    assert_eq!(reparsed.intervals(), set.intervals());
}

#[test]
fn min_prefix_forces_longer_blocks_end_to_end() {
    let cfg = Config::default();
    let mut set = load_text("a", "10.0.0.0/23\n", &cfg);
    let plan = PrefixPlan::from_restrictions(None, Some(24));
    assert_eq!(
        render_cidr(&mut set, &plan),
        "10.0.0.0/24\n10.0.1.0/24\n"
    );
}

#[test]
fn snapshot_header_is_what_the_loader_sniffs() {
    // A text file that merely starts with the header line must be treated
    // as binary and rejected when the rest does not follow.
    let cfg = Config::default();
    let text = format!("{}\nnot a snapshot\n", snapshot::HEADER);
    let mut resolver = LazyResolver::new();
    let result =
        loader::load_from_reader("a", &mut Cursor::new(text.as_str()), &cfg, &mut resolver);
    assert!(result.is_err());
}
