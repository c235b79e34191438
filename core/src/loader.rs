// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Source Loading
//!
//! Turns input sources (files, stdin) into [`IpSet`]s. The first line of
//! each source decides text versus binary: a line equal to the snapshot
//! header loads the rest of the stream through the snapshot codec, anything
//! else starts text parsing.
//!
//! Record failures are diagnostics, not errors: a malformed line or an
//! unresolvable hostname is warned about and dropped, and loading carries
//! on. A source that cannot be read at all is skipped; only a run where
//! every source failed aborts.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use ipfold_common::config::Config;
use ipfold_common::models::interval::Interval;
use ipfold_common::models::ipset::IpSet;
use ipfold_common::{verbose, warn};

use crate::errors::CoreError;
use crate::parse::{self, Record};
use crate::resolver::LazyResolver;
use crate::snapshot;

/// One input source as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

/// A source plus its display label. The label defaults to the path
/// (`stdin` for standard input) and can be overridden with `path=label`,
/// which is what the CSV modes print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub source: Source,
    pub label: String,
}

impl SourceSpec {
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            return Self {
                source: Source::Stdin,
                label: "stdin".to_string(),
            };
        }
        match arg.split_once('=') {
            Some((path, label)) if !path.is_empty() && !label.is_empty() => Self {
                source: Source::File(PathBuf::from(path)),
                label: label.to_string(),
            },
            _ => Self {
                source: Source::File(PathBuf::from(arg)),
                label: arg.to_string(),
            },
        }
    }

    pub fn stdin() -> Self {
        Self::parse("-")
    }
}

/// Load one source into a set named after its label.
pub fn load(
    spec: &SourceSpec,
    cfg: &Config,
    resolver: &mut LazyResolver,
) -> Result<IpSet, CoreError> {
    verbose!("loading from {}", spec.label);
    match &spec.source {
        Source::Stdin => load_from_reader(&spec.label, &mut io::stdin().lock(), cfg, resolver),
        Source::File(path) => {
            let mut reader = BufReader::new(File::open(path)?);
            load_from_reader(&spec.label, &mut reader, cfg, resolver)
        }
    }
}

/// Load text or binary records from any buffered reader.
pub fn load_from_reader<R: BufRead>(
    name: &str,
    input: &mut R,
    cfg: &Config,
    resolver: &mut LazyResolver,
) -> Result<IpSet, CoreError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(IpSet::new(name));
    }

    if line.trim_end_matches(['\r', '\n']) == snapshot::HEADER {
        let set = snapshot::load_after_header(input, name)?;
        verbose!(
            "binary loaded {} {name}",
            if set.is_optimized() {
                "optimized"
            } else {
                "non-optimized"
            }
        );
        return Ok(set);
    }

    let mut set = IpSet::new(name);
    let mut lineno: u64 = 0;
    loop {
        lineno += 1;
        ingest(&mut set, &line, lineno, name, cfg, resolver);
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
    }

    verbose!(
        "loaded {} {name}",
        if set.is_optimized() {
            "optimized"
        } else {
            "non-optimized"
        }
    );
    Ok(set)
}

fn ingest(
    set: &mut IpSet,
    line: &str,
    lineno: u64,
    name: &str,
    cfg: &Config,
    resolver: &mut LazyResolver,
) {
    match parse::classify(line, lineno) {
        Record::Empty => {}

        Record::Invalid => {
            warn!(
                "cannot understand line {lineno} of {name}: {}",
                line.trim_end()
            );
        }

        Record::One(token) => match parse::parse_addr(token, cfg) {
            Ok(iv) => set.push(iv),
            Err(err) => warn!("line {lineno} of {name}: {err}"),
        },

        Record::Pair(first, second) => match parse::parse_pair(first, second, cfg) {
            Ok(iv) => set.push(iv),
            Err(err) => warn!("line {lineno} of {name}: {err}"),
        },

        Record::Host(host) => {
            if cfg.no_dns {
                warn!("skipping hostname '{host}' on line {lineno} of {name}, DNS is disabled");
                return;
            }
            verbose!("resolving hostname '{host}' from line {lineno} of {name}");
            match resolver.lookup_ipv4(host) {
                Ok(addrs) => {
                    if addrs.is_empty() {
                        warn!("hostname '{host}' on line {lineno} of {name} has no IPv4 address");
                    }
                    for addr in addrs {
                        set.push(Interval::single(u32::from(addr)));
                    }
                }
                Err(err) => warn!("line {lineno} of {name}: {err}"),
            }
        }
    }
}

/// Load every given source, in order. `args` are raw command-line file
/// operands; no operands means stdin. Unreadable sources are skipped with
/// a warning; only a run with no usable source at all is an error, and
/// corrupt binary snapshots are always fatal.
pub fn load_all(args: &[String], cfg: &Config) -> anyhow::Result<Vec<IpSet>> {
    let specs: Vec<SourceSpec> = if args.is_empty() {
        vec![SourceSpec::stdin()]
    } else {
        args.iter().map(|arg| SourceSpec::parse(arg)).collect()
    };

    let mut resolver = LazyResolver::new();
    let mut sets = Vec::with_capacity(specs.len());
    for spec in &specs {
        match load(spec, cfg, &mut resolver) {
            Ok(set) => sets.push(set),
            Err(CoreError::Io(err)) => {
                warn!("{}: {err}, skipping this source", spec.label);
            }
            Err(err) => return Err(err.into()),
        }
    }

    anyhow::ensure!(!sets.is_empty(), "no usable input sources");
    Ok(sets)
}
