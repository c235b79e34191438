// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Command Line Interface Definitions
//!
//! The single source of truth for user input. Execution logic for each
//! mode lives in its own submodule; the definition of arguments, flags and
//! help text is centralized here.
//!
//! Two architectural functions:
//!
//! 1. **Input validation**: `clap` rejects malformed flags, out-of-range
//!    prefixes and missing operand groups before any file is opened.
//! 2. **State translation**: `From<&CommandLine> for Config` decouples the
//!    external flag surface from the internal configuration, so the
//!    library crates stay free of clap types.
//!
//! [`CommandLine`] carries the flags shared by every mode; [`Commands`]
//! holds the mutually exclusive operation modes. Everywhere a `FILES`
//! operand appears, `-` means stdin, no operand at all means stdin, and a
//! `path=label` suffix overrides the name shown in CSV output.

pub mod compare;
pub mod complement;
pub mod count;
pub mod intersect;
pub mod reduce;
pub mod union;

use clap::{ArgAction, Parser, Subcommand, value_parser};
use ipfold_common::config::{Config, OutputFormat, PrintStyle};

#[derive(Parser)]
#[command(name = "ipfold")]
#[command(about = "Calculator for sets of IPv4 addresses, ranges and CIDR blocks.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Prefix assumed for addresses given without a mask
    #[arg(
        short = 'p',
        long = "default-prefix",
        value_name = "PREFIX",
        default_value_t = 32,
        value_parser = value_parser!(u8).range(0..=32),
        global = true
    )]
    pub default_prefix: u8,

    /// Keep host bits of CIDR input (1.1.1.17/24 reads as 1.1.1.17-1.1.1.255)
    #[arg(long = "dont-fix-network", global = true)]
    pub dont_fix_network: bool,

    /// Never resolve hostnames found in the input
    #[arg(short = 'n', long = "no-dns", global = true)]
    pub no_dns: bool,

    /// Do not emit CIDR prefixes shorter than N (a /16 becomes many /N)
    #[arg(
        long = "min-prefix",
        value_name = "N",
        value_parser = value_parser!(u8).range(1..=31),
        global = true
    )]
    pub min_prefix: Option<u8>,

    /// Emit only these prefix lengths (32 is always allowed)
    #[arg(
        long = "prefixes",
        value_name = "N,N,...",
        value_delimiter = ',',
        value_parser = value_parser!(u8).range(1..=32),
        global = true
    )]
    pub prefixes: Option<Vec<u8>>,

    /// Print ranges (A.B.C.D-E.F.G.H) instead of CIDRs
    #[arg(short = 'j', long = "print-ranges", global = true)]
    pub print_ranges: bool,

    /// Print every single address (can produce huge output)
    #[arg(
        short = '1',
        long = "print-single-ips",
        conflicts_with = "print_ranges",
        global = true
    )]
    pub print_single_ips: bool,

    /// Print the binary snapshot format
    #[arg(
        long = "print-binary",
        conflicts_with_all = ["print_ranges", "print_single_ips"],
        global = true
    )]
    pub print_binary: bool,

    /// String printed before every IP, range or CIDR
    #[arg(long = "print-prefix", value_name = "STRING", global = true)]
    pub print_prefix: Option<String>,

    /// String printed before single IPs only
    #[arg(long = "print-prefix-ips", value_name = "STRING", global = true)]
    pub print_prefix_ips: Option<String>,

    /// String printed before ranges and CIDRs only
    #[arg(long = "print-prefix-nets", value_name = "STRING", global = true)]
    pub print_prefix_nets: Option<String>,

    /// String printed after every IP, range or CIDR
    #[arg(long = "print-suffix", value_name = "STRING", global = true)]
    pub print_suffix: Option<String>,

    /// String printed after single IPs only
    #[arg(long = "print-suffix-ips", value_name = "STRING", global = true)]
    pub print_suffix_ips: Option<String>,

    /// String printed after ranges and CIDRs only
    #[arg(long = "print-suffix-nets", value_name = "STRING", global = true)]
    pub print_suffix_nets: Option<String>,

    /// Print the header line in CSV output modes
    #[arg(long = "header", global = true)]
    pub header: bool,

    /// Probe flag for scripts: exit 0 if the compare modes exist
    #[arg(long = "has-compare")]
    pub has_compare: bool,

    /// Probe flag for scripts: exit 0 if the reduce mode exists
    #[arg(long = "has-reduce")]
    pub has_reduce: bool,

    /// Increase diagnostic detail on stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge all sources and print the combined set (the default mode)
    #[command(alias = "u", alias = "combine", alias = "merge")]
    Union {
        #[arg(value_name = "FILES")]
        files: Vec<String>,
    },

    /// Keep only the addresses present in every source
    #[command(alias = "common")]
    Intersect {
        #[arg(value_name = "FILES", num_args(1..))]
        files: Vec<String>,
    },

    /// Remove the addresses of the --remove sources from the union of FILES
    #[command(alias = "exclude")]
    Complement {
        #[arg(value_name = "FILES", num_args(1..))]
        files: Vec<String>,

        /// Sources whose addresses are removed
        #[arg(long = "remove", value_name = "FILES", num_args(1..), required = true)]
        remove: Vec<String>,
    },

    /// Compare every source with every other source (CSV)
    Compare {
        #[arg(value_name = "FILES", num_args(2..))]
        files: Vec<String>,
    },

    /// Compare the first source with each of the others (CSV)
    CompareFirst {
        #[arg(value_name = "FILES", num_args(2..))]
        files: Vec<String>,
    },

    /// Compare each of FILES with each of the --with sources (CSV)
    CompareNext {
        #[arg(value_name = "FILES", num_args(1..))]
        files: Vec<String>,

        /// The second comparison group
        #[arg(long = "with", value_name = "FILES", num_args(1..), required = true)]
        with: Vec<String>,
    },

    /// Merge all sources and print record and unique-address counts (CSV)
    #[command(name = "count-unique", alias = "count")]
    CountUnique {
        #[arg(value_name = "FILES")]
        files: Vec<String>,
    },

    /// Print record and unique-address counts per source (CSV)
    #[command(name = "count-unique-all")]
    CountUniqueAll {
        #[arg(value_name = "FILES")]
        files: Vec<String>,
    },

    /// Merge all sources, then express the set with fewer distinct prefix
    /// lengths at the cost of a bounded increase in entries
    Reduce {
        #[arg(value_name = "FILES")]
        files: Vec<String>,

        /// Acceptable increase of entries, in percent over the baseline
        #[arg(long = "factor", value_name = "PERCENT", default_value_t = 20)]
        factor: u64,

        /// Allow growing up to this many entries even past the percentage
        #[arg(long = "entries", value_name = "N", default_value_t = 16_384)]
        entries: u64,
    },
}

impl CommandLine {
    /// Parse without clap's default exit behavior; usage failures must
    /// terminate with exit code 1, help and version with 0.
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}

impl From<&CommandLine> for Config {
    fn from(cmd: &CommandLine) -> Self {
        let format = if cmd.print_binary {
            OutputFormat::Binary
        } else if cmd.print_single_ips {
            OutputFormat::Singles
        } else if cmd.print_ranges {
            OutputFormat::Ranges
        } else {
            OutputFormat::Cidr
        };

        let pick = |specific: &Option<String>, umbrella: &Option<String>| {
            specific
                .clone()
                .or_else(|| umbrella.clone())
                .unwrap_or_default()
        };
        let style = PrintStyle {
            prefix_ips: pick(&cmd.print_prefix_ips, &cmd.print_prefix),
            prefix_nets: pick(&cmd.print_prefix_nets, &cmd.print_prefix),
            suffix_ips: pick(&cmd.print_suffix_ips, &cmd.print_suffix),
            suffix_nets: pick(&cmd.print_suffix_nets, &cmd.print_suffix),
        };

        let (reduce_factor, reduce_entries) = match &cmd.command {
            Some(Commands::Reduce {
                factor, entries, ..
            }) => (100 + *factor, *entries),
            _ => (120, 16_384),
        };

        Self {
            default_prefix: cmd.default_prefix,
            fix_network: !cmd.dont_fix_network,
            no_dns: cmd.no_dns,
            header: cmd.header,
            format,
            style,
            min_prefix: cmd.min_prefix,
            prefixes: cmd.prefixes.clone(),
            reduce_factor,
            reduce_entries,
            verbosity: cmd.verbosity,
        }
    }
}
