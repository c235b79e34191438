// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

/// How an IP set is rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// CIDR blocks, one per line (`A.B.C.D/p`, bare address for /32).
    #[default]
    Cidr,
    /// Address ranges (`A.B.C.D-E.F.G.H`, bare address for singletons).
    Ranges,
    /// Every single address, expanded.
    Singles,
    /// The v1.0 binary snapshot.
    Binary,
}

/// Strings wrapped around each printed record.
///
/// Singletons and networks carry separate strings so that single IPs can be
/// routed into a different downstream set than subnets, e.g.
/// `--print-prefix-ips "add myset-hosts "`.
#[derive(Debug, Clone, Default)]
pub struct PrintStyle {
    pub prefix_ips: String,
    pub prefix_nets: String,
    pub suffix_ips: String,
    pub suffix_nets: String,
}

/// Global runtime options.
///
/// Constructed once from the command line and handed by reference to the
/// loading, printing and reduction paths. Library code never sees clap
/// types.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix applied to addresses given without `/mask`.
    ///
    /// The default is 32, i.e. a bare address is a single host.
    pub default_prefix: u8,

    /// Mask CIDR input down to its network address.
    ///
    /// When `true` (default), `1.1.1.17/24` reads as `1.1.1.0/24`. When
    /// `false` (`--dont-fix-network`), it reads as `1.1.1.17-1.1.1.255`:
    /// the given address is kept and only the broadcast is derived.
    pub fix_network: bool,

    /// Skip DNS resolution of hostname records.
    ///
    /// Hostname lines are dropped with a warning instead of being resolved.
    /// Useful for offline runs and for inputs that must not trigger
    /// network traffic.
    pub no_dns: bool,

    /// Print the header line in CSV output modes.
    pub header: bool,

    /// Rendering used by the set-producing modes.
    pub format: OutputFormat,

    /// Per-record prefix/suffix strings.
    pub style: PrintStyle,

    /// Do not emit CIDR blocks shorter than this prefix.
    ///
    /// A `/16` is then expressed as multiple longer blocks. Disabling short
    /// prefixes trades entry count for fewer distinct prefix lengths, which
    /// is what dominates lookup cost in some kernel set types.
    pub min_prefix: Option<u8>,

    /// Restrict emission to exactly these prefix lengths (32 is always
    /// allowed on top of the listed ones).
    pub prefixes: Option<Vec<u8>>,

    /// Reduction cap as a percentage of the baseline block count.
    ///
    /// 120 means the reduced decomposition may grow to 120% of the
    /// baseline.
    pub reduce_factor: u64,

    /// Absolute floor for the reduction cap.
    ///
    /// Small sets may grow past `reduce_factor` up to this many entries.
    pub reduce_entries: u64,

    /// Diagnostic verbosity, mapped from repeated `-v` flags.
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_prefix: 32,
            fix_network: true,
            no_dns: false,
            header: false,
            format: OutputFormat::default(),
            style: PrintStyle::default(),
            min_prefix: None,
            prefixes: None,
            reduce_factor: 120,
            reduce_entries: 16_384,
            verbosity: 0,
        }
    }
}
