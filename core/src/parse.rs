// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Input Record Parsing
//!
//! Two layers, mirroring the two decisions every input line needs:
//!
//! 1. [`classify`] decides what kind of record a line is (nothing, one
//!    address, an address range, a hostname) and slices out the textual
//!    tokens. It never interprets digits.
//! 2. [`parse_addr`] turns one token into an address interval, handling
//!    `/prefix`, `/netmask` and bare-address forms.
//!
//! Classification is forgiving: anything that does not scan as an address
//! form is retried as a hostname, and trailing junk is warned about rather
//! than rejected. Numeric interpretation is strict.

use std::net::Ipv4Addr;

use ipfold_common::config::Config;
use ipfold_common::models::interval::{Interval, PREFIX_MAX, broadcast, network};
use ipfold_common::warn;

use crate::errors::CoreError;

/// Longest accepted input line, in bytes.
pub const MAX_LINE: usize = 1024;

/// One classified input line. Tokens borrow from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// Blank line or pure comment.
    Empty,
    /// A single address or CIDR token.
    One(&'a str),
    /// `<token> - <token>`, an address-to-address range.
    Pair(&'a str, &'a str),
    /// A DNS name to be resolved.
    Host(&'a str),
    /// Nothing usable on the line.
    Invalid,
}

fn is_ip_char(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.' || b == b'/'
}

fn is_host_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'.'
}

fn skip_blank(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && (bytes[*i] == b' ' || bytes[*i] == b'\t') {
        *i += 1;
    }
}

/// True at end of record: end of line, CR/LF, or the start of a comment.
fn at_end(bytes: &[u8], i: usize) -> bool {
    i >= bytes.len() || matches!(bytes[i], b'#' | b';' | b'\r' | b'\n')
}

/// Classify one input line. `lineno` is used in diagnostics only.
pub fn classify(line: &str, lineno: u64) -> Record<'_> {
    if line.len() > MAX_LINE {
        warn!("line {lineno} exceeds {MAX_LINE} bytes, skipped");
        return Record::Invalid;
    }

    let bytes = line.as_bytes();
    let mut i = 0;

    skip_blank(bytes, &mut i);
    if at_end(bytes, i) {
        return Record::Empty;
    }

    let start = i;
    while i < bytes.len() && is_ip_char(bytes[i]) {
        i += 1;
    }
    if i == start {
        return classify_hostname(line, lineno);
    }
    let first = &line[start..i];

    skip_blank(bytes, &mut i);
    if at_end(bytes, i) {
        return Record::One(first);
    }

    if bytes[i] != b'-' {
        return classify_hostname(line, lineno);
    }
    i += 1;
    skip_blank(bytes, &mut i);

    if at_end(bytes, i) {
        warn!("incomplete range on line {lineno}, expected an address after '-'");
        return Record::One(first);
    }

    let start = i;
    while i < bytes.len() && is_ip_char(bytes[i]) {
        i += 1;
    }
    if i == start {
        return classify_hostname(line, lineno);
    }
    let second = &line[start..i];

    skip_blank(bytes, &mut i);
    if at_end(bytes, i) {
        return Record::Pair(first, second);
    }

    classify_hostname(line, lineno)
}

/// Rescan a line as a hostname record.
fn classify_hostname(line: &str, lineno: u64) -> Record<'_> {
    let bytes = line.as_bytes();
    let mut i = 0;

    skip_blank(bytes, &mut i);
    let start = i;
    while i < bytes.len() && is_host_char(bytes[i]) {
        i += 1;
    }
    if i == start {
        return Record::Invalid;
    }
    let token = &line[start..i];

    skip_blank(bytes, &mut i);
    if !at_end(bytes, i) {
        warn!("ignoring text after hostname '{token}' on line {lineno}");
    }

    Record::Host(token)
}

/// Parse the part after `/`: a decimal prefix in `[0,32]`, or a dotted-quad
/// netmask whose complement must be a contiguous run of low-order ones.
fn parse_prefix(s: &str) -> Result<u8, CoreError> {
    if let Ok(p) = s.parse::<u8>()
        && p <= PREFIX_MAX
    {
        return Ok(p);
    }

    let mask_addr: Ipv4Addr = s
        .parse()
        .map_err(|_| CoreError::InvalidMask(s.to_string()))?;
    let mut hostmask = !u32::from(mask_addr);
    let mut prefix = PREFIX_MAX;
    while hostmask & 1 == 1 {
        hostmask >>= 1;
        prefix -= 1;
    }
    if hostmask != 0 {
        return Err(CoreError::InvalidMask(s.to_string()));
    }

    Ok(prefix)
}

/// Parse one address token into an interval.
///
/// A token without `/` gets `Config::default_prefix`. With
/// `Config::fix_network` the address is masked down to its network first;
/// without it the given address is kept and only the broadcast derives
/// from the prefix.
pub fn parse_addr(token: &str, cfg: &Config) -> Result<Interval, CoreError> {
    let (addr_str, prefix) = match token.split_once('/') {
        Some((left, right)) => (left, parse_prefix(right)?),
        None => (token, cfg.default_prefix),
    };

    let addr: Ipv4Addr = addr_str
        .parse()
        .map_err(|_| CoreError::InvalidAddress(token.to_string()))?;
    let addr = u32::from(addr);

    let net = if cfg.fix_network {
        network(addr, prefix)
    } else {
        addr
    };

    Ok(Interval::new(net, broadcast(net, prefix)))
}

/// Parse a two-token range record. Either side may itself be a CIDR; the
/// result spans from the lowest network address to the highest broadcast,
/// whichever order the operands came in.
pub fn parse_pair(first: &str, second: &str, cfg: &Config) -> Result<Interval, CoreError> {
    let a = parse_addr(first, cfg)?;
    let b = parse_addr(second, cfg)?;
    Ok(Interval::new(
        a.addr.min(b.addr),
        a.broadcast.max(b.broadcast),
    ))
}
