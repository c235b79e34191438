// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Binary Snapshot Codec
//!
//! A round-trippable stream form of a set: a short ASCII header describing
//! the payload, an endianness marker, then the raw interval records in
//! native byte order. The point is fast reloads of large sets without
//! reparsing or re-normalizing, so the payload is exactly the in-memory
//! layout and a load from a foreign byte order is refused rather than
//! converted.
//!
//! ```text
//! iprange binary format v1.0
//! optimized | non-optimized
//! record size 8
//! records N
//! bytes N                     payload size, records * 8 + 4
//! lines N
//! unique ips N
//! <u32 0x1A2B3C4D, native><records * 8 bytes of intervals, native>
//! ```

use std::io::{BufRead, Write};

use ipfold_common::models::interval::Interval;
use ipfold_common::models::ipset::IpSet;

use crate::errors::CoreError;

/// First line of every snapshot; also what the loader sniffs for.
pub const HEADER: &str = "iprange binary format v1.0";

const ENDIAN_MARKER: u32 = 0x1A2B_3C4D;
const RECORD_SIZE: usize = 8;

/// Write `set` as a snapshot. An empty set writes nothing, so piping an
/// empty result produces an empty stream rather than a headerless stub.
pub fn save<W: Write>(out: &mut W, set: &IpSet) -> std::io::Result<()> {
    if set.entries() == 0 {
        return Ok(());
    }

    writeln!(out, "{HEADER}")?;
    writeln!(
        out,
        "{}",
        if set.is_optimized() {
            "optimized"
        } else {
            "non-optimized"
        }
    )?;
    writeln!(out, "record size {RECORD_SIZE}")?;
    writeln!(out, "records {}", set.entries())?;
    writeln!(
        out,
        "bytes {}",
        set.entries() * RECORD_SIZE + size_of::<u32>()
    )?;
    writeln!(out, "lines {}", set.lines())?;
    writeln!(out, "unique ips {}", set.unique_ips_hint())?;

    out.write_all(&ENDIAN_MARKER.to_ne_bytes())?;
    for iv in set.intervals() {
        out.write_all(&iv.addr.to_ne_bytes())?;
        out.write_all(&iv.broadcast.to_ne_bytes())?;
    }

    Ok(())
}

fn read_line<R: BufRead>(input: &mut R, name: &str) -> Result<String, CoreError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CoreError::snapshot(name, "truncated header"));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

fn read_field<R: BufRead>(input: &mut R, name: &str, key: &str) -> Result<u64, CoreError> {
    let line = read_line(input, name)?;
    let value = line
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or_else(|| {
            CoreError::snapshot(name, format!("expected '{key}' line but found '{line}'"))
        })?;
    value
        .parse::<u64>()
        .map_err(|_| CoreError::snapshot(name, format!("bad '{key}' value '{value}'")))
}

/// Read a snapshot whose header line has already been consumed by the
/// text/binary sniffing in the loader. `name` labels both the resulting
/// set and any diagnostics.
pub fn load_after_header<R: BufRead>(input: &mut R, name: &str) -> Result<IpSet, CoreError> {
    let flag = read_line(input, name)?;
    let optimized = match flag.as_str() {
        "optimized" => true,
        "non-optimized" => false,
        other => {
            return Err(CoreError::snapshot(
                name,
                format!("2nd line should be the optimized flag, found '{other}'"),
            ));
        }
    };

    let record_size = read_field(input, name, "record size")?;
    if record_size != RECORD_SIZE as u64 {
        return Err(CoreError::snapshot(
            name,
            format!("invalid record size {record_size} (expected {RECORD_SIZE})"),
        ));
    }

    let records = read_field(input, name, "records")?;
    let bytes = read_field(input, name, "bytes")?;
    let lines = read_field(input, name, "lines")?;
    let unique_ips = read_field(input, name, "unique ips")?;

    let expected = records * RECORD_SIZE as u64 + size_of::<u32>() as u64;
    if bytes != expected {
        return Err(CoreError::snapshot(
            name,
            format!("invalid number of bytes, found {bytes}, expected {expected}"),
        ));
    }
    if unique_ips < records {
        return Err(CoreError::snapshot(
            name,
            format!("unique IPs ({unique_ips}) cannot be less than records ({records})"),
        ));
    }
    if lines < records {
        return Err(CoreError::snapshot(
            name,
            format!("lines ({lines}) cannot be less than records ({records})"),
        ));
    }

    let mut marker = [0u8; 4];
    input
        .read_exact(&mut marker)
        .map_err(|_| CoreError::snapshot(name, "truncated endianness marker"))?;
    if u32::from_ne_bytes(marker) != ENDIAN_MARKER {
        return Err(CoreError::snapshot(name, "incompatible endianness"));
    }

    let mut intervals = Vec::with_capacity(records as usize);
    let mut record = [0u8; RECORD_SIZE];
    for _ in 0..records {
        input.read_exact(&mut record).map_err(|_| {
            CoreError::snapshot(name, format!("expected {records} records, payload is short"))
        })?;
        let addr = u32::from_ne_bytes(record[..4].try_into().unwrap());
        let broadcast = u32::from_ne_bytes(record[4..].try_into().unwrap());
        intervals.push(Interval { addr, broadcast });
    }

    Ok(IpSet::from_snapshot_parts(
        name, intervals, lines, unique_ips, optimized,
    ))
}
