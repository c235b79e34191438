// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Blocking hostname resolution for input records that name hosts instead
//! of addresses. The resolver prefers the system configuration and falls
//! back to a public recursor when none can be read (containers and bare
//! chroots routinely lack a usable resolv.conf).

use std::net::{IpAddr, Ipv4Addr};

use hickory_resolver::Resolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use ipfold_common::warn;

use crate::errors::CoreError;

pub struct HostResolver {
    inner: Resolver,
}

impl HostResolver {
    pub fn new() -> Result<Self, CoreError> {
        let inner = match Resolver::from_system_conf() {
            Ok(resolver) => resolver,
            Err(err) => {
                warn!("cannot read system resolver configuration ({err}), using fallback");
                Resolver::new(ResolverConfig::cloudflare(), ResolverOpts::default())
                    .map_err(|err| CoreError::Resolver {
                        reason: err.to_string(),
                    })?
            }
        };
        Ok(Self { inner })
    }

    /// All IPv4 addresses of `host`; may legitimately be empty for a name
    /// that only has AAAA records.
    pub fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, CoreError> {
        let response = self
            .inner
            .lookup_ip(host)
            .map_err(|err| CoreError::Lookup {
                host: host.to_string(),
                reason: err.to_string(),
            })?;

        Ok(response
            .iter()
            .filter_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .collect())
    }
}

/// Constructed on the first hostname record so that address-only runs
/// never touch resolver configuration. A failed construction is remembered
/// and not retried.
#[derive(Default)]
pub struct LazyResolver {
    resolver: Option<HostResolver>,
    failed: bool,
}

impl LazyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_ipv4(&mut self, host: &str) -> Result<Vec<Ipv4Addr>, CoreError> {
        if let Some(resolver) = &self.resolver {
            return resolver.lookup_ipv4(host);
        }
        if self.failed {
            return Err(CoreError::Lookup {
                host: host.to_string(),
                reason: "resolver unavailable".to_string(),
            });
        }

        let resolver = match HostResolver::new() {
            Ok(resolver) => resolver,
            Err(err) => {
                self.failed = true;
                return Err(err);
            }
        };
        let result = resolver.lookup_ipv4(host);
        self.resolver = Some(resolver);
        result
    }
}
