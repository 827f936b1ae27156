//! Builder for customizing the telemetry client.

use std::time::Duration;

use crate::{
    cache::{
        DnsResolver,
        Resolve,
        ResolveCache,
    },
    udp::PinbaClient,
    DEFAULT_RESOLVE_INTERVAL,
};

/// Builder allows you to override various default parameter values before
/// creating an instance of [`PinbaClient`].
#[derive(Debug)]
pub struct Builder<R = DnsResolver> {
    resolver: R,
    resolve_interval: Duration,
}

impl Builder {
    /// Creates a builder with default parameters.
    pub fn new() -> Self {
        Self {
            resolver: DnsResolver,
            resolve_interval: DEFAULT_RESOLVE_INTERVAL,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resolve> Builder<R> {
    /// Sets how long a destination's resolution result, socket or failure, is
    /// reused before the next call re-resolves it (default:
    /// [DEFAULT_RESOLVE_INTERVAL](crate::DEFAULT_RESOLVE_INTERVAL)).
    pub fn resolve_interval(&mut self, resolve_interval: Duration) -> &mut Self {
        self.resolve_interval = resolve_interval;
        self
    }

    /// Replaces the name resolver; mainly useful for substituting a test
    /// double.
    pub fn resolver<S: Resolve>(self, resolver: S) -> Builder<S> {
        Builder {
            resolver,
            resolve_interval: self.resolve_interval,
        }
    }

    /// Creates the client.
    pub fn build(self) -> PinbaClient<R> {
        PinbaClient::with_cache(ResolveCache::new(self.resolver, self.resolve_interval))
    }
}
