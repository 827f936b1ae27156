//! Per-destination socket resolution cache.
//!
//! Resolving a destination on every send would dominate the cost of the send
//! itself, so resolved sockets are memoized per `host:port` key and refreshed
//! at most once per freshness window. A failed resolution is memoized the
//! same way: until the window elapses, sends to that destination fail fast
//! without touching the resolver, which bounds the cost of an unreachable
//! server to one lookup per window.

use log::*;
use std::{
    collections::HashMap,
    future::Future,
    io,
    net::{
        Ipv4Addr,
        Ipv6Addr,
        SocketAddr,
    },
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};

use tokio::{
    net::{
        lookup_host,
        UdpSocket,
    },
    sync::Mutex,
};

use crate::Error;

/// Name resolution seam.
///
/// The production implementation is [`DnsResolver`]; tests substitute their
/// own to observe or fail resolution attempts.
pub trait Resolve {
    /// Resolves a destination to candidate socket addresses, in preference
    /// order.
    fn lookup(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Vec<SocketAddr>>> + Send;
}

/// Resolves destinations through the system resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct DnsResolver;

impl Resolve for DnsResolver {
    async fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok(lookup_host((host, port)).await?.collect())
    }
}

#[derive(Debug)]
struct Entry {
    host: String,
    port: u16,
    // Socket handle and resolved address are only ever valid together.
    socket: Option<(Arc<UdpSocket>, SocketAddr)>,
    last_error: String,
    last_resolve: Option<Instant>,
}

impl Entry {
    fn resolve_error(&self) -> Error {
        Error::Resolve {
            dest: format!("{}:{}", self.host, self.port),
            reason: self.last_error.clone(),
        }
    }
}

/// Lazily-refreshed map of destination to open datagram socket.
///
/// Entries are never removed; the key space is bounded by configured
/// destinations, not request volume. Replaced sockets close when their last
/// handle drops, and the whole cache closes its sockets on drop.
#[derive(Debug)]
pub(crate) struct ResolveCache<R> {
    entries: Mutex<HashMap<String, Entry>>,
    resolver: R,
    resolve_interval: Duration,
}

impl<R: Resolve> ResolveCache<R> {
    pub(crate) fn new(resolver: R, resolve_interval: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            resolver,
            resolve_interval,
        }
    }

    /// Returns a ready-to-use socket and resolved address for the
    /// destination, reusing the previous resolution while it is fresh.
    pub(crate) async fn acquire(
        &self,
        host: &str,
        port: u16,
    ) -> Result<(Arc<UdpSocket>, SocketAddr), Error> {
        let key = format!("{host}:{port}");
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_insert_with(|| Entry {
            host: host.to_string(),
            port,
            socket: None,
            last_error: String::new(),
            last_resolve: None,
        });

        if let Some(resolved_at) = entry.last_resolve {
            if resolved_at.elapsed() < self.resolve_interval {
                return match &entry.socket {
                    Some((socket, addr)) => Ok((Arc::clone(socket), *addr)),
                    // The last attempt failed inside the window; fail fast
                    // rather than hammering the resolver.
                    None => Err(entry.resolve_error()),
                };
            }
        }

        // The old socket may be in an unknown state; never carry it across a
        // re-resolution.
        entry.socket = None;

        // Stamp the attempt before resolving so that a failed or slow lookup
        // is not repeated until the window elapses.
        entry.last_resolve = Some(Instant::now());

        let resolved = open_socket(&self.resolver, &entry.host, entry.port).await;
        match resolved {
            Ok((socket, addr)) => {
                debug!("resolved {}:{} to {}", entry.host, entry.port, addr);

                let socket = Arc::new(socket);
                entry.socket = Some((Arc::clone(&socket), addr));
                entry.last_error.clear();
                Ok((socket, addr))
            }

            Err(e) => {
                warn!("failed to resolve {}:{}: {}", entry.host, entry.port, e);

                entry.last_error = e.to_string();
                Err(entry.resolve_error())
            }
        }
    }
}

/// Resolution proper: name lookup plus opening a datagram socket of the
/// matching family for the first candidate that accepts one.
async fn open_socket<R: Resolve>(
    resolver: &R,
    host: &str,
    port: u16,
) -> io::Result<(UdpSocket, SocketAddr)> {
    let addrs = resolver.lookup(host, port).await?;

    let mut last_err = None;
    for addr in addrs {
        let local: SocketAddr = match addr {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        match UdpSocket::bind(local).await {
            Ok(socket) => return Ok((socket, addr)),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no socket addresses yielded")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    #[derive(Clone, Debug, Default)]
    struct CountingResolver {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingResolver {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Resolve for CountingResolver {
        async fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail || host.ends_with(".invalid") {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "synthetic lookup failure",
                ));
            }

            Ok(vec![(Ipv4Addr::LOCALHOST, port).into()])
        }
    }

    #[tokio::test]
    async fn fresh_hit_reuses_socket() {
        let resolver = CountingResolver::default();
        let cache = ResolveCache::new(resolver.clone(), Duration::from_secs(60));

        let (first, first_addr) = cache.acquire("collector", 3002).await.expect("first");
        let (second, second_addr) = cache.acquire("collector", 3002).await.expect("second");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first_addr, second_addr);
        assert_eq!(1, resolver.calls());
    }

    #[tokio::test]
    async fn concurrent_calls_resolve_once() {
        let resolver = CountingResolver::default();
        let cache = ResolveCache::new(resolver.clone(), Duration::from_secs(60));

        let (a, b, c) = tokio::join!(
            cache.acquire("collector", 3002),
            cache.acquire("collector", 3002),
            cache.acquire("collector", 3002),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(1, resolver.calls());
    }

    #[tokio::test]
    async fn failed_resolution_memoized() {
        let resolver = CountingResolver::failing();
        let cache = ResolveCache::new(resolver.clone(), Duration::from_secs(60));

        let first = cache.acquire("collector", 3002).await;
        assert!(matches!(first, Err(Error::Resolve { .. })));

        let second = cache.acquire("collector", 3002).await;
        match second {
            Err(Error::Resolve { dest, reason }) => {
                assert_eq!("collector:3002", dest);
                assert!(reason.contains("synthetic lookup failure"));
            }
            other => panic!("expected resolve error, got {other:?}"),
        }

        assert_eq!(1, resolver.calls());
    }

    #[tokio::test]
    async fn stale_entry_re_resolves() {
        let resolver = CountingResolver::default();
        let cache = ResolveCache::new(resolver.clone(), Duration::ZERO);

        let (first, _) = cache.acquire("collector", 3002).await.expect("first");
        let (second, _) = cache.acquire("collector", 3002).await.expect("second");

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(2, resolver.calls());
    }

    #[tokio::test]
    async fn failure_retried_after_window() {
        let resolver = CountingResolver::failing();
        let cache = ResolveCache::new(resolver.clone(), Duration::ZERO);

        assert!(cache.acquire("collector", 3002).await.is_err());
        assert!(cache.acquire("collector", 3002).await.is_err());
        assert_eq!(2, resolver.calls());
    }

    #[tokio::test]
    async fn destinations_are_independent() {
        let resolver = CountingResolver::default();
        let cache = ResolveCache::new(resolver.clone(), Duration::from_secs(60));

        let (first, _) = cache.acquire("collector", 3002).await.expect("good");
        let bad = cache.acquire("other.invalid", 3002).await;
        assert!(matches!(bad, Err(Error::Resolve { .. })));

        // The failure next door must not disturb the healthy entry.
        let (second, _) = cache.acquire("collector", 3002).await.expect("still good");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(2, resolver.calls());
    }
}
