//! UDP client for delivering request samples to a Pinba server.

use bytes::BytesMut;
use log::*;
use prost::Message;

use crate::{
    builder::Builder,
    cache::{
        DnsResolver,
        Resolve,
        ResolveCache,
    },
    error::Error,
    request::RequestRecord,
    MSG_BUF_SIZE,
};

/// Fire-and-forget telemetry client for a Pinba collector.
///
/// Each call to [`send`](Self::send) encodes one [`RequestRecord`] as the
/// Pinba protobuf message and transmits it as a single UDP datagram. The
/// destination socket is resolved lazily and cached per `host:port`,
/// re-resolving at most once per freshness window (default:
/// [DEFAULT_RESOLVE_INTERVAL](crate::DEFAULT_RESOLVE_INTERVAL)), so the
/// per-call cost stays at one map lookup plus one `send_to`.
///
/// Delivery is unacknowledged. A failed transmission is reported to the
/// caller but leaves the cached socket in place for the next call; only a
/// failed resolution starts a backoff window for its destination.
///
/// ### Example
///
/// ```no_run
/// use tokio_pinba::{PinbaClient, RequestRecord, DEFAULT_PORT};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), tokio_pinba::Error> {
/// let client = PinbaClient::new();
///
/// let record = RequestRecord {
///     server_name: "example.com".to_string(),
///     script_name: "/checkout".to_string(),
///     request_count: 1,
///     document_size: 2048,
///     memory_peak: 65536,
///     request_time: 0.042,
///     ru_utime: 0.01,
///     ru_stime: 0.002,
///     status: Some(200),
///     ..Default::default()
/// };
///
/// client.send("pinba.example.com", DEFAULT_PORT, &record).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PinbaClient<R = DnsResolver> {
    cache: ResolveCache<R>,
}

impl PinbaClient {
    /// Creates a client with default parameters.
    pub fn new() -> Self {
        Builder::new().build()
    }
}

impl Default for PinbaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resolve> PinbaClient<R> {
    pub(crate) fn with_cache(cache: ResolveCache<R>) -> Self {
        Self { cache }
    }

    /// Sends one request sample to the given destination.
    ///
    /// Arguments are validated before any network activity. Invalid numeric
    /// fields in `record` are dropped rather than reported; see
    /// [`RequestRecord`].
    pub async fn send(
        &self,
        host: &str,
        port: u16,
        record: &RequestRecord,
    ) -> Result<(), Error> {
        if host.is_empty() {
            return Err(Error::EmptyHost);
        }

        if port == 0 {
            return Err(Error::InvalidPort);
        }

        let (socket, addr) = self.cache.acquire(host, port).await?;

        let msg = record.to_message();
        // Common-case messages fit the initial reservation; only an outsized
        // sample costs a second allocation.
        let mut buf = BytesMut::with_capacity(MSG_BUF_SIZE);
        msg.encode(&mut buf)?;

        match socket.send_to(&buf, addr).await {
            Ok(n) => {
                debug!("sent {} bytes to {}", n, addr);
                Ok(())
            }

            Err(e) => {
                error!("failed to send to {}: {:?}", addr, e);
                Err(Error::Send {
                    dest: format!("{host}:{port}"),
                    source: e,
                })
            }
        }
    }
}
