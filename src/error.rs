//! Error type for the telemetry send path.

use std::io;
use thiserror::Error;

/// Failure reported by [`PinbaClient::send`](crate::PinbaClient::send).
///
/// Each variant identifies the phase that failed: argument validation,
/// socket resolution, message encoding, or datagram transmission.
#[derive(Debug, Error)]
pub enum Error {
    /// The destination host was empty.
    #[error("pinba server host cannot be empty")]
    EmptyHost,

    /// The destination port was zero.
    #[error("pinba server port must be greater than 0")]
    InvalidPort,

    /// Name lookup failed, or no resolved address yielded a usable datagram
    /// socket. While the failure is still fresh, subsequent sends to the same
    /// destination return the memoized reason without a new lookup.
    #[error("failed to resolve {dest}: {reason}")]
    Resolve {
        /// Destination as `host:port`.
        dest: String,
        /// Resolver or socket error text from the failed attempt.
        reason: String,
    },

    /// The request message could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[from] prost::EncodeError),

    /// The datagram could not be handed to the transport layer.
    #[error("failed to send to {dest}: {source}")]
    Send {
        /// Destination as `host:port`.
        dest: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}
