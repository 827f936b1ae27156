//! Asynchronous, fire-and-forget telemetry client for the
//! [Pinba](https://github.com/tony2001/pinba_engine) realtime statistics
//! server.
//!
//! Request samples are encoded as Pinba's protobuf message and shipped as
//! single UDP datagrams; delivery is unacknowledged and loss is acceptable by
//! design. Destination sockets are resolved lazily and cached per
//! `host:port`, re-resolving at most once per freshness window, so the
//! per-call cost on a busy host stays at one map lookup plus one `send_to`.
//!
//! See [`PinbaClient`] for a usage example.

use std::time::Duration;

mod builder;
mod cache;
mod error;
pub mod proto;
mod request;
mod udp;

/// Default Pinba server port.
pub const DEFAULT_PORT: u16 = 30002;

/// Default time for which a destination's resolution result, socket or
/// failure, is reused before re-resolving.
pub const DEFAULT_RESOLVE_INTERVAL: Duration = Duration::from_secs(60);

/// Initial capacity of the per-send encode buffer; messages up to this size
/// cost a single allocation.
pub const MSG_BUF_SIZE: usize = 1024;

pub use crate::{
    builder::Builder,
    cache::{
        DnsResolver,
        Resolve,
    },
    error::Error,
    request::RequestRecord,
    udp::PinbaClient,
};
