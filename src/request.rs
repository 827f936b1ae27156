//! Telemetry sample as supplied by the caller, and its mapping onto the wire
//! message.

use crate::proto;
use std::sync::OnceLock;

/// One request's worth of telemetry, before encoding.
///
/// Numeric fields are best-effort: a value the wire format cannot carry
/// (negative, above the unsigned range, or non-finite) is dropped silently
/// and the field goes out at its zero default, so a misbehaving metric never
/// blocks the caller's request path.
///
/// `memory_footprint` and `status` distinguish "not provided" from a
/// legitimate zero; leave them `None` to omit them from the payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestRecord {
    /// Reporting host; when empty, the local machine's name is used.
    pub hostname: String,
    /// Virtual server that handled the request.
    pub server_name: String,
    /// Script or route that handled the request.
    pub script_name: String,
    /// Request schema such as `http` or `https`; omitted from the payload
    /// when empty.
    pub schema: String,
    /// Number of requests this sample covers.
    pub request_count: i64,
    /// Response body size in bytes.
    pub document_size: i64,
    /// Peak memory usage in bytes.
    pub memory_peak: i64,
    /// Total memory footprint in bytes.
    pub memory_footprint: Option<i64>,
    /// Wall-clock duration of the request, in seconds.
    pub request_time: f64,
    /// User CPU time consumed, in seconds.
    pub ru_utime: f64,
    /// System CPU time consumed, in seconds.
    pub ru_stime: f64,
    /// Response status code.
    pub status: Option<i64>,
}

/// A counter is carried on the wire only if it fits the unsigned range.
fn accept_counter(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}

/// A timing is carried only if it narrows to a finite, non-negative float.
fn accept_seconds(value: f64) -> Option<f32> {
    let narrowed = value as f32;
    (narrowed.is_finite() && value >= 0.0).then_some(narrowed)
}

/// Local machine name, discovered once per process.
fn local_hostname() -> &'static str {
    static HOSTNAME: OnceLock<String> = OnceLock::new();
    HOSTNAME.get_or_init(|| {
        hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

impl RequestRecord {
    /// Maps the record onto the wire message, applying the validation and
    /// defaulting rules above.
    pub(crate) fn to_message(&self) -> proto::Request {
        let mut msg = proto::Request::default();

        msg.hostname = if self.hostname.is_empty() {
            local_hostname().to_string()
        } else {
            self.hostname.clone()
        };
        msg.server_name = self.server_name.clone();
        msg.script_name = self.script_name.clone();

        if let Some(count) = accept_counter(self.request_count) {
            msg.request_count = count;
        }

        if let Some(size) = accept_counter(self.document_size) {
            msg.document_size = size;
        }

        if let Some(peak) = accept_counter(self.memory_peak) {
            msg.memory_peak = peak;
        }

        msg.memory_footprint = self.memory_footprint.and_then(accept_counter);

        if let Some(time) = accept_seconds(self.request_time) {
            msg.request_time = time;
        }

        if let Some(time) = accept_seconds(self.ru_utime) {
            msg.ru_utime = time;
        }

        if let Some(time) = accept_seconds(self.ru_stime) {
            msg.ru_stime = time;
        }

        msg.status = self.status.and_then(accept_counter);

        if !self.schema.is_empty() {
            msg.schema = Some(self.schema.clone());
        }

        msg
    }
}
