//! Wire format of the Pinba request message.
//!
//! Mirrors the proto2 `Pinba.Request` message shipped with the Pinba engine.
//! The prost field attributes are written out by hand so there is no protoc
//! step at build time; the encoding matches what generated code would emit.

/// One request sample as the Pinba server expects it on the wire.
///
/// The client populates the scalar fields only. The timer, tag, and
/// dictionary arrays are part of the message so payloads stay decodable by
/// real collectors, but they are always sent empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(string, required, tag = "1")]
    pub hostname: String,
    #[prost(string, required, tag = "2")]
    pub server_name: String,
    #[prost(string, required, tag = "3")]
    pub script_name: String,
    #[prost(uint32, required, tag = "4")]
    pub request_count: u32,
    #[prost(uint32, required, tag = "5")]
    pub document_size: u32,
    #[prost(uint32, required, tag = "6")]
    pub memory_peak: u32,
    #[prost(float, required, tag = "7")]
    pub request_time: f32,
    #[prost(float, required, tag = "8")]
    pub ru_utime: f32,
    #[prost(float, required, tag = "9")]
    pub ru_stime: f32,
    #[prost(uint32, repeated, packed = "false", tag = "10")]
    pub timer_hit_count: Vec<u32>,
    #[prost(float, repeated, packed = "false", tag = "11")]
    pub timer_value: Vec<f32>,
    #[prost(uint32, repeated, packed = "false", tag = "12")]
    pub timer_tag_count: Vec<u32>,
    #[prost(uint32, repeated, packed = "false", tag = "13")]
    pub timer_tag_name: Vec<u32>,
    #[prost(uint32, repeated, packed = "false", tag = "14")]
    pub timer_tag_value: Vec<u32>,
    #[prost(string, repeated, tag = "15")]
    pub dictionary: Vec<String>,
    #[prost(uint32, optional, tag = "16")]
    pub status: Option<u32>,
    #[prost(uint32, optional, tag = "17")]
    pub memory_footprint: Option<u32>,
    #[prost(uint32, repeated, packed = "false", tag = "18")]
    pub tag_name: Vec<u32>,
    #[prost(uint32, repeated, packed = "false", tag = "19")]
    pub tag_value: Vec<u32>,
    #[prost(string, optional, tag = "20")]
    pub schema: Option<String>,
}
