//! Interaction layer: talks to the LearnStack backend over HTTP.

pub mod http_backend_client;
pub mod stream_decoder;

pub use http_backend_client::HttpBackendClient;
pub use stream_decoder::{ReplyStreamDecoder, StreamOutcome, Utf8ChunkDecoder, stream_reply};
