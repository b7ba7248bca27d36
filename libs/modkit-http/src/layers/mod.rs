//! Tower layers for the HTTP client middleware stack
//!
//! - [`RequestSpanLayer`] - wraps each outbound request in a tracing span

mod request_span;

pub use request_span::{RequestSpanLayer, RequestSpanService};
