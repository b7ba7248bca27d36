#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client infrastructure for `ModKit`
//!
//! This crate provides a hyper-based HTTP client with:
//! - Automatic TLS via rustls (HTTPS only by default)
//! - Per-request timeouts and response body limits
//! - User-Agent header injection
//! - An `outgoing_http` tracing span per request
//! - Typed resource requests (optional feature, see [`ResourcesClient`])
//!
//! # Resources
//!
//! Installing the resources feature lets callers address endpoints with
//! [`modkit_resources::Resource`] values instead of URL strings. Each such
//! request carries its [`UrlTemplate`] in the request extensions; the request
//! span records it as `url.template` and the response exposes it through
//! [`HttpResponse::url_template`].
//!
//! ```ignore
//! use modkit_http::{HttpClient, ResourcesConfig};
//! use modkit_resources::Resource;
//!
//! #[derive(serde::Serialize, Resource)]
//! #[resource("/users/{id}")]
//! struct User {
//!     id: u64,
//!     fields: Option<String>,
//! }
//!
//! let client = HttpClient::builder()
//!     .with_resources(ResourcesConfig::new("https://api.example.com/v1"))
//!     .build()?;
//!
//! let resp = client
//!     .resources()?
//!     .get(&User { id: 7, fields: None })
//!     .send()
//!     .await?;
//! assert_eq!(
//!     resp.url_template().map(|t| t.as_str()),
//!     Some("/users/{id}?fields={fields?}")
//! );
//! ```
//!
//! Calling [`HttpClient::resources`] on a client built without
//! [`HttpClientBuilder::with_resources`] fails with
//! [`HttpError::FeatureNotInstalled`].

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod resources;
mod response;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{RequestSpanLayer, RequestSpanService};
pub use request::RequestBuilder;
pub use resources::ResourcesClient;
pub use response::{HttpResponse, ResponseBody};

pub use modkit_resources::{ResourcesConfig, UrlTemplate};
