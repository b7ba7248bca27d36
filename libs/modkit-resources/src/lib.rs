#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Typed resources for `ModKit` HTTP clients
//!
//! A *resource* is a plain struct whose fields address an HTTP endpoint: some
//! fields fill placeholders in the path, the rest become query parameters.
//! This crate provides:
//! - [`ResourceDescriptor`]: the declared mapping of fields to path/query roles
//! - [`build_url_template`]: the templated, non-expanded URL of a resource
//!   (`/items/{id}?expand={expand?}`), used for route-level telemetry
//! - [`resolve`]: substitution of a concrete instance's values into a URL
//! - `#[derive(Resource)]`: compile-time declaration of the mapping
//!
//! # Example
//!
//! ```
//! use modkit_resources::Resource;
//! use serde::Serialize;
//!
//! #[derive(Serialize, Resource)]
//! #[resource("/repos/{owner}")]
//! struct Owner {
//!     owner: String,
//! }
//!
//! #[derive(Serialize, Resource)]
//! #[resource("/issues")]
//! struct Issues {
//!     #[resource(parent)]
//!     parent: Owner,
//!     state: String,
//!     labels: Vec<String>,
//!     page: Option<u32>,
//! }
//!
//! assert_eq!(
//!     Issues::url_template()?.as_str(),
//!     "/repos/{owner}/issues?state={state}&labels={labels}&page={page?}"
//! );
//!
//! let issues = Issues {
//!     parent: Owner { owner: "octo".into() },
//!     state: "open".into(),
//!     labels: vec!["bug".into(), "ui".into()],
//!     page: None,
//! };
//! assert_eq!(
//!     issues.href()?.to_string(),
//!     "/repos/octo/issues?state=open&labels=bug&labels=ui"
//! );
//! # Ok::<(), modkit_resources::ResourceError>(())
//! ```

mod config;
mod descriptor;
mod error;
mod href;
mod parameters;
mod pattern;
mod resource;
pub mod template;

pub use config::ResourcesConfig;
pub use descriptor::{QueryParameter, ResourceDescriptor, ResourceDescriptorBuilder};
pub use error::ResourceError;
pub use href::{Href, resolve};
pub use parameters::Parameters;
pub use pattern::{PathPattern, PathSegment};
pub use resource::Resource;
pub use template::{UrlTemplate, build_url_template};

#[cfg(feature = "derive")]
pub use modkit_resources_macros::Resource;
