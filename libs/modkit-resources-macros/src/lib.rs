//! # modkit-resources-macros
//!
//! Derive macro for `modkit-resources`.
//!
//! `#[derive(Resource)]` turns a struct declaration into a
//! `modkit_resources::Resource` implementation: the struct-level path pattern
//! and each field's role (path, query, parent) are resolved at compile time,
//! so no runtime reflection is involved.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod pattern;
mod resource;

/// Derive macro implementing `modkit_resources::Resource`.
///
/// The struct must also implement `serde::Serialize`.
///
/// # Attributes
///
/// - `#[resource("/path/{id}")]` (or `#[resource(path = "...")]`) on the struct:
///   path pattern, required
/// - `#[resource(parent)]` on a field: the field is the enclosing resource; its
///   path is prefixed and its query parameters are inherited
/// - `#[resource(optional)]` on a field: mark a query parameter optional
///
/// Fields named by a path placeholder fill the path; every other field is a
/// query parameter. `Option<T>` and `#[serde(default)]` fields are optional,
/// `#[serde(rename = "...")]` renames the parameter and `#[serde(skip)]`
/// fields are ignored.
///
/// # Example
///
/// ```ignore
/// use modkit_resources::Resource;
/// use serde::Serialize;
///
/// #[derive(Serialize, Resource)]
/// #[resource("/users/{id}")]
/// pub struct User {
///     pub id: u64,
///     #[serde(rename = "fields")]
///     pub projection: Option<String>,
/// }
/// ```
#[proc_macro_derive(Resource, attributes(resource))]
#[proc_macro_error]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    resource::expand_derive_resource(&input).into()
}
