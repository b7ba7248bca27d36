use crate::descriptor::ResourceDescriptor;
use crate::error::ResourceError;
use crate::parameters::Parameters;
use crate::pattern::PathSegment;
use std::fmt;

/// A resolved resource URL: encoded path plus optional encoded query string.
///
/// Renders as `/path` or `/path?query`. It is always relative; join it with a
/// base URL (see [`ResourcesConfig::url_for`](crate::ResourcesConfig::url_for))
/// before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Href {
    path: String,
    query: Option<String>,
}

impl Href {
    /// Percent-encoded path, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Form-urlencoded query string without the leading `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// Substitute `parameters` into `descriptor`.
///
/// Path placeholders consume their values; every other parameter goes to the
/// query string, declared query parameters first in declaration order, then
/// any undeclared names in the order they appear in `parameters`.
/// [`Parameters::encode`] yields fields in name order, so undeclared fields of
/// an encoded struct come out sorted by name.
///
/// # Errors
///
/// - [`ResourceError::MissingPathParameter`] if a `{name}` placeholder does not
///   have exactly one value
/// - [`ResourceError::AmbiguousPathParameter`] if a `{name?}` placeholder has
///   more than one value
/// - [`ResourceError::DotSegment`] if a path value is `.` or `..`
/// - [`ResourceError::QueryEncode`] if the query string cannot be encoded
pub fn resolve(
    descriptor: &ResourceDescriptor,
    parameters: &Parameters,
) -> Result<Href, ResourceError> {
    let mut consumed: Vec<&str> = Vec::new();
    let mut segments: Vec<String> = Vec::new();

    for segment in descriptor.path().segments() {
        match segment {
            PathSegment::Literal(text) => segments.push(urlencoding::encode(text).into_owned()),
            PathSegment::Param(name) => {
                let values = parameters.get_all(name);
                let [value] = values.as_slice() else {
                    return Err(ResourceError::MissingPathParameter {
                        name: name.clone(),
                        found: values.len(),
                    });
                };
                segments.push(encode_path_value(name, value)?);
                consumed.push(name);
            }
            PathSegment::OptionalParam(name) => {
                let values = parameters.get_all(name);
                if values.len() > 1 {
                    return Err(ResourceError::AmbiguousPathParameter {
                        name: name.clone(),
                        found: values.len(),
                    });
                }
                for value in values {
                    segments.push(encode_path_value(name, value)?);
                }
                consumed.push(name);
            }
            PathSegment::Tail(name) => {
                for value in parameters.get_all(name) {
                    segments.push(encode_path_value(name, value)?);
                }
                consumed.push(name);
            }
        }
    }

    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for declared in descriptor.query_parameters() {
        let name = declared.name();
        if consumed.contains(&name) {
            continue;
        }
        pairs.extend(parameters.get_all(name).into_iter().map(|v| (name, v)));
        consumed.push(name);
    }
    for (name, value) in parameters.iter() {
        if !consumed.contains(&name) {
            pairs.push((name, value));
        }
    }

    let path = format!("/{}", segments.join("/"));
    let query = if pairs.is_empty() {
        None
    } else {
        Some(serde_urlencoded::to_string(&pairs)?)
    };

    tracing::trace!(
        template = %descriptor.url_template(),
        path = %path,
        "resolved resource href"
    );

    Ok(Href { path, query })
}

/// Percent-encode one path value. `urlencoding` leaves `.` alone, and servers
/// normalise `.`/`..` segments away, so those are rejected.
fn encode_path_value(name: &str, value: &str) -> Result<String, ResourceError> {
    if value == "." || value == ".." {
        return Err(ResourceError::DotSegment {
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }
    Ok(urlencoding::encode(value).into_owned())
}
