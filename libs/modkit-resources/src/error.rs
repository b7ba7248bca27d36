use thiserror::Error;

/// Errors raised while declaring, encoding or resolving a resource.
///
/// Building a URL template never fails; every variant here originates either
/// in descriptor construction or in href resolution for a concrete instance.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ResourceError {
    /// Path pattern is not well-formed
    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Diagnostic message (unstable format, for logging only)
        reason: String,
    },

    /// A descriptor was given more than one parent resource
    #[error("Resource '{path}' declares more than one parent")]
    MultipleParents {
        /// Path pattern of the resource being built
        path: String,
    },

    /// The resource did not serialize to a struct-like value
    #[error("Resource must serialize to a struct, got {kind}")]
    NotAStruct {
        /// JSON kind that was produced instead
        kind: &'static str,
    },

    /// A field value cannot be represented as URL parameters
    #[error("Field '{name}' holds a value that cannot be encoded as a URL parameter ({kind})")]
    UnsupportedValue {
        /// Parameter name
        name: String,
        /// JSON kind that was rejected
        kind: &'static str,
    },

    /// A required path placeholder had no value, or more than one
    #[error("Expected exactly one value for path parameter '{name}', found {found}")]
    MissingPathParameter {
        /// Placeholder name
        name: String,
        /// Number of values supplied
        found: usize,
    },

    /// An optional path placeholder received several values
    #[error("Expected at most one value for optional path parameter '{name}', found {found}")]
    AmbiguousPathParameter {
        /// Placeholder name
        name: String,
        /// Number of values supplied
        found: usize,
    },

    /// A path value was `.` or `..`, which would change the resolved path
    #[error("Path parameter '{name}' must not be a dot segment, got '{value}'")]
    DotSegment {
        /// Placeholder name
        name: String,
        /// Rejected value
        value: String,
    },

    /// Serializing the resource failed
    #[error("Resource serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Query string encoding failed
    #[error("Query encoding failed: {0}")]
    QueryEncode(#[from] serde_urlencoded::ser::Error),
}

impl ResourceError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: reason.into(),
        }
    }
}
