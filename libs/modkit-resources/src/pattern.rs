use crate::error::ResourceError;
use std::fmt;
use std::str::FromStr;

/// One `/`-separated piece of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Fixed text, emitted as-is (percent-encoded on resolution)
    Literal(String),
    /// `{name}`: exactly one value
    Param(String),
    /// `{name?}`: zero or one value; the segment disappears when absent
    OptionalParam(String),
    /// `{name...}`: any number of values, one segment each; must be last
    Tail(String),
}

impl PathSegment {
    /// Placeholder name, or `None` for literal text.
    #[must_use]
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Param(name) | Self::OptionalParam(name) | Self::Tail(name) => Some(name),
        }
    }

    fn parse(raw: &str, pattern: &str) -> Result<Self, ResourceError> {
        let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            if raw.contains(['{', '}']) {
                return Err(ResourceError::invalid_pattern(
                    pattern,
                    format!("placeholder must span a whole segment: '{raw}'"),
                ));
            }
            return Ok(Self::Literal(raw.to_owned()));
        };

        let (name, ctor): (&str, fn(String) -> Self) = if let Some(name) = inner.strip_suffix("...")
        {
            (name, Self::Tail)
        } else if let Some(name) = inner.strip_suffix('?') {
            (name, Self::OptionalParam)
        } else {
            (inner, Self::Param)
        };

        if name.is_empty() {
            return Err(ResourceError::invalid_pattern(
                pattern,
                "placeholder name is empty",
            ));
        }
        if name.contains(['{', '}', '?']) {
            return Err(ResourceError::invalid_pattern(
                pattern,
                format!("invalid placeholder name '{name}'"),
            ));
        }

        Ok(ctor(name.to_owned()))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Param(name) => write!(f, "{{{name}}}"),
            Self::OptionalParam(name) => write!(f, "{{{name}?}}"),
            Self::Tail(name) => write!(f, "{{{name}...}}"),
        }
    }
}

/// Parsed path pattern such as `/users/{id}/posts/{slug?}`.
///
/// Empty segments are dropped, so `/users//{id}/` and `users/{id}` parse to the
/// same pattern. The rendered form always starts with `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathPattern {
    segments: Vec<PathSegment>,
}

impl PathPattern {
    /// Parse a pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidPattern`] when a placeholder does not span a
    /// whole segment, has an empty or invalid name, is declared twice, or when a
    /// tail placeholder is not the last segment.
    pub fn parse(pattern: &str) -> Result<Self, ResourceError> {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| PathSegment::parse(s, pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_segments(segments).map_err(|reason| ResourceError::invalid_pattern(pattern, reason))
    }

    fn from_segments(segments: Vec<PathSegment>) -> Result<Self, String> {
        if let Some(pos) = segments
            .iter()
            .position(|s| matches!(s, PathSegment::Tail(_)))
            && pos + 1 != segments.len()
        {
            return Err("tail placeholder must be the last segment".to_owned());
        }

        let mut seen = Vec::new();
        for name in segments.iter().filter_map(PathSegment::parameter_name) {
            if seen.contains(&name) {
                return Err(format!("placeholder '{name}' is declared more than once"));
            }
            seen.push(name);
        }

        Ok(Self { segments })
    }

    /// Pattern with no segments, rendered as `/`.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Placeholder names in path order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(PathSegment::parameter_name)
    }

    #[must_use]
    pub fn contains_parameter(&self, name: &str) -> bool {
        self.parameter_names().any(|n| n == name)
    }

    /// Append `child` below this pattern, as a nested resource does with its parent.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidPattern`] if the combined pattern is invalid:
    /// the parent ends in a tail placeholder, or both declare the same placeholder.
    pub fn join(&self, child: &PathPattern) -> Result<Self, ResourceError> {
        let segments = self
            .segments
            .iter()
            .chain(&child.segments)
            .cloned()
            .collect();
        Self::from_segments(segments)
            .map_err(|reason| ResourceError::invalid_pattern(&format!("{self}{child}"), reason))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PathPattern {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
