use crate::error::ResourceError;
use crate::pattern::PathPattern;
use crate::template::{UrlTemplate, build_url_template};

/// A query parameter slot of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParameter {
    name: String,
    optional: bool,
}

impl QueryParameter {
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Structural description of a resource type: where its fields go in a URL.
///
/// A descriptor is an ordered path pattern plus an ordered list of query
/// parameters. Fields that appear as placeholders in the path never show up
/// as query parameters.
///
/// Descriptors are normally produced by `#[derive(Resource)]`; hand-written
/// resources use [`ResourceDescriptor::builder`]:
///
/// ```
/// use modkit_resources::ResourceDescriptor;
///
/// let users = ResourceDescriptor::builder("/users/{user_id}").build()?;
/// let posts = ResourceDescriptor::builder("/posts")
///     .parent(users)
///     .query("page")
///     .optional_query("tag")
///     .build()?;
///
/// assert_eq!(
///     posts.url_template().as_str(),
///     "/users/{user_id}/posts?page={page}&tag={tag?}"
/// );
/// # Ok::<(), modkit_resources::ResourceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    path: PathPattern,
    query: Vec<QueryParameter>,
}

impl ResourceDescriptor {
    /// Assemble a descriptor from parts without any normalization.
    #[must_use]
    pub fn new(path: PathPattern, query: Vec<QueryParameter>) -> Self {
        Self { path, query }
    }

    #[must_use]
    pub fn builder(path: impl Into<String>) -> ResourceDescriptorBuilder {
        ResourceDescriptorBuilder::new(path.into())
    }

    #[must_use]
    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    #[must_use]
    pub fn query_parameters(&self) -> &[QueryParameter] {
        &self.query
    }

    #[must_use]
    pub fn query_parameter(&self, name: &str) -> Option<&QueryParameter> {
        self.query.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn url_template(&self) -> UrlTemplate {
        build_url_template(self)
    }
}

enum Entry {
    Query(QueryParameter),
    Parent(ResourceDescriptor),
}

/// Declares a [`ResourceDescriptor`] field by field.
///
/// Entries keep their call order: a parent's query parameters are spliced in
/// where [`parent`](Self::parent) was called.
#[must_use = "ResourceDescriptorBuilder does nothing until .build() is called"]
pub struct ResourceDescriptorBuilder {
    path: String,
    entries: Vec<Entry>,
}

impl ResourceDescriptorBuilder {
    fn new(path: String) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    /// Declare a required query parameter.
    pub fn query(self, name: impl Into<String>) -> Self {
        self.parameter(QueryParameter::required(name))
    }

    /// Declare an optional query parameter.
    pub fn optional_query(self, name: impl Into<String>) -> Self {
        self.parameter(QueryParameter::optional(name))
    }

    pub fn parameter(mut self, parameter: QueryParameter) -> Self {
        self.entries.push(Entry::Query(parameter));
        self
    }

    /// Nest this resource below `parent`.
    ///
    /// The parent's path is prefixed to this resource's path and its query
    /// parameters are inherited.
    pub fn parent(mut self, parent: ResourceDescriptor) -> Self {
        self.entries.push(Entry::Parent(parent));
        self
    }

    /// Finish the descriptor.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::InvalidPattern`] if the path pattern does not parse or
    ///   cannot be joined below the parent's path
    /// - [`ResourceError::MultipleParents`] if `parent` was called more than once
    pub fn build(self) -> Result<ResourceDescriptor, ResourceError> {
        let own = PathPattern::parse(&self.path)?;

        let mut parents = self.entries.iter().filter_map(|e| match e {
            Entry::Parent(parent) => Some(parent),
            Entry::Query(_) => None,
        });
        let path = match (parents.next(), parents.next()) {
            (None, _) => own,
            (Some(parent), None) => parent.path.join(&own)?,
            (Some(_), Some(_)) => {
                return Err(ResourceError::MultipleParents { path: self.path });
            }
        };

        let mut query: Vec<QueryParameter> = Vec::new();
        let declared = self.entries.into_iter().flat_map(|e| match e {
            Entry::Query(parameter) => vec![parameter],
            Entry::Parent(parent) => parent.query,
        });
        for parameter in declared {
            if path.contains_parameter(&parameter.name)
                || query.iter().any(|p| p.name == parameter.name)
            {
                continue;
            }
            query.push(parameter);
        }

        Ok(ResourceDescriptor { path, query })
    }
}
