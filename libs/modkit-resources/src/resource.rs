use crate::descriptor::ResourceDescriptor;
use crate::error::ResourceError;
use crate::href::{Href, resolve};
use crate::parameters::Parameters;
use crate::template::{UrlTemplate, build_url_template};
use serde::Serialize;

/// A type whose values address an HTTP resource.
///
/// The descriptor declares, once per type, which fields form the path and
/// which go to the query string; `serde` supplies the values of a concrete
/// instance. Implement it with `#[derive(Resource)]`:
///
/// ```
/// use modkit_resources::Resource;
/// use serde::Serialize;
///
/// #[derive(Serialize, Resource)]
/// #[resource("/articles/{id}")]
/// struct Article {
///     id: u64,
///     lang: Option<String>,
/// }
///
/// assert_eq!(Article::url_template()?.as_str(), "/articles/{id}?lang={lang?}");
///
/// let href = Article { id: 7, lang: Some("en".into()) }.href()?;
/// assert_eq!(href.to_string(), "/articles/7?lang=en");
/// # Ok::<(), modkit_resources::ResourceError>(())
/// ```
///
/// or by hand through [`ResourceDescriptor::builder`].
pub trait Resource: Serialize {
    /// Structural description of this resource type.
    ///
    /// # Errors
    ///
    /// Returns an error if the declared mapping is invalid (bad path pattern,
    /// more than one parent).
    fn descriptor() -> Result<ResourceDescriptor, ResourceError>;

    /// URL template of this resource type.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Resource::descriptor`].
    fn url_template() -> Result<UrlTemplate, ResourceError>
    where
        Self: Sized,
    {
        Ok(build_url_template(&Self::descriptor()?))
    }

    /// Resolve this instance to a concrete relative URL.
    ///
    /// # Errors
    ///
    /// Propagates descriptor, serialization and resolution errors.
    fn href(&self) -> Result<Href, ResourceError>
    where
        Self: Sized,
    {
        let descriptor = Self::descriptor()?;
        let parameters = Parameters::encode(self)?;
        resolve(&descriptor, &parameters)
    }
}
