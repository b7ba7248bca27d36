//! Resources feature configuration.

use crate::href::Href;
use serde::Deserialize;

/// Configuration for the resources feature of an HTTP client.
///
/// ```yaml
/// resources:
///   base_url: "https://api.example.com/v1"
///   attach_url_template: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcesConfig {
    /// Absolute URL that resource hrefs are appended to.
    pub base_url: String,
    /// Attach the [`UrlTemplate`](crate::UrlTemplate) to every request.
    #[serde(default = "default_attach_url_template")]
    pub attach_url_template: bool,
}

fn default_attach_url_template() -> bool {
    true
}

impl ResourcesConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            attach_url_template: true,
        }
    }

    /// Absolute URL for `href`. A trailing `/` on the base is ignored.
    #[must_use]
    pub fn url_for(&self, href: &Href) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}{href}")
    }
}
