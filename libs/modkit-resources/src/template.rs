//! URL templates: the non-expanded form of a resource URL.
//!
//! A template is the resource's path pattern followed by one placeholder per
//! query parameter, e.g. `/items/{id}?expand={expand}&page={page?}`. It is
//! attached to outgoing requests so that metrics and tracing can group calls
//! by route instead of by concrete URL.

use crate::descriptor::ResourceDescriptor;
use std::fmt;

/// Templated URL of a resource.
///
/// Stored in `http::Extensions` of requests made through the resources client;
/// the type itself is the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UrlTemplate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<UrlTemplate> for String {
    fn from(template: UrlTemplate) -> Self {
        template.0
    }
}

/// Build the URL template for `descriptor`.
///
/// The path pattern is emitted verbatim. Each query parameter follows in
/// declaration order as `name={name}`, or `name={name?}` when optional; the
/// first one is introduced by `?` and the rest by `&`. Names are not escaped.
#[must_use]
pub fn build_url_template(descriptor: &ResourceDescriptor) -> UrlTemplate {
    let mut template = descriptor.path().to_string();

    for (i, parameter) in descriptor.query_parameters().iter().enumerate() {
        template.push(if i == 0 { '?' } else { '&' });
        template.push_str(parameter.name());
        template.push_str("={");
        template.push_str(parameter.name());
        if parameter.is_optional() {
            template.push('?');
        }
        template.push('}');
    }

    UrlTemplate(template)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::descriptor::QueryParameter;
    use crate::pattern::PathPattern;

    fn descriptor(path: &str, query: Vec<QueryParameter>) -> ResourceDescriptor {
        ResourceDescriptor::new(PathPattern::parse(path).unwrap(), query)
    }

    #[test]
    fn test_no_query_parameters_yields_path_verbatim() {
        let d = descriptor("/items/{id}", vec![]);
        assert_eq!(build_url_template(&d).as_str(), "/items/{id}");
    }

    #[test]
    fn test_required_and_optional_parameters() {
        let d = descriptor(
            "/items",
            vec![QueryParameter::required("a"), QueryParameter::optional("b")],
        );
        assert_eq!(build_url_template(&d).as_str(), "/items?a={a}&b={b?}");
    }

    #[test]
    fn test_single_parameter_uses_question_mark() {
        let d = descriptor("/search", vec![QueryParameter::required("q")]);
        assert_eq!(build_url_template(&d).as_str(), "/search?q={q}");
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let d = descriptor(
            "/list",
            vec![
                QueryParameter::required("z"),
                QueryParameter::required("a"),
                QueryParameter::required("m"),
            ],
        );
        assert_eq!(build_url_template(&d).as_str(), "/list?z={z}&a={a}&m={m}");
    }

    #[test]
    fn test_deterministic() {
        let d = descriptor(
            "/items/{id}",
            vec![QueryParameter::optional("x"), QueryParameter::required("y")],
        );
        assert_eq!(build_url_template(&d), build_url_template(&d.clone()));
    }

    #[test]
    fn test_optionality_only_toggles_marker() {
        let required = build_url_template(&descriptor(
            "/p",
            vec![QueryParameter::required("a"), QueryParameter::required("b")],
        ));
        let optional = build_url_template(&descriptor(
            "/p",
            vec![QueryParameter::required("a"), QueryParameter::optional("b")],
        ));
        assert_eq!(required.as_str().replace("{b}", "{b?}"), optional.as_str());
    }

    #[test]
    fn test_names_are_not_escaped() {
        let d = descriptor("/p", vec![QueryParameter::required("a&b")]);
        assert_eq!(build_url_template(&d).as_str(), "/p?a&b={a&b}");
    }

    #[test]
    fn test_root_path() {
        let d = descriptor("/", vec![QueryParameter::optional("q")]);
        assert_eq!(build_url_template(&d).as_str(), "/?q={q?}");
    }
}
