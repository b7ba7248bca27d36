/// Compile-time check of a path pattern.
///
/// Mirrors the runtime parser in `modkit_resources::PathPattern` so that bad
/// patterns fail the build instead of the first request. Returns the
/// placeholder names in path order.
pub fn placeholder_names(pattern: &str) -> Result<Vec<String>, String> {
    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let mut names: Vec<String> = Vec::new();

    for (i, segment) in segments.iter().enumerate() {
        let Some(inner) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        else {
            if segment.contains(['{', '}']) {
                return Err(format!(
                    "placeholder must span a whole segment: '{segment}'"
                ));
            }
            continue;
        };

        let name = if let Some(name) = inner.strip_suffix("...") {
            if i + 1 != segments.len() {
                return Err("tail placeholder must be the last segment".to_owned());
            }
            name
        } else {
            inner.strip_suffix('?').unwrap_or(inner)
        };

        if name.is_empty() || name.contains(['{', '}', '?']) {
            return Err(format!("invalid placeholder '{segment}'"));
        }
        if names.iter().any(|n| n == name) {
            return Err(format!("placeholder '{name}' is declared more than once"));
        }
        names.push(name.to_owned());
    }

    Ok(names)
}
