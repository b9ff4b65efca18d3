//! Resolution of relative references against the (possibly nested)
//! document base, and the inverse relativization used when writing.

use crate::error::{Result, UriResolutionError};
use log::trace;
use oxiri::Iri;

/// The base in force for an element: its own `xml:base` wins outright,
/// otherwise the inherited one. The override is taken verbatim.
pub fn resolve_base(element_base: Option<&str>, inherited: Option<&str>) -> Option<String> {
    match element_base {
        Some(base) => Some(base.to_string()),
        None => inherited.map(str::to_string),
    }
}

/// Does `reference` start with `scheme ":"`?
pub fn has_scheme(reference: &str) -> bool {
    match reference.find(':') {
        Some(end) if end > 0 => {
            let scheme = &reference[..end];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Resolves `reference` against `base`. Absolute references are
/// returned unchanged; `element` only names the culprit in errors.
pub fn resolve(reference: &str, base: Option<&str>, element: &str) -> Result<String> {
    if has_scheme(reference) {
        return Ok(reference.to_string());
    }

    let base = match base {
        Some(base) if !base.is_empty() => base,
        _ => {
            return Err(UriResolutionError::BaseUriRequired {
                reference: reference.to_string(),
                element: element.to_string(),
            }
            .into())
        }
    };

    match Iri::parse(base).and_then(|b| b.resolve(reference)) {
        Ok(iri) => Ok(iri.into_inner()),
        Err(error) => {
            trace!(
                "RFC 3986 resolution of {:?} against {:?} failed ({}), resolving manually",
                reference,
                base,
                error
            );
            resolve_manually(reference, base).ok_or_else(|| {
                UriResolutionError::Unresolvable {
                    reference: reference.to_string(),
                    base: base.to_string(),
                    message: error.to_string(),
                }
                .into()
            })
        }
    }
}

/// `base` with any fragment removed.
pub fn strip_fragment(base: &str) -> &str {
    match base.find('#') {
        Some(pos) => &base[..pos],
        None => base,
    }
}

/// The `scheme://authority` part of `base`, if it has a scheme.
fn scheme_and_authority(base: &str) -> Option<&str> {
    let colon = base.find(':')?;
    let rest = &base[colon + 1..];
    if let Some(after) = rest.strip_prefix("//") {
        let end = after.find(['/', '?', '#']).unwrap_or(after.len());
        Some(&base[..colon + 3 + end])
    } else {
        Some(&base[..=colon])
    }
}

// Used when the base is not a valid IRI and oxiri refuses it.
fn resolve_manually(reference: &str, base: &str) -> Option<String> {
    let document = strip_fragment(base);
    if reference.is_empty() {
        return Some(document.to_string());
    }
    if reference.starts_with('#') {
        return Some(format!("{}{}", document, reference));
    }
    let root = scheme_and_authority(document)?;
    if let Some(network) = reference.strip_prefix("//") {
        let scheme_end = root.find(':')?;
        return Some(format!("{}//{}", &root[..=scheme_end], network));
    }
    if reference.starts_with('/') {
        return Some(format!("{}{}", root, reference));
    }
    let path = &document[root.len()..];
    let path = match path.find('?') {
        Some(pos) => &path[..pos],
        None => path,
    };
    if reference.starts_with('?') {
        return Some(format!("{}{}{}", root, path, reference));
    }
    match path.rfind('/') {
        Some(pos) => Some(format!("{}{}{}", root, &path[..=pos], reference)),
        None => Some(format!("{}/{}", root, reference)),
    }
}

/// The shortest reference that resolves back to `iri` against `base`,
/// or `None` when no safe relative form exists.
pub fn relativize(iri: &str, base: &str) -> Option<String> {
    let document = strip_fragment(base);
    let candidate = if iri == document {
        String::new()
    } else if let Some(fragment) = iri.strip_prefix(document).filter(|r| r.starts_with('#')) {
        fragment.to_string()
    } else {
        let root = scheme_and_authority(document)?;
        let path = &document[root.len()..];
        let path = &path[..path.find('?').unwrap_or(path.len())];
        let directory = &document[..root.len() + path.rfind('/')? + 1];
        let tail = iri.strip_prefix(directory)?;
        let first_segment = &tail[..tail.find(['/', '?', '#']).unwrap_or(tail.len())];
        if tail.is_empty() || first_segment.contains(':') || tail.starts_with(['?', '#']) {
            return None;
        }
        tail.to_string()
    };

    let base = Iri::parse(base).ok()?;
    match base.resolve(&candidate) {
        Ok(resolved) if resolved.as_str() == iri => Some(candidate),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::RdfXmlError;
    use test_case::test_case;

    #[test_case("http://example.org/a", true)]
    #[test_case("urn:isbn:123", true)]
    #[test_case("x-ample+1.2:foo", true)]
    #[test_case("foo/bar", false)]
    #[test_case("#frag", false)]
    #[test_case(":nope", false)]
    #[test_case("1http:x", false)]
    fn scheme(reference: &str, expected: bool) {
        assert_eq!(has_scheme(reference), expected);
    }

    #[test_case("#me", "http://example.org/doc#old", "http://example.org/doc#me")]
    #[test_case("/root", "http://example.org/a/b", "http://example.org/root")]
    #[test_case("c", "http://example.org/a/b", "http://example.org/a/c")]
    #[test_case("", "http://example.org/a/b#x", "http://example.org/a/b")]
    #[test_case("../c", "http://example.org/a/b/d", "http://example.org/a/c")]
    #[test_case("http://other.org/x", "http://example.org/", "http://other.org/x")]
    fn resolution(reference: &str, base: &str, expected: &str) {
        assert_eq!(resolve(reference, Some(base), "test").unwrap(), expected);
    }

    #[test]
    fn absolute_needs_no_base() {
        assert_eq!(resolve("urn:x", None, "test").unwrap(), "urn:x");
    }

    #[test]
    fn relative_without_base() {
        let err = resolve("foo", None, "rdf:Description").unwrap_err();
        assert!(matches!(
            err,
            RdfXmlError::UriResolution(UriResolutionError::BaseUriRequired { ref reference, ref element })
                if reference == "foo" && element == "rdf:Description"
        ));
        assert!(resolve("foo", Some(""), "x").is_err());
    }

    #[test]
    fn manual_fallback() {
        // a space makes the base invalid for oxiri
        let base = "http://example.org/my dir/doc";
        assert_eq!(resolve("#f", Some(base), "t").unwrap(), "http://example.org/my dir/doc#f");
        assert_eq!(resolve("/x", Some(base), "t").unwrap(), "http://example.org/x");
        assert_eq!(resolve("y", Some(base), "t").unwrap(), "http://example.org/my dir/y");
    }

    #[test]
    fn base_override_is_verbatim() {
        assert_eq!(
            resolve_base(Some("relative/base"), Some("http://example.org/")),
            Some("relative/base".to_string())
        );
        assert_eq!(
            resolve_base(None, Some("http://example.org/")),
            Some("http://example.org/".to_string())
        );
        assert_eq!(resolve_base(None, None), None);
    }

    #[test_case("http://example.org/doc", "http://example.org/doc", Some(""))]
    #[test_case("http://example.org/doc#me", "http://example.org/doc", Some("#me"))]
    #[test_case("http://example.org/dir/other", "http://example.org/dir/doc", Some("other"))]
    #[test_case("http://example.org/dir/sub/x", "http://example.org/dir/doc", Some("sub/x"))]
    #[test_case("http://other.org/doc", "http://example.org/dir/doc", None)]
    #[test_case("http://example.org/dir/a:b", "http://example.org/dir/doc", None)]
    #[test_case("http://example.org/dir/./x", "http://example.org/dir/doc", None)]
    fn relativization(iri: &str, base: &str, expected: Option<&str>) {
        assert_eq!(relativize(iri, base).as_deref(), expected);
    }
}
