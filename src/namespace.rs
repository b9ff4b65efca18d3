//! Namespaces: in-scope prefix bindings while reading, and IRI to
//! QName mapping plus prefix assignment while writing.

use crate::model::{Term, Triple};
use crate::vocab::rdf;
use indexmap::IndexMap;
use log::debug;

// Utilities
pub fn is_name_start_char(c: char) -> bool {
    // ":" | [A-Z] | "_" | [a-z] | [#xC0-#xD6] | [#xD8-#xF6] | [#xF8-#x2FF] | [#x370-#x37D] | [#x37F-#x1FFF] | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
    matches!(c,
        ':'
        | 'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub fn is_name_char(c: char) -> bool {
    // NameStartChar | "-" | "." | [0-9] | #xB7 | [#x0300-#x036F] | [#x203F-#x2040]
    is_name_start_char(c)
        || matches!(c,  '-' | '.' | '0'..='9' | '\u{B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// A non-colonized XML name: usable as a local name or a prefix.
pub fn is_nc_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c != ':' && is_name_start_char(c) => {
            chars.all(|c| c != ':' && is_name_char(c))
        }
        _ => false,
    }
}

/// The namespace of a prefix that no `xmlns` declaration in scope binds.
/// Documents may use `rdf:` without declaring it.
pub fn implicit_namespace(prefix: &[u8]) -> Option<&'static str> {
    match prefix {
        b"rdf" => Some(rdf::NS),
        _ => None,
    }
}

/// Prefixes bound without being asked to.
pub fn well_known_prefixes() -> IndexMap<String, String> {
    [
        ("rdf", rdf::NS),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ("owl", "http://www.w3.org/2002/07/owl#"),
        ("dc", "http://purl.org/dc/elements/1.1/"),
        ("dcterms", "http://purl.org/dc/terms/"),
        ("foaf", "http://xmlns.com/foaf/0.1/"),
        ("skos", "http://www.w3.org/2004/02/skos/core#"),
        ("schema", "http://schema.org/"),
        ("ex", "http://example.org/"),
    ]
    .into_iter()
    .map(|(p, ns)| (p.to_string(), ns.to_string()))
    .collect()
}

/// `prefix:local` for `iri`, using the longest namespace of
/// `namespaces` (prefix to namespace) that leaves a valid local name.
pub fn to_qname(iri: &str, namespaces: &IndexMap<String, String>) -> Option<String> {
    let mut best: Option<(&str, &str)> = None;
    for (prefix, ns) in namespaces {
        if let Some(local) = iri.strip_prefix(ns.as_str()) {
            if is_nc_name(local) && best.map_or(true, |(_, b)| ns.len() > b.len()) {
                best = Some((prefix.as_str(), ns.as_str()));
            }
        }
    }
    best.map(|(prefix, ns)| {
        let local = &iri[ns.len()..];
        if prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", prefix, local)
        }
    })
}

/// Splits `iri` into a namespace and a local name, preferring the last
/// `#`, then the last `/`, then the longest valid local name suffix.
pub fn split_iri(iri: &str) -> Option<(&str, &str)> {
    for sep in ['#', '/'] {
        if let Some(pos) = iri.rfind(sep) {
            let local = &iri[pos + 1..];
            if is_nc_name(local) {
                return Some((&iri[..=pos], local));
            }
        }
    }

    let position_base = iri.rfind(|c| !is_name_char(c) || c == ':')?;
    let position_add =
        iri[position_base..].find(|c| is_name_start_char(c) && c != ':')?;
    let split = position_base + position_add;
    let local = &iri[split..];
    if is_nc_name(local) {
        Some((&iri[..split], local))
    } else {
        None
    }
}

fn is_usable_prefix(prefix: &str) -> bool {
    is_nc_name(prefix) && !prefix.to_ascii_lowercase().starts_with("xml")
}

/// A short prefix derived from the last usable path segment of `ns`,
/// or from its host name.
fn mnemonic(ns: &str) -> Option<String> {
    let rest = match ns.find("://") {
        Some(pos) => &ns[pos + 3..],
        None => ns.split_once(':').map(|(_, rest)| rest)?,
    };
    let mut segments = rest.split(['/', '#', '?']).filter(|s| !s.is_empty());
    let host = segments.next().unwrap_or("");

    let usable = |s: &str| {
        let s = s.to_ascii_lowercase();
        if s.starts_with(|c: char| c.is_ascii_alphabetic())
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && is_usable_prefix(&s)
        {
            Some(s)
        } else {
            None
        }
    };

    let path: Vec<&str> = segments.collect();
    path.iter()
        .rev()
        .find_map(|s| usable(*s))
        .or_else(|| {
            host.split(['.', ':'])
                .find(|label| *label != "www")
                .and_then(usable)
        })
}

/// The prefix to namespace bindings needed to write `triples`.
///
/// `rdf` is always present. `custom` overrides the well-known bindings.
/// Only namespaces that some predicate or `rdf:type` object actually
/// uses are returned, in order of first use. Subjects are written as
/// `rdf:about` values and never need a prefix.
pub fn build_used_namespaces(
    triples: &[Triple],
    custom: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let mut bound = well_known_prefixes();
    for (prefix, ns) in custom {
        // a custom binding also displaces a well-known prefix of the same namespace
        bound.retain(|p, n| p == prefix || n != ns);
        bound.insert(prefix.clone(), ns.clone());
    }

    let mut used: IndexMap<String, String> = IndexMap::new();
    if let Some(ns) = bound.get("rdf") {
        used.insert("rdf".to_string(), ns.clone());
    } else {
        used.insert("rdf".to_string(), rdf::NS.to_string());
    }

    let mut synthesized = 0;
    for iri in used_iris(triples) {
        if to_qname(iri, &used).is_some() {
            continue;
        }
        if let Some(qname) = to_qname(iri, &bound) {
            let prefix = qname.split_once(':').map_or("", |(p, _)| p);
            if let Some(ns) = bound.get(prefix) {
                if !used.contains_key(prefix) {
                    used.insert(prefix.to_string(), ns.clone());
                    continue;
                }
            }
        }

        let ns = match split_iri(iri) {
            Some((ns, _)) => ns,
            None => continue,
        };
        let prefix = match mnemonic(ns).filter(|p| !bound.contains_key(p)) {
            Some(prefix) => prefix,
            None => loop {
                synthesized += 1;
                let candidate = format!("ns{}", synthesized);
                if !bound.contains_key(&candidate) {
                    break candidate;
                }
            },
        };
        debug!("binding prefix {} to {}", prefix, ns);
        bound.insert(prefix.clone(), ns.to_string());
        used.insert(prefix, ns.to_string());
    }
    used
}

fn used_iris(triples: &[Triple]) -> impl Iterator<Item = &str> {
    triples.iter().flat_map(|t| {
        let class = match &t.object {
            Term::NamedNode(nn) if t.is_type() => Some(nn.as_str()),
            _ => None,
        };
        Some(t.predicate.as_str()).into_iter().chain(class)
    })
}
