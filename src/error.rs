//! Errors raised while parsing or writing RDF/XML.
//!
//! Every variant is fatal for the call that raised it: the engines
//! either return a complete result or one of these.

use std::io;
use thiserror::Error;

pub type Result<T, E = RdfXmlError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RdfXmlError {
    /// The input is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    XmlSyntax { message: String, position: u64 },

    /// The XML is well-formed but does not follow the RDF/XML grammar.
    #[error("invalid RDF/XML structure: {0}")]
    Structure(String),

    #[error(transparent)]
    UriResolution(#[from] UriResolutionError),

    /// The graph cannot be expressed in RDF/XML.
    #[error("cannot serialize graph: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum UriResolutionError {
    #[error("relative reference '{reference}' on <{element}> needs a base URI, but none is set")]
    BaseUriRequired { reference: String, element: String },

    #[error("cannot resolve '{reference}' against base '{base}': {message}")]
    Unresolvable {
        reference: String,
        base: String,
        message: String,
    },
}

impl RdfXmlError {
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        RdfXmlError::Structure(message.into())
    }

    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        RdfXmlError::Serialization(message.into())
    }

    pub(crate) fn depth_exceeded(depth: usize, max_depth: usize) -> Self {
        RdfXmlError::Structure(format!(
            "element nesting depth {} exceeds the maximum of {}",
            depth, max_depth
        ))
    }

    pub(crate) fn syntax(message: impl ToString, position: u64) -> Self {
        RdfXmlError::XmlSyntax {
            message: message.to_string(),
            position,
        }
    }
}

/// Errors from the quick-xml writer are either I/O failures of the
/// underlying sink, or something we asked it to write badly.
pub(crate) fn map_err(error: quick_xml::Error) -> RdfXmlError {
    if let quick_xml::Error::Io(error) = error {
        RdfXmlError::Io(io::Error::new(error.kind(), error.to_string()))
    } else {
        RdfXmlError::Serialization(error.to_string())
    }
}
