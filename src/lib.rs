//! Read and write RDF/XML.
//!
//! [`parser`] turns RDF/XML documents into [`Graph`]s, either by
//! building the document tree first or by streaming triples as the
//! input is read. [`serializer`] writes triples back out as compact,
//! pretty printed RDF/XML: typed node elements, nested containers,
//! `rdf:parseType="Collection"` lists and folded reifications.
//!
//! ```
//! use rdfxml_codec::{parse_str, write};
//! use indexmap::IndexMap;
//!
//! let graph = parse_str(
//!     r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!                 xmlns:ex="http://example.org/">
//!          <rdf:Description rdf:about="http://example.org/s">
//!            <ex:p>o</ex:p>
//!          </rdf:Description>
//!        </rdf:RDF>"#,
//!     None,
//! )
//! .unwrap();
//! assert_eq!(graph.len(), 1);
//!
//! let xml = write(graph.triples(), None, &IndexMap::new()).unwrap();
//! assert!(xml.contains("<ex:p>o</ex:p>"));
//! ```

pub mod bnode;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod namespace;
pub mod parser;
pub mod rio;
pub mod serializer;
pub mod uri;
pub mod vocab;
pub mod xml;

pub use crate::config::{ParserConfig, WriterConfig};
pub use crate::error::{RdfXmlError, Result, UriResolutionError};
pub use crate::graph::Graph;
pub use crate::model::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
pub use crate::parser::{parse_str, ParsedGraph, RdfXmlParser, StreamingParser};
pub use crate::serializer::{write, RdfXmlWriter};
