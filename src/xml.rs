//! The XML side of parsing: a namespace-aware event source over
//! `quick_xml`, a materialized element tree, and the [`XmlVisitor`]
//! seam both of them drive.

use crate::error::{RdfXmlError, Result};
use crate::namespace::implicit_namespace;
use crate::vocab::xml;
use log::trace;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{LocalName, PrefixDeclaration, QName, ResolveResult};
use quick_xml::NsReader;
use std::io::BufRead;

/// An element or attribute name after namespace resolution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct XmlName {
    pub namespace: Option<String>,
    pub local: String,
    /// The name as written, prefix included.
    pub raw: String,
}

impl XmlName {
    /// Namespace and local name concatenated, if the name is qualified.
    pub fn iri(&self) -> Option<String> {
        self.namespace
            .as_ref()
            .map(|ns| format!("{}{}", ns, self.local))
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct XmlAttribute {
    pub name: XmlName,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartElement {
    pub name: XmlName,
    /// Attributes other than namespace declarations.
    pub attributes: Vec<XmlAttribute>,
    /// `xmlns` declarations made on this element, as (prefix, namespace);
    /// the default namespace has the empty prefix.
    pub declarations: Vec<(String, String)>,
}

impl StartElement {
    /// The value of `xml:{local}` on this element.
    pub fn xml_attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(xml::NS, local))
            .map(|a| a.value.as_str())
    }
}

/// Receives the document in order. Text may arrive in several pieces.
pub trait XmlVisitor {
    fn start_element(&mut self, element: &StartElement) -> Result<()>;
    fn text(&mut self, text: &str) -> Result<()>;
    fn end_element(&mut self) -> Result<()>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum XmlEvent {
    Start(StartElement),
    Text(String),
    End,
}

impl XmlEvent {
    pub fn visit<V: XmlVisitor>(&self, visitor: &mut V) -> Result<()> {
        match self {
            XmlEvent::Start(element) => visitor.start_element(element),
            XmlEvent::Text(text) => visitor.text(text),
            XmlEvent::End => visitor.end_element(),
        }
    }
}

/// Pulls namespace-resolved events from a byte stream. Comments,
/// processing instructions and the XML declaration are dropped; CDATA
/// sections arrive as plain text.
pub struct XmlEventReader<R> {
    reader: NsReader<R>,
    buffer: Vec<u8>,
    depth: usize,
    seen_root: bool,
}

impl<R: BufRead> XmlEventReader<R> {
    pub fn new(read: R) -> Self {
        let mut reader = NsReader::from_reader(read);
        reader.trim_text(false);
        reader.expand_empty_elements(true);
        XmlEventReader {
            reader,
            buffer: Vec::new(),
            depth: 0,
            seen_root: false,
        }
    }

    /// Byte offset of the reader in the input.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// The next event, or `None` once the document is complete.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        loop {
            self.buffer.clear();
            let position = self.reader.buffer_position() as u64;
            let event = self
                .reader
                .read_event_into(&mut self.buffer)
                .map_err(|e| RdfXmlError::syntax(e, position))?;

            match event {
                Event::Start(start) => {
                    if self.depth == 0 {
                        if self.seen_root {
                            return Err(RdfXmlError::syntax(
                                "document has more than one root element",
                                position,
                            ));
                        }
                        self.seen_root = true;
                    }
                    let element = resolve_start(&self.reader, &start, position)?;
                    self.depth += 1;
                    return Ok(Some(XmlEvent::Start(element)));
                }
                Event::End(_) => {
                    if self.depth == 0 {
                        return Err(RdfXmlError::syntax("unexpected closing tag", position));
                    }
                    self.depth -= 1;
                    return Ok(Some(XmlEvent::End));
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| RdfXmlError::syntax(e, position))?
                        .into_owned();
                    if self.depth == 0 {
                        if text.trim().is_empty() {
                            continue;
                        }
                        return Err(RdfXmlError::syntax(
                            "text outside of the root element",
                            position,
                        ));
                    }
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned())
                        .map_err(|e| RdfXmlError::syntax(e, position))?;
                    if self.depth == 0 {
                        return Err(RdfXmlError::syntax(
                            "CDATA outside of the root element",
                            position,
                        ));
                    }
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Event::Empty(_) => {
                    return Err(RdfXmlError::syntax(
                        "unexpanded empty element",
                        position,
                    ))
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(RdfXmlError::syntax(
                            format!("{} element(s) left unclosed", self.depth),
                            position,
                        ));
                    }
                    return Ok(None);
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {
                    continue
                }
            }
        }
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| RdfXmlError::syntax(e, position))
}

// The reader has already opened the namespace scope of `start`.
fn resolve_start<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<StartElement> {
    let name = resolve_name(reader.resolve_element(start.name()), start.name(), position)?;
    let mut declarations = vec![];
    let mut attributes = vec![];
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| RdfXmlError::syntax(e, position))?;
        let value = attribute
            .unescape_value()
            .map_err(|e| RdfXmlError::syntax(e, position))?
            .into_owned();
        match attribute.key.as_namespace_binding() {
            Some(PrefixDeclaration::Default) => declarations.push((String::new(), value)),
            Some(PrefixDeclaration::Named(prefix)) => {
                declarations.push((utf8(prefix, position)?.to_string(), value))
            }
            None => attributes.push(XmlAttribute {
                name: resolve_name(reader.resolve_attribute(attribute.key), attribute.key, position)?,
                value,
            }),
        }
    }
    Ok(StartElement {
        name,
        attributes,
        declarations,
    })
}

// Unprefixed attributes come back unbound; unprefixed elements take the
// default namespace.
fn resolve_name(
    (resolved, local): (ResolveResult<'_>, LocalName<'_>),
    qname: QName<'_>,
    position: u64,
) -> Result<XmlName> {
    let raw = utf8(qname.as_ref(), position)?.to_string();
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(utf8(ns.as_ref(), position)?.to_string()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => match implicit_namespace(&prefix) {
            Some(ns) => Some(ns.to_string()),
            None => {
                return Err(RdfXmlError::syntax(
                    format!(
                        "undeclared namespace prefix '{}' in <{}>",
                        String::from_utf8_lossy(&prefix),
                        raw
                    ),
                    position,
                ))
            }
        },
    };
    Ok(XmlName {
        namespace,
        local: utf8(local.as_ref(), position)?.to_string(),
        raw,
    })
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct XmlElement {
    pub start: StartElement,
    pub children: Vec<XmlNode>,
}

/// A fully materialized document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct XmlDocument {
    pub root: Option<XmlElement>,
}

impl XmlDocument {
    /// Reads the whole input. Malformed XML fails here, before any
    /// visitor sees the document.
    pub fn parse<R: BufRead>(read: R, max_depth: usize) -> Result<XmlDocument> {
        let mut reader = XmlEventReader::new(read);
        let mut stack: Vec<XmlElement> = vec![];
        let mut root = None;
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::Start(start) => {
                    if stack.len() >= max_depth {
                        return Err(RdfXmlError::depth_exceeded(stack.len() + 1, max_depth));
                    }
                    stack.push(XmlElement {
                        start,
                        children: vec![],
                    });
                }
                XmlEvent::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                XmlEvent::End => {
                    let element = stack.pop().ok_or_else(|| {
                        RdfXmlError::syntax("unexpected closing tag", reader.position())
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
            }
        }
        trace!("materialized document, root present: {}", root.is_some());
        Ok(XmlDocument { root })
    }

    pub fn parse_str(xml: &str, max_depth: usize) -> Result<XmlDocument> {
        XmlDocument::parse(xml.as_bytes(), max_depth)
    }

    /// Replays the document to `visitor` in document order.
    pub fn walk<V: XmlVisitor>(&self, visitor: &mut V) -> Result<()> {
        let root = match &self.root {
            Some(root) => root,
            None => return Ok(()),
        };
        visitor.start_element(&root.start)?;
        let mut stack: Vec<(&XmlElement, usize)> = vec![(root, 0)];
        while let Some(top) = stack.last_mut() {
            let element: &XmlElement = top.0;
            match element.children.get(top.1) {
                Some(child) => {
                    top.1 += 1;
                    match child {
                        XmlNode::Text(text) => visitor.text(text)?,
                        XmlNode::Element(child) => {
                            visitor.start_element(&child.start)?;
                            stack.push((child, 0));
                        }
                    }
                }
                None => {
                    stack.pop();
                    visitor.end_element()?;
                }
            }
        }
        Ok(())
    }
}
