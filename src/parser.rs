//! The RDF/XML grammar.
//!
//! [`Grammar`] keeps one frame per open element and turns the element
//! hierarchy into triples. It only sees [`XmlVisitor`] calls, so the
//! same rules run whether the document was materialized first
//! ([`RdfXmlParser::parse_str`]) or is consumed incrementally
//! ([`RdfXmlParser::stream`]).

use crate::bnode::BlankNodeManager;
use crate::config::ParserConfig;
use crate::error::{map_err, RdfXmlError, Result};
use crate::graph::Graph;
use crate::model::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use crate::namespace::is_nc_name;
use crate::uri;
use crate::vocab::{rdf, xml};
use crate::xml::{StartElement, XmlDocument, XmlEventReader, XmlVisitor};
use log::{debug, warn};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::{HashSet, VecDeque};
use std::io::BufRead;

/// The result of a successful parse.
#[derive(Clone, Debug, Default)]
pub struct ParsedGraph {
    pub graph: Graph,
    /// Recovered problems, only ever non-empty for lenient parses.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct RdfXmlParser {
    config: ParserConfig,
}

impl RdfXmlParser {
    pub fn new(config: ParserConfig) -> Self {
        RdfXmlParser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a complete document held in memory.
    pub fn parse_str(&self, xml: &str) -> Result<ParsedGraph> {
        self.parse_read(xml.as_bytes())
    }

    /// Materializes the document, then runs the grammar over it. Nothing
    /// is produced unless the whole document is well-formed.
    pub fn parse_read<R: BufRead>(&self, read: R) -> Result<ParsedGraph> {
        let document = XmlDocument::parse(read, self.config.max_depth)?;
        self.parse_tree(&document)
    }

    pub fn parse_tree(&self, document: &XmlDocument) -> Result<ParsedGraph> {
        let mut grammar = Grammar::new(self.config.clone());
        document.walk(&mut grammar)?;
        grammar.finish()?;
        let graph = grammar.output.drain(..).collect();
        Ok(ParsedGraph {
            graph,
            warnings: grammar.warnings,
        })
    }

    /// Triples are produced as the input is read. The iterator ends after
    /// the first error.
    pub fn stream<R: BufRead>(&self, read: R) -> StreamingParser<R> {
        StreamingParser {
            reader: XmlEventReader::new(read),
            grammar: Grammar::new(self.config.clone()),
            done: false,
        }
    }
}

/// Parses `xml` with the default strict settings.
pub fn parse_str(xml: &str, base: Option<&str>) -> Result<Graph> {
    let mut config = ParserConfig::default();
    if let Some(base) = base {
        config = config.base(base);
    }
    Ok(RdfXmlParser::new(config).parse_str(xml)?.graph)
}

pub struct StreamingParser<R> {
    reader: XmlEventReader<R>,
    grammar: Grammar,
    done: bool,
}

impl<R: BufRead> StreamingParser<R> {
    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[String] {
        &self.grammar.warnings
    }
}

impl<R: BufRead> Iterator for StreamingParser<R> {
    type Item = Result<Triple>;

    fn next(&mut self) -> Option<Result<Triple>> {
        loop {
            if let Some(triple) = self.grammar.output.pop_front() {
                return Some(Ok(triple));
            }
            if self.done {
                return None;
            }
            let step = match self.reader.next_event() {
                Ok(Some(event)) => event.visit(&mut self.grammar),
                Ok(None) => {
                    self.done = true;
                    self.grammar.finish()
                }
                Err(error) => Err(error),
            };
            if let Err(error) = step {
                self.done = true;
                self.grammar.output.clear();
                return Some(Err(error));
            }
        }
    }
}

// Frames

struct NodeFrame {
    subject: Subject,
    // last rdf:_n index used for this node
    li_counter: u64,
}

// A property element whose object is not decided until it closes: a
// literal, a nested node element, or a blank node built from its
// property attributes.
struct PropertyFrame {
    subject: Subject,
    predicate: NamedNode,
    reify: Option<NamedNode>,
    datatype: Option<NamedNode>,
    properties: Vec<(String, String)>,
    element: String,
    text: String,
    nodes: usize,
}

struct LiteralFrame {
    subject: Subject,
    predicate: NamedNode,
    reify: Option<NamedNode>,
    writer: Writer<Vec<u8>>,
    open: Vec<String>,
}

impl LiteralFrame {
    fn start(&mut self, element: &StartElement) -> Result<()> {
        let mut start = BytesStart::new(element.name.raw.as_str());
        for (prefix, ns) in &element.declarations {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            start.push_attribute((key.as_str(), ns.as_str()));
        }
        for attribute in &element.attributes {
            start.push_attribute((attribute.name.raw.as_str(), attribute.value.as_str()));
        }
        self.writer.write_event(Event::Start(start)).map_err(map_err)?;
        self.open.push(element.name.raw.clone());
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
            .map_err(map_err)
    }

    fn end(&mut self) -> Result<()> {
        if let Some(name) = self.open.pop() {
            self.writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(map_err)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<(Triple, Option<NamedNode>)> {
        let markup = String::from_utf8(self.writer.into_inner())
            .map_err(|e| RdfXmlError::structure(format!("literal markup is not UTF-8: {}", e)))?;
        let literal = Literal::typed(markup, NamedNode::new(rdf::XML_LITERAL));
        Ok((Triple::new(self.subject, self.predicate, literal), self.reify))
    }
}

struct CollectionFrame {
    subject: Subject,
    predicate: NamedNode,
    reify: Option<NamedNode>,
    items: Vec<Subject>,
}

enum Role {
    // `searching` while no root has been found above
    Skipped { searching: bool },
    RdfRoot,
    Description(NodeFrame),
    Container(NodeFrame),
    ParseTypeResource(NodeFrame),
    // rdf:resource or rdf:nodeID: the object is known, no content allowed
    ResourceProperty,
    LiteralProperty(PropertyFrame),
    ParseTypeLiteral(LiteralFrame),
    ParseTypeCollection(CollectionFrame),
}

impl Role {
    fn node_mut(&mut self) -> Option<&mut NodeFrame> {
        match self {
            Role::Description(node) | Role::Container(node) | Role::ParseTypeResource(node) => {
                Some(node)
            }
            _ => None,
        }
    }
}

struct Frame {
    base: Option<String>,
    language: Option<String>,
    role: Role,
}

// Where a new element sits, as decided by its parent.
enum Position {
    Search,
    Ignored,
    TopLevel,
    Property,
    Object {
        subject: Subject,
        predicate: NamedNode,
        reify: Option<NamedNode>,
        first: bool,
        mixed: bool,
    },
    CollectionItem,
    InsideEmptyProperty,
}

#[derive(Default)]
struct Attributes<'a> {
    about: Option<&'a str>,
    id: Option<&'a str>,
    node_id: Option<&'a str>,
    resource: Option<&'a str>,
    datatype: Option<&'a str>,
    parse_type: Option<&'a str>,
    // rdf:li, and names the grammar no longer knows
    forbidden: Vec<&'a str>,
    properties: Vec<(String, String)>,
}

/// The grammar state machine. One instance parses one document.
pub struct Grammar {
    config: ParserConfig,
    bnodes: BlankNodeManager,
    frames: Vec<Frame>,
    depth: usize,
    found_root: bool,
    known_ids: HashSet<String>,
    output: VecDeque<Triple>,
    warnings: Vec<String>,
}

impl Grammar {
    pub fn new(config: ParserConfig) -> Self {
        Grammar {
            config,
            bnodes: BlankNodeManager::new(),
            frames: vec![],
            depth: 0,
            found_root: false,
            known_ids: HashSet::new(),
            output: VecDeque::new(),
            warnings: vec![],
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Checks that the document had somewhere to start from. Call once
    /// after the last element has closed.
    pub fn finish(&mut self) -> Result<()> {
        if !self.found_root {
            return Err(RdfXmlError::structure(
                "no rdf:RDF element, and no element declaring the RDF namespace",
            ));
        }
        Ok(())
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    // Fatal when strict, a warning otherwise.
    fn violation(&mut self, message: String) -> Result<()> {
        if self.config.strict {
            Err(RdfXmlError::Structure(message))
        } else {
            self.warn(message);
            Ok(())
        }
    }

    fn emit(&mut self, triple: Triple) -> Result<()> {
        if self.config.validate_output {
            validate(&triple)?;
        }
        self.output.push_back(triple);
        Ok(())
    }

    fn emit_with_reification(&mut self, triple: Triple, reify: Option<NamedNode>) -> Result<()> {
        if let Some(statement) = reify {
            let node = |iri: &str| NamedNode::new(iri);
            self.emit(Triple::new(
                statement.clone(),
                node(rdf::TYPE),
                node(rdf::STATEMENT),
            ))?;
            self.emit(Triple::new(
                statement.clone(),
                node(rdf::SUBJECT),
                triple.subject.clone(),
            ))?;
            self.emit(Triple::new(
                statement.clone(),
                node(rdf::PREDICATE),
                triple.predicate.clone(),
            ))?;
            self.emit(Triple::new(statement, node(rdf::OBJECT), triple.object.clone()))?;
        }
        self.emit(triple)
    }

    // The element's name as an IRI, or `None` when it has no namespace
    // and the parse is lenient.
    fn qualified(&mut self, element: &StartElement) -> Result<Option<String>> {
        match element.name.iri() {
            Some(iri) => Ok(Some(iri)),
            None => {
                self.violation(format!("element <{}> has no namespace", element.name.raw))?;
                Ok(None)
            }
        }
    }

    fn classify<'a>(&mut self, element: &'a StartElement) -> Result<Attributes<'a>> {
        let mut attributes = Attributes::default();
        for attribute in &element.attributes {
            let ns = match &attribute.name.namespace {
                Some(ns) => ns,
                None => {
                    self.violation(format!(
                        "unqualified attribute {} on <{}>",
                        attribute.name.raw, element.name.raw
                    ))?;
                    continue;
                }
            };
            if ns == xml::NS {
                continue;
            }
            let value = attribute.value.as_str();
            let iri = format!("{}{}", ns, attribute.name.local);
            match iri.as_str() {
                rdf::ABOUT => attributes.about = Some(value),
                rdf::ID => attributes.id = Some(value),
                rdf::NODE_ID => attributes.node_id = Some(value),
                rdf::RESOURCE => attributes.resource = Some(value),
                rdf::DATATYPE => attributes.datatype = Some(value),
                rdf::PARSE_TYPE => attributes.parse_type = Some(value),
                rdf::LI
                | rdf::ABOUT_EACH
                | rdf::ABOUT_EACH_PREFIX
                | rdf::BAG_ID
                | rdf::DESCRIPTION
                | rdf::RDF => attributes.forbidden.push(&attribute.name.raw),
                _ => attributes.properties.push((iri, value.to_string())),
            }
        }
        Ok(attributes)
    }

    fn rdf_id(&mut self, id: &str, base: Option<&str>, element: &str) -> Result<NamedNode> {
        if !is_nc_name(id) {
            self.violation(format!("rdf:ID '{}' on <{}> is not an XML name", id, element))?;
        }
        let iri = uri::resolve(&format!("#{}", id), base, element)?;
        if !self.known_ids.insert(iri.clone()) {
            self.violation(format!("rdf:ID '{}' is used more than once", id))?;
        }
        Ok(NamedNode::new(iri))
    }

    fn node_id(&mut self, id: &str, element: &str) -> Result<BlankNode> {
        if !is_nc_name(id) {
            self.violation(format!("rdf:nodeID '{}' on <{}> is not an XML name", id, element))?;
        }
        Ok(self.bnodes.identity(id))
    }

    // Literal valued, except rdf:type which names a class.
    fn property_attributes(
        &mut self,
        subject: &Subject,
        properties: &[(String, String)],
        base: Option<&str>,
        element: &str,
    ) -> Result<()> {
        for (predicate, value) in properties {
            let object: Term = if predicate == rdf::TYPE {
                NamedNode::new(uri::resolve(value, base, element)?).into()
            } else {
                Literal::simple(value.as_str()).into()
            };
            self.emit(Triple::new(
                subject.clone(),
                NamedNode::new(predicate.as_str()),
                object,
            ))?;
        }
        Ok(())
    }

    fn search_root(&mut self, element: &StartElement, base: Option<&str>) -> Result<Role> {
        if element.name.is(rdf::NS, "RDF") {
            debug!("found root <{}>", element.name.raw);
            self.found_root = true;
            return Ok(Role::RdfRoot);
        }
        if !element.declarations.iter().any(|(_, ns)| ns == rdf::NS) {
            return Ok(Role::Skipped { searching: true });
        }

        self.found_root = true;
        let is_node = element.name.is(rdf::NS, "Description")
            || element.attributes.iter().any(|a| {
                a.name.is(rdf::NS, "about") || a.name.is(rdf::NS, "ID") || a.name.is(rdf::NS, "nodeID")
            });
        if is_node {
            debug!("<{}> is a top-level node element", element.name.raw);
            self.top_level(element, base)
        } else {
            debug!("<{}> declares the RDF namespace, using it as root", element.name.raw);
            Ok(Role::RdfRoot)
        }
    }

    fn top_level(&mut self, element: &StartElement, base: Option<&str>) -> Result<Role> {
        if element.name.is(rdf::NS, "RDF") {
            return Ok(Role::RdfRoot);
        }
        Ok(match self.node_element(element, base)? {
            Some((role, _)) => role,
            None => Role::Skipped { searching: false },
        })
    }

    fn node_element(
        &mut self,
        element: &StartElement,
        base: Option<&str>,
    ) -> Result<Option<(Role, Subject)>> {
        let raw = element.name.raw.as_str();
        let iri = match self.qualified(element)? {
            Some(iri) => iri,
            None => return Ok(None),
        };
        if rdf::FORBIDDEN_NODE_ELEMENTS.contains(&iri.as_str()) {
            self.violation(format!("<{}> cannot be used as a node element", raw))?;
            return Ok(None);
        }

        let attributes = self.classify(element)?;
        for name in attributes.forbidden.iter().copied().chain(
            [
                attributes.resource.map(|_| "rdf:resource"),
                attributes.datatype.map(|_| "rdf:datatype"),
                attributes.parse_type.map(|_| "rdf:parseType"),
            ]
            .into_iter()
            .flatten(),
        ) {
            self.violation(format!("attribute {} is not allowed on node element <{}>", name, raw))?;
        }

        let given = [attributes.about, attributes.id, attributes.node_id]
            .iter()
            .filter(|a| a.is_some())
            .count();
        if given > 1 {
            self.violation(format!(
                "<{}> has more than one of rdf:about, rdf:ID and rdf:nodeID",
                raw
            ))?;
        }
        let subject: Subject = if let Some(about) = attributes.about {
            NamedNode::new(uri::resolve(about, base, raw)?).into()
        } else if let Some(id) = attributes.id {
            self.rdf_id(id, base, raw)?.into()
        } else if let Some(node_id) = attributes.node_id {
            self.node_id(node_id, raw)?.into()
        } else {
            self.bnodes.fresh().into()
        };

        if iri != rdf::DESCRIPTION {
            self.emit(Triple::new(
                subject.clone(),
                NamedNode::new(rdf::TYPE),
                NamedNode::new(iri.as_str()),
            ))?;
        }
        self.property_attributes(&subject, &attributes.properties, base, raw)?;

        let node = NodeFrame {
            subject: subject.clone(),
            li_counter: 0,
        };
        let role = if rdf::is_container(&iri) {
            Role::Container(node)
        } else {
            Role::Description(node)
        };
        Ok(Some((role, subject)))
    }

    fn property_element(
        &mut self,
        element: &StartElement,
        base: Option<&str>,
    ) -> Result<Role> {
        let raw = element.name.raw.as_str();
        let iri = match self.qualified(element)? {
            Some(iri) => iri,
            None => return Ok(Role::Skipped { searching: false }),
        };
        if rdf::FORBIDDEN_PROPERTY_ELEMENTS.contains(&iri.as_str()) {
            self.violation(format!("<{}> cannot be used as a property element", raw))?;
            return Ok(Role::Skipped { searching: false });
        }

        let (subject, predicate) = match self.frames.last_mut().and_then(|f| f.role.node_mut()) {
            Some(node) => {
                let predicate = if iri == rdf::LI {
                    node.li_counter += 1;
                    rdf::membership(node.li_counter)
                } else {
                    if let Some(index) = rdf::membership_index(&iri) {
                        node.li_counter = node.li_counter.max(index);
                    }
                    iri
                };
                (node.subject.clone(), NamedNode::new(predicate))
            }
            None => {
                return Err(RdfXmlError::structure(format!(
                    "property element <{}> outside of a node element",
                    raw
                )))
            }
        };

        let attributes = self.classify(element)?;
        for name in attributes
            .forbidden
            .iter()
            .copied()
            .chain(attributes.about.map(|_| "rdf:about"))
        {
            self.violation(format!("attribute {} is not allowed on property element <{}>", name, raw))?;
        }
        let reify = match attributes.id {
            Some(id) => Some(self.rdf_id(id, base, raw)?),
            None => None,
        };

        if attributes.resource.is_some() && attributes.node_id.is_some() {
            self.violation(format!("<{}> has both rdf:resource and rdf:nodeID", raw))?;
        }
        let object: Option<Subject> = if let Some(resource) = attributes.resource {
            Some(NamedNode::new(uri::resolve(resource, base, raw)?).into())
        } else if let Some(node_id) = attributes.node_id {
            Some(self.node_id(node_id, raw)?.into())
        } else {
            None
        };
        if let Some(object) = object {
            if attributes.parse_type.is_some() || attributes.datatype.is_some() {
                self.violation(format!(
                    "<{}> cannot combine an object reference with rdf:parseType or rdf:datatype",
                    raw
                ))?;
            }
            self.emit_with_reification(
                Triple::new(subject, predicate, object.clone()),
                reify,
            )?;
            self.property_attributes(&object, &attributes.properties, base, raw)?;
            return Ok(Role::ResourceProperty);
        }

        if let Some(parse_type) = attributes.parse_type {
            if !attributes.properties.is_empty() || attributes.datatype.is_some() {
                self.violation(format!(
                    "<{}> cannot combine rdf:parseType with other property attributes",
                    raw
                ))?;
            }
            return match parse_type {
                "Resource" => self.parse_type_resource(subject, predicate, reify),
                "Literal" => Ok(Role::ParseTypeLiteral(LiteralFrame {
                    subject,
                    predicate,
                    reify,
                    writer: Writer::new(Vec::new()),
                    open: vec![],
                })),
                "Collection" => Ok(Role::ParseTypeCollection(CollectionFrame {
                    subject,
                    predicate,
                    reify,
                    items: vec![],
                })),
                other => {
                    self.violation(format!(
                        "unknown rdf:parseType '{}' on <{}>",
                        other, raw
                    ))?;
                    self.parse_type_resource(subject, predicate, reify)
                }
            };
        }

        let datatype = match attributes.datatype {
            Some(datatype) => Some(NamedNode::new(uri::resolve(datatype, base, raw)?)),
            None => None,
        };
        Ok(Role::LiteralProperty(PropertyFrame {
            subject,
            predicate,
            reify,
            datatype,
            properties: attributes.properties,
            element: raw.to_string(),
            text: String::new(),
            nodes: 0,
        }))
    }

    fn parse_type_resource(
        &mut self,
        subject: Subject,
        predicate: NamedNode,
        reify: Option<NamedNode>,
    ) -> Result<Role> {
        let nested = self.bnodes.fresh();
        self.emit_with_reification(Triple::new(subject, predicate, nested.clone()), reify)?;
        Ok(Role::ParseTypeResource(NodeFrame {
            subject: nested.into(),
            li_counter: 0,
        }))
    }

    fn finish_property(
        &mut self,
        property: PropertyFrame,
        base: Option<&str>,
        language: Option<String>,
    ) -> Result<()> {
        if property.nodes > 0 {
            return Ok(());
        }

        if !property.properties.is_empty() {
            if !property.text.trim().is_empty() || property.datatype.is_some() {
                self.violation(format!(
                    "<{}> combines property attributes with literal content",
                    property.element
                ))?;
            }
            let object: Subject = self.bnodes.fresh().into();
            self.emit_with_reification(
                Triple::new(property.subject, property.predicate, object.clone()),
                property.reify,
            )?;
            return self.property_attributes(&object, &property.properties, base, &property.element);
        }

        let value = if self.config.normalize_whitespace {
            normalize_whitespace(&property.text)
        } else {
            property.text
        };
        let literal = match (property.datatype, language) {
            (Some(datatype), _) => Literal::typed(value, datatype),
            (None, Some(language)) => Literal::language_tagged(value, language),
            (None, None) => Literal::simple(value),
        };
        self.emit_with_reification(
            Triple::new(property.subject, property.predicate, literal),
            property.reify,
        )
    }

    fn finish_collection(&mut self, collection: CollectionFrame) -> Result<()> {
        if collection.items.is_empty() {
            return self.emit_with_reification(
                Triple::new(
                    collection.subject,
                    collection.predicate,
                    NamedNode::new(rdf::NIL),
                ),
                collection.reify,
            );
        }

        let cells: Vec<BlankNode> = collection.items.iter().map(|_| self.bnodes.fresh()).collect();
        self.emit_with_reification(
            Triple::new(collection.subject, collection.predicate, cells[0].clone()),
            collection.reify,
        )?;
        for (i, item) in collection.items.into_iter().enumerate() {
            self.emit(Triple::new(cells[i].clone(), NamedNode::new(rdf::FIRST), item))?;
            let rest: Term = match cells.get(i + 1) {
                Some(next) => next.clone().into(),
                None => NamedNode::new(rdf::NIL).into(),
            };
            self.emit(Triple::new(cells[i].clone(), NamedNode::new(rdf::REST), rest))?;
        }
        Ok(())
    }
}

impl XmlVisitor for Grammar {
    fn start_element(&mut self, element: &StartElement) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(RdfXmlError::depth_exceeded(self.depth, self.config.max_depth));
        }

        let position = match self.frames.last_mut().map(|f| &mut f.role) {
            None | Some(Role::Skipped { searching: true }) => Position::Search,
            Some(Role::Skipped { searching: false }) => Position::Ignored,
            Some(Role::RdfRoot) => Position::TopLevel,
            Some(Role::Description(_)) | Some(Role::Container(_)) | Some(Role::ParseTypeResource(_)) => {
                Position::Property
            }
            Some(Role::LiteralProperty(property)) => {
                property.nodes += 1;
                Position::Object {
                    subject: property.subject.clone(),
                    predicate: property.predicate.clone(),
                    reify: property.reify.take(),
                    first: property.nodes == 1,
                    mixed: !property.text.trim().is_empty()
                        || !property.properties.is_empty()
                        || property.datatype.is_some(),
                }
            }
            Some(Role::ParseTypeCollection(_)) => Position::CollectionItem,
            Some(Role::ResourceProperty) => Position::InsideEmptyProperty,
            Some(Role::ParseTypeLiteral(literal)) => return literal.start(element),
        };

        let (base, language) = match self.frames.last() {
            Some(frame) => (frame.base.clone(), frame.language.clone()),
            None => (self.config.base.clone(), None),
        };
        let base = uri::resolve_base(element.xml_attribute(xml::BASE), base.as_deref());
        let language = match element.xml_attribute(xml::LANG) {
            Some("") => None,
            Some(language) => Some(language.to_string()),
            None => language,
        };

        let role = match position {
            Position::Search => self.search_root(element, base.as_deref())?,
            Position::Ignored => Role::Skipped { searching: false },
            Position::TopLevel => self.top_level(element, base.as_deref())?,
            Position::Property => self.property_element(element, base.as_deref())?,
            Position::Object {
                subject,
                predicate,
                reify,
                first,
                mixed,
            } => {
                if mixed {
                    self.violation(format!(
                        "property {} mixes a node element with literal content",
                        predicate
                    ))?;
                }
                if !first {
                    self.violation(format!(
                        "property {} holds more than one node element",
                        predicate
                    ))?;
                }
                match self.node_element(element, base.as_deref())? {
                    Some((role, object)) => {
                        self.emit_with_reification(Triple::new(subject, predicate, object), reify)?;
                        role
                    }
                    None => Role::Skipped { searching: false },
                }
            }
            Position::CollectionItem => match self.node_element(element, base.as_deref())? {
                Some((role, item)) => {
                    if let Some(Role::ParseTypeCollection(collection)) =
                        self.frames.last_mut().map(|f| &mut f.role)
                    {
                        collection.items.push(item);
                    }
                    role
                }
                None => Role::Skipped { searching: false },
            },
            Position::InsideEmptyProperty => {
                self.violation(format!(
                    "<{}> is inside a property element that already names its object",
                    element.name.raw
                ))?;
                Role::Skipped { searching: false }
            }
        };

        self.frames.push(Frame {
            base,
            language,
            role,
        });
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        match self.frames.last_mut().map(|f| &mut f.role) {
            Some(Role::LiteralProperty(property)) => {
                if property.nodes == 0 || text.trim().is_empty() {
                    property.text.push_str(text);
                    return Ok(());
                }
                let message = format!("property {} mixes a node element with text", property.predicate);
                self.violation(message)
            }
            Some(Role::ParseTypeLiteral(literal)) => literal.text(text),
            None | Some(Role::Skipped { .. }) => Ok(()),
            Some(_) if text.trim().is_empty() => Ok(()),
            Some(_) => self.violation(format!("unexpected text {:?}", text.trim())),
        }
    }

    fn end_element(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        if let Some(Frame {
            role: Role::ParseTypeLiteral(literal),
            ..
        }) = self.frames.last_mut()
        {
            if !literal.open.is_empty() {
                return literal.end();
            }
        }

        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => return Ok(()),
        };
        match frame.role {
            Role::LiteralProperty(property) => {
                self.finish_property(property, frame.base.as_deref(), frame.language)
            }
            Role::ParseTypeLiteral(literal) => {
                let (triple, reify) = literal.finish()?;
                self.emit_with_reification(triple, reify)
            }
            Role::ParseTypeCollection(collection) => self.finish_collection(collection),
            _ => Ok(()),
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_language_tag(tag: &str) -> bool {
    let mut subtags = tag.split('-');
    let primary = subtags.next().unwrap_or("");
    (1..=8).contains(&primary.len())
        && primary.bytes().all(|b| b.is_ascii_alphabetic())
        && subtags.all(|s| (1..=8).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphanumeric()))
}

fn absolute(iri: &NamedNode, role: &str) -> Result<()> {
    if uri::has_scheme(iri.as_str()) {
        Ok(())
    } else {
        Err(RdfXmlError::structure(format!(
            "{} {} is not an absolute IRI",
            role, iri
        )))
    }
}

// Term kinds are guaranteed by the types; what is left to check is
// that IRIs are absolute and language tags well formed.
fn validate(triple: &Triple) -> Result<()> {
    if let Subject::NamedNode(nn) = &triple.subject {
        absolute(nn, "subject")?;
    }
    absolute(&triple.predicate, "predicate")?;
    match &triple.object {
        Term::NamedNode(nn) => absolute(nn, "object"),
        Term::BlankNode(_) => Ok(()),
        Term::Literal(Literal::LanguageTaggedString { language, .. }) => {
            if is_language_tag(language) {
                Ok(())
            } else {
                Err(RdfXmlError::structure(format!(
                    "'{}' is not a valid language tag",
                    language
                )))
            }
        }
        Term::Literal(Literal::Typed { datatype, .. }) => absolute(datatype, "datatype"),
        Term::Literal(Literal::Simple { .. }) => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::UriResolutionError;
    use crate::vocab::xsd;
    use pretty_assertions::assert_eq;

    const HEAD: &str = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/">"#;

    fn doc(body: &str) -> String {
        format!("{}{}</rdf:RDF>", HEAD, body)
    }

    fn parse(xml: &str) -> Graph {
        RdfXmlParser::default().parse_str(xml).unwrap().graph
    }

    fn ex(local: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{}", local))
    }

    fn iri(value: &str) -> NamedNode {
        NamedNode::new(value)
    }

    fn object_of(graph: &Graph, predicate: &NamedNode) -> Term {
        graph
            .iter()
            .find(|t| &t.predicate == predicate)
            .map(|t| t.object.clone())
            .unwrap()
    }

    #[test]
    fn single_triple() {
        let graph = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/"><rdf:Description rdf:about="http://example.org/subject"><ex:predicate>Object</ex:predicate></rdf:Description></rdf:RDF>"#,
        );
        assert_eq!(
            graph.triples(),
            &[Triple::new(ex("subject"), ex("predicate"), Literal::simple("Object"))]
        );
    }

    #[test]
    fn typed_node() {
        let graph = parse(&doc(
            r#"<ex:Person rdf:about="http://example.org/person/1"><ex:name>John Doe</ex:name></ex:Person>"#,
        ));
        assert_eq!(graph.len(), 2);
        assert!(graph.contains(&Triple::new(ex("person/1"), iri(rdf::TYPE), ex("Person"))));
        assert!(graph.contains(&Triple::new(
            ex("person/1"),
            ex("name"),
            Literal::simple("John Doe")
        )));
    }

    #[test]
    fn collection() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:list rdf:parseType="Collection">
                   <rdf:Description rdf:about="http://example.org/a"/>
                   <rdf:Description rdf:about="http://example.org/b"/>
                   <rdf:Description rdf:about="http://example.org/c"/>
                 </ex:list>
               </rdf:Description>"#,
        ));
        assert_eq!(graph.len(), 7);

        let mut cell = object_of(&graph, &ex("list"));
        for item in ["a", "b", "c"] {
            let subject = cell.as_subject().unwrap();
            let first = graph.about(&subject).find(|t| t.is_collection_first()).unwrap();
            assert_eq!(first.object, Term::NamedNode(ex(item)));
            let rest = graph.about(&subject).find(|t| t.is_collection_rest()).unwrap();
            cell = rest.object.clone();
        }
        assert_eq!(cell, Term::NamedNode(iri(rdf::NIL)));
    }

    #[test]
    fn empty_collection() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:list rdf:parseType="Collection"/></rdf:Description>"#,
        ));
        assert_eq!(
            graph.triples(),
            &[Triple::new(ex("s"), ex("list"), iri(rdf::NIL))]
        );
    }

    #[test]
    fn container() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:p><rdf:Seq><rdf:li>a</rdf:li><rdf:li>b</rdf:li></rdf:Seq></ex:p>
               </rdf:Description>"#,
        ));
        assert_eq!(graph.len(), 4);
        let seq = object_of(&graph, &ex("p")).as_subject().unwrap();
        assert!(graph.contains(&Triple::new(seq.clone(), iri(rdf::TYPE), iri(rdf::SEQ))));
        assert!(graph.contains(&Triple::new(seq.clone(), iri(&rdf::membership(1)), Literal::simple("a"))));
        assert!(graph.contains(&Triple::new(seq, iri(&rdf::membership(2)), Literal::simple("b"))));
    }

    #[test]
    fn explicit_membership_advances_li() {
        let graph = parse(&doc(
            r#"<rdf:Bag rdf:about="http://example.org/bag">
                 <rdf:li>a</rdf:li><rdf:_3>c</rdf:_3><rdf:li>d</rdf:li>
               </rdf:Bag>"#,
        ));
        let indices: Vec<u64> = graph.iter().filter_map(|t| t.membership_index()).collect();
        assert_eq!(indices, vec![1, 3, 4]);
    }

    #[test]
    fn node_ids_are_stable() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:nodeID="x"><ex:p>1</ex:p></rdf:Description>
               <rdf:Description rdf:nodeID="x"><ex:q>2</ex:q></rdf:Description>
               <rdf:Description rdf:about="http://example.org/s"><ex:r rdf:nodeID="x"/></rdf:Description>"#,
        ));
        let subjects: HashSet<Term> = graph
            .iter()
            .filter(|t| t.predicate != ex("r"))
            .map(|t| t.subject.clone().into())
            .collect();
        assert_eq!(subjects.len(), 1);
        assert!(subjects.contains(&object_of(&graph, &ex("r"))));
    }

    #[test]
    fn separate_parses_do_not_share_blank_nodes() {
        let xml = doc(r#"<rdf:Description rdf:nodeID="x"><ex:p>1</ex:p></rdf:Description>"#);
        let first = parse(&xml);
        let second = parse(&xml);
        assert_ne!(first.triples()[0].subject, second.triples()[0].subject);
        assert!(first.is_isomorphic(&second));
    }

    #[test]
    fn unknown_parse_type() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:p rdf:parseType="Bogus"><ex:q>v</ex:q></ex:p>
               </rdf:Description>"#,
        );
        match RdfXmlParser::new(ParserConfig::strict()).parse_str(&xml) {
            Err(RdfXmlError::Structure(message)) => assert!(message.contains("Bogus")),
            other => panic!("expected a structure error, got {:?}", other),
        }

        let parsed = RdfXmlParser::new(ParserConfig::lenient()).parse_str(&xml).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.graph.len(), 2);
        let nested = object_of(&parsed.graph, &ex("p")).as_subject().unwrap();
        assert!(parsed.graph.contains(&Triple::new(nested, ex("q"), Literal::simple("v"))));
    }

    #[test]
    fn parse_type_resource() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:p rdf:parseType="Resource"><ex:q>v</ex:q></ex:p>
               </rdf:Description>"#,
        ));
        assert_eq!(graph.len(), 2);
        assert!(matches!(object_of(&graph, &ex("p")), Term::BlankNode(_)));
    }

    #[test]
    fn parse_type_literal() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:p rdf:parseType="Literal"><b class="x">bold</b> &amp; text</ex:p></rdf:Description>"#,
        ));
        assert_eq!(
            object_of(&graph, &ex("p")),
            Term::Literal(Literal::typed(
                r#"<b class="x">bold</b> &amp; text"#,
                iri(rdf::XML_LITERAL)
            ))
        );
    }

    #[test]
    fn parse_type_literal_keeps_quotes() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:p rdf:parseType="Literal">it's "q"</ex:p></rdf:Description>"#,
        ));
        assert_eq!(
            object_of(&graph, &ex("p")),
            Term::Literal(Literal::typed(r#"it's "q""#, iri(rdf::XML_LITERAL)))
        );
    }

    #[test]
    fn stray_text_in_node_element() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s">stray<ex:p>v</ex:p></rdf:Description>"#,
        );
        match RdfXmlParser::new(ParserConfig::strict()).parse_str(&xml) {
            Err(RdfXmlError::Structure(message)) => assert!(message.contains("stray")),
            other => panic!("expected a structure error, got {:?}", other),
        }

        let parsed = RdfXmlParser::new(ParserConfig::lenient()).parse_str(&xml).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(
            parsed.graph.triples(),
            &[Triple::new(ex("s"), ex("p"), Literal::simple("v"))]
        );
    }

    #[test]
    fn unqualified_attribute() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s" about="x"><ex:p>v</ex:p></rdf:Description>"#,
        );
        assert!(matches!(
            RdfXmlParser::new(ParserConfig::strict()).parse_str(&xml),
            Err(RdfXmlError::Structure(_))
        ));

        let parsed = RdfXmlParser::new(ParserConfig::lenient()).parse_str(&xml).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.graph.len(), 1);
    }

    #[test]
    fn alt_keeps_document_order() {
        let graph = parse(&doc(
            r#"<rdf:Alt rdf:about="http://example.org/alt">
                 <rdf:li>second-best</rdf:li><rdf:li>fallback</rdf:li>
               </rdf:Alt>"#,
        ));
        assert!(graph.contains(&Triple::new(ex("alt"), iri(rdf::TYPE), iri(rdf::ALT))));
        let members: Vec<(u64, Term)> = graph
            .iter()
            .filter_map(|t| t.membership_index().map(|i| (i, t.object.clone())))
            .collect();
        assert_eq!(
            members,
            vec![
                (1, Literal::simple("second-best").into()),
                (2, Literal::simple("fallback").into()),
            ]
        );
    }

    #[test]
    fn languages_and_datatypes() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s" xml:lang="en">
                 <ex:a>hello</ex:a>
                 <ex:b xml:lang="">plain</ex:b>
                 <ex:c xml:lang="fr">bonjour</ex:c>
                 <ex:d rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">1</ex:d>
                 <ex:e rdf:datatype="http://www.w3.org/2001/XMLSchema#string">s</ex:e>
               </rdf:Description>"#,
        ));
        assert_eq!(object_of(&graph, &ex("a")), Term::Literal(Literal::language_tagged("hello", "en")));
        assert_eq!(object_of(&graph, &ex("b")), Term::Literal(Literal::simple("plain")));
        assert_eq!(object_of(&graph, &ex("c")), Term::Literal(Literal::language_tagged("bonjour", "fr")));
        assert_eq!(
            object_of(&graph, &ex("d")),
            Term::Literal(Literal::typed("1", NamedNode::new(format!("{}integer", xsd::NS))))
        );
        assert_eq!(object_of(&graph, &ex("e")), Term::Literal(Literal::simple("s")));
    }

    #[test]
    fn whitespace_normalization() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:p>  two
                 words  </ex:p></rdf:Description>"#,
        );
        let parser = RdfXmlParser::new(ParserConfig::strict().normalize_whitespace(true));
        let graph = parser.parse_str(&xml).unwrap().graph;
        assert_eq!(object_of(&graph, &ex("p")), Term::Literal(Literal::simple("two words")));

        let graph = parse(&xml);
        assert!(matches!(object_of(&graph, &ex("p")), Term::Literal(l) if l.value().starts_with("  two\n")));
    }

    #[test]
    fn property_attributes() {
        let graph = parse(&doc(
            r#"<rdf:Description rdf:about="http://example.org/s" ex:name="n" rdf:type="http://example.org/C">
                 <ex:knows ex:name="other"/>
                 <ex:link rdf:resource="http://example.org/o" ex:label="o"/>
               </rdf:Description>"#,
        ));
        assert_eq!(graph.len(), 6);
        assert!(graph.contains(&Triple::new(ex("s"), ex("name"), Literal::simple("n"))));
        assert!(graph.contains(&Triple::new(ex("s"), iri(rdf::TYPE), ex("C"))));
        let other = object_of(&graph, &ex("knows")).as_subject().unwrap();
        assert!(graph.contains(&Triple::new(other, ex("name"), Literal::simple("other"))));
        assert!(graph.contains(&Triple::new(ex("o"), ex("label"), Literal::simple("o"))));
    }

    #[test]
    fn xml_base() {
        let graph = parse(
            r##"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/"
                        xml:base="http://example.org/base/">
                 <rdf:Description rdf:about="thing"><ex:p rdf:resource="other"/></rdf:Description>
                 <rdf:Description rdf:ID="me" xml:base="http://other.org/doc"><ex:p rdf:resource="#x"/></rdf:Description>
               </rdf:RDF>"##,
        );
        assert!(graph.contains(&Triple::new(ex("base/thing"), ex("p"), ex("base/other"))));
        assert!(graph.contains(&Triple::new(
            NamedNode::new("http://other.org/doc#me"),
            ex("p"),
            NamedNode::new("http://other.org/doc#x")
        )));
    }

    #[test]
    fn reification() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:p rdf:ID="st">v</ex:p></rdf:Description>"#,
        );
        let parser = RdfXmlParser::new(ParserConfig::strict().base("http://example.org/doc"));
        let graph = parser.parse_str(&xml).unwrap().graph;
        let statement = ex("doc#st");
        assert_eq!(graph.len(), 5);
        for (predicate, object) in [
            (rdf::TYPE, Term::NamedNode(iri(rdf::STATEMENT))),
            (rdf::SUBJECT, Term::NamedNode(ex("s"))),
            (rdf::PREDICATE, Term::NamedNode(ex("p"))),
            (rdf::OBJECT, Term::Literal(Literal::simple("v"))),
        ] {
            assert!(graph.contains(&Triple::new(statement.clone(), iri(predicate), object)));
        }
    }

    #[test]
    fn reified_collection() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:p rdf:ID="st" rdf:parseType="Collection">
                   <rdf:Description rdf:about="http://example.org/a"/>
                   <rdf:Description rdf:about="http://example.org/b"/>
                 </ex:p>
               </rdf:Description>"#,
        );
        let parser = RdfXmlParser::new(ParserConfig::strict().base("http://example.org/doc"));
        let graph = parser.parse_str(&xml).unwrap().graph;
        assert_eq!(graph.len(), 9);
        let head = object_of(&graph, &ex("p"));
        assert!(matches!(head, Term::BlankNode(_)));
        let statement = ex("doc#st");
        for (predicate, object) in [
            (rdf::TYPE, Term::NamedNode(iri(rdf::STATEMENT))),
            (rdf::SUBJECT, Term::NamedNode(ex("s"))),
            (rdf::PREDICATE, Term::NamedNode(ex("p"))),
            (rdf::OBJECT, head.clone()),
        ] {
            assert!(graph.contains(&Triple::new(statement.clone(), iri(predicate), object)));
        }
    }

    #[test]
    fn reified_parse_type_resource() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s">
                 <ex:p rdf:ID="st" rdf:parseType="Resource"><ex:q>v</ex:q></ex:p>
               </rdf:Description>"#,
        );
        let parser = RdfXmlParser::new(ParserConfig::strict().base("http://example.org/doc"));
        let graph = parser.parse_str(&xml).unwrap().graph;
        assert_eq!(graph.len(), 6);
        let nested = object_of(&graph, &ex("p"));
        let statement = ex("doc#st");
        assert!(graph.contains(&Triple::new(
            nested.as_subject().unwrap(),
            ex("q"),
            Literal::simple("v")
        )));
        assert!(graph.contains(&Triple::new(statement.clone(), iri(rdf::SUBJECT), ex("s"))));
        assert!(graph.contains(&Triple::new(statement, iri(rdf::OBJECT), nested)));
    }

    #[test]
    fn duplicate_ids() {
        let xml = doc(
            r#"<rdf:Description rdf:ID="a"/><rdf:Description rdf:ID="a"/>"#,
        );
        let strict = RdfXmlParser::new(ParserConfig::strict().base("http://example.org/doc"));
        assert!(matches!(strict.parse_str(&xml), Err(RdfXmlError::Structure(_))));
        let lenient = RdfXmlParser::new(ParserConfig::lenient().base("http://example.org/doc"));
        assert_eq!(lenient.parse_str(&xml).unwrap().warnings.len(), 1);
    }

    #[test]
    fn relative_reference_without_base() {
        let xml = doc(r#"<rdf:Description rdf:about="thing"><ex:p>v</ex:p></rdf:Description>"#);
        assert!(matches!(
            RdfXmlParser::default().parse_str(&xml),
            Err(RdfXmlError::UriResolution(UriResolutionError::BaseUriRequired { .. }))
        ));
    }

    #[test]
    fn root_discovery() {
        let graph = parse(
            r#"<doc xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/s"><ex:p>v</ex:p></rdf:Description>
               </doc>"#,
        );
        assert_eq!(graph.len(), 1);

        let graph = parse(
            r#"<wrapper><meta>ignored</meta><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/">
                 <rdf:Description rdf:about="http://example.org/s"><ex:p>v</ex:p></rdf:Description>
               </rdf:RDF></wrapper>"#,
        );
        assert_eq!(graph.len(), 1);

        let graph = parse(
            r#"<rdf:Description xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/"
                   rdf:about="http://example.org/s"><ex:p>v</ex:p></rdf:Description>"#,
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn missing_root() {
        assert!(matches!(
            RdfXmlParser::default().parse_str("<foo><bar>x</bar></foo>"),
            Err(RdfXmlError::Structure(_))
        ));
        assert!(matches!(
            RdfXmlParser::default().parse_str(""),
            Err(RdfXmlError::Structure(_))
        ));
    }

    #[test]
    fn malformed_xml() {
        assert!(matches!(
            RdfXmlParser::default().parse_str(&format!("{}<rdf:Description>", HEAD)),
            Err(RdfXmlError::XmlSyntax { .. })
        ));
    }

    #[test]
    fn depth_guard() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:p><rdf:Description><ex:q>v</ex:q></rdf:Description></ex:p></rdf:Description>"#,
        );
        let shallow = RdfXmlParser::new(ParserConfig::strict().max_depth(4));
        assert!(matches!(shallow.parse_str(&xml), Err(RdfXmlError::Structure(_))));
        let streamed: Result<Vec<Triple>> = shallow.stream(xml.as_bytes()).collect();
        assert!(matches!(streamed, Err(RdfXmlError::Structure(_))));

        let deep_enough = RdfXmlParser::new(ParserConfig::strict().max_depth(5));
        assert_eq!(deep_enough.parse_str(&xml).unwrap().graph.len(), 2);
    }

    #[test]
    fn output_validation() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:rel="relative/">
            <rdf:Description rdf:about="http://example.org/s"><rel:p>v</rel:p></rdf:Description></rdf:RDF>"#;
        assert!(matches!(
            RdfXmlParser::default().parse_str(xml),
            Err(RdfXmlError::Structure(_))
        ));
        let unchecked = RdfXmlParser::new(ParserConfig::strict().validate_output(false));
        assert_eq!(unchecked.parse_str(xml).unwrap().graph.len(), 1);

        let underscored = doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><ex:p xml:lang="en_US">v</ex:p></rdf:Description>"#,
        );
        match RdfXmlParser::default().parse_str(&underscored) {
            Err(RdfXmlError::Structure(message)) => assert!(message.contains("en_US")),
            other => panic!("expected a structure error, got {:?}", other),
        }
    }

    #[test]
    fn forbidden_names() {
        let xml = doc(
            r#"<rdf:Description rdf:about="http://example.org/s"><rdf:about>v</rdf:about><ex:p>w</ex:p></rdf:Description>"#,
        );
        assert!(matches!(
            RdfXmlParser::default().parse_str(&xml),
            Err(RdfXmlError::Structure(_))
        ));
        let parsed = RdfXmlParser::new(ParserConfig::lenient()).parse_str(&xml).unwrap();
        assert_eq!(parsed.graph.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn stream_matches_tree() {
        let xml = doc(
            r#"<ex:Person rdf:about="http://example.org/p" xml:lang="en">
                 <ex:name>Ann</ex:name>
                 <ex:friends rdf:parseType="Collection">
                   <ex:Person rdf:about="http://example.org/q"/>
                   <rdf:Description><ex:name>anonymous</ex:name></rdf:Description>
                 </ex:friends>
                 <ex:tags><rdf:Bag><rdf:li>a</rdf:li><rdf:li rdf:resource="http://example.org/b"/></rdf:Bag></ex:tags>
                 <ex:bio rdf:parseType="Literal"><em>hi</em></ex:bio>
                 <ex:address rdf:parseType="Resource"><ex:city>Town</ex:city></ex:address>
               </ex:Person>"#,
        );
        let parser = RdfXmlParser::default();
        let tree = parser.parse_str(&xml).unwrap().graph;
        let streamed: Graph = parser
            .stream(xml.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap()
            .into();
        assert_eq!(tree.len(), streamed.len());
        assert!(tree.is_isomorphic(&streamed));
    }

    #[test]
    fn free_function() {
        let graph = parse_str(
            &doc(r#"<rdf:Description rdf:about="s"><ex:p>v</ex:p></rdf:Description>"#),
            Some("http://example.org/"),
        )
        .unwrap();
        assert_eq!(graph.triples()[0].subject, Subject::NamedNode(ex("s")));
    }
}
