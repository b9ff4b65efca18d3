//! Writes triples as RDF/XML.
//!
//! Triples are first normalized into a [`Chunk`]: grouped by subject in
//! encounter order, with well-formed lists, nestable containers and
//! foldable reifications picked out. [`RdfXmlFormatter`] then walks the
//! chunk and writes one node element per remaining subject.

use crate::bnode::BlankNodeLabeler;
use crate::config::WriterConfig;
use crate::error::{map_err, RdfXmlError, Result};
use crate::model::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use crate::namespace::{build_used_namespaces, is_nc_name, to_qname};
use crate::uri;
use crate::vocab::rdf;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::{HashMap, HashSet};
use std::io::Write;

// A set of triples with a shared subject
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct SubjectGroup {
    subject: Subject,
    triples: Vec<Triple>,
}

impl SubjectGroup {
    /// The only `rdf:type` of the subject, if it has exactly one.
    fn find_typed(&self) -> Option<&Triple> {
        let mut types = self
            .triples
            .iter()
            .filter(|t| t.is_type() && matches!(t.object, Term::NamedNode(_)));
        match (types.next(), types.next()) {
            (Some(t), None) => Some(t),
            _ => None,
        }
    }

    fn has_type(&self, iri: &str) -> bool {
        matches!(self.find_typed(), Some(Triple { object: Term::NamedNode(nn), .. }) if nn.iri == iri)
    }

    fn is_container(&self) -> bool {
        matches!(self.find_typed(), Some(Triple { object: Term::NamedNode(nn), .. }) if rdf::is_container(&nn.iri))
    }

    fn single(&self, predicate: &str) -> Option<&Term> {
        let mut found = self.triples.iter().filter(|t| t.predicate.iri == predicate);
        match (found.next(), found.next()) {
            (Some(t), None) => Some(&t.object),
            _ => None,
        }
    }
}

// The items of a list, to be rendered with rdf:parseType="Collection"
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TripleSeq {
    items: Vec<Subject>,
}

/// A graph prepared for writing.
#[derive(Debug)]
pub(crate) struct Chunk {
    // deduplicated, without the triples folded into rdf:ID attributes
    triples: Vec<Triple>,
    groups: IndexMap<Subject, SubjectGroup>,
    // list head -> items
    seqs: HashMap<BlankNode, TripleSeq>,
    // list nodes, written only through their head
    cells: HashSet<BlankNode>,
    // containers written inline inside the one property that references them
    nested: HashSet<BlankNode>,
    // base triple -> rdf:ID of the statement that reifies it
    reified: HashMap<Triple, String>,
}

impl Chunk {
    pub(crate) fn normalize(triples: &[Triple], base: Option<&str>) -> Chunk {
        let triples: Vec<Triple> = triples.iter().cloned().collect::<IndexSet<_>>().into_iter().collect();

        let mut groups: IndexMap<Subject, SubjectGroup> = IndexMap::new();
        // a blank node object referenced exactly once maps to its referrer
        let mut references: HashMap<&BlankNode, (usize, &Triple)> = HashMap::new();
        for t in &triples {
            groups
                .entry(t.subject.clone())
                .or_insert_with(|| SubjectGroup {
                    subject: t.subject.clone(),
                    triples: vec![],
                })
                .triples
                .push(t.clone());
            if let Term::BlankNode(bn) = &t.object {
                references.entry(bn).or_insert((0, t)).0 += 1;
            }
        }
        let referrer = |bn: &BlankNode| match references.get(bn) {
            Some((1, t)) => Some(*t),
            _ => None,
        };

        let (seqs, cells) = find_lists(&groups, &referrer);

        let mut nested = HashSet::new();
        for group in groups.values() {
            if let Subject::BlankNode(bn) = &group.subject {
                if !group.is_container() {
                    continue;
                }
                // a list item is written by reference, so it can't be nested
                let in_list = |t: &Triple| {
                    t.is_collection_first()
                        && matches!(&t.subject, Subject::BlankNode(cell) if cells.contains(cell))
                };
                if matches!(referrer(bn), Some(t) if !in_list(t)) {
                    nested.insert(bn.clone());
                }
            }
        }

        let (reified, suppressed) = match base {
            Some(base) => find_reifications(&triples, &groups, &cells, base),
            None => (HashMap::new(), HashSet::new()),
        };
        for group in groups.values_mut() {
            group.triples.retain(|t| !suppressed.contains(t));
        }
        groups.retain(|_, group| !group.triples.is_empty());

        debug!(
            "normalized {} triples: {} subjects, {} lists, {} nested containers, {} reifications",
            triples.len(),
            groups.len(),
            seqs.len(),
            nested.len(),
            reified.len()
        );
        Chunk {
            triples: triples.into_iter().filter(|t| !suppressed.contains(t)).collect(),
            groups,
            seqs,
            cells,
            nested,
            reified,
        }
    }

    fn group(&self, subject: &Subject) -> Option<&SubjectGroup> {
        self.groups.get(subject)
    }
}

// Well formed lists: chains of blank nodes carrying exactly one
// rdf:first and one rdf:rest, each node referenced once, ending in
// rdf:nil, with a head referenced once from outside any list.
fn find_lists<'a>(
    groups: &IndexMap<Subject, SubjectGroup>,
    referrer: &impl Fn(&BlankNode) -> Option<&'a Triple>,
) -> (HashMap<BlankNode, TripleSeq>, HashSet<BlankNode>) {
    let mut seqs = HashMap::new();
    let mut cells = HashSet::new();

    'heads: for group in groups.values() {
        let head = match &group.subject {
            Subject::BlankNode(bn) => bn,
            Subject::NamedNode(_) => continue,
        };
        match referrer(head) {
            Some(t) if !t.is_collection_first() && !t.is_collection_rest() => {}
            _ => continue,
        }

        let mut items = vec![];
        let mut chain = vec![];
        let mut cell = head.clone();
        loop {
            if chain.contains(&cell) || cells.contains(&cell) {
                continue 'heads;
            }
            let node = match groups.get(&Subject::BlankNode(cell.clone())) {
                Some(node) if node.triples.len() == 2 => node,
                _ => continue 'heads,
            };
            let item = match node.single(rdf::FIRST).and_then(Term::as_subject) {
                Some(item) => item,
                None => continue 'heads,
            };
            items.push(item);
            chain.push(cell.clone());
            match node.single(rdf::REST) {
                Some(Term::NamedNode(nn)) if nn.iri == rdf::NIL => break,
                Some(Term::BlankNode(next)) if referrer(next).is_some() => cell = next.clone(),
                _ => continue 'heads,
            }
        }
        cells.extend(chain);
        seqs.insert(head.clone(), TripleSeq { items });
    }
    (seqs, cells)
}

// Statements `{base}#{id}` describing exactly one triple of the graph
// fold into an rdf:ID on that triple's property element.
fn find_reifications(
    triples: &[Triple],
    groups: &IndexMap<Subject, SubjectGroup>,
    cells: &HashSet<BlankNode>,
    base: &str,
) -> (HashMap<Triple, String>, HashSet<Triple>) {
    let present: HashSet<&Triple> = triples.iter().collect();
    let document = format!("{}#", uri::strip_fragment(base));
    let mut reified = HashMap::new();
    let mut suppressed = HashSet::new();

    for group in groups.values() {
        let statement = match &group.subject {
            Subject::NamedNode(nn) => nn,
            Subject::BlankNode(_) => continue,
        };
        let id = match statement.iri.strip_prefix(&document) {
            Some(id) if is_nc_name(id) => id,
            _ => continue,
        };
        if !group.has_type(rdf::STATEMENT) {
            continue;
        }
        let subject = group.single(rdf::SUBJECT).and_then(Term::as_subject);
        let predicate = match group.single(rdf::PREDICATE) {
            Some(Term::NamedNode(nn)) => Some(nn.clone()),
            _ => None,
        };
        let object = group.single(rdf::OBJECT).cloned();
        let base_triple = match (subject, predicate, object) {
            (Some(s), Some(p), Some(o)) => Triple::new(s, p, o),
            _ => continue,
        };

        if base_triple.subject == group.subject
            || !present.contains(&base_triple)
            || reified.contains_key(&base_triple)
        {
            continue;
        }
        // the base triple has to be written as a property element
        match groups.get(&base_triple.subject) {
            Some(owner)
                if !owner.has_type(rdf::STATEMENT)
                    && owner.find_typed() != Some(&base_triple) => {}
            _ => continue,
        }
        if let Subject::BlankNode(bn) = &base_triple.subject {
            if cells.contains(bn) {
                continue;
            }
        }

        for t in &group.triples {
            let part = [rdf::SUBJECT, rdf::PREDICATE, rdf::OBJECT].contains(&t.predicate.as_str());
            let statement_type = t.is_type() && matches!(&t.object, Term::NamedNode(nn) if nn.iri == rdf::STATEMENT);
            if part || statement_type {
                suppressed.insert(t.clone());
            }
        }
        debug!("folding {} into rdf:ID=\"{}\"", statement, id);
        reified.insert(base_triple, id.to_string());
    }
    (reified, suppressed)
}

/// Writes one chunk as a complete RDF/XML document.
pub(crate) struct RdfXmlFormatter<'a, W: Write> {
    writer: Writer<W>,
    namespaces: IndexMap<String, String>,
    base: Option<&'a str>,
    labeler: BlankNodeLabeler,
    open_tag_stack: Vec<String>,
    last_open_tag: Option<BytesStart<'static>>,
    emitted: HashSet<Subject>,
}

impl<'a, W: Write> RdfXmlFormatter<'a, W> {
    pub(crate) fn new(
        write: W,
        config: &'a WriterConfig,
        namespaces: IndexMap<String, String>,
    ) -> Result<Self> {
        let writer = if config.indent > 0 {
            Writer::new_with_indent(write, b' ', config.indent)
        } else {
            Writer::new(write)
        };
        let mut formatter = RdfXmlFormatter {
            writer,
            namespaces,
            base: config.base.as_deref(),
            labeler: BlankNodeLabeler::new(),
            open_tag_stack: vec![],
            last_open_tag: None,
            emitted: HashSet::new(),
        };
        let declared_base = if config.emit_base { formatter.base } else { None };
        formatter.write_declaration(declared_base)?;
        Ok(formatter)
    }

    fn write_declaration(&mut self, base: Option<&str>) -> Result<()> {
        self.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut rdf_open = BytesStart::new("rdf:RDF");
        self.write_prefix(&mut rdf_open);
        if let Some(base) = base {
            rdf_open.push_attribute(("xml:base", base));
        }
        self.write_start(rdf_open)
    }

    fn write_prefix(&self, rdf_open: &mut BytesStart<'_>) {
        for (prefix, ns) in &self.namespaces {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            rdf_open.push_attribute((key.as_str(), ns.as_str()));
        }
    }

    fn write_complete_open(&mut self) -> Result<()> {
        if let Some(start) = self.last_open_tag.take() {
            self.writer.write_event(Event::Start(start)).map_err(map_err)?;
        }
        Ok(())
    }

    fn write_event(&mut self, event: Event<'_>) -> Result<()> {
        self.write_complete_open()?;
        self.writer.write_event(event).map_err(map_err)
    }

    // Held back until the next event: if that is the matching close,
    // the element is written empty.
    fn write_start(&mut self, start: BytesStart<'_>) -> Result<()> {
        self.write_complete_open()?;
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        self.open_tag_stack.push(name);
        self.last_open_tag = Some(start.into_owned());
        Ok(())
    }

    fn write_close(&mut self) -> Result<()> {
        let close = self
            .open_tag_stack
            .pop()
            .ok_or_else(|| RdfXmlError::serialization("close when no element is open"))?;
        if let Some(empty) = self.last_open_tag.take() {
            self.write_event(Event::Empty(empty))
        } else {
            self.write_event(Event::End(BytesEnd::new(close)))
        }
    }

    // rdf:about and rdf:resource values
    fn reference(&self, iri: &str) -> String {
        self.base
            .and_then(|base| uri::relativize(iri, base))
            .unwrap_or_else(|| iri.to_string())
    }

    fn push_identity(&mut self, start: &mut BytesStart<'_>, subject: &Subject) {
        match subject {
            Subject::NamedNode(nn) => {
                let about = self.reference(&nn.iri);
                start.push_attribute(("rdf:about", about.as_str()));
            }
            Subject::BlankNode(bn) => {
                start.push_attribute(("rdf:nodeID", self.labeler.label(bn)));
            }
        }
    }

    fn property_name(&self, predicate: &NamedNode) -> Result<String> {
        if predicate.iri == rdf::LI || rdf::FORBIDDEN_PROPERTY_ELEMENTS.contains(&predicate.as_str()) {
            return Err(RdfXmlError::serialization(format!(
                "{} cannot be written as a property element",
                predicate
            )));
        }
        to_qname(&predicate.iri, &self.namespaces).ok_or_else(|| {
            RdfXmlError::serialization(format!("no QName can be formed for predicate {}", predicate))
        })
    }

    // The element name of a node: the QName of its only type when there
    // is one, rdf:Description otherwise.
    fn node_name<'g>(&self, group: &'g SubjectGroup) -> (String, Option<&'g Triple>) {
        if let Some(typed) = group.find_typed() {
            if let Term::NamedNode(class) = &typed.object {
                let usable = class.iri != rdf::DESCRIPTION
                    && !rdf::FORBIDDEN_NODE_ELEMENTS.contains(&class.as_str());
                if let Some(qname) = to_qname(&class.iri, &self.namespaces).filter(|_| usable) {
                    return (qname, Some(typed));
                }
            }
        }
        ("rdf:Description".to_string(), None)
    }

    fn format_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        for group in chunk.groups.values() {
            if let Subject::BlankNode(bn) = &group.subject {
                if chunk.cells.contains(bn) || chunk.nested.contains(bn) {
                    continue;
                }
            }
            if !self.emitted.contains(&group.subject) {
                self.format_multi(group, chunk, false)?;
            }
        }

        // nested containers only reachable through each other
        for group in chunk.groups.values() {
            if let Subject::BlankNode(bn) = &group.subject {
                if chunk.nested.contains(bn) && !self.emitted.contains(&group.subject) {
                    debug!("writing container {} at the top level", bn);
                    self.format_multi(group, chunk, false)?;
                }
            }
        }
        Ok(())
    }

    fn format_multi(&mut self, group: &SubjectGroup, chunk: &Chunk, nested: bool) -> Result<()> {
        self.emitted.insert(group.subject.clone());

        let (name, typed) = self.node_name(group);
        let mut description_open = BytesStart::new(name);
        if !nested {
            self.push_identity(&mut description_open, &group.subject);
        }
        self.write_start(description_open)?;

        let mut members: Vec<(u64, &Triple)> = vec![];
        for triple in &group.triples {
            if Some(triple) == typed {
                continue;
            }
            match triple.membership_index() {
                Some(index) if group.is_container() => members.push((index, triple)),
                _ => {
                    let name = self.property_name(&triple.predicate)?;
                    self.format_property_arc(triple, name, chunk)?;
                }
            }
        }

        // Rewrite: 2.15 Container Membership Property Elements
        members.sort_by_key(|(index, _)| *index);
        let contiguous = members
            .iter()
            .enumerate()
            .all(|(i, (index, _))| *index == i as u64 + 1);
        for (_, triple) in members {
            let name = if contiguous {
                "rdf:li".to_string()
            } else {
                self.property_name(&triple.predicate)?
            };
            self.format_property_arc(triple, name, chunk)?;
        }

        self.write_close()
    }

    fn format_property_arc(&mut self, triple: &Triple, name: String, chunk: &Chunk) -> Result<()> {
        let mut property_open = BytesStart::new(name);
        if let Some(id) = chunk.reified.get(triple) {
            property_open.push_attribute(("rdf:ID", id.as_str()));
        }
        self.format_object(property_open, &triple.object, chunk)?;
        self.write_close()
    }

    fn format_object(&mut self, mut property_open: BytesStart<'_>, object: &Term, chunk: &Chunk) -> Result<()> {
        match object {
            Term::NamedNode(nn) => {
                let resource = self.reference(&nn.iri);
                property_open.push_attribute(("rdf:resource", resource.as_str()));
                self.write_start(property_open)
            }
            Term::BlankNode(bn) => {
                if let Some(seq) = chunk.seqs.get(bn) {
                    // Rewrite: 2.16 Collections
                    property_open.push_attribute(("rdf:parseType", "Collection"));
                    self.write_start(property_open)?;
                    return self.format_seq(seq);
                }
                let subject = Subject::BlankNode(bn.clone());
                match chunk.group(&subject) {
                    Some(group) if chunk.nested.contains(bn) && !self.emitted.contains(&subject) => {
                        self.write_start(property_open)?;
                        self.format_multi(group, chunk, true)
                    }
                    _ => {
                        property_open.push_attribute(("rdf:nodeID", self.labeler.label(bn)));
                        self.write_start(property_open)
                    }
                }
            }
            Term::Literal(l) => {
                match l {
                    Literal::Simple { .. } => {}
                    Literal::LanguageTaggedString { language, .. } => {
                        property_open.push_attribute(("xml:lang", language.as_str()));
                    }
                    Literal::Typed { datatype, .. } => {
                        property_open.push_attribute(("rdf:datatype", datatype.as_str()));
                    }
                }
                self.write_start(property_open)?;
                if !l.value().is_empty() {
                    self.write_event(Event::Text(BytesText::new(l.value())))?;
                }
                Ok(())
            }
        }
    }

    fn format_seq(&mut self, seq: &TripleSeq) -> Result<()> {
        for item in &seq.items {
            let mut item_open = BytesStart::new("rdf:Description");
            self.push_identity(&mut item_open, item);
            self.write_start(item_open)?;
            self.write_close()?;
        }
        Ok(())
    }

    /// Closes everything still open and returns the underlying `Write`.
    pub(crate) fn finish(mut self) -> Result<W> {
        while !self.open_tag_stack.is_empty() {
            self.write_close()?;
        }
        Ok(self.writer.into_inner())
    }
}

/// Serializes graphs with one [`WriterConfig`].
#[derive(Clone, Debug, Default)]
pub struct RdfXmlWriter {
    config: WriterConfig,
}

impl RdfXmlWriter {
    pub fn new(config: WriterConfig) -> Self {
        RdfXmlWriter { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn write(&self, triples: &[Triple]) -> Result<String> {
        let sink = self.write_to(Vec::new(), triples)?;
        String::from_utf8(sink).map_err(|e| RdfXmlError::serialization(e.to_string()))
    }

    /// Writes the document to `write` and hands it back.
    pub fn write_to<W: Write>(&self, write: W, triples: &[Triple]) -> Result<W> {
        let chunk = Chunk::normalize(triples, self.config.base.as_deref());
        let namespaces = build_used_namespaces(&chunk.triples, &self.config.prefixes);
        let mut formatter = RdfXmlFormatter::new(write, &self.config, namespaces)?;
        formatter.format_chunk(&chunk)?;
        formatter.finish()
    }
}

/// Writes `triples` pretty printed, relative to `base` when given.
pub fn write(
    triples: &[Triple],
    base: Option<&str>,
    custom_prefixes: &IndexMap<String, String>,
) -> Result<String> {
    let mut config = WriterConfig::all().prefix(custom_prefixes.clone());
    if let Some(base) = base {
        config = config.base(base);
    }
    RdfXmlWriter::new(config).write(triples)
}
