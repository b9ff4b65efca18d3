use crate::vocab::{rdf, xsd};
use std::fmt::{self, Formatter, Write};

// We keep our own owned copy of the data model: the parser produces
// terms that outlive the XML buffers they came from, and the
// serializer needs to hash, group and clone them freely. Conversions
// to the borrowed `rio_api` model live in `rio.rs`.

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NamedNode {
    pub iri: String,
}

impl NamedNode {
    pub fn new(iri: impl Into<String>) -> Self {
        NamedNode { iri: iri.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.iri
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

impl AsRef<str> for NamedNode {
    fn as_ref(&self) -> &str {
        &self.iri
    }
}

/// A blank node. The `id` is an opaque identity, only meaningful
/// within the parse or write call that produced it.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BlankNode {
    pub id: String,
}

impl BlankNode {
    pub fn new(id: impl Into<String>) -> Self {
        BlankNode { id: id.into() }
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

impl AsRef<str> for BlankNode {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// A literal. Language tag and datatype are exclusive; a literal
/// with neither has the datatype `xsd:string`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Literal {
    Simple { value: String },
    LanguageTaggedString { value: String, language: String },
    Typed { value: String, datatype: NamedNode },
}

impl Literal {
    pub fn simple(value: impl Into<String>) -> Self {
        Literal::Simple {
            value: value.into(),
        }
    }

    pub fn language_tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Literal::LanguageTaggedString {
            value: value.into(),
            language: language.into(),
        }
    }

    /// Builds a typed literal. `xsd:string` is folded into `Simple`
    /// so that the two spellings of a plain string compare equal.
    pub fn typed(value: impl Into<String>, datatype: NamedNode) -> Self {
        if datatype.iri == xsd::STRING {
            Literal::simple(value)
        } else {
            Literal::Typed {
                value: value.into(),
                datatype,
            }
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Literal::Simple { value }
            | Literal::LanguageTaggedString { value, .. }
            | Literal::Typed { value, .. } => value,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Literal::LanguageTaggedString { language, .. } => Some(language),
            _ => None,
        }
    }

    pub fn datatype(&self) -> &str {
        match self {
            Literal::Simple { .. } => xsd::STRING,
            Literal::LanguageTaggedString { .. } => rdf::LANG_STRING,
            Literal::Typed { datatype, .. } => datatype.as_str(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for c in self.value().chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                c => f.write_char(c)?,
            }
        }
        f.write_char('"')?;
        match self {
            Literal::Simple { .. } => Ok(()),
            Literal::LanguageTaggedString { language, .. } => write!(f, "@{}", language),
            Literal::Typed { datatype, .. } => write!(f, "^^{}", datatype),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Subject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Subject::NamedNode(nn) => nn.fmt(f),
            Subject::BlankNode(bn) => bn.fmt(f),
        }
    }
}

impl From<NamedNode> for Subject {
    fn from(nn: NamedNode) -> Self {
        Subject::NamedNode(nn)
    }
}

impl From<BlankNode> for Subject {
    fn from(bn: BlankNode) -> Self {
        Subject::BlankNode(bn)
    }
}

impl AsRef<str> for Subject {
    fn as_ref(&self) -> &str {
        match self {
            Subject::NamedNode(nn) => nn.as_ref(),
            Subject::BlankNode(bn) => bn.as_ref(),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl Term {
    /// The term as a subject, unless it is a literal.
    pub fn as_subject(&self) -> Option<Subject> {
        match self {
            Term::NamedNode(nn) => Some(nn.clone().into()),
            Term::BlankNode(bn) => Some(bn.clone().into()),
            Term::Literal(_) => None,
        }
    }
}

impl PartialEq<Subject> for Term {
    fn eq(&self, other: &Subject) -> bool {
        match (self, other) {
            (Term::NamedNode(nn), Subject::NamedNode(onn)) => nn == onn,
            (Term::BlankNode(bn), Subject::BlankNode(obn)) => bn == obn,
            _ => false,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(nn) => nn.fmt(f),
            Term::BlankNode(bn) => bn.fmt(f),
            Term::Literal(l) => l.fmt(f),
        }
    }
}

impl From<Subject> for Term {
    fn from(s: Subject) -> Self {
        match s {
            Subject::NamedNode(nn) => Term::NamedNode(nn),
            Subject::BlankNode(bn) => Term::BlankNode(bn),
        }
    }
}

impl From<NamedNode> for Term {
    fn from(nn: NamedNode) -> Self {
        Term::NamedNode(nn)
    }
}

impl From<BlankNode> for Term {
    fn from(bn: BlankNode) -> Self {
        Term::BlankNode(bn)
    }
}

impl From<Literal> for Term {
    fn from(l: Literal) -> Self {
        Term::Literal(l)
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: NamedNode,
    pub object: Term,
}

impl Triple {
    pub fn new(
        subject: impl Into<Subject>,
        predicate: NamedNode,
        object: impl Into<Term>,
    ) -> Triple {
        Triple {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    pub fn is_type(&self) -> bool {
        self.predicate.iri == rdf::TYPE
    }

    pub fn is_collection_first(&self) -> bool {
        self.predicate.iri == rdf::FIRST
    }

    pub fn is_collection_rest(&self) -> bool {
        self.predicate.iri == rdf::REST
    }

    /// `Some(n)` when the predicate is the container membership property `rdf:_n`.
    pub fn membership_index(&self) -> Option<u64> {
        rdf::membership_index(&self.predicate.iri)
    }

    pub fn blank_nodes(&self) -> impl Iterator<Item = &BlankNode> {
        let s = match &self.subject {
            Subject::BlankNode(bn) => Some(bn),
            Subject::NamedNode(_) => None,
        };
        let o = match &self.object {
            Term::BlankNode(bn) => Some(bn),
            _ => None,
        };
        s.into_iter().chain(o)
    }
}

/// N-Triples rendering of the statement.
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
