//! Conversions between our owned model and the borrowed `rio_api`
//! model, so that triples can flow to and from the rio parsers and
//! serializers.

use crate::error::RdfXmlError;
use crate::model::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use rio_api::model as rio;
use std::convert::TryFrom;

impl<'a> From<&'a NamedNode> for rio::NamedNode<'a> {
    fn from(nn: &'a NamedNode) -> Self {
        rio::NamedNode { iri: &nn.iri }
    }
}

impl From<rio::NamedNode<'_>> for NamedNode {
    fn from(nn: rio::NamedNode<'_>) -> Self {
        NamedNode::new(nn.iri)
    }
}

impl<'a> From<&'a BlankNode> for rio::BlankNode<'a> {
    fn from(bn: &'a BlankNode) -> Self {
        rio::BlankNode { id: &bn.id }
    }
}

impl From<rio::BlankNode<'_>> for BlankNode {
    fn from(bn: rio::BlankNode<'_>) -> Self {
        BlankNode::new(bn.id)
    }
}

impl<'a> From<&'a Literal> for rio::Literal<'a> {
    fn from(l: &'a Literal) -> Self {
        match l {
            Literal::Simple { value } => rio::Literal::Simple { value },
            Literal::LanguageTaggedString { value, language } => {
                rio::Literal::LanguageTaggedString { value, language }
            }
            Literal::Typed { value, datatype } => rio::Literal::Typed {
                value,
                datatype: datatype.into(),
            },
        }
    }
}

impl From<rio::Literal<'_>> for Literal {
    fn from(l: rio::Literal<'_>) -> Self {
        match l {
            rio::Literal::Simple { value } => Literal::simple(value),
            rio::Literal::LanguageTaggedString { value, language } => {
                Literal::language_tagged(value, language)
            }
            rio::Literal::Typed { value, datatype } => Literal::typed(value, datatype.into()),
        }
    }
}

impl<'a> From<&'a Subject> for rio::Subject<'a> {
    fn from(s: &'a Subject) -> Self {
        match s {
            Subject::NamedNode(nn) => rio::Subject::NamedNode(nn.into()),
            Subject::BlankNode(bn) => rio::Subject::BlankNode(bn.into()),
        }
    }
}

fn quoted_triple() -> RdfXmlError {
    RdfXmlError::structure("quoted triples cannot be represented in RDF/XML")
}

impl TryFrom<rio::Subject<'_>> for Subject {
    type Error = RdfXmlError;

    fn try_from(s: rio::Subject<'_>) -> Result<Self, Self::Error> {
        match s {
            rio::Subject::NamedNode(nn) => Ok(Subject::NamedNode(nn.into())),
            rio::Subject::BlankNode(bn) => Ok(Subject::BlankNode(bn.into())),
            rio::Subject::Triple(_) => Err(quoted_triple()),
        }
    }
}

impl<'a> From<&'a Term> for rio::Term<'a> {
    fn from(t: &'a Term) -> Self {
        match t {
            Term::NamedNode(nn) => rio::Term::NamedNode(nn.into()),
            Term::BlankNode(bn) => rio::Term::BlankNode(bn.into()),
            Term::Literal(l) => rio::Term::Literal(l.into()),
        }
    }
}

impl TryFrom<rio::Term<'_>> for Term {
    type Error = RdfXmlError;

    fn try_from(t: rio::Term<'_>) -> Result<Self, Self::Error> {
        match t {
            rio::Term::NamedNode(nn) => Ok(Term::NamedNode(nn.into())),
            rio::Term::BlankNode(bn) => Ok(Term::BlankNode(bn.into())),
            rio::Term::Literal(l) => Ok(Term::Literal(l.into())),
            rio::Term::Triple(_) => Err(quoted_triple()),
        }
    }
}

impl<'a> From<&'a Triple> for rio::Triple<'a> {
    fn from(t: &'a Triple) -> Self {
        rio::Triple {
            subject: (&t.subject).into(),
            predicate: (&t.predicate).into(),
            object: (&t.object).into(),
        }
    }
}

impl TryFrom<rio::Triple<'_>> for Triple {
    type Error = RdfXmlError;

    fn try_from(t: rio::Triple<'_>) -> Result<Self, Self::Error> {
        Ok(Triple {
            subject: t.subject.try_into()?,
            predicate: t.predicate.into(),
            object: t.object.try_into()?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vocab::xsd;
    use rio_api::parser::TriplesParser;
    use rio_turtle::{NTriplesParser, TurtleError};

    #[test]
    fn from_ntriples() {
        let nt = r#"<http://example.org/s> <http://example.org/p> "v"@en .
_:x <http://example.org/p> "1"^^<http://www.w3.org/2001/XMLSchema#integer> .
_:x <http://example.org/q> "plain"^^<http://www.w3.org/2001/XMLSchema#string> .
"#;
        let mut triples: Vec<Triple> = vec![];
        NTriplesParser::new(nt.as_bytes())
            .parse_all(&mut |t| {
                triples.push(Triple::try_from(t).unwrap());
                Ok(()) as Result<(), TurtleError>
            })
            .unwrap();

        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0].object, Term::Literal(Literal::language_tagged("v", "en")));
        assert_eq!(triples[1].subject, Subject::BlankNode(BlankNode::new("x")));
        assert_eq!(triples[2].object, Term::Literal(Literal::simple("plain")));
        assert_eq!(
            Literal::typed("1", NamedNode::new(xsd::STRING)).datatype(),
            xsd::STRING
        );
    }

    #[test]
    fn to_rio_and_back() {
        let t = Triple::new(
            BlankNode::new("b"),
            NamedNode::new("http://example.org/p"),
            Literal::typed("1", NamedNode::new("http://www.w3.org/2001/XMLSchema#integer")),
        );
        let r: rio::Triple = (&t).into();
        assert_eq!(r.predicate.iri, "http://example.org/p");
        assert!(matches!(r.subject, rio::Subject::BlankNode(rio::BlankNode { id: "b" })));
        assert_eq!(Triple::try_from(r).unwrap(), t);
    }
}
