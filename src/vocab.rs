//! IRIs of the vocabularies the RDF/XML grammar reserves.

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#RDF";
    pub const DESCRIPTION: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Description";
    pub const ABOUT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#about";
    pub const ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#ID";
    pub const NODE_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nodeID";
    pub const RESOURCE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#resource";
    pub const DATATYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#datatype";
    pub const PARSE_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#parseType";
    pub const LI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#li";
    pub const ABOUT_EACH: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#aboutEach";
    pub const ABOUT_EACH_PREFIX: &str =
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#aboutEachPrefix";
    pub const BAG_ID: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#bagID";

    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const STATEMENT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement";
    pub const SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";
    pub const PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";
    pub const OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";
    pub const BAG: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Bag";
    pub const SEQ: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Seq";
    pub const ALT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Alt";
    pub const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// Names that may never be used as a node element.
    pub const FORBIDDEN_NODE_ELEMENTS: [&str; 11] = [
        RDF,
        ID,
        ABOUT,
        BAG_ID,
        PARSE_TYPE,
        RESOURCE,
        NODE_ID,
        LI,
        ABOUT_EACH,
        ABOUT_EACH_PREFIX,
        DATATYPE,
    ];

    /// Names that may never be used as a property element.
    pub const FORBIDDEN_PROPERTY_ELEMENTS: [&str; 11] = [
        DESCRIPTION,
        RDF,
        ID,
        ABOUT,
        BAG_ID,
        PARSE_TYPE,
        RESOURCE,
        NODE_ID,
        ABOUT_EACH,
        ABOUT_EACH_PREFIX,
        DATATYPE,
    ];

    pub fn is_container(iri: &str) -> bool {
        iri == BAG || iri == SEQ || iri == ALT
    }

    /// The index `n` of a membership property `rdf:_n`, if `iri` is one.
    pub fn membership_index(iri: &str) -> Option<u64> {
        let digits = iri.strip_prefix(NS)?.strip_prefix('_')?;
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits.parse().ok()
    }

    pub fn membership(index: u64) -> String {
        format!("{}_{}", NS, index)
    }
}

pub mod xml {
    pub const NS: &str = "http://www.w3.org/XML/1998/namespace";
    pub const LANG: &str = "lang";
    pub const BASE: &str = "base";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}
