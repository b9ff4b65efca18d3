use crate::model::{BlankNode, Subject, Term, Triple};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// An RDF graph. Triples are kept in insertion order, duplicates
/// included; comparisons with [`Graph::is_isomorphic`] ignore both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }

    /// The triples whose subject is `subject`.
    pub fn about<'a>(&'a self, subject: &'a Subject) -> impl Iterator<Item = &'a Triple> {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    /// Set equivalence up to a renaming of blank nodes.
    pub fn is_isomorphic(&self, other: &Graph) -> bool {
        let g1: HashSet<&Triple> = self.triples.iter().collect();
        let g2: HashSet<&Triple> = other.triples.iter().collect();
        if g1.len() != g2.len() {
            return false;
        }

        let (ground1, blank1): (Vec<&Triple>, Vec<&Triple>) =
            g1.iter().copied().partition(|t| t.blank_nodes().next().is_none());
        let blank2: Vec<&Triple> = g2
            .iter()
            .copied()
            .filter(|t| t.blank_nodes().next().is_some())
            .collect();
        if blank1.len() != blank2.len() || !ground1.iter().all(|t| g2.contains(*t)) {
            return false;
        }

        let colors1 = colors(&blank1);
        let colors2 = colors(&blank2);
        let mut classes1: HashMap<u64, Vec<&BlankNode>> = HashMap::new();
        for (bn, c) in &colors1 {
            classes1.entry(*c).or_default().push(*bn);
        }
        let mut classes2: HashMap<u64, Vec<&BlankNode>> = HashMap::new();
        for (bn, c) in &colors2 {
            classes2.entry(*c).or_default().push(*bn);
        }
        if classes1.len() != classes2.len()
            || classes1
                .iter()
                .any(|(c, v)| classes2.get(c).map_or(true, |v2| v2.len() != v.len()))
        {
            return false;
        }

        // smallest classes first, so that forced choices come early
        let mut order: Vec<&BlankNode> = colors1.keys().copied().collect();
        order.sort_by(|a, b| {
            let size = |bn: &BlankNode| classes1[&colors1[bn]].len();
            (size(a), &a.id).cmp(&(size(b), &b.id))
        });

        let mut incident: HashMap<&BlankNode, Vec<&Triple>> = HashMap::new();
        for t in blank1.iter().copied() {
            for bn in t.blank_nodes() {
                incident.entry(bn).or_default().push(t);
            }
        }

        let search = Search {
            order: &order,
            colors1: &colors1,
            classes2: &classes2,
            incident: &incident,
            target: blank2.into_iter().collect(),
        };
        search.run(0, &mut HashMap::new(), &mut HashSet::new())
    }
}

struct Search<'a> {
    order: &'a [&'a BlankNode],
    colors1: &'a HashMap<&'a BlankNode, u64>,
    classes2: &'a HashMap<u64, Vec<&'a BlankNode>>,
    incident: &'a HashMap<&'a BlankNode, Vec<&'a Triple>>,
    target: HashSet<&'a Triple>,
}

impl<'a> Search<'a> {
    fn run(
        &self,
        index: usize,
        mapping: &mut HashMap<&'a BlankNode, &'a BlankNode>,
        taken: &mut HashSet<&'a BlankNode>,
    ) -> bool {
        let bn = match self.order.get(index) {
            Some(bn) => *bn,
            None => return true,
        };
        for candidate in &self.classes2[&self.colors1[bn]] {
            if taken.contains(candidate) {
                continue;
            }
            mapping.insert(bn, *candidate);
            taken.insert(*candidate);
            if self.consistent(bn, mapping) && self.run(index + 1, mapping, taken) {
                return true;
            }
            mapping.remove(bn);
            taken.remove(candidate);
        }
        false
    }

    // every triple around `bn` whose blank nodes are all mapped must
    // exist in the other graph
    fn consistent(&self, bn: &BlankNode, mapping: &HashMap<&'a BlankNode, &'a BlankNode>) -> bool {
        self.incident.get(bn).map_or(true, |triples| {
            triples.iter().all(|t| match map_triple(t, mapping) {
                Some(mapped) => self.target.contains(&mapped),
                None => true,
            })
        })
    }
}

fn map_triple(t: &Triple, mapping: &HashMap<&BlankNode, &BlankNode>) -> Option<Triple> {
    let subject = match &t.subject {
        Subject::BlankNode(bn) => Subject::BlankNode((*mapping.get(bn)?).clone()),
        s => s.clone(),
    };
    let object = match &t.object {
        Term::BlankNode(bn) => Term::BlankNode((*mapping.get(bn)?).clone()),
        o => o.clone(),
    };
    Some(Triple {
        subject,
        predicate: t.predicate.clone(),
        object,
    })
}

const REFINEMENT_ROUNDS: usize = 4;

// A label-independent color for each blank node, refined from the
// colors of its neighbours. Isomorphic nodes always share a color.
fn colors<'a>(triples: &[&'a Triple]) -> HashMap<&'a BlankNode, u64> {
    let mut colors: HashMap<&BlankNode, u64> = triples
        .iter()
        .flat_map(|t| t.blank_nodes())
        .map(|bn| (bn, 0))
        .collect();

    for _ in 0..REFINEMENT_ROUNDS {
        let mut signatures: HashMap<&BlankNode, Vec<u64>> = HashMap::new();
        for t in triples.iter().copied() {
            let subject_color = match &t.subject {
                Subject::BlankNode(bn) => Some(colors[bn]),
                Subject::NamedNode(_) => None,
            };
            let object_color = match &t.object {
                Term::BlankNode(bn) => Some(colors[bn]),
                _ => None,
            };
            if let Subject::BlankNode(bn) = &t.subject {
                let mut h = DefaultHasher::new();
                0u8.hash(&mut h);
                t.predicate.hash(&mut h);
                match object_color {
                    Some(c) => c.hash(&mut h),
                    None => t.object.hash(&mut h),
                }
                signatures.entry(bn).or_default().push(h.finish());
            }
            if let Term::BlankNode(bn) = &t.object {
                let mut h = DefaultHasher::new();
                1u8.hash(&mut h);
                t.predicate.hash(&mut h);
                match subject_color {
                    Some(c) => c.hash(&mut h),
                    None => t.subject.hash(&mut h),
                }
                signatures.entry(bn).or_default().push(h.finish());
            }
        }
        colors = colors
            .iter()
            .map(|(bn, old)| {
                let mut sig = signatures.remove(bn).unwrap_or_default();
                sig.sort_unstable();
                let mut h = DefaultHasher::new();
                old.hash(&mut h);
                sig.hash(&mut h);
                (*bn, h.finish())
            })
            .collect();
    }
    colors
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Graph {
            triples: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Triple>> for Graph {
    fn from(triples: Vec<Triple>) -> Self {
        Graph { triples }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter)
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Literal, NamedNode};

    fn nn(iri: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{}", iri))
    }

    fn bn(id: &str) -> BlankNode {
        BlankNode::new(id)
    }

    #[test]
    fn order_and_duplicates_ignored() {
        let t1 = Triple::new(nn("s"), nn("p"), Literal::simple("a"));
        let t2 = Triple::new(nn("s"), nn("p"), nn("o"));
        let g1: Graph = vec![t1.clone(), t2.clone(), t1.clone()].into();
        let g2: Graph = vec![t2, t1].into();
        assert!(g1.is_isomorphic(&g2));
    }

    #[test]
    fn blank_nodes_renamed() {
        let g1: Graph = vec![
            Triple::new(nn("s"), nn("p"), bn("a")),
            Triple::new(bn("a"), nn("q"), bn("b")),
            Triple::new(bn("b"), nn("q"), Literal::simple("end")),
        ]
        .into();
        let g2: Graph = vec![
            Triple::new(bn("y"), nn("q"), Literal::simple("end")),
            Triple::new(bn("x"), nn("q"), bn("y")),
            Triple::new(nn("s"), nn("p"), bn("x")),
        ]
        .into();
        assert!(g1.is_isomorphic(&g2));
    }

    #[test]
    fn structure_matters() {
        let g1: Graph = vec![
            Triple::new(bn("a"), nn("p"), bn("b")),
            Triple::new(bn("b"), nn("p"), bn("a")),
        ]
        .into();
        let g2: Graph = vec![
            Triple::new(bn("a"), nn("p"), bn("b")),
            Triple::new(bn("c"), nn("p"), bn("d")),
        ]
        .into();
        assert!(!g1.is_isomorphic(&g2));
    }

    #[test]
    fn symmetric_nodes_need_search() {
        // four interchangeable nodes in a ring: colors alone can't tell them apart
        let ring = |ids: [&str; 4]| -> Graph {
            (0..4)
                .map(|i| Triple::new(bn(ids[i]), nn("next"), bn(ids[(i + 1) % 4])))
                .collect()
        };
        let g1 = ring(["a", "b", "c", "d"]);
        let g2 = ring(["w", "x", "y", "z"]);
        assert!(g1.is_isomorphic(&g2));

        let two_rings: Graph = vec![
            Triple::new(bn("a"), nn("next"), bn("b")),
            Triple::new(bn("b"), nn("next"), bn("a")),
            Triple::new(bn("c"), nn("next"), bn("d")),
            Triple::new(bn("d"), nn("next"), bn("c")),
        ]
        .into();
        assert!(!g1.is_isomorphic(&two_rings));
    }

    #[test]
    fn literal_difference() {
        let g1: Graph = vec![Triple::new(nn("s"), nn("p"), Literal::simple("a"))].into();
        let g2: Graph = vec![Triple::new(nn("s"), nn("p"), Literal::language_tagged("a", "en"))].into();
        assert!(!g1.is_isomorphic(&g2));
    }
}
