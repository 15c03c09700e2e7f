//! The ontology boundary used for closure expansion and term labels
//!
//! The association engine does not model the ontology graph itself. It only
//! needs two lookups, captured by the [`Ontology`] trait: the ancestor set
//! of a term and an optional human-readable label. Graph construction,
//! parsing and reasoning all happen upstream.
use std::collections::{BTreeSet, HashMap};

use crate::TermId;

/// Read-only view of a pre-built ontology
///
/// Implementations must be immutable for the lifetime of a query session.
/// Both methods take `&self`, so a shared reference can serve concurrent
/// readers.
pub trait Ontology {
    /// Returns the transitive ancestors of `term`, or `None` if the term
    /// is unknown to the ontology
    ///
    /// The returned set must *not* contain `term` itself. Reflexivity is
    /// added by the indexer.
    fn ancestors(&self, term: &TermId) -> Option<BTreeSet<TermId>>;

    /// Returns the label of `term`, if the term exists and has one
    fn label(&self, term: &TermId) -> Option<String>;
}

/// An in-memory [`Ontology`] backed by precomputed ancestor sets
///
/// `MapOntology` is deliberately dumb: each term is registered together
/// with its full, non-reflexive ancestor set. It does no graph traversal
/// and is mostly useful for tests, examples and small static ontologies.
///
/// # Examples
///
/// ```
/// use assoc::{MapOntology, Ontology, TermId};
///
/// let mut ontology = MapOntology::new();
/// ontology.insert("HP:0000118", ["HP:0000001"]);
/// ontology.set_label("HP:0000118", "Phenotypic abnormality");
///
/// let term = TermId::from("HP:0000118");
/// assert_eq!(ontology.ancestors(&term).unwrap().len(), 1);
/// assert_eq!(
///     ontology.label(&term).as_deref(),
///     Some("Phenotypic abnormality")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapOntology {
    ancestors: HashMap<TermId, BTreeSet<TermId>>,
    labels: HashMap<TermId, String>,
}

impl MapOntology {
    /// Constructs a new, empty `MapOntology`
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `term` with its full set of transitive ancestors
    ///
    /// The ancestor set must not include `term` itself. Registering the
    /// same term again replaces its previous ancestor set.
    pub fn insert<T, I, A>(&mut self, term: T, ancestors: I)
    where
        T: Into<TermId>,
        I: IntoIterator<Item = A>,
        A: Into<TermId>,
    {
        self.ancestors.insert(
            term.into(),
            ancestors.into_iter().map(Into::into).collect(),
        );
    }

    /// Sets the label of a term
    ///
    /// Labels are independent of ancestor registration; a label on an
    /// unregistered term is allowed.
    pub fn set_label<T: Into<TermId>, S: Into<String>>(&mut self, term: T, label: S) {
        self.labels.insert(term.into(), label.into());
    }

    /// Returns the number of registered terms
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    /// Returns `true` if no terms are registered
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }
}

impl Ontology for MapOntology {
    fn ancestors(&self, term: &TermId) -> Option<BTreeSet<TermId>> {
        self.ancestors.get(term).cloned()
    }

    fn label(&self, term: &TermId) -> Option<String> {
        self.labels.get(term).cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_term_has_no_ancestors() {
        let ontology = MapOntology::new();
        assert!(ontology.ancestors(&TermId::from("GO:A")).is_none());
        assert!(ontology.label(&TermId::from("GO:A")).is_none());
    }

    #[test]
    fn reinsert_replaces_ancestors() {
        let mut ontology = MapOntology::new();
        ontology.insert("GO:A", ["GO:B", "GO:C"]);
        ontology.insert("GO:A", ["GO:B"]);
        let ancestors = ontology.ancestors(&TermId::from("GO:A")).unwrap();
        assert_eq!(ancestors.len(), 1);
        assert!(ancestors.contains(&TermId::from("GO:B")));
    }

    #[test]
    fn label_without_registration() {
        let mut ontology = MapOntology::new();
        ontology.set_label("GO:A", "kinase activity");
        assert_eq!(
            ontology.label(&TermId::from("GO:A")).as_deref(),
            Some("kinase activity")
        );
        assert!(ontology.is_empty());
    }
}
