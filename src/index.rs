//! Building the closure index and looking up inferred term sets
//!
//! Assembly and querying are split into two phases:
//! [`AssociationSetBuilder`] collects the direct subject→term annotations,
//! and [`AssociationSetBuilder::build`] expands them once into an immutable
//! [`AssociationSet`] snapshot. All query operations live on the snapshot
//! and take `&self`, so one snapshot can serve any number of concurrent
//! readers. Refreshing the index means building a new snapshot.
use std::collections::{BTreeSet, HashMap};

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::ontology::Ontology;
use crate::{AssocError, AssocResult, SubjectId, TermId, DEFAULT_NUM_DIRECT_TERMS};

/// Direct annotations of a single subject, before closure expansion
type DirectTerms = SmallVec<[TermId; DEFAULT_NUM_DIRECT_TERMS]>;

/// How the indexer reacts when the ontology does not know a direct term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TermPolicy {
    /// Drop the term's ancestor contribution; the term itself stays in
    /// the subject's closure
    #[default]
    Skip,
    /// Abort the build with [`AssocError::InvalidTerm`]
    Abort,
}

/// Configuration of an [`AssociationSet`]
///
/// The default is lenient on both axes: closure lookups for unindexed
/// subjects yield an empty set, and unknown terms are skipped during
/// indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexConfig {
    /// If `true`, closure lookups for subjects that are not part of the
    /// index fail with [`AssocError::UnknownSubject`] instead of
    /// returning an empty set
    pub strict: bool,
    /// Handling of direct terms the ontology does not know
    pub term_policy: TermPolicy,
}

/// Collects direct annotations and builds an [`AssociationSet`]
///
/// Subjects keep the order in which they were first annotated; that order
/// becomes the subject index of the snapshot and defines query output
/// order. Annotating a subject a second time extends its direct term set.
pub struct AssociationSetBuilder<'a, O> {
    ontology: &'a O,
    subjects: Vec<SubjectId>,
    direct: HashMap<SubjectId, DirectTerms>,
    config: IndexConfig,
}

impl<'a, O: Ontology> AssociationSetBuilder<'a, O> {
    /// Constructs a builder with the default (lenient) [`IndexConfig`]
    pub fn new(ontology: &'a O) -> Self {
        Self::with_config(ontology, IndexConfig::default())
    }

    /// Constructs a builder with an explicit [`IndexConfig`]
    pub fn with_config(ontology: &'a O, config: IndexConfig) -> Self {
        Self {
            ontology,
            subjects: Vec::new(),
            direct: HashMap::new(),
            config,
        }
    }

    /// Adds direct term annotations for a subject
    pub fn annotate<S, I, T>(&mut self, subject: S, terms: I)
    where
        S: Into<SubjectId>,
        I: IntoIterator<Item = T>,
        T: Into<TermId>,
    {
        let subject = subject.into();
        let direct = self.direct.entry(subject.clone()).or_insert_with(|| {
            self.subjects.push(subject);
            DirectTerms::new()
        });
        for term in terms {
            let term = term.into();
            if !direct.contains(&term) {
                direct.push(term);
            }
        }
    }

    /// Expands all direct annotations into their reflexive ancestor
    /// closures and freezes the result
    ///
    /// Ancestor sets are cached per term for the duration of the build, so
    /// corpora where many subjects share terms do not pay for repeated
    /// ontology lookups.
    ///
    /// # Errors
    ///
    /// Fails with [`AssocError::InvalidTerm`] if a direct term is unknown
    /// to the ontology and the [`TermPolicy`] is `Abort`.
    pub fn build(self) -> AssocResult<AssociationSet<'a, O>> {
        let Self {
            ontology,
            subjects,
            direct,
            config,
        } = self;

        info!("indexing {} subjects", subjects.len());
        let mut ancestor_cache: HashMap<TermId, Option<BTreeSet<TermId>>> = HashMap::new();
        let mut closures: HashMap<SubjectId, BTreeSet<TermId>> =
            HashMap::with_capacity(subjects.len());

        for subject in &subjects {
            let terms = direct
                .get(subject)
                .expect("every indexed subject has a direct annotation entry");
            let mut closure = BTreeSet::new();
            for term in terms {
                let ancestors = ancestor_cache
                    .entry(term.clone())
                    .or_insert_with(|| ontology.ancestors(term));
                match ancestors {
                    Some(ancestors) => closure.extend(ancestors.iter().cloned()),
                    None => match config.term_policy {
                        TermPolicy::Skip => {
                            debug!("skipping unknown term {} on {}", term, subject);
                        }
                        TermPolicy::Abort => {
                            return Err(AssocError::InvalidTerm(term.clone()));
                        }
                    },
                }
                // reflexive: the direct term is always part of the closure
                closure.insert(term.clone());
            }
            closures.insert(subject.clone(), closure);
        }
        debug!("cached ancestor sets for {} terms", ancestor_cache.len());

        Ok(AssociationSet {
            ontology,
            subjects,
            closures,
            config,
        })
    }
}

static EMPTY_CLOSURE: BTreeSet<TermId> = BTreeSet::new();

#[cfg_attr(doc, aquamarine::aquamarine)]
/// An immutable snapshot of subject→term associations, indexed by closure
///
/// An `AssociationSet` maps every subject to the reflexive transitive
/// ancestor closure of its direct annotations. It is created through
/// [`AssociationSetBuilder`] and never changes afterwards; all query
/// methods borrow it immutably.
///
/// ```mermaid
/// flowchart LR
///     DA[direct annotations] --> B(AssociationSetBuilder)
///     ONT[Ontology] --> B
///     B -- build --> S(AssociationSet)
///     S --> Q[query]
///     S --> I[intersections]
///     S --> E[enrichment_test]
///     S --> J[jaccard]
/// ```
///
/// # Examples
///
/// ```
/// use assoc::{AssociationSetBuilder, MapOntology, SubjectId};
///
/// let mut ontology = MapOntology::new();
/// ontology.insert("GO:A", ["GO:B"]);
///
/// let mut builder = AssociationSetBuilder::new(&ontology);
/// builder.annotate("gene1", ["GO:A"]);
/// let associations = builder.build().unwrap();
///
/// let closure = associations
///     .closure_of(&SubjectId::from("gene1"))
///     .unwrap();
/// assert_eq!(closure.len(), 2);
/// ```
pub struct AssociationSet<'a, O> {
    pub(crate) ontology: &'a O,
    pub(crate) subjects: Vec<SubjectId>,
    pub(crate) closures: HashMap<SubjectId, BTreeSet<TermId>>,
    pub(crate) config: IndexConfig,
}

impl<'a, O: Ontology> AssociationSet<'a, O> {
    /// Returns the reflexive inferred term set of a subject
    ///
    /// E.g. if a gene is directly annotated with terms A and B, and these
    /// terms have the ancestors C, D and E, the returned set is
    /// {A, B, C, D, E}.
    ///
    /// # Errors
    ///
    /// In strict mode a lookup for a subject that is not part of the
    /// index fails with [`AssocError::UnknownSubject`]. In lenient mode
    /// (the default) it yields an empty set instead.
    pub fn closure_of(&self, subject: &SubjectId) -> AssocResult<&BTreeSet<TermId>> {
        match self.closures.get(subject) {
            Some(closure) => Ok(closure),
            None if self.config.strict => Err(AssocError::UnknownSubject(subject.clone())),
            None => Ok(&EMPTY_CLOSURE),
        }
    }

    /// All indexed subjects, in annotation order
    pub fn subjects(&self) -> &[SubjectId] {
        &self.subjects
    }

    /// Returns the number of indexed subjects
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Returns `true` if no subjects are indexed
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// The ontology this snapshot was built against
    pub fn ontology(&self) -> &'a O {
        self.ontology
    }

    /// The configuration this snapshot was built with
    pub fn config(&self) -> IndexConfig {
        self.config
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MapOntology;

    fn chain_ontology() -> MapOntology {
        // A is_a B is_a C
        let mut ontology = MapOntology::new();
        ontology.insert("GO:A", ["GO:B", "GO:C"]);
        ontology.insert("GO:B", ["GO:C"]);
        ontology.insert("GO:C", std::iter::empty::<&str>());
        ontology
    }

    fn chain_associations(ontology: &MapOntology) -> AssociationSet<'_, MapOntology> {
        let mut builder = AssociationSetBuilder::new(ontology);
        builder.annotate("g1", ["GO:A"]);
        builder.annotate("g2", ["GO:A"]);
        builder.annotate("g3", ["GO:B"]);
        builder.build().expect("chain ontology build cannot fail")
    }

    fn closure_strings(set: &AssociationSet<'_, MapOntology>, subject: &str) -> Vec<String> {
        set.closure_of(&SubjectId::from(subject))
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn closure_contains_direct_and_ancestors() {
        let ontology = chain_ontology();
        let set = chain_associations(&ontology);

        assert_eq!(closure_strings(&set, "g1"), ["GO:A", "GO:B", "GO:C"]);
        assert_eq!(closure_strings(&set, "g2"), ["GO:A", "GO:B", "GO:C"]);
        assert_eq!(closure_strings(&set, "g3"), ["GO:B", "GO:C"]);
    }

    #[test]
    fn closure_is_superset_of_direct() {
        let ontology = chain_ontology();
        let mut builder = AssociationSetBuilder::new(&ontology);
        builder.annotate("g1", ["GO:B", "GO:C"]);
        let set = builder.build().unwrap();
        let closure = set.closure_of(&SubjectId::from("g1")).unwrap();
        assert!(closure.contains(&TermId::from("GO:B")));
        assert!(closure.contains(&TermId::from("GO:C")));
    }

    #[test]
    fn subject_order_is_annotation_order() {
        let ontology = chain_ontology();
        let set = chain_associations(&ontology);
        let subjects: Vec<&str> = set.subjects().iter().map(SubjectId::as_str).collect();
        assert_eq!(subjects, ["g1", "g2", "g3"]);
    }

    #[test]
    fn reannotation_extends_direct_set() {
        let ontology = chain_ontology();
        let mut builder = AssociationSetBuilder::new(&ontology);
        builder.annotate("g1", ["GO:C"]);
        builder.annotate("g2", ["GO:C"]);
        builder.annotate("g1", ["GO:B", "GO:C"]);
        let set = builder.build().unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(closure_strings(&set, "g1"), ["GO:B", "GO:C"]);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let ontology = chain_ontology();
        let first = chain_associations(&ontology);
        let second = chain_associations(&ontology);
        assert_eq!(first.subjects, second.subjects);
        assert_eq!(first.closures, second.closures);
    }

    #[test]
    fn lenient_lookup_yields_empty_closure() {
        let ontology = chain_ontology();
        let set = chain_associations(&ontology);
        let closure = set.closure_of(&SubjectId::from("nosuch")).unwrap();
        assert!(closure.is_empty());
    }

    #[test]
    fn strict_lookup_fails_for_unknown_subject() {
        let ontology = chain_ontology();
        let config = IndexConfig {
            strict: true,
            ..IndexConfig::default()
        };
        let mut builder = AssociationSetBuilder::with_config(&ontology, config);
        builder.annotate("g1", ["GO:A"]);
        let set = builder.build().unwrap();

        assert_eq!(
            set.closure_of(&SubjectId::from("nosuch")),
            Err(AssocError::UnknownSubject(SubjectId::from("nosuch")))
        );
        assert!(set.closure_of(&SubjectId::from("g1")).is_ok());
    }

    #[test]
    fn unknown_term_is_skipped_by_default() {
        let ontology = chain_ontology();
        let mut builder = AssociationSetBuilder::new(&ontology);
        builder.annotate("g1", ["GO:A", "GO:X"]);
        let set = builder.build().unwrap();
        // GO:X contributes no ancestors but stays in the closure
        assert_eq!(
            closure_strings(&set, "g1"),
            ["GO:A", "GO:B", "GO:C", "GO:X"]
        );
    }

    #[test]
    fn unknown_term_aborts_in_abort_mode() {
        let ontology = chain_ontology();
        let config = IndexConfig {
            term_policy: TermPolicy::Abort,
            ..IndexConfig::default()
        };
        let mut builder = AssociationSetBuilder::with_config(&ontology, config);
        builder.annotate("g1", ["GO:A", "GO:X"]);
        assert_eq!(
            builder.build().err(),
            Some(AssocError::InvalidTerm(TermId::from("GO:X")))
        );
    }

    #[test]
    fn concurrent_readers_share_one_snapshot() {
        use rayon::prelude::*;

        let ontology = chain_ontology();
        let set = chain_associations(&ontology);

        let results: Vec<usize> = (0..64)
            .into_par_iter()
            .map(|_| {
                set.query(["GO:B"], std::iter::empty::<&str>())
                    .unwrap()
                    .len()
            })
            .collect();
        assert!(results.into_iter().all(|n| n == 3));
    }
}
