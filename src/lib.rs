//! Query ontology-annotated subjects: closure indexing, boolean queries,
//! term enrichment and similarity
//!
//! `assoc` holds a collection of associations between subjects (e.g. genes)
//! and ontology terms (e.g. Gene Ontology classes). Each subject's direct
//! annotations are expanded once into their reflexive ancestor closure, and
//! all queries run against that immutable index:
//!
//! - [`AssociationSet::query`]: boolean include/exclude filtering
//! - [`AssociationSet::intersections`]: pairwise subject-overlap of terms
//! - [`AssociationSet::enrichment_test`]: Fisher's exact test with
//!   Bonferroni correction
//! - [`AssociationSet::jaccard`]: similarity of two subjects' closures
//!
//! The ontology itself is an external collaborator behind the [`Ontology`]
//! trait. The crate ships [`MapOntology`], a minimal in-memory
//! implementation backed by precomputed ancestor sets; anything that can
//! answer ancestor and label lookups can be plugged in instead.
//!
//! # Examples
//!
//! ```
//! use assoc::{AssociationSetBuilder, MapOntology};
//!
//! // A small ontology: A is_a B is_a C
//! let mut ontology = MapOntology::new();
//! ontology.insert("GO:A", ["GO:B", "GO:C"]);
//! ontology.insert("GO:B", ["GO:C"]);
//!
//! let mut builder = AssociationSetBuilder::new(&ontology);
//! builder.annotate("gene1", ["GO:A"]);
//! builder.annotate("gene2", ["GO:A"]);
//! builder.annotate("gene3", ["GO:B"]);
//! let associations = builder.build().unwrap();
//!
//! // every subject annotated to GO:B, directly or through an ancestor path
//! let matches = associations
//!     .query(["GO:B"], std::iter::empty::<&str>())
//!     .unwrap();
//! assert_eq!(matches.len(), 3);
//! ```
use thiserror::Error;

pub mod ident;
pub mod index;
pub mod ontology;
pub mod query;
pub mod similarity;
pub mod stats;

pub use ident::{SubjectId, TermId};
pub use index::{AssociationSet, AssociationSetBuilder, IndexConfig, TermPolicy};
pub use ontology::{MapOntology, Ontology};
pub use query::IntersectionRecord;
pub use stats::{EnrichmentParams, EnrichmentRecord, TestDirection};

const DEFAULT_NUM_DIRECT_TERMS: usize = 8;

/// Main Error type of the crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssocError {
    /// A closure lookup targeted a subject that is not part of the index
    /// (only raised in strict mode, see [`IndexConfig`])
    #[error("unknown subject: {0}")]
    UnknownSubject(SubjectId),
    /// An ontology lookup failed for the term
    #[error("invalid term: {0}")]
    InvalidTerm(TermId),
    /// An input constraint was violated, e.g. an empty background set
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Crate-wide Result type, using [`AssocError`]
pub type AssocResult<T> = Result<T, AssocError>;
