//! Boolean queries and pairwise term-intersection analysis
use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::index::AssociationSet;
use crate::ontology::Ontology;
use crate::{AssocResult, SubjectId, TermId};

/// The subjects shared by one pair of terms
///
/// Returned from [`AssociationSet::intersections`]. A subject is shared by
/// `x` and `y` if both terms are part of its closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionRecord {
    x: TermId,
    y: TermId,
    shared: BTreeSet<SubjectId>,
}

impl IntersectionRecord {
    /// The lexicographically smaller term of the pair
    pub fn x(&self) -> &TermId {
        &self.x
    }

    /// The lexicographically larger term of the pair
    pub fn y(&self) -> &TermId {
        &self.y
    }

    /// The subjects whose closures contain both terms
    pub fn shared(&self) -> &BTreeSet<SubjectId> {
        &self.shared
    }

    /// The number of shared subjects
    pub fn count(&self) -> usize {
        self.shared.len()
    }
}

impl<'a, O: Ontology> AssociationSet<'a, O> {
    /// Basic boolean query over the closure index
    ///
    /// A subject matches if its closure contains *every* `include` term
    /// and *none* of the `exclude` terms. An empty `include` matches all
    /// subjects; an empty `exclude` excludes nothing. Matches come back
    /// in subject-index order, there is no relevance ranking.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::AssocError::UnknownSubject`] in strict mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::{AssociationSetBuilder, MapOntology};
    ///
    /// let mut ontology = MapOntology::new();
    /// ontology.insert("GO:A", ["GO:B"]);
    ///
    /// let mut builder = AssociationSetBuilder::new(&ontology);
    /// builder.annotate("g1", ["GO:A"]);
    /// builder.annotate("g2", ["GO:B"]);
    /// let associations = builder.build().unwrap();
    ///
    /// let matches = associations.query(["GO:B"], ["GO:A"]).unwrap();
    /// assert_eq!(matches.len(), 1);
    /// assert_eq!(matches[0].as_str(), "g2");
    /// ```
    pub fn query<I, J, S, T>(&self, include: I, exclude: J) -> AssocResult<Vec<SubjectId>>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<TermId>,
        T: Into<TermId>,
    {
        let include: BTreeSet<TermId> = include.into_iter().map(Into::into).collect();
        let exclude: BTreeSet<TermId> = exclude.into_iter().map(Into::into).collect();

        let mut matches = Vec::new();
        for subject in &self.subjects {
            let closure = self.closure_of(subject)?;
            if include.iter().all(|term| closure.contains(term))
                && !exclude.iter().any(|term| closure.contains(term))
            {
                matches.push(subject.clone());
            }
        }
        debug!("query matched {} of {} subjects", matches.len(), self.len());
        Ok(matches)
    }

    /// Computes the subject overlap of every term pair drawn from
    /// `x_terms` × `y_terms`
    ///
    /// The term→subject map is built in a single pass over all indexed
    /// subjects. Pairs are restricted to `x < y` (lexicographic on the
    /// term ID), which suppresses self-pairs and symmetric duplicates.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::AssocError::UnknownSubject`] in strict mode.
    pub fn intersections<I, J, S, T>(
        &self,
        x_terms: I,
        y_terms: J,
    ) -> AssocResult<Vec<IntersectionRecord>>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<TermId>,
        T: Into<TermId>,
    {
        let x_terms: Vec<TermId> = x_terms.into_iter().map(Into::into).collect();
        let y_terms: Vec<TermId> = y_terms.into_iter().map(Into::into).collect();

        let mut subjects_of: HashMap<&TermId, BTreeSet<SubjectId>> = x_terms
            .iter()
            .chain(y_terms.iter())
            .map(|term| (term, BTreeSet::new()))
            .collect();

        for subject in &self.subjects {
            let closure = self.closure_of(subject)?;
            for term in closure {
                if let Some(shared) = subjects_of.get_mut(term) {
                    shared.insert(subject.clone());
                }
            }
        }

        let mut records = Vec::new();
        for x in &x_terms {
            for y in &y_terms {
                if x < y {
                    let shared = subjects_of[x]
                        .intersection(&subjects_of[y])
                        .cloned()
                        .collect();
                    records.push(IntersectionRecord {
                        x: x.clone(),
                        y: y.clone(),
                        shared,
                    });
                }
            }
        }
        Ok(records)
    }
}
