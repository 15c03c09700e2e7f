//! Similarity scoring between two subjects' inferred term sets
use crate::index::AssociationSet;
use crate::ontology::Ontology;
use crate::{AssocResult, SubjectId};

impl<'a, O: Ontology> AssociationSet<'a, O> {
    /// Calculates the Jaccard index of the inferred term sets of two
    /// subjects
    ///
    /// ```text
    /// |closure(s1) ∩ closure(s2)|
    /// ---------------------------
    /// |closure(s1) ∪ closure(s2)|
    /// ```
    ///
    /// Returns `0.0` when both closures are empty.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::AssocError::UnknownSubject`] in strict mode.
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
    /// builder.annotate("g1", ["GO:A"]);
    /// builder.annotate("g2", ["GO:B"]);
    /// let associations = builder.build().unwrap();
    ///
    /// let sim = associations
    ///     .jaccard(&SubjectId::from("g1"), &SubjectId::from("g2"))
    ///     .unwrap();
    /// assert!((sim - 0.5).abs() < f64::EPSILON);
    /// ```
    pub fn jaccard(&self, s1: &SubjectId, s2: &SubjectId) -> AssocResult<f64> {
        let c1 = self.closure_of(s1)?;
        let c2 = self.closure_of(s2)?;
        let num_union = c1.union(c2).count();
        if num_union == 0 {
            return Ok(0.0);
        }
        let num_shared = c1.intersection(c2).count();
        Ok(usize_to_f64(num_shared) / usize_to_f64(num_union))
    }
}

/// This is a really weird way of converting a usize into a float but I
/// want to make sure the app crashes, so I don't want to use `as`.
fn usize_to_f64(n: usize) -> f64 {
    <usize as TryInto<u32>>::try_into(n)
        .expect("closure too large")
        .into()
}
