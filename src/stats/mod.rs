//! Statistical over- and under-representation testing of terms
//!
//! [`AssociationSet::enrichment_test`] compares how often each term occurs
//! in a sample of subjects against a background population. Every term in
//! the closure of any sample subject is a hypothesis; each one gets a 2×2
//! contingency table and a Fisher exact test, and the p-values are
//! Bonferroni-corrected by the number of retained hypotheses.
use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::index::AssociationSet;
use crate::ontology::Ontology;
use crate::{AssocError, AssocResult, SubjectId, TermId};

pub mod fisher;

/// Tail of the exact test to evaluate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TestDirection {
    /// Over-representation (enrichment)
    #[default]
    Greater,
    /// Under-representation (depletion)
    Less,
    /// Deviation in either direction
    TwoSided,
}

/// Per-call configuration of [`AssociationSet::enrichment_test`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentParams {
    /// Records with a corrected p-value at or above this are dropped
    pub threshold: f64,
    /// Attach ontology labels to the returned records
    pub labels: bool,
    /// Tail of the exact test
    pub direction: TestDirection,
}

impl Default for EnrichmentParams {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            labels: false,
            direction: TestDirection::default(),
        }
    }
}

/// An enriched (or depleted) term with its corrected and raw p-values
///
/// Returned from [`AssociationSet::enrichment_test`], sorted ascending by
/// corrected p-value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRecord {
    term: TermId,
    p_corrected: f64,
    p_uncorrected: f64,
    label: Option<String>,
}

impl EnrichmentRecord {
    /// The tested term
    pub fn term(&self) -> &TermId {
        &self.term
    }

    /// The Bonferroni-corrected p-value, capped at 1.0
    pub fn p_corrected(&self) -> f64 {
        self.p_corrected
    }

    /// The raw p-value of the exact test
    pub fn p_uncorrected(&self) -> f64 {
        self.p_uncorrected
    }

    /// The ontology label of the term, if requested and known
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<'a, O: Ontology> AssociationSet<'a, O> {
    /// Performs term enrichment analysis of `sample` against a background
    ///
    /// `background` defaults to all indexed subjects and always absorbs
    /// the sample, so every term's sample count is bounded by its
    /// background count. Hypothesis terms occurring in at most one
    /// background subject cannot yield a meaningful test and are dropped
    /// before correction.
    ///
    /// Results carry both the raw and the Bonferroni-corrected p-value,
    /// are filtered to `p_corrected < threshold` and sorted ascending by
    /// corrected p-value (ties broken by term ID).
    ///
    /// # Errors
    ///
    /// - [`AssocError::InvalidArgument`] if the threshold is negative or
    ///   not finite, or if sample and background are both empty
    /// - [`AssocError::UnknownSubject`] in strict mode, if the sample or
    ///   background name a subject that is not part of the index
    ///
    /// # Examples
    ///
    /// ```
    /// use assoc::{AssociationSetBuilder, EnrichmentParams, MapOntology, SubjectId};
    ///
    /// let mut ontology = MapOntology::new();
    /// ontology.insert("GO:A", ["GO:B"]);
    /// ontology.insert("GO:B", std::iter::empty::<&str>());
    ///
    /// let mut builder = AssociationSetBuilder::new(&ontology);
    /// builder.annotate("g1", ["GO:A"]);
    /// builder.annotate("g2", ["GO:A"]);
    /// builder.annotate("g3", ["GO:B"]);
    /// let associations = builder.build().unwrap();
    ///
    /// let sample = [SubjectId::from("g1"), SubjectId::from("g2")];
    /// let params = EnrichmentParams {
    ///     threshold: 1.5,
    ///     ..EnrichmentParams::default()
    /// };
    /// let records = associations.enrichment_test(&sample, None, params).unwrap();
    /// assert_eq!(records.first().unwrap().term().as_str(), "GO:A");
    /// ```
    pub fn enrichment_test(
        &self,
        sample: &[SubjectId],
        background: Option<&[SubjectId]>,
        params: EnrichmentParams,
    ) -> AssocResult<Vec<EnrichmentRecord>> {
        if !params.threshold.is_finite() || params.threshold < 0.0 {
            return Err(AssocError::InvalidArgument(format!(
                "threshold must be finite and non-negative, got {}",
                params.threshold
            )));
        }

        let sample: BTreeSet<&SubjectId> = sample.iter().collect();
        let sample_size = sample.len() as u64;

        let mut hypotheses: BTreeSet<TermId> = BTreeSet::new();
        for subject in &sample {
            hypotheses.extend(self.closure_of(subject)?.iter().cloned());
        }
        debug!(
            "{} hypotheses from {} sample subjects",
            hypotheses.len(),
            sample.len()
        );

        let mut bg: BTreeSet<&SubjectId> = match background {
            Some(background) => background.iter().collect(),
            None => self.subjects.iter().collect(),
        };
        // the sample is always part of the background
        bg.extend(sample.iter().copied());
        if bg.is_empty() {
            return Err(AssocError::InvalidArgument(
                "empty background set".to_string(),
            ));
        }
        let bg_size = bg.len() as u64;

        let mut bg_count: HashMap<&TermId, u64> = HashMap::new();
        for subject in &bg {
            for term in self.closure_of(subject)? {
                if let Some(term) = hypotheses.get(term) {
                    *bg_count.entry(term).or_insert(0) += 1;
                }
            }
        }
        let mut sample_count: HashMap<&TermId, u64> = HashMap::new();
        for subject in &sample {
            for term in self.closure_of(subject)? {
                if let Some(term) = hypotheses.get(term) {
                    *sample_count.entry(term).or_insert(0) += 1;
                }
            }
        }

        // terms seen in at most one background subject cannot yield a
        // meaningful test and would distort the correction factor
        let retained: Vec<&TermId> = hypotheses
            .iter()
            .filter(|term| bg_count.get(*term).copied().unwrap_or(0) > 1)
            .collect();
        let num_hypotheses = retained.len() as u64;
        debug!("{} hypotheses retained for correction", num_hypotheses);

        let mut results = Vec::new();
        for term in retained {
            //              Term  NotTerm   RowTotal
            //              ----  -------   --------
            // sample       [a,      b]     sample_size
            // rest of bg   [c,      d]     bg_size - sample_size
            let n_bg = bg_count[term];
            let a = sample_count.get(term).copied().unwrap_or(0);
            let b = sample_size - a;
            let c = n_bg - a;
            let d = (bg_size - n_bg) - b;
            let p_uncorrected = fisher::fisher_exact([a, b, c, d], params.direction)?;
            let p_corrected = (p_uncorrected * f64_from_u64(num_hypotheses)).min(1.0);
            debug!(
                "{}: a={} b={} c={} d={} p={} corrected={}",
                term, a, b, c, d, p_uncorrected, p_corrected
            );
            if p_corrected < params.threshold {
                let label = if params.labels {
                    self.ontology().label(term)
                } else {
                    None
                };
                results.push(EnrichmentRecord {
                    term: term.clone(),
                    p_corrected,
                    p_uncorrected,
                    label,
                });
            }
        }
        results.sort_by(|x, y| {
            x.p_corrected
                .total_cmp(&y.p_corrected)
                .then_with(|| x.term.cmp(&y.term))
        });
        Ok(results)
    }
}

/// We have to frequently do divisions starting with u64 values
/// and need to return f64 values. To ensure some kind of safety
/// we use this method to panic in case of overflows.
pub(crate) fn f64_from_u64(n: u64) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large u64");
    intermediate.into()
}
