//! Identifier types for ontology terms and annotated subjects
//!
//! Both [`TermId`] and [`SubjectId`] are opaque string wrappers. The engine
//! never interprets them; it only compares, hashes and orders them, so any
//! CURIE or ad-hoc identifier scheme works.
use core::fmt::Debug;
use std::fmt::Display;

/// The ID of an ontology term, e.g. `GO:0016301`
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TermId {
    inner: String,
}

impl TermId {
    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for TermId {
    fn from(s: &str) -> Self {
        Self { inner: s.into() }
    }
}

impl From<String> for TermId {
    fn from(inner: String) -> Self {
        Self { inner }
    }
}

impl Debug for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TermId({})", self)
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for TermId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

/// The ID of an annotated subject, e.g. a gene symbol or accession
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubjectId {
    inner: String,
}

impl SubjectId {
    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self { inner: s.into() }
    }
}

impl From<String> for SubjectId {
    fn from(inner: String) -> Self {
        Self { inner }
    }
}

impl Debug for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SubjectId({})", self)
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for SubjectId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn term_id_ordering_is_lexicographic() {
        let a = TermId::from("GO:0000001");
        let b = TermId::from("GO:0000002");
        assert!(a < b);
        assert_eq!(a, TermId::from(String::from("GO:0000001")));
    }

    #[test]
    fn display_roundtrip() {
        let s = SubjectId::from("NCBIGene:840");
        assert_eq!(s.to_string(), "NCBIGene:840");
        assert_eq!(s.as_str(), "NCBIGene:840");
        assert!(s == *"NCBIGene:840");
    }
}
