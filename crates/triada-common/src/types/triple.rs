//! Triples as strings and as identifier tuples.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dictionary-assigned identifier for a subject, predicate or object.
///
/// Valid identifiers start at 1; the value 0 means "unbound" in a triple
/// pattern and is never stored.
pub type Id = u32;

/// A triple of numeric identifiers.
///
/// Components equal to 0 act as wildcards when the value is used as a
/// search pattern. Stored triples always have all three components in
/// `[1, ..]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripleId {
    /// Subject id, in the combined shared + subject section.
    pub subject: Id,
    /// Predicate id, numbered independently.
    pub predicate: Id,
    /// Object id, in the combined shared + object section.
    pub object: Id,
}

impl TripleId {
    /// Creates a new identifier triple.
    #[must_use]
    pub const fn new(subject: Id, predicate: Id, object: Id) -> Self {
        Self { subject, predicate, object }
    }

    /// The all-wildcard pattern.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(0, 0, 0)
    }

    /// Whether all three components are bound (non-zero).
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.subject != 0 && self.predicate != 0 && self.object != 0
    }

    /// Whether this (concrete) triple matches `pattern`, where pattern
    /// components equal to 0 match anything.
    #[must_use]
    pub fn matches(&self, pattern: &TripleId) -> bool {
        (pattern.subject == 0 || pattern.subject == self.subject)
            && (pattern.predicate == 0 || pattern.predicate == self.predicate)
            && (pattern.object == 0 || pattern.object == self.object)
    }
}

impl fmt::Display for TripleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

/// A triple of owned strings, exactly as the RDF parser produced them.
///
/// No normalization is applied; IRIs keep their angle brackets and literals
/// their quoting. An empty component denotes a wildcard in search patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripleString {
    /// Subject term.
    pub subject: String,
    /// Predicate term.
    pub predicate: String,
    /// Object term.
    pub object: String,
}

impl TripleString {
    /// Creates a new string triple.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self { subject: subject.into(), predicate: predicate.into(), object: object.into() }
    }
}

impl fmt::Display for TripleString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matching() {
        let t = TripleId::new(1, 2, 3);
        assert!(t.matches(&TripleId::any()));
        assert!(t.matches(&TripleId::new(1, 0, 0)));
        assert!(t.matches(&TripleId::new(1, 2, 3)));
        assert!(t.matches(&TripleId::new(0, 2, 0)));
        assert!(!t.matches(&TripleId::new(2, 0, 0)));
        assert!(!t.matches(&TripleId::new(1, 2, 4)));
    }

    #[test]
    fn concreteness() {
        assert!(TripleId::new(1, 1, 1).is_concrete());
        assert!(!TripleId::new(1, 0, 1).is_concrete());
        assert!(!TripleId::any().is_concrete());
    }
}
