//! Core value types for triples and their identifiers.
//!
//! - [`TripleString`] - a triple of owned strings, as produced by an RDF parser
//! - [`TripleId`] - a triple of numeric identifiers assigned by a dictionary
//! - [`Order`] - the component order of a sorted triples sequence
//! - [`TripleRole`] - the position a string occupies within a triple

mod order;
mod triple;

pub use order::Order;
pub use triple::{Id, TripleId, TripleString};

/// The position a string occupies within a triple.
///
/// Subjects and objects share one identifier space (strings occurring in
/// both roles get a single id); predicates are numbered independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripleRole {
    /// First component.
    Subject,
    /// Second component; independent id space.
    Predicate,
    /// Third component.
    Object,
}

impl TripleRole {
    /// Short lowercase name, used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TripleRole::Subject => "subject",
            TripleRole::Predicate => "predicate",
            TripleRole::Object => "object",
        }
    }
}
