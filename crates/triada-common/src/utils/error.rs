//! The single error type surfaced by every Triada crate.

use crate::types::TripleRole;
use thiserror::Error;

/// Result alias using the Triada [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building, persisting, or querying.
///
/// Build errors abort the operation and the façade re-creates empty
/// components; load errors leave the façade in a consistent empty state.
/// Pattern search never produces an error: unknown inputs simply yield no
/// matches.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: RDF text, binary container, or control block.
    #[error("parse error: {0}")]
    Parse(String),

    /// A known section kind carries an unrecognized implementation tag.
    #[error("unrecognized {section} format {tag:?}")]
    Format {
        /// Section kind being read ("dictionary", "triples", ...).
        section: &'static str,
        /// The offending tag from the control block.
        tag: String,
    },

    /// The underlying read or write failed.
    #[error("i/o failure")]
    Io(#[from] std::io::Error),

    /// Mutation was attempted on a finalized building form.
    #[error("component is already frozen")]
    AlreadyFrozen,

    /// An operation that requires a sorted sequence found an unsorted one.
    #[error("triples list is not sorted")]
    NotSorted,

    /// An id fell outside its partition's range on decode. Fatal; indicates
    /// a corrupt container or a mismatched dictionary.
    #[error("unknown {role} id {id}", role = .role.as_str())]
    UnknownId {
        /// The out-of-range identifier.
        id: u32,
        /// Which partition was consulted.
        role: TripleRole,
    },

    /// The progress listener requested abort.
    #[error("operation cancelled during {0}")]
    Cancelled(&'static str),

    /// The operation is intentionally unsupported.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl Error {
    /// Convenience constructor for [`Error::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}
