//! Physical representations of the `(subject, predicate, object)` id
//! tuples.
//!
//! Pick the form that fits the lifecycle stage:
//!
//! | Form | Mutable | Space | Search |
//! | ---- | ------- | ----- | ------ |
//! | [`TriplesList`] | yes | 12 bytes/triple | scan, or range when sorted |
//! | [`PlainTriples`] | no | 3 packed columns | binary on first column |
//! | [`CompactTriples`] | no | 2 grouped streams | group skip + filter |
//! | [`BitmapTriples`] | no | streams + bitmaps | `select1` slices |
//!
//! Every form answers `search(pattern)` where components equal to 0 match
//! anything; results always come back in the stored order. [`Triples`]
//! dispatches over whichever form a façade currently holds.

pub mod bitmap;
pub mod compact;
pub mod list;
pub mod plain;
#[cfg(feature = "spill")]
pub mod spill;

use std::io::{BufRead, Write};

use triada_common::{Order, Result, TripleId};

use crate::control::ControlInfo;
use crate::header::PlainHeader;
use crate::vocab;

pub use bitmap::{BitmapSearchIter, BitmapTriples};
pub use compact::{CompactSearchIter, CompactTriples};
pub use list::{ListSearchIter, TriplesList};
pub use plain::{PlainSearchIter, PlainTriples};

/// Control property with the stored triple count.
pub const PROP_NUM_TRIPLES: &str = "numTriples";

/// A triples section in any physical form.
#[derive(Debug, Clone)]
pub enum Triples {
    /// Mutable building form.
    List(TriplesList),
    /// Three parallel columns.
    Plain(PlainTriples),
    /// Run-length grouped streams.
    Compact(CompactTriples),
    /// Bitmap-delimited streams.
    Bitmap(BitmapTriples),
}

impl Default for Triples {
    fn default() -> Self {
        Triples::List(TriplesList::new())
    }
}

impl Triples {
    /// Number of stored triples.
    #[must_use]
    pub fn num_triples(&self) -> usize {
        match self {
            Triples::List(t) => t.num_triples(),
            Triples::Plain(t) => t.num_triples(),
            Triples::Compact(t) => t.num_triples(),
            Triples::Bitmap(t) => t.num_triples(),
        }
    }

    /// Heap size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        match self {
            Triples::List(t) => t.size_bytes(),
            Triples::Plain(t) => t.size_bytes(),
            Triples::Compact(t) => t.size_bytes(),
            Triples::Bitmap(t) => t.size_bytes(),
        }
    }

    /// The established component order; `Unknown` for an unsorted list.
    #[must_use]
    pub fn order(&self) -> Order {
        match self {
            Triples::List(t) => t.order(),
            Triples::Plain(t) => t.order(),
            Triples::Compact(t) => t.order(),
            Triples::Bitmap(t) => t.order(),
        }
    }

    /// The control-block format tag of the current form.
    #[must_use]
    pub fn format_tag(&self) -> &'static str {
        match self {
            Triples::List(_) => vocab::TRIPLES_TYPE_LIST,
            Triples::Plain(_) => vocab::TRIPLES_TYPE_PLAIN,
            Triples::Compact(_) => vocab::TRIPLES_TYPE_COMPACT,
            Triples::Bitmap(_) => vocab::TRIPLES_TYPE_BITMAP,
        }
    }

    /// Iterates over all triples matching `pattern` (0 matches anything).
    #[must_use]
    pub fn search(&self, pattern: TripleId) -> TriplesSearchIter<'_> {
        match self {
            Triples::List(t) => TriplesSearchIter::List(t.search(pattern)),
            Triples::Plain(t) => TriplesSearchIter::Plain(t.search(pattern)),
            Triples::Compact(t) => TriplesSearchIter::Compact(t.search(pattern)),
            Triples::Bitmap(t) => TriplesSearchIter::Bitmap(t.search(pattern)),
        }
    }

    /// Iterates over every stored triple in the stored order.
    #[must_use]
    pub fn iter(&self) -> TriplesSearchIter<'_> {
        self.search(TripleId::any())
    }

    /// Adds this section's statistics to the header under `node`.
    pub fn populate_header(&self, header: &mut PlainHeader, node: &str) {
        header.insert(node, vocab::RDF_TYPE, self.format_tag());
        header.insert_number(node, vocab::TRIPLES_NUM_TRIPLES, self.num_triples() as u64);
        header.insert(node, vocab::TRIPLES_ORDER, format!("\"{}\"", self.order()));
    }

    /// Writes the control block and payload of the current form.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        match self {
            Triples::List(t) => t.save(writer),
            Triples::Plain(t) => t.save(writer),
            Triples::Compact(t) => t.save(writer),
            Triples::Bitmap(t) => t.save(writer),
        }
    }

    /// Reads the variant named by the control block's format tag.
    ///
    /// # Errors
    ///
    /// `Format` for an unrecognized tag; `Parse`/`Io` for bad payloads.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        match ci.format() {
            vocab::TRIPLES_TYPE_LIST => Ok(Triples::List(TriplesList::load(ci, reader)?)),
            vocab::TRIPLES_TYPE_PLAIN => Ok(Triples::Plain(PlainTriples::load(ci, reader)?)),
            vocab::TRIPLES_TYPE_COMPACT => Ok(Triples::Compact(CompactTriples::load(ci, reader)?)),
            vocab::TRIPLES_TYPE_BITMAP => Ok(Triples::Bitmap(BitmapTriples::load(ci, reader)?)),
            tag => {
                Err(triada_common::Error::Format { section: "triples", tag: tag.to_string() })
            }
        }
    }
}

/// Search iterator over any physical form.
pub enum TriplesSearchIter<'a> {
    /// Iterator over a list range.
    List(ListSearchIter<'a>),
    /// Iterator over plain columns.
    Plain(PlainSearchIter<'a>),
    /// Iterator over compact groups.
    Compact(CompactSearchIter<'a>),
    /// Iterator over bitmap slices.
    Bitmap(BitmapSearchIter<'a>),
}

impl Iterator for TriplesSearchIter<'_> {
    type Item = TripleId;

    fn next(&mut self) -> Option<TripleId> {
        match self {
            TriplesSearchIter::List(it) => it.next(),
            TriplesSearchIter::Plain(it) => it.next(),
            TriplesSearchIter::Compact(it) => it.next(),
            TriplesSearchIter::Bitmap(it) => it.next(),
        }
    }
}
