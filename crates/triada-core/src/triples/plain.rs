//! Three parallel bit-packed id streams.

use std::io::{BufRead, Write};

use triada_common::{Error, Id, Order, Result, TripleId};

use crate::containers::LogSequence;
use crate::control::{ControlInfo, SectionKind, PROP_ORDER};
use crate::triples::{TriplesList, PROP_NUM_TRIPLES};
use crate::vocab;

/// Triples as three columns `A`, `B`, `C` arranged by [`Order`].
///
/// There is no index: a bound first coordinate binary-searches the sorted
/// `A` column, everything else scans.
#[derive(Debug, Clone, Default)]
pub struct PlainTriples {
    order: Order,
    a: LogSequence,
    b: LogSequence,
    c: LogSequence,
}

impl PlainTriples {
    /// Transcodes a sorted, de-duplicated list.
    ///
    /// # Errors
    ///
    /// `NotSorted` when the list has no established order.
    pub fn from_list(list: &TriplesList) -> Result<Self> {
        let order = list.order();
        if order == Order::Unknown {
            return Err(Error::NotSorted);
        }
        let mut max = (0u64, 0u64, 0u64);
        for t in list.iter() {
            let (a, b, c) = order.encode(&t);
            max = (max.0.max(a.into()), max.1.max(b.into()), max.2.max(c.into()));
        }
        let mut cols = (
            LogSequence::with_width(crate::containers::bits_needed(max.0)),
            LogSequence::with_width(crate::containers::bits_needed(max.1)),
            LogSequence::with_width(crate::containers::bits_needed(max.2)),
        );
        for t in list.iter() {
            let (a, b, c) = order.encode(&t);
            cols.0.push(a.into());
            cols.1.push(b.into());
            cols.2.push(c.into());
        }
        Ok(Self { order, a: cols.0, b: cols.1, c: cols.2 })
    }

    /// Number of stored triples.
    #[must_use]
    pub fn num_triples(&self) -> usize {
        self.a.len()
    }

    /// The arrangement of the three columns.
    #[must_use]
    pub fn order(&self) -> Order {
        self.order
    }

    /// Heap size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.a.size_bytes() + self.b.size_bytes() + self.c.size_bytes()
    }

    /// Iterates over all triples matching `pattern`; a bound first
    /// coordinate narrows to a binary-searched range of `A`.
    #[must_use]
    pub fn search(&self, pattern: TripleId) -> PlainSearchIter<'_> {
        let native = self.order.encode(&pattern);
        let (lo, hi) = if native.0 != 0 {
            let lo = self.a.lower_bound(native.0.into(), 0, self.a.len());
            let hi = self.a.upper_bound(native.0.into(), lo, self.a.len());
            (lo, hi)
        } else {
            (0, self.a.len())
        };
        PlainSearchIter { triples: self, idx: lo, end: hi, native }
    }

    /// Writes the control block and the three columns.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut ci = ControlInfo::new(SectionKind::Triples);
        ci.set_format(vocab::TRIPLES_TYPE_PLAIN);
        ci.set(PROP_ORDER, self.order.to_string());
        ci.set(PROP_NUM_TRIPLES, self.num_triples().to_string());
        ci.save(writer)?;
        self.a.save(writer)?;
        self.b.save(writer)?;
        self.c.save(writer)?;
        Ok(())
    }

    /// Reads back what [`save`](Self::save) wrote.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        if ci.format() != vocab::TRIPLES_TYPE_PLAIN {
            return Err(Error::Format { section: "triples", tag: ci.format().to_string() });
        }
        let order = Order::parse(ci.get(PROP_ORDER).unwrap_or(""));
        if order == Order::Unknown {
            return Err(Error::parse("plain triples section without a component order"));
        }
        let a = LogSequence::load(reader)?;
        let b = LogSequence::load(reader)?;
        let c = LogSequence::load(reader)?;
        if a.len() != b.len() || b.len() != c.len() {
            return Err(Error::parse("plain triples columns differ in length"));
        }
        Ok(Self { order, a, b, c })
    }
}

/// Range iterator over the columns with a component filter.
pub struct PlainSearchIter<'a> {
    triples: &'a PlainTriples,
    idx: usize,
    end: usize,
    native: (Id, Id, Id),
}

impl Iterator for PlainSearchIter<'_> {
    type Item = TripleId;

    fn next(&mut self) -> Option<TripleId> {
        while self.idx < self.end {
            let i = self.idx;
            self.idx += 1;
            let b = self.triples.b.get(i) as Id;
            if self.native.1 != 0 && b != self.native.1 {
                continue;
            }
            let c = self.triples.c.get(i) as Id;
            if self.native.2 != 0 && c != self.native.2 {
                continue;
            }
            let a = self.triples.a.get(i) as Id;
            return Some(self.triples.order.decode(a, b, c));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(order: Order) -> PlainTriples {
        let mut list = TriplesList::new();
        for (s, p, o) in [(1, 1, 2), (1, 1, 3), (2, 2, 1), (2, 1, 3)] {
            list.insert(TripleId::new(s, p, o));
        }
        list.sort(order).unwrap();
        list.remove_duplicates().unwrap();
        PlainTriples::from_list(&list).unwrap()
    }

    #[test]
    fn requires_a_sorted_list() {
        let mut list = TriplesList::new();
        list.insert(TripleId::new(1, 1, 1));
        assert!(matches!(PlainTriples::from_list(&list), Err(Error::NotSorted)));
    }

    #[test]
    fn full_scan_yields_sorted_sequence() {
        let t = sample(Order::Spo);
        let all: Vec<_> = t.search(TripleId::any()).collect();
        assert_eq!(
            all,
            vec![
                TripleId::new(1, 1, 2),
                TripleId::new(1, 1, 3),
                TripleId::new(2, 1, 3),
                TripleId::new(2, 2, 1),
            ]
        );
    }

    #[test]
    fn bound_first_coordinate_uses_the_range() {
        let t = sample(Order::Spo);
        let hits: Vec<_> = t.search(TripleId::new(2, 0, 0)).collect();
        assert_eq!(hits, vec![TripleId::new(2, 1, 3), TripleId::new(2, 2, 1)]);
        assert_eq!(t.search(TripleId::new(7, 0, 0)).count(), 0);
    }

    #[test]
    fn non_native_patterns_post_filter() {
        let t = sample(Order::Pos);
        // POS arrangement: bound predicate narrows, others filter.
        let hits: Vec<_> = t.search(TripleId::new(0, 1, 3)).collect();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|t| t.predicate == 1 && t.object == 3));

        let hits: Vec<_> = t.search(TripleId::new(1, 0, 0)).collect();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn save_load_round_trip() {
        let t = sample(Order::Spo);
        let mut buf = Vec::new();
        t.save(&mut buf).unwrap();

        let mut cursor = buf.as_slice();
        let ci = ControlInfo::load(&mut cursor).unwrap();
        let loaded = PlainTriples::load(&ci, &mut cursor).unwrap();
        assert_eq!(loaded.order(), Order::Spo);
        assert_eq!(
            loaded.search(TripleId::any()).collect::<Vec<_>>(),
            t.search(TripleId::any()).collect::<Vec<_>>()
        );

        let mut buf2 = Vec::new();
        loaded.save(&mut buf2).unwrap();
        assert_eq!(buf, buf2);
    }
}
