//! Run-length grouped id streams.
//!
//! The first coordinate is implicit: the `k`-th group of the `B` stream
//! belongs to `A = k`. Each `A` group in the `B` stream opens with its
//! length; each `(A, B)` pair owns one length-prefixed group in the `C`
//! stream, in `B`-stream order. Searching walks the groups sequentially,
//! skipping whole groups when the first coordinate is bound.

use std::io::{BufRead, Write};

use triada_common::{Error, Id, Order, Result, TripleId};

use crate::containers::LogSequence;
use crate::control::{ControlInfo, SectionKind, PROP_ORDER};
use crate::triples::{TriplesList, PROP_NUM_TRIPLES};
use crate::vocab;

/// Triples with run-length compressed first coordinate.
#[derive(Debug, Clone, Default)]
pub struct CompactTriples {
    order: Order,
    num_triples: usize,
    /// Per `A` value: group length, then that group's `B` values.
    b_stream: LogSequence,
    /// Per `(A, B)` pair: group length, then that pair's `C` values.
    c_stream: LogSequence,
}

impl CompactTriples {
    /// Transcodes a sorted, de-duplicated list.
    ///
    /// # Errors
    ///
    /// `NotSorted` without an established order; `Parse` when the first
    /// coordinate has gaps (the implicit numbering cannot express them).
    pub fn from_list(list: &TriplesList) -> Result<Self> {
        let order = list.order();
        if order == Order::Unknown {
            return Err(Error::NotSorted);
        }

        // Group sizes first so lengths and values can share one stream.
        let mut b_values: Vec<u64> = Vec::new();
        let mut c_values: Vec<u64> = Vec::new();
        let mut b_group_start: Option<usize> = None;
        let mut c_group_start: Option<usize> = None;
        let mut prev: Option<(Id, Id)> = None;

        for t in list.iter() {
            let (a, b, c) = order.encode(&t);
            let new_a = prev.map_or(true, |(pa, _)| a != pa);
            let new_b = new_a || prev.map_or(true, |(_, pb)| b != pb);
            if new_a {
                let expected = prev.map_or(1, |(pa, _)| pa + 1);
                if a != expected {
                    return Err(Error::parse(format!(
                        "first coordinate jumps from {} to {a}",
                        expected - 1
                    )));
                }
                if let Some(start) = b_group_start {
                    b_values[start] = (b_values.len() - start - 1) as u64;
                }
                b_group_start = Some(b_values.len());
                b_values.push(0); // patched when the group closes
            }
            if new_b {
                b_values.push(b.into());
                if let Some(start) = c_group_start {
                    c_values[start] = (c_values.len() - start - 1) as u64;
                }
                c_group_start = Some(c_values.len());
                c_values.push(0);
            }
            c_values.push(c.into());
            prev = Some((a, b));
        }
        if let Some(start) = b_group_start {
            b_values[start] = (b_values.len() - start - 1) as u64;
        }
        if let Some(start) = c_group_start {
            c_values[start] = (c_values.len() - start - 1) as u64;
        }

        Ok(Self {
            order,
            num_triples: list.num_triples(),
            b_stream: LogSequence::from_values(&b_values),
            c_stream: LogSequence::from_values(&c_values),
        })
    }

    /// Number of stored triples.
    #[must_use]
    pub fn num_triples(&self) -> usize {
        self.num_triples
    }

    /// The arrangement of the streams.
    #[must_use]
    pub fn order(&self) -> Order {
        self.order
    }

    /// Heap size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.b_stream.size_bytes() + self.c_stream.size_bytes()
    }

    /// Iterates over all triples matching `pattern`.
    #[must_use]
    pub fn search(&self, pattern: TripleId) -> CompactSearchIter<'_> {
        CompactSearchIter {
            triples: self,
            native: self.order.encode(&pattern),
            a: 0,
            b: 0,
            b_pos: 0,
            b_left: 0,
            c_pos: 0,
            c_left: 0,
        }
    }

    /// Writes the control block and the two streams.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut ci = ControlInfo::new(SectionKind::Triples);
        ci.set_format(vocab::TRIPLES_TYPE_COMPACT);
        ci.set(PROP_ORDER, self.order.to_string());
        ci.set(PROP_NUM_TRIPLES, self.num_triples.to_string());
        ci.save(writer)?;
        self.b_stream.save(writer)?;
        self.c_stream.save(writer)?;
        Ok(())
    }

    /// Reads back what [`save`](Self::save) wrote.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        if ci.format() != vocab::TRIPLES_TYPE_COMPACT {
            return Err(Error::Format { section: "triples", tag: ci.format().to_string() });
        }
        let order = Order::parse(ci.get(PROP_ORDER).unwrap_or(""));
        if order == Order::Unknown {
            return Err(Error::parse("compact triples section without a component order"));
        }
        let num_triples = ci
            .get_number(PROP_NUM_TRIPLES)
            .ok_or_else(|| Error::parse("triples block lacks a numTriples property"))?;
        let loaded = Self {
            order,
            num_triples: usize::try_from(num_triples)
                .map_err(|_| Error::parse("numTriples exceeds address space"))?,
            b_stream: LogSequence::load(reader)?,
            c_stream: LogSequence::load(reader)?,
        };
        loaded.validate()?;
        Ok(loaded)
    }

    /// Walks the group structure once, so a corrupt section fails at load
    /// time instead of panicking during a later search.
    fn validate(&self) -> Result<()> {
        let inconsistent = || Error::parse("compact triples streams are inconsistent");
        let mut b_pos = 0usize;
        let mut c_pos = 0usize;
        let mut triples = 0usize;
        while b_pos < self.b_stream.len() {
            let b_count = self.b_stream.get(b_pos) as usize;
            b_pos += 1;
            if b_pos + b_count > self.b_stream.len() {
                return Err(inconsistent());
            }
            b_pos += b_count;
            for _ in 0..b_count {
                if c_pos >= self.c_stream.len() {
                    return Err(inconsistent());
                }
                let c_count = self.c_stream.get(c_pos) as usize;
                c_pos += 1 + c_count;
                triples += c_count;
            }
        }
        if c_pos != self.c_stream.len() || triples != self.num_triples {
            return Err(inconsistent());
        }
        Ok(())
    }
}

/// Sequential group walker with a component filter.
pub struct CompactSearchIter<'a> {
    triples: &'a CompactTriples,
    native: (Id, Id, Id),
    /// Current first-coordinate value (0 before the first group).
    a: Id,
    /// Current second-coordinate value.
    b: Id,
    b_pos: usize,
    /// `B` entries left in the current `A` group.
    b_left: u64,
    c_pos: usize,
    /// `C` entries left in the current `(A, B)` group.
    c_left: u64,
}

impl CompactSearchIter<'_> {
    /// Skips the rest of the current `A` group in both streams.
    fn skip_a_group(&mut self) {
        let cs = &self.triples.c_stream;
        while self.b_left > 0 {
            self.b_pos += 1; // the B value itself
            self.b_left -= 1;
            let run = cs.get(self.c_pos);
            self.c_pos += 1 + run as usize;
        }
    }
}

impl Iterator for CompactSearchIter<'_> {
    type Item = TripleId;

    fn next(&mut self) -> Option<TripleId> {
        let bs = &self.triples.b_stream;
        let cs = &self.triples.c_stream;
        loop {
            if self.c_left > 0 {
                let c = cs.get(self.c_pos) as Id;
                self.c_pos += 1;
                self.c_left -= 1;
                if self.native.2 != 0 && c != self.native.2 {
                    continue;
                }
                return Some(self.triples.order.decode(self.a, self.b, c));
            }
            if self.b_left > 0 {
                self.b = bs.get(self.b_pos) as Id;
                self.b_pos += 1;
                self.b_left -= 1;
                let run = cs.get(self.c_pos);
                self.c_pos += 1;
                if self.native.1 != 0 && self.b != self.native.1 {
                    self.c_pos += run as usize;
                    continue;
                }
                self.c_left = run;
                continue;
            }
            if self.b_pos >= bs.len() {
                return None;
            }
            // A new A group begins with its length prefix.
            self.a += 1;
            self.b_left = bs.get(self.b_pos);
            self.b_pos += 1;
            if self.native.0 != 0 {
                if self.a > self.native.0 {
                    return None;
                }
                if self.a < self.native.0 {
                    self.skip_a_group();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(order: Order) -> CompactTriples {
        let mut list = TriplesList::new();
        for (s, p, o) in [(1, 1, 2), (1, 1, 3), (2, 2, 1), (2, 1, 3), (1, 2, 2)] {
            list.insert(TripleId::new(s, p, o));
        }
        list.sort(order).unwrap();
        list.remove_duplicates().unwrap();
        CompactTriples::from_list(&list).unwrap()
    }

    #[test]
    fn full_scan_matches_the_list_order() {
        let t = sample(Order::Spo);
        let all: Vec<_> = t.search(TripleId::any()).collect();
        assert_eq!(
            all,
            vec![
                TripleId::new(1, 1, 2),
                TripleId::new(1, 1, 3),
                TripleId::new(1, 2, 2),
                TripleId::new(2, 1, 3),
                TripleId::new(2, 2, 1),
            ]
        );
        assert_eq!(t.num_triples(), 5);
    }

    #[test]
    fn bound_first_coordinate_skips_groups() {
        let t = sample(Order::Spo);
        let hits: Vec<_> = t.search(TripleId::new(2, 0, 0)).collect();
        assert_eq!(hits, vec![TripleId::new(2, 1, 3), TripleId::new(2, 2, 1)]);
        assert_eq!(t.search(TripleId::new(9, 0, 0)).count(), 0);
    }

    #[test]
    fn bound_pair_and_full_patterns() {
        let t = sample(Order::Spo);
        let hits: Vec<_> = t.search(TripleId::new(1, 1, 0)).collect();
        assert_eq!(hits, vec![TripleId::new(1, 1, 2), TripleId::new(1, 1, 3)]);
        assert_eq!(t.search(TripleId::new(1, 1, 3)).count(), 1);
        assert_eq!(t.search(TripleId::new(1, 1, 9)).count(), 0);
        // Unbound prefix, bound suffix: post-filtered.
        let hits: Vec<_> = t.search(TripleId::new(0, 2, 0)).collect();
        assert_eq!(hits, vec![TripleId::new(1, 2, 2), TripleId::new(2, 2, 1)]);
    }

    #[test]
    fn alternative_order() {
        let t = sample(Order::Ops);
        let all: Vec<_> = t.search(TripleId::any()).collect();
        assert_eq!(all.len(), 5);
        // Native order is (object, predicate, subject).
        let mut expected = sample(Order::Spo).search(TripleId::any()).collect::<Vec<_>>();
        expected.sort_by(|x, y| Order::Ops.cmp_triples(x, y));
        assert_eq!(all, expected);
    }

    #[test]
    fn gaps_in_the_first_coordinate_are_rejected() {
        let mut list = TriplesList::new();
        list.insert(TripleId::new(1, 1, 1));
        list.insert(TripleId::new(3, 1, 1));
        list.sort(Order::Spo).unwrap();
        assert!(matches!(CompactTriples::from_list(&list), Err(Error::Parse(_))));
    }

    #[test]
    fn save_load_round_trip() {
        let t = sample(Order::Spo);
        let mut buf = Vec::new();
        t.save(&mut buf).unwrap();

        let mut cursor = buf.as_slice();
        let ci = ControlInfo::load(&mut cursor).unwrap();
        let loaded = CompactTriples::load(&ci, &mut cursor).unwrap();
        assert_eq!(loaded.num_triples(), 5);
        assert_eq!(
            loaded.search(TripleId::any()).collect::<Vec<_>>(),
            t.search(TripleId::any()).collect::<Vec<_>>()
        );

        let mut buf2 = Vec::new();
        loaded.save(&mut buf2).unwrap();
        assert_eq!(buf, buf2);
    }
}
