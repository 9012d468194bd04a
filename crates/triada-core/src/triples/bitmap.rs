//! Bitmap-delimited id streams: the canonical compact form.
//!
//! For a sorted sequence in order `(A, B, C)`:
//!
//! - `Y` holds, per distinct `A` in order, that group's distinct `B`
//!   values; `Bp[i] = 1` marks the last `Y` entry of its `A` group.
//! - `Z` holds, per `(A, B)` pair in `Y` order, that pair's `C` values;
//!   `Bo[j] = 1` marks the last `Z` entry of its pair.
//! - `A` is implicit: the `k`-th `Bp` group is `A = k`.
//!
//! Bound-prefix patterns resolve to `Y`/`Z` slices through `select1` and
//! binary search; patterns whose bound components are not a prefix of the
//! native order iterate the superset slice and post-filter.

use std::io::{BufRead, Write};

use log::debug;
use triada_common::{Error, Id, Order, Result, TripleId};

use crate::containers::{Bitmap, BitmapBuilder, LogSequence};
use crate::control::{ControlInfo, SectionKind, PROP_ORDER};
use crate::triples::{TriplesList, PROP_NUM_TRIPLES};
use crate::vocab;

/// Triples as two bit-packed streams delimited by two bitmaps.
#[derive(Debug, Clone, Default)]
pub struct BitmapTriples {
    order: Order,
    bp: Bitmap,
    y: LogSequence,
    bo: Bitmap,
    z: LogSequence,
}

impl BitmapTriples {
    /// Transcodes a sorted, de-duplicated list.
    ///
    /// # Errors
    ///
    /// `NotSorted` when the list has no established order or is not
    /// strictly increasing under it; `Parse` when the first coordinate has
    /// gaps (the implicit numbering cannot express them).
    pub fn from_list(list: &TriplesList) -> Result<Self> {
        let order = list.order();
        if order == Order::Unknown {
            return Err(Error::NotSorted);
        }

        let mut y_values: Vec<u64> = Vec::new();
        let mut z_values: Vec<u64> = Vec::new();
        let mut bp = BitmapBuilder::new();
        let mut bo = BitmapBuilder::new();
        let mut prev: Option<(Id, Id, Id)> = None;

        for t in list.iter() {
            let (a, b, c) = order.encode(&t);
            match prev {
                Some(p) if (a, b, c) <= p => return Err(Error::NotSorted),
                Some((pa, pb, _)) if a == pa && b == pb => {
                    bo.push(false);
                    z_values.push(c.into());
                }
                Some((pa, _, _)) if a == pa => {
                    bp.push(false);
                    y_values.push(b.into());
                    bo.push(true);
                    z_values.push(c.into());
                }
                Some((pa, _, _)) => {
                    if a != pa + 1 {
                        return Err(Error::parse(format!(
                            "first coordinate jumps from {pa} to {a}"
                        )));
                    }
                    bp.push(true);
                    y_values.push(b.into());
                    bo.push(true);
                    z_values.push(c.into());
                }
                None => {
                    if a != 1 {
                        return Err(Error::parse(format!("first coordinate starts at {a}")));
                    }
                    y_values.push(b.into());
                    z_values.push(c.into());
                }
            }
            prev = Some((a, b, c));
        }
        // The boundary bits trail their entries by one position.
        if prev.is_some() {
            bp.push(true);
            bo.push(true);
        }

        let bp = bp.finish();
        debug!(
            "bitmap triples: {} triples, {} (a,b) pairs, {} first-level groups",
            z_values.len(),
            y_values.len(),
            bp.count_ones()
        );

        Ok(Self {
            order,
            bp,
            y: LogSequence::from_values(&y_values),
            bo: bo.finish(),
            z: LogSequence::from_values(&z_values),
        })
    }

    /// Number of stored triples.
    #[must_use]
    pub fn num_triples(&self) -> usize {
        self.z.len()
    }

    /// The arrangement of the streams.
    #[must_use]
    pub fn order(&self) -> Order {
        self.order
    }

    /// Heap size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bp.size_bytes() + self.y.size_bytes() + self.bo.size_bytes() + self.z.size_bytes()
    }

    /// Number of distinct first-coordinate values.
    #[must_use]
    pub fn num_first(&self) -> usize {
        self.bp.count_ones()
    }

    /// `Y` slice `[start, end)` of first-coordinate value `a`.
    fn y_bounds(&self, a: Id) -> (usize, usize) {
        let start = if a > 1 { self.bp.select1(a as usize - 1).map_or(0, |p| p + 1) } else { 0 };
        let end = self.bp.select1(a as usize).map_or(self.y.len(), |p| p + 1);
        (start, end)
    }

    /// `Z` slice `[start, end)` of the `Y` entry at `y_idx`.
    fn z_bounds(&self, y_idx: usize) -> (usize, usize) {
        let start = if y_idx > 0 { self.bo.select1(y_idx).map_or(0, |p| p + 1) } else { 0 };
        let end = self.bo.select1(y_idx + 1).map_or(self.z.len(), |p| p + 1);
        (start, end)
    }

    /// Iterates over all triples matching `pattern`.
    #[must_use]
    pub fn search(&self, pattern: TripleId) -> BitmapSearchIter<'_> {
        let native = self.order.encode(&pattern);
        let (pa, pb, pc) = native;

        let empty = |t| BitmapSearchIter { triples: t, native, a: 1, y_pos: 0, z_pos: 0, z_end: 0 };

        if pa == 0 {
            // Full scan; pb/pc are post-filtered.
            return BitmapSearchIter {
                triples: self,
                native,
                a: 1,
                y_pos: 0,
                z_pos: 0,
                z_end: self.z.len(),
            };
        }
        if pa as usize > self.num_first() {
            return empty(self);
        }
        let (y_start, y_end) = self.y_bounds(pa);
        if pb == 0 {
            let (z_start, _) = self.z_bounds(y_start);
            let (_, z_end) = self.z_bounds(y_end - 1);
            return BitmapSearchIter {
                triples: self,
                native,
                a: pa,
                y_pos: y_start,
                z_pos: z_start,
                z_end,
            };
        }
        // The B slice of one A value is sorted: binary search it.
        let Some(y_pos) = self.y.binary_search_range(pb.into(), y_start, y_end) else {
            return empty(self);
        };
        let (z_start, z_end) = self.z_bounds(y_pos);
        if pc == 0 {
            return BitmapSearchIter {
                triples: self,
                native,
                a: pa,
                y_pos,
                z_pos: z_start,
                z_end,
            };
        }
        match self.z.binary_search_range(pc.into(), z_start, z_end) {
            Some(z_pos) => BitmapSearchIter {
                triples: self,
                native,
                a: pa,
                y_pos,
                z_pos,
                z_end: z_pos + 1,
            },
            None => empty(self),
        }
    }

    /// Writes the control block, then `Bp`, `Y`, `Bo`, `Z`.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut ci = ControlInfo::new(SectionKind::Triples);
        ci.set_format(vocab::TRIPLES_TYPE_BITMAP);
        ci.set(PROP_ORDER, self.order.to_string());
        ci.set(PROP_NUM_TRIPLES, self.num_triples().to_string());
        ci.save(writer)?;
        self.bp.save(writer)?;
        self.y.save(writer)?;
        self.bo.save(writer)?;
        self.z.save(writer)?;
        Ok(())
    }

    /// Reads back what [`save`](Self::save) wrote.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        if ci.format() != vocab::TRIPLES_TYPE_BITMAP {
            return Err(Error::Format { section: "triples", tag: ci.format().to_string() });
        }
        let order = Order::parse(ci.get(PROP_ORDER).unwrap_or(""));
        if order == Order::Unknown {
            return Err(Error::parse("bitmap triples section without a component order"));
        }
        let bp = Bitmap::load(reader)?;
        let y = LogSequence::load(reader)?;
        let bo = Bitmap::load(reader)?;
        let z = LogSequence::load(reader)?;
        if bp.len() != y.len() || bo.len() != z.len() || bo.count_ones() != y.len() {
            return Err(Error::parse("bitmap triples streams are inconsistent"));
        }
        Ok(Self { order, bp, y, bo, z })
    }
}

/// Walks a `Z` range, tracking the `Y` position and implicit `A` value.
pub struct BitmapSearchIter<'a> {
    triples: &'a BitmapTriples,
    native: (Id, Id, Id),
    a: Id,
    y_pos: usize,
    z_pos: usize,
    z_end: usize,
}

impl Iterator for BitmapSearchIter<'_> {
    type Item = TripleId;

    fn next(&mut self) -> Option<TripleId> {
        let t = self.triples;
        while self.z_pos < self.z_end {
            let z_pos = self.z_pos;
            self.z_pos += 1;

            let b = t.y.get(self.y_pos) as Id;
            let c = t.z.get(z_pos) as Id;
            let a = self.a;

            // Boundary bits advance Y and the implicit A for the next turn.
            if t.bo.get(z_pos) {
                if t.bp.get(self.y_pos) {
                    self.a += 1;
                }
                self.y_pos += 1;
            }

            if (self.native.1 == 0 || b == self.native.1)
                && (self.native.2 == 0 || c == self.native.2)
            {
                return Some(t.order.decode(a, b, c));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(triples: &[(Id, Id, Id)], order: Order) -> TriplesList {
        let mut list = TriplesList::new();
        for &(s, p, o) in triples {
            list.insert(TripleId::new(s, p, o));
        }
        list.sort(order).unwrap();
        list.remove_duplicates().unwrap();
        list
    }

    fn sample() -> BitmapTriples {
        // The S1 scenario graph: (1,1,2), (1,1,3), (2,2,1) in SPO.
        BitmapTriples::from_list(&listing(&[(2, 2, 1), (1, 1, 3), (1, 1, 2)], Order::Spo)).unwrap()
    }

    #[test]
    fn construction_shapes() {
        let t = sample();
        assert_eq!(t.num_triples(), 3);
        assert_eq!(t.num_first(), 2);
        assert_eq!(t.y.len(), 2); // (1,1) and (2,2)
        assert_eq!(t.z.len(), 3);
    }

    #[test]
    fn full_scan_in_spo_order() {
        let t = sample();
        let all: Vec<_> = t.search(TripleId::any()).collect();
        assert_eq!(
            all,
            vec![TripleId::new(1, 1, 2), TripleId::new(1, 1, 3), TripleId::new(2, 2, 1)]
        );
    }

    #[test]
    fn every_pattern_shape_matches_a_filter() {
        let triples: Vec<(Id, Id, Id)> = vec![
            (1, 1, 1),
            (1, 1, 4),
            (1, 2, 2),
            (2, 1, 1),
            (2, 3, 3),
            (3, 1, 2),
            (3, 2, 2),
            (3, 2, 4),
        ];
        for order in [Order::Spo, Order::Pos, Order::Ops] {
            let list = listing(&triples, order);
            let t = BitmapTriples::from_list(&list).unwrap();
            let all: Vec<_> = list.iter().collect();

            for s in 0..=3u32 {
                for p in 0..=3u32 {
                    for o in 0..=4u32 {
                        let pattern = TripleId::new(s, p, o);
                        let got: Vec<_> = t.search(pattern).collect();
                        let mut expected: Vec<_> =
                            all.iter().filter(|t| t.matches(&pattern)).copied().collect();
                        expected.sort_by(|x, y| order.cmp_triples(x, y));
                        assert_eq!(got, expected, "order {order}, pattern {pattern}");
                    }
                }
            }
        }
    }

    #[test]
    fn bound_prefix_searches_use_slices() {
        let t = sample();
        let hits: Vec<_> = t.search(TripleId::new(1, 0, 0)).collect();
        assert_eq!(hits, vec![TripleId::new(1, 1, 2), TripleId::new(1, 1, 3)]);

        let hits: Vec<_> = t.search(TripleId::new(1, 1, 3)).collect();
        assert_eq!(hits, vec![TripleId::new(1, 1, 3)]);

        assert_eq!(t.search(TripleId::new(4, 0, 0)).count(), 0);
        assert_eq!(t.search(TripleId::new(1, 2, 0)).count(), 0);
        assert_eq!(t.search(TripleId::new(1, 1, 9)).count(), 0);
    }

    #[test]
    fn unsorted_and_gapped_lists_are_rejected() {
        let mut unsorted = TriplesList::new();
        unsorted.insert(TripleId::new(1, 1, 1));
        assert!(matches!(BitmapTriples::from_list(&unsorted), Err(Error::NotSorted)));

        let gapped = listing(&[(1, 1, 1), (3, 1, 1)], Order::Spo);
        assert!(matches!(BitmapTriples::from_list(&gapped), Err(Error::Parse(_))));

        let late_start = listing(&[(2, 1, 1)], Order::Spo);
        assert!(matches!(BitmapTriples::from_list(&late_start), Err(Error::Parse(_))));
    }

    #[test]
    fn empty_list_builds_an_empty_section() {
        let list = listing(&[], Order::Spo);
        let t = BitmapTriples::from_list(&list).unwrap();
        assert_eq!(t.num_triples(), 0);
        assert_eq!(t.search(TripleId::any()).count(), 0);
    }

    #[test]
    fn save_load_round_trip() {
        let t = sample();
        let mut buf = Vec::new();
        t.save(&mut buf).unwrap();

        let mut cursor = buf.as_slice();
        let ci = ControlInfo::load(&mut cursor).unwrap();
        assert_eq!(ci.format(), vocab::TRIPLES_TYPE_BITMAP);
        assert_eq!(ci.get(PROP_ORDER), Some("SPO"));
        let loaded = BitmapTriples::load(&ci, &mut cursor).unwrap();
        assert_eq!(loaded.num_triples(), 3);
        assert_eq!(
            loaded.search(TripleId::any()).collect::<Vec<_>>(),
            t.search(TripleId::any()).collect::<Vec<_>>()
        );

        let mut buf2 = Vec::new();
        loaded.save(&mut buf2).unwrap();
        assert_eq!(buf, buf2);
    }
}
