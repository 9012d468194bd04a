//! The mutable triples list: the building form.

use std::cmp::Ordering;
use std::io::{BufRead, Write};

use log::debug;
use triada_common::{Error, Order, Result, TripleId};

use crate::control::{ControlInfo, SectionKind, PROP_ORDER};
use crate::triples::PROP_NUM_TRIPLES;
use crate::vocab;

/// A growable array of id triples.
///
/// The list starts unordered; [`sort`](Self::sort) establishes an
/// [`Order`] and [`remove_duplicates`](Self::remove_duplicates) then
/// leaves a strictly increasing sequence under it. Any mutation drops the
/// order back to `Unknown`.
#[derive(Debug, Clone, Default)]
pub struct TriplesList {
    triples: Vec<TripleId>,
    order: Order,
}

impl TriplesList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` triples.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { triples: Vec::with_capacity(capacity), order: Order::Unknown }
    }

    /// Wraps a sequence that is already strictly increasing under `order`.
    ///
    /// Used by builders (external sort, container load) that produce
    /// sorted output; the invariant is the caller's to uphold.
    #[must_use]
    pub fn from_sorted(order: Order, triples: Vec<TripleId>) -> Self {
        debug_assert!(triples
            .windows(2)
            .all(|w| order.cmp_triples(&w[0], &w[1]) == Ordering::Less));
        Self { triples, order }
    }

    /// Number of stored triples (duplicates included until removed).
    #[must_use]
    pub fn num_triples(&self) -> usize {
        self.triples.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Heap size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.triples.len() * std::mem::size_of::<TripleId>()
    }

    /// The established order, `Unknown` until sorted.
    #[must_use]
    pub fn order(&self) -> Order {
        self.order
    }

    /// The stored triples in their current sequence.
    #[must_use]
    pub fn as_slice(&self) -> &[TripleId] {
        &self.triples
    }

    /// Clears the list for a fresh build.
    pub fn start_processing(&mut self) {
        self.triples.clear();
        self.order = Order::Unknown;
    }

    /// Marks the end of insertion. Kept for pipeline symmetry; the list
    /// stays mutable.
    pub fn stop_processing(&mut self) {}

    /// Appends a triple. The list loses its established order.
    pub fn insert(&mut self, triple: TripleId) {
        self.triples.push(triple);
        self.order = Order::Unknown;
    }

    /// Removes every triple matching `pattern` (0 components match
    /// anything), returning how many were dropped. Removal preserves the
    /// established order.
    pub fn remove(&mut self, pattern: &TripleId) -> usize {
        let before = self.triples.len();
        self.triples.retain(|t| !t.matches(pattern));
        before - self.triples.len()
    }

    /// Sorts under the lexicographic comparator induced by `order`.
    ///
    /// # Errors
    ///
    /// `NotSorted` when `order` is `Unknown` (there is nothing to sort by).
    pub fn sort(&mut self, order: Order) -> Result<()> {
        if order == Order::Unknown {
            return Err(Error::NotSorted);
        }
        self.triples.sort_unstable_by(|x, y| order.cmp_triples(x, y));
        self.order = order;
        Ok(())
    }

    /// Removes adjacent duplicates from a sorted list.
    ///
    /// # Errors
    ///
    /// `NotSorted` when [`sort`](Self::sort) has not established an order.
    pub fn remove_duplicates(&mut self) -> Result<()> {
        if self.order == Order::Unknown {
            return Err(Error::NotSorted);
        }
        let before = self.triples.len();
        self.triples.dedup();
        if before != self.triples.len() {
            debug!("dropped {} duplicate triples", before - self.triples.len());
        }
        Ok(())
    }

    /// Compares the first `prefix` order components of `t` against `key`.
    fn prefix_cmp(order: Order, t: &TripleId, key: (u32, u32, u32), prefix: usize) -> Ordering {
        let e = order.encode(t);
        let lhs = [e.0, e.1, e.2];
        let rhs = [key.0, key.1, key.2];
        lhs[..prefix].cmp(&rhs[..prefix])
    }

    /// Iterates over all triples matching `pattern`.
    ///
    /// When the stored order covers the pattern's bound components as a
    /// prefix, the scan narrows to a binary-searched range; otherwise it
    /// is linear. Results come back in the stored sequence.
    #[must_use]
    pub fn search(&self, pattern: TripleId) -> ListSearchIter<'_> {
        let mut lo = 0;
        let mut hi = self.triples.len();

        if self.order != Order::Unknown {
            let key = self.order.encode(&pattern);
            let bound = [key.0, key.1, key.2].iter().take_while(|&&c| c != 0).count();
            if bound > 0 {
                let order = self.order;
                lo = self
                    .triples
                    .partition_point(|t| Self::prefix_cmp(order, t, key, bound) == Ordering::Less);
                hi = self.triples.partition_point(|t| {
                    Self::prefix_cmp(order, t, key, bound) != Ordering::Greater
                });
            }
        }
        ListSearchIter { triples: &self.triples[lo..hi], idx: 0, pattern }
    }

    /// Iterates over all stored triples in their current sequence.
    pub fn iter(&self) -> impl Iterator<Item = TripleId> + '_ {
        self.triples.iter().copied()
    }

    /// Writes the control block and one 12-byte record per triple.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut ci = ControlInfo::new(SectionKind::Triples);
        ci.set_format(vocab::TRIPLES_TYPE_LIST);
        ci.set(PROP_ORDER, self.order.to_string());
        ci.set(PROP_NUM_TRIPLES, self.triples.len().to_string());
        ci.save(writer)?;

        for t in &self.triples {
            writer.write_all(&t.subject.to_le_bytes())?;
            writer.write_all(&t.predicate.to_le_bytes())?;
            writer.write_all(&t.object.to_le_bytes())?;
        }
        Ok(())
    }

    /// Reads back what [`save`](Self::save) wrote.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        if ci.format() != vocab::TRIPLES_TYPE_LIST {
            return Err(Error::Format { section: "triples", tag: ci.format().to_string() });
        }
        let order = Order::parse(ci.get(PROP_ORDER).unwrap_or("Unknown"));
        let count = ci
            .get_number(PROP_NUM_TRIPLES)
            .ok_or_else(|| Error::parse("triples block lacks a numTriples property"))?;

        let mut triples = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        let mut record = [0u8; 12];
        for _ in 0..count {
            reader.read_exact(&mut record)?;
            triples.push(TripleId::new(
                u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
                u32::from_le_bytes([record[4], record[5], record[6], record[7]]),
                u32::from_le_bytes([record[8], record[9], record[10], record[11]]),
            ));
        }
        Ok(Self { triples, order })
    }
}

/// Forward iterator over a (possibly narrowed) slice of the list.
pub struct ListSearchIter<'a> {
    triples: &'a [TripleId],
    idx: usize,
    pattern: TripleId,
}

impl Iterator for ListSearchIter<'_> {
    type Item = TripleId;

    fn next(&mut self) -> Option<TripleId> {
        while self.idx < self.triples.len() {
            let t = self.triples[self.idx];
            self.idx += 1;
            if t.matches(&self.pattern) {
                return Some(t);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TriplesList {
        let mut list = TriplesList::new();
        for (s, p, o) in [(2, 2, 1), (1, 1, 3), (1, 1, 2), (1, 1, 3)] {
            list.insert(TripleId::new(s, p, o));
        }
        list
    }

    #[test]
    fn sort_establishes_order() {
        let mut list = sample();
        assert_eq!(list.order(), Order::Unknown);
        list.sort(Order::Spo).unwrap();
        assert_eq!(list.order(), Order::Spo);
        let v: Vec<_> = list.iter().collect();
        assert_eq!(
            v,
            vec![
                TripleId::new(1, 1, 2),
                TripleId::new(1, 1, 3),
                TripleId::new(1, 1, 3),
                TripleId::new(2, 2, 1),
            ]
        );
    }

    #[test]
    fn sort_is_idempotent() {
        let mut a = sample();
        a.sort(Order::Pos).unwrap();
        let once: Vec<_> = a.iter().collect();
        a.sort(Order::Pos).unwrap();
        assert_eq!(a.iter().collect::<Vec<_>>(), once);
    }

    #[test]
    fn duplicates_need_a_sorted_list() {
        let mut list = sample();
        assert!(matches!(list.remove_duplicates(), Err(Error::NotSorted)));
        list.sort(Order::Spo).unwrap();
        list.remove_duplicates().unwrap();
        assert_eq!(list.num_triples(), 3);
        // Strictly increasing under the order.
        let v: Vec<_> = list.iter().collect();
        assert!(v.windows(2).all(|w| Order::Spo.cmp_triples(&w[0], &w[1]) == Ordering::Less));
    }

    #[test]
    fn insert_resets_order() {
        let mut list = sample();
        list.sort(Order::Spo).unwrap();
        list.insert(TripleId::new(9, 9, 9));
        assert_eq!(list.order(), Order::Unknown);
    }

    #[test]
    fn remove_by_pattern() {
        let mut list = sample();
        list.sort(Order::Spo).unwrap();
        list.remove_duplicates().unwrap();
        let removed = list.remove(&TripleId::new(1, 0, 0));
        assert_eq!(removed, 2);
        assert_eq!(list.num_triples(), 1);
        assert_eq!(list.order(), Order::Spo);
    }

    #[test]
    fn search_unsorted_is_a_full_scan() {
        let list = sample();
        let hits: Vec<_> = list.search(TripleId::new(1, 0, 0)).collect();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn search_sorted_narrows_by_prefix() {
        let mut list = sample();
        list.sort(Order::Spo).unwrap();
        list.remove_duplicates().unwrap();

        let hits: Vec<_> = list.search(TripleId::new(1, 0, 0)).collect();
        assert_eq!(hits, vec![TripleId::new(1, 1, 2), TripleId::new(1, 1, 3)]);

        let hits: Vec<_> = list.search(TripleId::new(1, 1, 3)).collect();
        assert_eq!(hits, vec![TripleId::new(1, 1, 3)]);

        // Bound component not a prefix of SPO: still correct via filter.
        let hits: Vec<_> = list.search(TripleId::new(0, 0, 1)).collect();
        assert_eq!(hits, vec![TripleId::new(2, 2, 1)]);

        assert_eq!(list.search(TripleId::new(5, 0, 0)).count(), 0);
    }

    #[test]
    fn save_load_round_trip() {
        let mut list = sample();
        list.sort(Order::Spo).unwrap();
        let mut buf = Vec::new();
        list.save(&mut buf).unwrap();

        let mut cursor = buf.as_slice();
        let ci = ControlInfo::load(&mut cursor).unwrap();
        let loaded = TriplesList::load(&ci, &mut cursor).unwrap();
        assert_eq!(loaded.order(), Order::Spo);
        assert_eq!(loaded.as_slice(), list.as_slice());

        let mut buf2 = Vec::new();
        loaded.save(&mut buf2).unwrap();
        assert_eq!(buf, buf2);
    }
}
