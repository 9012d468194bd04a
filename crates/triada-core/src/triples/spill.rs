//! Disk-backed triples building for graphs that do not fit in memory.
//!
//! Inserts append 12-byte records to a scratch file. Sorting re-reads the
//! scratch in fixed-size chunks, sorts each chunk in memory, writes the
//! chunks out as sorted runs, and then streams a k-way merge over the
//! memory-mapped runs with duplicate suppression. Only the chunk being
//! sorted and the final id list ever live in memory.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use log::{debug, warn};
use memmap2::Mmap;
use triada_common::{Error, Order, Result, TripleId};

use crate::triples::TriplesList;

/// Triples per sort chunk unless configured otherwise (12 MiB of records).
pub const DEFAULT_CHUNK_TRIPLES: usize = 1 << 20;

const RECORD_BYTES: usize = 12;

fn encode_record(t: &TripleId) -> [u8; RECORD_BYTES] {
    let mut rec = [0u8; RECORD_BYTES];
    rec[0..4].copy_from_slice(&t.subject.to_le_bytes());
    rec[4..8].copy_from_slice(&t.predicate.to_le_bytes());
    rec[8..12].copy_from_slice(&t.object.to_le_bytes());
    rec
}

fn decode_record(rec: &[u8]) -> TripleId {
    TripleId::new(
        u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]),
        u32::from_le_bytes([rec[4], rec[5], rec[6], rec[7]]),
        u32::from_le_bytes([rec[8], rec[9], rec[10], rec[11]]),
    )
}

/// An append-only, disk-backed triples list.
pub struct SpillTriplesList {
    writer: BufWriter<File>,
    scratch: PathBuf,
    dir: PathBuf,
    count: u64,
    chunk_triples: usize,
}

impl std::fmt::Debug for SpillTriplesList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpillTriplesList")
            .field("scratch", &self.scratch)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl SpillTriplesList {
    /// Opens a fresh scratch file under `dir`.
    pub fn create(dir: impl Into<PathBuf>, chunk_triples: usize) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let scratch = dir.join("triples.scratch");
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(&scratch)?;
        Ok(Self {
            writer: BufWriter::new(file),
            scratch,
            dir,
            count: 0,
            chunk_triples: chunk_triples.max(2),
        })
    }

    /// Appends one triple.
    pub fn insert(&mut self, triple: TripleId) -> Result<()> {
        self.writer.write_all(&encode_record(&triple))?;
        self.count += 1;
        Ok(())
    }

    /// Number of appended triples (duplicates included).
    #[must_use]
    pub fn num_triples(&self) -> u64 {
        self.count
    }

    /// Sorts the scratch content under `order`, removes duplicates, and
    /// returns the result as an in-memory list with that order
    /// established. All scratch and run files are removed afterwards.
    ///
    /// # Errors
    ///
    /// `NotSorted` for an `Unknown` order; `Io` for any file failure.
    pub fn into_sorted_list(mut self, order: Order) -> Result<TriplesList> {
        if order == Order::Unknown {
            return Err(Error::NotSorted);
        }
        self.writer.flush()?;

        // Phase one: chunk the scratch into sorted runs.
        let mut runs: Vec<PathBuf> = Vec::new();
        {
            let mut reader = BufReader::new(File::open(&self.scratch)?);
            let mut remaining = self.count;
            let mut chunk: Vec<TripleId> = Vec::with_capacity(self.chunk_triples.min(1 << 20));
            while remaining > 0 {
                chunk.clear();
                while remaining > 0 && chunk.len() < self.chunk_triples {
                    let mut rec = [0u8; RECORD_BYTES];
                    reader.read_exact(&mut rec)?;
                    chunk.push(decode_record(&rec));
                    remaining -= 1;
                }
                chunk.sort_unstable_by(|x, y| order.cmp_triples(x, y));
                chunk.dedup();

                let path = self.dir.join(format!("run-{:04}.spill", runs.len()));
                let mut out = BufWriter::new(File::create(&path)?);
                for t in &chunk {
                    out.write_all(&encode_record(t))?;
                }
                out.flush()?;
                runs.push(path);
            }
        }
        remove_quietly(&self.scratch);
        debug!("spill sort: {} triples across {} runs", self.count, runs.len());

        // Phase two: k-way merge over the memory-mapped runs.
        let mut sources = Vec::with_capacity(runs.len());
        for path in &runs {
            let file = File::open(path)?;
            // Safety: run files are private to this build and not mutated
            // while mapped.
            let map = unsafe { Mmap::map(&file)? };
            sources.push(RunCursor { map, pos: 0 });
        }

        let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::new();
        for (idx, src) in sources.iter().enumerate() {
            if let Some(t) = src.peek() {
                heap.push(Reverse(HeapEntry { key: order.encode(&t), triple: t, run: idx }));
            }
        }

        let mut merged: Vec<TripleId> = Vec::new();
        let mut last: Option<TripleId> = None;
        while let Some(Reverse(entry)) = heap.pop() {
            if last != Some(entry.triple) {
                merged.push(entry.triple);
                last = Some(entry.triple);
            }
            let src = &mut sources[entry.run];
            src.advance();
            if let Some(t) = src.peek() {
                heap.push(Reverse(HeapEntry { key: order.encode(&t), triple: t, run: entry.run }));
            }
        }

        drop(sources);
        for path in &runs {
            remove_quietly(path);
        }

        Ok(TriplesList::from_sorted(order, merged))
    }
}

fn remove_quietly(path: &std::path::Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("could not remove spill file {}: {e}", path.display());
    }
}

struct RunCursor {
    map: Mmap,
    pos: usize,
}

impl RunCursor {
    fn peek(&self) -> Option<TripleId> {
        let end = self.pos + RECORD_BYTES;
        (end <= self.map.len()).then(|| decode_record(&self.map[self.pos..end]))
    }

    fn advance(&mut self) {
        self.pos += RECORD_BYTES;
    }
}

#[derive(PartialEq, Eq)]
struct HeapEntry {
    key: (u32, u32, u32),
    triple: TripleId,
    run: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key).then(self.run.cmp(&other.run))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sorts_and_deduplicates_across_runs() {
        let dir = tempdir().unwrap();
        // Chunk size 4 forces several runs.
        let mut spill = SpillTriplesList::create(dir.path().join("work"), 4).unwrap();

        let mut reference = TriplesList::new();
        for i in (0..50u32).rev() {
            let t = TripleId::new(i % 7 + 1, i % 3 + 1, i % 5 + 1);
            spill.insert(t).unwrap();
            spill.insert(t).unwrap(); // duplicate in a different chunk position
            reference.insert(t);
        }
        assert_eq!(spill.num_triples(), 100);

        let list = spill.into_sorted_list(Order::Spo).unwrap();
        reference.sort(Order::Spo).unwrap();
        reference.remove_duplicates().unwrap();
        assert_eq!(list.as_slice(), reference.as_slice());
        assert_eq!(list.order(), Order::Spo);
    }

    #[test]
    fn empty_spill_yields_an_empty_list() {
        let dir = tempdir().unwrap();
        let spill = SpillTriplesList::create(dir.path(), DEFAULT_CHUNK_TRIPLES).unwrap();
        let list = spill.into_sorted_list(Order::Spo).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn unknown_order_is_rejected() {
        let dir = tempdir().unwrap();
        let spill = SpillTriplesList::create(dir.path(), 8).unwrap();
        assert!(matches!(spill.into_sorted_list(Order::Unknown), Err(Error::NotSorted)));
    }

    #[test]
    fn scratch_files_are_cleaned_up() {
        let dir = tempdir().unwrap();
        let work = dir.path().join("scratch");
        let mut spill = SpillTriplesList::create(&work, 4).unwrap();
        for i in 0..20u32 {
            spill.insert(TripleId::new(i + 1, 1, 1)).unwrap();
        }
        spill.into_sorted_list(Order::Spo).unwrap();
        let leftovers: Vec<_> = fs::read_dir(&work).unwrap().collect();
        assert!(leftovers.is_empty(), "spill files left behind: {leftovers:?}");
    }
}
