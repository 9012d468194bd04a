//! The immutable plain-front-coded dictionary.
//!
//! Each partition is a byte stream of buckets. A bucket opens with its
//! first string stored verbatim; every following string stores the length
//! of its longest common prefix with its predecessor as a vbyte, then the
//! remaining suffix. All strings are NUL-terminated. A bit-packed array of
//! bucket start offsets gives O(1) access to buckets; lookups
//! binary-search the bucket heads and scan inside a single bucket.

use std::io::{BufRead, Write};

use log::debug;
use triada_common::{Error, Id, Result, TripleRole};

use crate::containers::{vbyte, LogSequence};
use crate::control::{ControlInfo, SectionKind};
use crate::dictionary::plain::{PlainDictionary, PROP_ELEMENTS, PROP_MAPPING, PROP_SIZE_STRINGS};
use crate::header::PlainHeader;
use crate::vocab;

/// Strings per bucket unless configured otherwise.
pub const DEFAULT_BUCKET_SIZE: usize = 16;

/// One front-coded partition.
#[derive(Debug, Clone, Default)]
pub struct PfcSection {
    num_strings: usize,
    bucket_size: usize,
    data: Vec<u8>,
    offsets: LogSequence,
}

impl PfcSection {
    /// Front-codes a lexicographically sorted slice of strings.
    #[must_use]
    pub fn build(strings: &[Box<str>], bucket_size: usize) -> Self {
        debug_assert!(bucket_size >= 2);
        debug_assert!(strings.windows(2).all(|w| w[0] < w[1]), "input must be sorted and unique");

        let mut data = Vec::new();
        let mut offsets = Vec::new();
        for bucket in strings.chunks(bucket_size) {
            offsets.push(data.len() as u64);
            let mut prev = bucket[0].as_bytes();
            data.extend_from_slice(prev);
            data.push(0);
            for s in &bucket[1..] {
                let bytes = s.as_bytes();
                let lcp = common_prefix(prev, bytes);
                vbyte::append(&mut data, lcp as u64);
                data.extend_from_slice(&bytes[lcp..]);
                data.push(0);
                prev = bytes;
            }
        }

        Self {
            num_strings: strings.len(),
            bucket_size,
            offsets: LogSequence::from_values(&offsets),
            data,
        }
    }

    /// Number of strings in this partition.
    #[must_use]
    pub fn num_strings(&self) -> usize {
        self.num_strings
    }

    /// Heap size of the packed data and offsets.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len() + self.offsets.size_bytes()
    }

    fn num_buckets(&self) -> usize {
        self.offsets.len()
    }

    /// The NUL-terminated byte run starting at `pos` (empty past the end).
    fn str_at(&self, pos: usize) -> &[u8] {
        let Some(tail) = self.data.get(pos..) else {
            return &[];
        };
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..end]
    }

    fn bucket_end(&self, bucket: usize) -> usize {
        if bucket + 1 < self.num_buckets() {
            self.offsets.get(bucket + 1) as usize
        } else {
            self.data.len()
        }
    }

    /// Local id (1-based) of `text`, or 0 when absent.
    #[must_use]
    pub fn locate(&self, text: &str) -> Id {
        if self.num_strings == 0 {
            return 0;
        }
        let element = text.as_bytes();

        // First bucket whose head is greater than the element.
        let mut lo = 0usize;
        let mut hi = self.num_buckets();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.str_at(self.offsets.get(mid) as usize) <= element {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == 0 {
            return 0;
        }
        let bucket = lo - 1;

        let mut pos = self.offsets.get(bucket) as usize;
        if pos > self.data.len() {
            return 0;
        }
        let end = self.bucket_end(bucket);
        let head = self.str_at(pos);
        if head == element {
            return (bucket * self.bucket_size + 1) as Id;
        }
        let mut current = head.to_vec();
        pos += head.len() + 1;

        for in_bucket in 1..self.bucket_size {
            if pos >= end {
                break;
            }
            let Ok((lcp, used)) = vbyte::decode(&self.data, pos) else {
                return 0;
            };
            pos += used;
            let suffix = self.str_at(pos);
            pos += suffix.len() + 1;
            current.truncate(lcp as usize);
            current.extend_from_slice(suffix);
            match current.as_slice().cmp(element) {
                std::cmp::Ordering::Equal => return (bucket * self.bucket_size + in_bucket + 1) as Id,
                std::cmp::Ordering::Greater => return 0,
                std::cmp::Ordering::Less => {}
            }
        }
        0
    }

    /// The string with local id `id` (1-based), or `None` out of range.
    #[must_use]
    pub fn extract(&self, id: Id) -> Option<String> {
        if id == 0 || id as usize > self.num_strings {
            return None;
        }
        let index = id as usize - 1;
        let bucket = index / self.bucket_size;
        let within = index % self.bucket_size;

        let mut pos = self.offsets.get(bucket) as usize;
        if pos > self.data.len() {
            return None;
        }
        let head = self.str_at(pos);
        let mut current = head.to_vec();
        pos += head.len() + 1;
        for _ in 0..within {
            let (lcp, used) = vbyte::decode(&self.data, pos).ok()?;
            pos += used;
            let suffix = self.str_at(pos);
            pos += suffix.len() + 1;
            current.truncate(lcp as usize);
            current.extend_from_slice(suffix);
        }
        String::from_utf8(current).ok()
    }

    /// Serializes this partition.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        vbyte::write(writer, self.num_strings as u64)?;
        vbyte::write(writer, self.bucket_size as u64)?;
        vbyte::write(writer, self.data.len() as u64)?;
        writer.write_all(&self.data)?;
        self.offsets.save(writer)?;
        Ok(())
    }

    /// Reads back one partition.
    pub fn load<R: BufRead + ?Sized>(reader: &mut R) -> Result<Self> {
        let num_strings = usize::try_from(vbyte::read(reader)?)
            .map_err(|_| Error::parse("pfc string count overflow"))?;
        let bucket_size = usize::try_from(vbyte::read(reader)?)
            .map_err(|_| Error::parse("pfc bucket size overflow"))?;
        if num_strings > 0 && bucket_size < 2 {
            return Err(Error::parse(format!("invalid pfc bucket size {bucket_size}")));
        }
        let total = usize::try_from(vbyte::read(reader)?)
            .map_err(|_| Error::parse("pfc byte count overflow"))?;
        let mut data = vec![0u8; total];
        reader.read_exact(&mut data)?;
        let offsets = LogSequence::load(reader)?;
        let expected_buckets = (num_strings + bucket_size.max(1) - 1) / bucket_size.max(1);
        if offsets.len() != expected_buckets {
            return Err(Error::parse(format!(
                "pfc bucket count mismatch: {} offsets for {num_strings} strings",
                offsets.len()
            )));
        }
        Ok(Self { num_strings, bucket_size, data, offsets })
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// The four-partition front-coded dictionary.
#[derive(Debug, Clone, Default)]
pub struct PfcDictionary {
    shared: PfcSection,
    subjects: PfcSection,
    objects: PfcSection,
    predicates: PfcSection,
}

impl PfcDictionary {
    /// Transcodes a finalized [`PlainDictionary`], preserving every id.
    ///
    /// # Errors
    ///
    /// `Parse` when the source dictionary has not been finalized.
    pub fn import(plain: &PlainDictionary, bucket_size: usize) -> Result<Self> {
        let [shared, subjects, objects, predicates] = plain
            .partitions()
            .ok_or_else(|| Error::parse("cannot front-code an unfinalized dictionary"))?;
        debug!(
            "front-coding {} shared / {} subject / {} object / {} predicate strings",
            shared.len(),
            subjects.len(),
            objects.len(),
            predicates.len()
        );
        Ok(Self {
            shared: PfcSection::build(shared, bucket_size),
            subjects: PfcSection::build(subjects, bucket_size),
            objects: PfcSection::build(objects, bucket_size),
            predicates: PfcSection::build(predicates, bucket_size),
        })
    }

    /// Number of strings occurring as both subject and object.
    #[must_use]
    pub fn num_shared(&self) -> usize {
        self.shared.num_strings()
    }

    /// Number of distinct subjects (shared included).
    #[must_use]
    pub fn num_subjects(&self) -> usize {
        self.shared.num_strings() + self.subjects.num_strings()
    }

    /// Number of distinct objects (shared included).
    #[must_use]
    pub fn num_objects(&self) -> usize {
        self.shared.num_strings() + self.objects.num_strings()
    }

    /// Number of distinct predicates.
    #[must_use]
    pub fn num_predicates(&self) -> usize {
        self.predicates.num_strings()
    }

    /// Total number of distinct terms.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.shared.num_strings()
            + self.subjects.num_strings()
            + self.objects.num_strings()
            + self.predicates.num_strings()
    }

    /// Heap size across the four partitions.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.shared.size_bytes()
            + self.subjects.size_bytes()
            + self.objects.size_bytes()
            + self.predicates.size_bytes()
    }

    /// Resolves a string under `role`, returning 0 when absent.
    #[must_use]
    pub fn string_to_id(&self, text: &str, role: TripleRole) -> Id {
        let shared_size = self.shared.num_strings() as Id;
        match role {
            TripleRole::Predicate => self.predicates.locate(text),
            TripleRole::Subject => match self.shared.locate(text) {
                0 => match self.subjects.locate(text) {
                    0 => 0,
                    local => shared_size + local,
                },
                id => id,
            },
            TripleRole::Object => match self.shared.locate(text) {
                0 => match self.objects.locate(text) {
                    0 => 0,
                    local => shared_size + local,
                },
                id => id,
            },
        }
    }

    /// Resolves an id under `role` back to its string.
    ///
    /// # Errors
    ///
    /// `UnknownId` when the id is 0 or outside the partition's range.
    pub fn id_to_string(&self, id: Id, role: TripleRole) -> Result<String> {
        let missing = || Error::UnknownId { id, role };
        let shared_size = self.shared.num_strings() as Id;
        match role {
            TripleRole::Predicate => self.predicates.extract(id).ok_or_else(missing),
            TripleRole::Subject if id <= shared_size => self.shared.extract(id).ok_or_else(missing),
            TripleRole::Subject => self.subjects.extract(id - shared_size).ok_or_else(missing),
            TripleRole::Object if id <= shared_size => self.shared.extract(id).ok_or_else(missing),
            TripleRole::Object => self.objects.extract(id - shared_size).ok_or_else(missing),
        }
    }

    /// Adds the partition statistics to the header under `node`.
    pub fn populate_header(&self, header: &mut PlainHeader, node: &str) {
        header.insert(node, vocab::RDF_TYPE, vocab::DICTIONARY_TYPE_PFC);
        header.insert_number(node, vocab::DICT_NUM_SHARED, self.num_shared() as u64);
        header.insert_number(node, vocab::DICT_NUM_SUBJECTS, self.num_subjects() as u64);
        header.insert_number(node, vocab::DICT_NUM_PREDICATES, self.num_predicates() as u64);
        header.insert_number(node, vocab::DICT_NUM_OBJECTS, self.num_objects() as u64);
    }

    /// Writes the control block and the four partitions in fixed order.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let total_bytes: usize = [&self.shared, &self.subjects, &self.objects, &self.predicates]
            .iter()
            .map(|s| s.data.len())
            .sum();
        let mut ci = ControlInfo::new(SectionKind::Dictionary);
        ci.set_format(vocab::DICTIONARY_TYPE_PFC);
        ci.set(PROP_MAPPING, "1");
        ci.set(PROP_ELEMENTS, self.num_elements().to_string());
        ci.set(PROP_SIZE_STRINGS, total_bytes.to_string());
        ci.save(writer)?;

        self.shared.save(writer)?;
        self.subjects.save(writer)?;
        self.objects.save(writer)?;
        self.predicates.save(writer)?;
        Ok(())
    }

    /// Reads back what [`save`](Self::save) wrote.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        if ci.format() != vocab::DICTIONARY_TYPE_PFC {
            return Err(Error::Format { section: "dictionary", tag: ci.format().to_string() });
        }
        Ok(Self {
            shared: PfcSection::load(reader)?,
            subjects: PfcSection::load(reader)?,
            objects: PfcSection::load(reader)?,
            predicates: PfcSection::load(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(strings: &[&str]) -> Vec<Box<str>> {
        strings.iter().map(|s| Box::from(*s)).collect()
    }

    #[test]
    fn section_locate_and_extract() {
        let strings = boxed(&[
            "http://example.org/alpha",
            "http://example.org/beta",
            "http://example.org/betamax",
            "http://example.org/gamma",
            "zzz",
        ]);
        let section = PfcSection::build(&strings, 2);
        assert_eq!(section.num_strings(), 5);

        for (i, s) in strings.iter().enumerate() {
            assert_eq!(section.locate(s), (i + 1) as Id, "{s}");
            assert_eq!(section.extract((i + 1) as Id).unwrap(), s.as_ref());
        }
        assert_eq!(section.locate("http://example.org/bet"), 0);
        assert_eq!(section.locate("aaa"), 0);
        assert_eq!(section.locate("zzzz"), 0);
        assert_eq!(section.extract(0), None);
        assert_eq!(section.extract(6), None);
    }

    #[test]
    fn empty_section() {
        let section = PfcSection::build(&[], DEFAULT_BUCKET_SIZE);
        assert_eq!(section.locate("anything"), 0);
        assert_eq!(section.extract(1), None);
    }

    #[test]
    fn bucket_boundaries_with_many_strings() {
        let strings: Vec<Box<str>> =
            (0..100).map(|i| format!("http://example.org/resource/{i:03}").into()).collect();
        let section = PfcSection::build(&strings, DEFAULT_BUCKET_SIZE);
        for (i, s) in strings.iter().enumerate() {
            assert_eq!(section.locate(s), (i + 1) as Id);
            assert_eq!(section.extract((i + 1) as Id).unwrap(), s.as_ref());
        }
    }

    /// Hand-assembles a section payload with the given parts.
    fn craft_section(num_strings: u64, bucket_size: u64, data: &[u8], offsets: &[u64]) -> PfcSection {
        let mut bytes = Vec::new();
        vbyte::append(&mut bytes, num_strings);
        vbyte::append(&mut bytes, bucket_size);
        vbyte::append(&mut bytes, data.len() as u64);
        bytes.extend_from_slice(data);
        LogSequence::from_values(offsets).save(&mut bytes).unwrap();
        PfcSection::load(&mut bytes.as_slice()).unwrap()
    }

    #[test]
    fn corrupted_offsets_fail_lookups_without_panicking() {
        // The second bucket's offset points far past the packed data.
        let section = craft_section(4, 2, b"a\0", &[0, 60]);
        assert_eq!(section.extract(4), None);
        assert_eq!(section.locate("zzz"), 0);
        // The intact first bucket still decodes.
        assert_eq!(section.extract(1).unwrap(), "a");
    }

    #[test]
    fn truncated_bucket_data_fails_lookups_without_panicking() {
        // The second string's prefix length is a dangling continuation
        // byte, so its vbyte never terminates.
        let section = craft_section(2, 2, b"a\0\x80", &[0]);
        assert_eq!(section.extract(1).unwrap(), "a");
        assert_eq!(section.extract(2), None);
        assert_eq!(section.locate("ab"), 0);
    }

    #[test]
    fn section_save_load_round_trip() {
        let strings: Vec<Box<str>> = (0..40).map(|i| format!("term{i:02}").into()).collect();
        let section = PfcSection::build(&strings, 7);
        let mut buf = Vec::new();
        section.save(&mut buf).unwrap();
        let loaded = PfcSection::load(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.num_strings(), 40);
        assert_eq!(loaded.locate("term25"), 26);
        assert_eq!(loaded.extract(1).unwrap(), "term00");

        let mut buf2 = Vec::new();
        loaded.save(&mut buf2).unwrap();
        assert_eq!(buf, buf2);
    }

    fn finalized_plain() -> PlainDictionary {
        use triada_common::TripleRole::{Object, Predicate, Subject};
        let mut d = PlainDictionary::new();
        for (s, p, o) in [("<a>", "<p>", "<b>"), ("<a>", "<p>", "<c>"), ("<b>", "<q>", "<a>")] {
            d.insert(s, Subject).unwrap();
            d.insert(p, Predicate).unwrap();
            d.insert(o, Object).unwrap();
        }
        d.stop_processing().unwrap();
        d
    }

    #[test]
    fn import_preserves_ids() {
        let plain = finalized_plain();
        let pfc = PfcDictionary::import(&plain, DEFAULT_BUCKET_SIZE).unwrap();

        assert_eq!(pfc.num_shared(), plain.num_shared());
        assert_eq!(pfc.num_elements(), plain.num_elements());
        for role in [TripleRole::Subject, TripleRole::Object, TripleRole::Predicate] {
            let count = match role {
                TripleRole::Subject => plain.num_subjects(),
                TripleRole::Object => plain.num_objects(),
                TripleRole::Predicate => plain.num_predicates(),
            };
            for id in 1..=count as Id {
                let expected = plain.id_to_string(id, role).unwrap();
                assert_eq!(pfc.id_to_string(id, role).unwrap(), expected);
                assert_eq!(pfc.string_to_id(expected, role), id);
            }
        }
    }

    #[test]
    fn import_requires_finalized_source() {
        let plain = PlainDictionary::new();
        assert!(PfcDictionary::import(&plain, DEFAULT_BUCKET_SIZE).is_err());
    }

    #[test]
    fn dictionary_save_load_round_trip() {
        let pfc = PfcDictionary::import(&finalized_plain(), DEFAULT_BUCKET_SIZE).unwrap();
        let mut buf = Vec::new();
        pfc.save(&mut buf).unwrap();

        let mut cursor = buf.as_slice();
        let ci = ControlInfo::load(&mut cursor).unwrap();
        assert_eq!(ci.format(), vocab::DICTIONARY_TYPE_PFC);
        let loaded = PfcDictionary::load(&ci, &mut cursor).unwrap();
        assert_eq!(loaded.string_to_id("<c>", TripleRole::Object), 3);
        assert_eq!(loaded.id_to_string(1, TripleRole::Subject).unwrap(), "<a>");

        let mut buf2 = Vec::new();
        loaded.save(&mut buf2).unwrap();
        assert_eq!(buf, buf2);
    }

    #[test]
    fn unknown_strings_and_ids() {
        let pfc = PfcDictionary::import(&finalized_plain(), DEFAULT_BUCKET_SIZE).unwrap();
        assert_eq!(pfc.string_to_id("<missing>", TripleRole::Subject), 0);
        assert!(matches!(
            pfc.id_to_string(17, TripleRole::Object),
            Err(Error::UnknownId { id: 17, .. })
        ));
    }
}
