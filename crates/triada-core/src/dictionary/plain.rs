//! The hash-backed building dictionary.

use std::io::{BufRead, Write};

use triada_common::collections::TriadaMap;
use triada_common::{Error, Id, Result, TripleRole};

use crate::containers::vbyte;
use crate::control::{ControlInfo, SectionKind};
use crate::header::PlainHeader;
use crate::vocab;

/// Control property distinguishing the partition layouts.
pub const PROP_MAPPING: &str = "mapping";
/// Control property with the total string byte count.
pub const PROP_SIZE_STRINGS: &str = "sizeStrings";
/// Control property with the number of distinct terms.
pub const PROP_ELEMENTS: &str = "elements";

/// One growing string namespace with insertion-order ids.
#[derive(Debug, Default, Clone)]
struct Registry {
    list: Vec<Box<str>>,
    index: TriadaMap<Box<str>, Id>,
}

impl Registry {
    fn get_or_insert(&mut self, text: &str) -> Id {
        if let Some(&id) = self.index.get(text) {
            return id;
        }
        let boxed: Box<str> = text.into();
        self.list.push(boxed.clone());
        let id = self.list.len() as Id;
        self.index.insert(boxed, id);
        id
    }

    fn id_of(&self, text: &str) -> Id {
        self.index.get(text).copied().unwrap_or(0)
    }

    fn get(&self, id: Id) -> Option<&str> {
        self.list.get(id as usize - 1).map(AsRef::as_ref)
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn byte_len(&self) -> usize {
        self.list.iter().map(|s| s.len()).sum()
    }
}

/// Where a string landed after finalization.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Shared(u32),
    SubjectOnly(u32),
    ObjectOnly(u32),
}

#[derive(Debug, Default, Clone)]
struct Frozen {
    shared: Vec<Box<str>>,
    subjects: Vec<Box<str>>,
    objects: Vec<Box<str>>,
    predicates: Vec<Box<str>>,
    terms: TriadaMap<Box<str>, Slot>,
    preds: TriadaMap<Box<str>, u32>,
}

impl Frozen {
    fn from_partitions(
        shared: Vec<Box<str>>,
        subjects: Vec<Box<str>>,
        objects: Vec<Box<str>>,
        predicates: Vec<Box<str>>,
    ) -> Self {
        let mut terms = TriadaMap::default();
        for (i, s) in shared.iter().enumerate() {
            terms.insert(s.clone(), Slot::Shared(i as u32));
        }
        for (i, s) in subjects.iter().enumerate() {
            terms.insert(s.clone(), Slot::SubjectOnly(i as u32));
        }
        for (i, s) in objects.iter().enumerate() {
            terms.insert(s.clone(), Slot::ObjectOnly(i as u32));
        }
        let mut preds = TriadaMap::default();
        for (i, s) in predicates.iter().enumerate() {
            preds.insert(s.clone(), i as u32);
        }
        Self { shared, subjects, objects, predicates, terms, preds }
    }
}

#[derive(Debug, Clone)]
enum State {
    Building { subjects: Registry, objects: Registry, predicates: Registry },
    Frozen(Frozen),
}

impl Default for State {
    fn default() -> Self {
        State::Building {
            subjects: Registry::default(),
            objects: Registry::default(),
            predicates: Registry::default(),
        }
    }
}

/// The mutable, hash-backed dictionary used while building.
///
/// While building, each role keeps its own namespace and ids follow
/// insertion order; the four-partition layout with its shared-prefix id
/// assignment exists only after [`stop_processing`](Self::stop_processing)
/// sorts and renumbers everything. Lookups work in both states and always
/// reflect the current mapping.
#[derive(Debug, Default, Clone)]
pub struct PlainDictionary {
    state: State,
}

impl PlainDictionary {
    /// Creates an empty building dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all content and returns to the building state.
    pub fn start_processing(&mut self) {
        self.state = State::default();
    }

    /// Whether [`stop_processing`](Self::stop_processing) has run.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, State::Frozen(_))
    }

    /// Records `text` under `role` and returns its id under the current
    /// (tentative) numbering.
    ///
    /// # Errors
    ///
    /// `AlreadyFrozen` after finalization; `Parse` for an empty term.
    pub fn insert(&mut self, text: &str, role: TripleRole) -> Result<Id> {
        if text.is_empty() {
            return Err(Error::parse("empty term cannot be inserted"));
        }
        match &mut self.state {
            State::Frozen(_) => Err(Error::AlreadyFrozen),
            State::Building { subjects, objects, predicates } => Ok(match role {
                TripleRole::Subject => subjects.get_or_insert(text),
                TripleRole::Object => objects.get_or_insert(text),
                TripleRole::Predicate => predicates.get_or_insert(text),
            }),
        }
    }

    /// Partitions, sorts, and renumbers per the four-partition layout.
    ///
    /// # Errors
    ///
    /// `AlreadyFrozen` when called twice.
    pub fn stop_processing(&mut self) -> Result<()> {
        let State::Building { subjects, objects, predicates } = &mut self.state else {
            return Err(Error::AlreadyFrozen);
        };

        let mut shared = Vec::new();
        let mut subject_only = Vec::new();
        for s in &subjects.list {
            if objects.index.contains_key(s.as_ref()) {
                shared.push(s.clone());
            } else {
                subject_only.push(s.clone());
            }
        }
        let mut object_only: Vec<Box<str>> = objects
            .list
            .iter()
            .filter(|s| !subjects.index.contains_key(s.as_ref()))
            .cloned()
            .collect();
        let mut preds: Vec<Box<str>> = predicates.list.clone();

        shared.sort_unstable();
        subject_only.sort_unstable();
        object_only.sort_unstable();
        preds.sort_unstable();

        self.state =
            State::Frozen(Frozen::from_partitions(shared, subject_only, object_only, preds));
        Ok(())
    }

    /// Number of strings occurring as both subject and object.
    #[must_use]
    pub fn num_shared(&self) -> usize {
        match &self.state {
            State::Frozen(f) => f.shared.len(),
            State::Building { subjects, objects, .. } => {
                // Computed on demand; the building form keeps no shared set.
                let (small, large) = if subjects.len() <= objects.len() {
                    (subjects, objects)
                } else {
                    (objects, subjects)
                };
                small.list.iter().filter(|s| large.index.contains_key(s.as_ref())).count()
            }
        }
    }

    /// Number of distinct subjects (shared included).
    #[must_use]
    pub fn num_subjects(&self) -> usize {
        match &self.state {
            State::Frozen(f) => f.shared.len() + f.subjects.len(),
            State::Building { subjects, .. } => subjects.len(),
        }
    }

    /// Number of distinct objects (shared included).
    #[must_use]
    pub fn num_objects(&self) -> usize {
        match &self.state {
            State::Frozen(f) => f.shared.len() + f.objects.len(),
            State::Building { objects, .. } => objects.len(),
        }
    }

    /// Number of distinct predicates.
    #[must_use]
    pub fn num_predicates(&self) -> usize {
        match &self.state {
            State::Frozen(f) => f.predicates.len(),
            State::Building { predicates, .. } => predicates.len(),
        }
    }

    /// Total number of distinct terms across all partitions.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.num_subjects() + self.num_objects() - self.num_shared() + self.num_predicates()
    }

    /// Finalized partitions in order: shared, subjects-only, objects-only,
    /// predicates. `None` while still building.
    #[must_use]
    pub fn partitions(&self) -> Option<[&[Box<str>]; 4]> {
        match &self.state {
            State::Frozen(f) => Some([&f.shared, &f.subjects, &f.objects, &f.predicates]),
            State::Building { .. } => None,
        }
    }

    /// Resolves a string under `role`, returning 0 when absent.
    #[must_use]
    pub fn string_to_id(&self, text: &str, role: TripleRole) -> Id {
        match &self.state {
            State::Building { subjects, objects, predicates } => match role {
                TripleRole::Subject => subjects.id_of(text),
                TripleRole::Object => objects.id_of(text),
                TripleRole::Predicate => predicates.id_of(text),
            },
            State::Frozen(f) => match role {
                TripleRole::Predicate => f.preds.get(text).map_or(0, |&p| p + 1),
                TripleRole::Subject => match f.terms.get(text) {
                    Some(Slot::Shared(p)) => p + 1,
                    Some(Slot::SubjectOnly(p)) => f.shared.len() as Id + p + 1,
                    _ => 0,
                },
                TripleRole::Object => match f.terms.get(text) {
                    Some(Slot::Shared(p)) => p + 1,
                    Some(Slot::ObjectOnly(p)) => f.shared.len() as Id + p + 1,
                    _ => 0,
                },
            },
        }
    }

    /// Resolves an id under `role` back to its string.
    ///
    /// # Errors
    ///
    /// `UnknownId` when the id is 0 or outside the partition's range.
    pub fn id_to_string(&self, id: Id, role: TripleRole) -> Result<&str> {
        let missing = || Error::UnknownId { id, role };
        if id == 0 {
            return Err(missing());
        }
        match &self.state {
            State::Building { subjects, objects, predicates } => match role {
                TripleRole::Subject => subjects.get(id).ok_or_else(missing),
                TripleRole::Object => objects.get(id).ok_or_else(missing),
                TripleRole::Predicate => predicates.get(id).ok_or_else(missing),
            },
            State::Frozen(f) => {
                let shared = f.shared.len() as Id;
                let section = match role {
                    TripleRole::Predicate => {
                        return f.predicates.get(id as usize - 1).map(AsRef::as_ref).ok_or_else(missing)
                    }
                    _ if id <= shared => return Ok(&f.shared[id as usize - 1]),
                    TripleRole::Subject => &f.subjects,
                    TripleRole::Object => &f.objects,
                };
                section.get((id - shared) as usize - 1).map(AsRef::as_ref).ok_or_else(missing)
            }
        }
    }

    /// Heap bytes held by the stored strings.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        match &self.state {
            State::Building { subjects, objects, predicates } => {
                subjects.byte_len() + objects.byte_len() + predicates.byte_len()
            }
            State::Frozen(f) => [&f.shared, &f.subjects, &f.objects, &f.predicates]
                .iter()
                .flat_map(|p| p.iter())
                .map(|s| s.len())
                .sum(),
        }
    }

    /// Adds the partition statistics to the header under `node`.
    pub fn populate_header(&self, header: &mut PlainHeader, node: &str) {
        header.insert(node, vocab::RDF_TYPE, vocab::DICTIONARY_TYPE_PLAIN);
        header.insert_number(node, vocab::DICT_NUM_SHARED, self.num_shared() as u64);
        header.insert_number(node, vocab::DICT_NUM_SUBJECTS, self.num_subjects() as u64);
        header.insert_number(node, vocab::DICT_NUM_PREDICATES, self.num_predicates() as u64);
        header.insert_number(node, vocab::DICT_NUM_OBJECTS, self.num_objects() as u64);
    }

    /// Writes the control block and four length-prefixed partitions.
    ///
    /// The `mapping` property records the layout: 1 for the finalized
    /// four-partition form, 2 for the building form's separate subject and
    /// object namespaces (whose shared partition is empty by construction).
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut ci = ControlInfo::new(SectionKind::Dictionary);
        ci.set_format(vocab::DICTIONARY_TYPE_PLAIN);
        ci.set(PROP_ELEMENTS, self.num_elements().to_string());
        ci.set(PROP_SIZE_STRINGS, self.size_bytes().to_string());

        let empty: &[Box<str>] = &[];
        let partitions: [&[Box<str>]; 4] = match &self.state {
            State::Frozen(f) => {
                ci.set(PROP_MAPPING, "1");
                [&f.shared, &f.subjects, &f.objects, &f.predicates]
            }
            State::Building { subjects, objects, predicates } => {
                ci.set(PROP_MAPPING, "2");
                [empty, &subjects.list, &objects.list, &predicates.list]
            }
        };
        ci.save(writer)?;

        for partition in partitions {
            vbyte::write(writer, partition.len() as u64)?;
            for s in partition {
                vbyte::write(writer, s.len() as u64)?;
                writer.write_all(s.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Reads back what [`save`](Self::save) wrote.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        if ci.format() != vocab::DICTIONARY_TYPE_PLAIN {
            return Err(Error::Format { section: "dictionary", tag: ci.format().to_string() });
        }
        let mapping = ci.get_number(PROP_MAPPING).unwrap_or(1);

        let mut partitions: [Vec<Box<str>>; 4] = Default::default();
        for partition in &mut partitions {
            let count = vbyte::read(reader)?;
            partition.reserve(usize::try_from(count).unwrap_or(0));
            for _ in 0..count {
                let len = usize::try_from(vbyte::read(reader)?)
                    .map_err(|_| Error::parse("dictionary string length overflow"))?;
                let mut bytes = vec![0u8; len];
                reader.read_exact(&mut bytes)?;
                let s = String::from_utf8(bytes)
                    .map_err(|_| Error::parse("dictionary string is not UTF-8"))?;
                partition.push(s.into_boxed_str());
            }
        }
        let [shared, subjects, objects, predicates] = partitions;

        match mapping {
            1 => Ok(Self {
                state: State::Frozen(Frozen::from_partitions(shared, subjects, objects, predicates)),
            }),
            2 => {
                if !shared.is_empty() {
                    return Err(Error::parse("building-form dictionary with a shared partition"));
                }
                let rebuild = |list: Vec<Box<str>>| {
                    let mut reg = Registry::default();
                    for s in list {
                        let id = reg.list.len() as Id + 1;
                        reg.index.insert(s.clone(), id);
                        reg.list.push(s);
                    }
                    reg
                };
                Ok(Self {
                    state: State::Building {
                        subjects: rebuild(subjects),
                        objects: rebuild(objects),
                        predicates: rebuild(predicates),
                    },
                })
            }
            other => Err(Error::parse(format!("unknown dictionary mapping {other}"))),
        }
    }
}
