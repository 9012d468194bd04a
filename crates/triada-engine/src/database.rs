//! The two façades over Header + Dictionary + Triples.
//!
//! [`Triada`] is the immutable-after-build store: ingest RDF once (or
//! load a container), then query and serialize. [`MutableTriada`] keeps
//! the building forms alive and accepts `insert`/`remove` of individual
//! triples at the cost of the compact layouts.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, info};
use triada_common::progress::{NoListener, SectionListener};
use triada_common::{Error, Progress, ProgressListener, Result, TripleId, TripleRole, TripleString};
use triada_core::control::{self, ControlInfo, SectionKind};
use triada_core::dictionary::{PfcDictionary, DEFAULT_BUCKET_SIZE};
use triada_core::triples::TriplesSearchIter;
use triada_core::{
    vocab, BitmapTriples, CompactTriples, Dictionary, PlainDictionary, PlainHeader, PlainTriples,
    Triples, TriplesList,
};

use crate::config::{Config, DictionaryKind, TriplesKind};
use crate::rdf::{write_ntriples, RdfParser};
use crate::registry::FormatRegistry;

/// Triples between listener notifications during ingest.
const NOTIFY_BATCH: u64 = 10_000;

fn checkpoint(
    listener: &mut dyn ProgressListener,
    stage: &'static str,
    done: u64,
    total: u64,
) -> Result<()> {
    if listener.notify(stage, done, total) == Progress::Abort {
        return Err(Error::Cancelled(stage));
    }
    Ok(())
}

fn populate_header(
    header: &mut PlainHeader,
    base_uri: &str,
    original_size: u64,
    dictionary: &Dictionary,
    triples: &Triples,
) {
    header.insert(base_uri, vocab::RDF_TYPE, vocab::HDT_DATASET);
    header.insert(base_uri, vocab::HDT_FORMAT_INFORMATION, "_:format");
    header.insert("_:format", vocab::HDT_DICTIONARY, "_:dictionary");
    header.insert("_:format", vocab::HDT_TRIPLES, "_:triples");
    header.insert(base_uri, vocab::HDT_STATISTICAL_INFORMATION, "_:statistics");
    header.insert(base_uri, vocab::HDT_PUBLICATION_INFORMATION, "_:publication");

    dictionary.populate_header(header, "_:dictionary");
    triples.populate_header(header, "_:triples");

    header.insert_number("_:statistics", vocab::ORIGINAL_SIZE, original_size);
    header.insert_number(
        "_:statistics",
        vocab::HDT_SIZE,
        (dictionary.size_bytes() + triples.size_bytes()) as u64,
    );
    if let Ok(since_epoch) = SystemTime::now().duration_since(UNIX_EPOCH) {
        header.insert_number("_:publication", vocab::DC_ISSUED, since_epoch.as_secs());
    }
}

/// An immutable-after-build triple store.
///
/// # Example
///
/// ```rust
/// use triada_common::TripleString;
/// use triada_engine::rdf::MemoryTriples;
/// use triada_engine::Triada;
///
/// let mut parser = MemoryTriples::new(vec![
///     TripleString::new("<a>", "<p>", "<b>"),
///     TripleString::new("<b>", "<q>", "<a>"),
/// ]);
/// let mut store = Triada::new();
/// store.load_from_rdf(&mut parser, "<http://example.org/dataset>")?;
///
/// let hits: Vec<_> = store.search("<a>", "", "").collect();
/// assert_eq!(hits.len(), 1);
/// # Ok::<(), triada_common::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Triada {
    config: Config,
    registry: FormatRegistry,
    header: PlainHeader,
    dictionary: Dictionary,
    triples: Triples,
}

impl Triada {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { config, ..Self::default() }
    }

    /// Opens a container file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self::new();
        store.load_from_file(path)?;
        Ok(store)
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The metadata header.
    #[must_use]
    pub fn header(&self) -> &PlainHeader {
        &self.header
    }

    /// The dictionary component.
    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// The triples component.
    #[must_use]
    pub fn triples(&self) -> &Triples {
        &self.triples
    }

    /// Number of stored triples.
    #[must_use]
    pub fn num_triples(&self) -> usize {
        self.triples.num_triples()
    }

    /// Heap size of the dictionary and triples together.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.dictionary.size_bytes() + self.triples.size_bytes()
    }

    /// Ingests RDF from a parser cursor (no progress reporting).
    pub fn load_from_rdf(&mut self, parser: &mut dyn RdfParser, base_uri: &str) -> Result<()> {
        self.load_from_rdf_with_listener(parser, base_uri, &mut NoListener)
    }

    /// Ingests RDF from a parser cursor, reporting progress.
    ///
    /// On any failure (including a listener abort) the partial build is
    /// dropped and the store is reset to empty components, so the façade
    /// stays usable.
    pub fn load_from_rdf_with_listener(
        &mut self,
        parser: &mut dyn RdfParser,
        base_uri: &str,
        listener: &mut dyn ProgressListener,
    ) -> Result<()> {
        match self.build_from_rdf(parser, base_uri, listener) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    fn reset(&mut self) {
        self.header = PlainHeader::new();
        self.dictionary = Dictionary::default();
        self.triples = Triples::default();
    }

    fn build_from_rdf(
        &mut self,
        parser: &mut dyn RdfParser,
        base_uri: &str,
        listener: &mut dyn ProgressListener,
    ) -> Result<()> {
        // First pass: accumulate the dictionary. The sub-stages report
        // into the first half of the listener's range.
        let mut plain = PlainDictionary::new();
        plain.start_processing();
        let mut seen = 0u64;
        {
            let mut section = SectionListener::new(listener, 0, 450);
            while let Some(triple) = parser.next_triple() {
                let triple = triple?;
                plain.insert(&triple.subject, TripleRole::Subject)?;
                plain.insert(&triple.predicate, TripleRole::Predicate)?;
                plain.insert(&triple.object, TripleRole::Object)?;
                seen += 1;
                if seen % NOTIFY_BATCH == 0 {
                    checkpoint(&mut section, "dictionary", parser.position(), parser.size())?;
                }
            }
        }
        plain.stop_processing()?;
        info!("dictionary pass: {seen} triples, {} terms", plain.num_elements());

        checkpoint(&mut SectionListener::new(listener, 450, 500), "dictionary", 1, 1)?;
        let dictionary = match self.config.dictionary_kind() {
            DictionaryKind::Plain => Dictionary::Plain(plain),
            DictionaryKind::Pfc => {
                Dictionary::Pfc(PfcDictionary::import(&plain, DEFAULT_BUCKET_SIZE)?)
            }
        };

        // Second pass: translate and collect the triples.
        parser.reset()?;
        let list = {
            let mut section = SectionListener::new(listener, 500, 950);
            self.collect_triples(parser, &dictionary, &mut section)?
        };

        checkpoint(listener, "transcode", 0, 1)?;
        let triples = match self.config.triples_kind() {
            TriplesKind::List => Triples::List(list),
            TriplesKind::Plain => Triples::Plain(PlainTriples::from_list(&list)?),
            TriplesKind::Compact => Triples::Compact(CompactTriples::from_list(&list)?),
            TriplesKind::Bitmap => Triples::Bitmap(BitmapTriples::from_list(&list)?),
        };
        info!("triples pass: {} unique triples in {}", triples.num_triples(), triples.order());

        let mut header = PlainHeader::new();
        if !self.config.no_header() {
            populate_header(&mut header, base_uri, parser.size(), &dictionary, &triples);
        }

        self.header = header;
        self.dictionary = dictionary;
        self.triples = triples;
        Ok(())
    }

    #[cfg(feature = "spill")]
    fn collect_triples(
        &self,
        parser: &mut dyn RdfParser,
        dictionary: &Dictionary,
        listener: &mut dyn ProgressListener,
    ) -> Result<TriplesList> {
        use triada_core::triples::spill::{SpillTriplesList, DEFAULT_CHUNK_TRIPLES};

        let Some(dir) = self.config.get(crate::config::KEY_SPILL_DIRECTORY) else {
            return self.collect_triples_in_memory(parser, dictionary, listener);
        };
        debug!("spilling triples to {dir}");
        let mut spill = SpillTriplesList::create(dir, DEFAULT_CHUNK_TRIPLES)?;
        let mut seen = 0u64;
        while let Some(triple) = parser.next_triple() {
            let triple = triple?;
            spill.insert(dictionary.triple_to_ids(&triple))?;
            seen += 1;
            if seen % NOTIFY_BATCH == 0 {
                checkpoint(listener, "triples", parser.position(), parser.size())?;
            }
        }
        checkpoint(listener, "sort", 0, 1)?;
        spill.into_sorted_list(self.config.component_order())
    }

    #[cfg(not(feature = "spill"))]
    fn collect_triples(
        &self,
        parser: &mut dyn RdfParser,
        dictionary: &Dictionary,
        listener: &mut dyn ProgressListener,
    ) -> Result<TriplesList> {
        self.collect_triples_in_memory(parser, dictionary, listener)
    }

    fn collect_triples_in_memory(
        &self,
        parser: &mut dyn RdfParser,
        dictionary: &Dictionary,
        listener: &mut dyn ProgressListener,
    ) -> Result<TriplesList> {
        let mut list = TriplesList::new();
        list.start_processing();
        let mut seen = 0u64;
        while let Some(triple) = parser.next_triple() {
            let triple = triple?;
            list.insert(dictionary.triple_to_ids(&triple));
            seen += 1;
            if seen % NOTIFY_BATCH == 0 {
                checkpoint(listener, "triples", parser.position(), parser.size())?;
            }
        }
        list.stop_processing();

        checkpoint(listener, "sort", 0, 1)?;
        list.sort(self.config.component_order())?;
        checkpoint(listener, "duplicates", 0, 1)?;
        list.remove_duplicates()?;
        Ok(list)
    }

    /// Searches by strings; empty components are wildcards.
    ///
    /// A non-empty component unknown to the dictionary yields an empty
    /// iterator, never an error. Results decode lazily and arrive in the
    /// stored order when the pattern is compatible with it.
    #[must_use]
    pub fn search(&self, subject: &str, predicate: &str, object: &str) -> SearchIter<'_> {
        let dict = DictRef::Full(&self.dictionary);
        match dict.encode_pattern(subject, predicate, object) {
            Some(pattern) => SearchIter { dict, inner: Some(self.triples.search(pattern)) },
            None => SearchIter { dict, inner: None },
        }
    }

    /// Serializes every triple as N-Triples, returning the count.
    pub fn save_to_rdf<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64> {
        write_ntriples(self.search("", "", ""), writer)
    }

    /// Writes the full container: cookie, global block, then the header,
    /// dictionary and triples sections.
    pub fn save_to_hdt<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        control::write_cookie(writer)?;
        let mut global = ControlInfo::new(SectionKind::Global);
        global.set_format(vocab::CONTAINER_FORMAT);
        global.save(writer)?;

        self.header.save(writer)?;
        self.dictionary.save(writer)?;
        self.triples.save(writer)?;
        Ok(())
    }

    /// Saves the container to a file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to_hdt(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Replaces this store's content with a container read from `reader`.
    ///
    /// On failure the store is left in a consistent empty state.
    pub fn load_from_hdt<R: BufRead + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        match self.read_container(reader) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Loads the container from a file.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load_from_hdt(&mut BufReader::new(File::open(path)?))
    }

    fn read_container<R: BufRead + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        control::read_cookie(reader)?;
        let global = ControlInfo::load(reader)?;
        if global.kind != SectionKind::Global {
            return Err(Error::parse("container does not open with a global block"));
        }
        if global.format() != vocab::CONTAINER_FORMAT {
            return Err(Error::Format { section: "container", tag: global.format().to_string() });
        }

        let ci = ControlInfo::load(reader)?;
        self.header = self.registry.read_header(&ci, reader)?;
        let ci = ControlInfo::load(reader)?;
        self.dictionary = self.registry.read_dictionary(&ci, reader)?;
        let ci = ControlInfo::load(reader)?;
        self.triples = self.registry.read_triples(&ci, reader)?;
        debug!("loaded container: {} triples", self.triples.num_triples());
        Ok(())
    }

    /// Re-encoding an existing store under a different configuration.
    pub fn convert(&mut self, _config: &Config) -> Result<()> {
        Err(Error::NotImplemented("convert"))
    }
}

/// A store that stays mutable: plain dictionary + triples list.
///
/// Ids are tentative (insertion-ordered per role namespace) and the
/// dictionary only ever grows; [`remove`](Self::remove) drops triples but
/// never reclaims ids.
#[derive(Debug, Default)]
pub struct MutableTriada {
    config: Config,
    registry: FormatRegistry,
    header: PlainHeader,
    dictionary: PlainDictionary,
    triples: TriplesList,
}

impl MutableTriada {
    /// Creates an empty mutable store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mutable store with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self { config, ..Self::default() }
    }

    /// The metadata header.
    #[must_use]
    pub fn header(&self) -> &PlainHeader {
        &self.header
    }

    /// The dictionary component.
    #[must_use]
    pub fn dictionary(&self) -> &PlainDictionary {
        &self.dictionary
    }

    /// The triples component.
    #[must_use]
    pub fn triples(&self) -> &TriplesList {
        &self.triples
    }

    /// Number of stored triples.
    #[must_use]
    pub fn num_triples(&self) -> usize {
        self.triples.num_triples()
    }

    /// Ingests RDF in a single pass under tentative ids.
    ///
    /// Unlike [`Triada`], the dictionary is never finalized, so the store
    /// keeps accepting [`insert`](Self::insert) afterwards.
    pub fn load_from_rdf(&mut self, parser: &mut dyn RdfParser) -> Result<()> {
        let result = (|| {
            while let Some(triple) = parser.next_triple() {
                self.insert(&triple?)?;
            }
            self.triples.sort(self.config.component_order())?;
            self.triples.remove_duplicates()
        })();
        if result.is_err() {
            self.header = PlainHeader::new();
            self.dictionary = PlainDictionary::new();
            self.triples = TriplesList::new();
        }
        result
    }

    /// Inserts one triple, assigning dictionary ids as needed.
    ///
    /// # Errors
    ///
    /// `Parse` when any component is empty.
    pub fn insert(&mut self, triple: &TripleString) -> Result<()> {
        let s = self.dictionary.insert(&triple.subject, TripleRole::Subject)?;
        let p = self.dictionary.insert(&triple.predicate, TripleRole::Predicate)?;
        let o = self.dictionary.insert(&triple.object, TripleRole::Object)?;
        self.triples.insert(TripleId::new(s, p, o));
        Ok(())
    }

    /// Bulk insertion through an iterator.
    pub fn insert_all(
        &mut self,
        _triples: &mut dyn Iterator<Item = TripleString>,
    ) -> Result<()> {
        Err(Error::NotImplemented("insert from an iterator"))
    }

    /// Removes every triple matching the string pattern (empty components
    /// are wildcards), returning how many were dropped.
    ///
    /// A non-empty component unknown to the dictionary matches nothing.
    /// Dictionary entries are never removed; ids stay stable.
    #[must_use = "returns the number of removed triples"]
    pub fn remove(&mut self, pattern: &TripleString) -> usize {
        let dict_ref = DictRef::Plain(&self.dictionary);
        let Some(ids) = dict_ref.encode_pattern(&pattern.subject, &pattern.predicate, &pattern.object)
        else {
            return 0;
        };
        self.triples.remove(&ids)
    }

    /// Searches by strings; empty components are wildcards.
    #[must_use]
    pub fn search(&self, subject: &str, predicate: &str, object: &str) -> SearchIter<'_> {
        let dict = DictRef::Plain(&self.dictionary);
        match dict.encode_pattern(subject, predicate, object) {
            Some(pattern) => {
                SearchIter { dict, inner: Some(TriplesSearchIter::List(self.triples.search(pattern))) }
            }
            None => SearchIter { dict, inner: None },
        }
    }

    /// Serializes every triple as N-Triples, returning the count.
    pub fn save_to_rdf<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64> {
        write_ntriples(self.search("", "", ""), writer)
    }

    /// Writes the container with the building forms as payloads.
    pub fn save_to_hdt<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        control::write_cookie(writer)?;
        let mut global = ControlInfo::new(SectionKind::Global);
        global.set_format(vocab::CONTAINER_FORMAT);
        global.save(writer)?;

        self.header.save(writer)?;
        self.dictionary.save(writer)?;
        self.triples.save(writer)?;
        Ok(())
    }

    /// Replaces this store's content with a container holding building
    /// forms. On failure the store is left empty.
    pub fn load_from_hdt<R: BufRead + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        let result = (|| {
            control::read_cookie(reader)?;
            let global = ControlInfo::load(reader)?;
            if global.kind != SectionKind::Global {
                return Err(Error::parse("container does not open with a global block"));
            }

            let ci = ControlInfo::load(reader)?;
            let header = self.registry.read_header(&ci, reader)?;
            let ci = ControlInfo::load(reader)?;
            let Dictionary::Plain(dictionary) = self.registry.read_dictionary(&ci, reader)? else {
                return Err(Error::parse("mutable store requires a plain dictionary section"));
            };
            let ci = ControlInfo::load(reader)?;
            let Triples::List(triples) = self.registry.read_triples(&ci, reader)? else {
                return Err(Error::parse("mutable store requires a triples list section"));
            };
            Ok((header, dictionary, triples))
        })();

        match result {
            Ok((header, dictionary, triples)) => {
                self.header = header;
                self.dictionary = dictionary;
                self.triples = triples;
                Ok(())
            }
            Err(e) => {
                self.header = PlainHeader::new();
                self.dictionary = PlainDictionary::new();
                self.triples = TriplesList::new();
                Err(e)
            }
        }
    }
}

/// Either dictionary shape, for lazy result decoding.
enum DictRef<'a> {
    Full(&'a Dictionary),
    Plain(&'a PlainDictionary),
}

impl DictRef<'_> {
    fn string_to_id(&self, text: &str, role: TripleRole) -> u32 {
        match self {
            DictRef::Full(d) => d.string_to_id(text, role),
            DictRef::Plain(d) => d.string_to_id(text, role),
        }
    }

    /// Encodes a string pattern, or `None` when a bound component is
    /// unknown (the search result is then necessarily empty).
    fn encode_pattern(&self, subject: &str, predicate: &str, object: &str) -> Option<TripleId> {
        let encode = |text: &str, role| {
            if text.is_empty() {
                Some(0)
            } else {
                match self.string_to_id(text, role) {
                    0 => None,
                    id => Some(id),
                }
            }
        };
        Some(TripleId::new(
            encode(subject, TripleRole::Subject)?,
            encode(predicate, TripleRole::Predicate)?,
            encode(object, TripleRole::Object)?,
        ))
    }

    fn decode(&self, ids: &TripleId) -> Result<TripleString> {
        match self {
            DictRef::Full(d) => d.ids_to_triple(ids),
            DictRef::Plain(d) => Ok(TripleString {
                subject: d.id_to_string(ids.subject, TripleRole::Subject)?.to_owned(),
                predicate: d.id_to_string(ids.predicate, TripleRole::Predicate)?.to_owned(),
                object: d.id_to_string(ids.object, TripleRole::Object)?.to_owned(),
            }),
        }
    }
}

/// Forward-only iterator over decoded search results.
///
/// Decoding happens lazily per triple. A decode failure (which indicates
/// a corrupt store) logs a diagnostic and ends the iteration rather than
/// panicking.
pub struct SearchIter<'a> {
    dict: DictRef<'a>,
    inner: Option<TriplesSearchIter<'a>>,
}

impl Iterator for SearchIter<'_> {
    type Item = TripleString;

    fn next(&mut self) -> Option<TripleString> {
        let ids = self.inner.as_mut()?.next()?;
        match self.dict.decode(&ids) {
            Ok(triple) => Some(triple),
            Err(e) => {
                error!("stopping search: failed to decode {ids}: {e}");
                self.inner = None;
                None
            }
        }
    }
}
