//! Format tags and header vocabulary.
//!
//! The implementation tags follow the HDT vocabulary so containers are
//! recognizable by kin tools; the header IRIs are the subset the façade
//! actually emits.

/// The container-level format tag carried by the global control block.
pub const CONTAINER_FORMAT: &str = "<http://purl.org/HDT/hdt#HDTv1>";

/// Plain (hash-backed) dictionary sections.
pub const DICTIONARY_TYPE_PLAIN: &str = "<http://purl.org/HDT/hdt#dictionaryPlain>";
/// Four-section plain-front-coded dictionary.
pub const DICTIONARY_TYPE_PFC: &str = "<http://purl.org/HDT/hdt#dictionaryFour>";

/// Unindexed triples list.
pub const TRIPLES_TYPE_LIST: &str = "<http://purl.org/HDT/hdt#triplesList>";
/// Three parallel id streams.
pub const TRIPLES_TYPE_PLAIN: &str = "<http://purl.org/HDT/hdt#triplesPlain>";
/// Run-length grouped streams.
pub const TRIPLES_TYPE_COMPACT: &str = "<http://purl.org/HDT/hdt#triplesCompact>";
/// Bitmap-delimited streams; the canonical compact form.
pub const TRIPLES_TYPE_BITMAP: &str = "<http://purl.org/HDT/hdt#triplesBitmap>";

/// N-Triples header payload.
pub const HEADER_NTRIPLES: &str = "<http://purl.org/HDT/hdt#headerNtriples>";

/// rdf:type.
pub const RDF_TYPE: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>";
/// The dataset class.
pub const HDT_DATASET: &str = "<http://purl.org/HDT/hdt#Dataset>";
/// Links a dataset to its format description node.
pub const HDT_FORMAT_INFORMATION: &str = "<http://purl.org/HDT/hdt#formatInformation>";
/// Links the format node to the dictionary description.
pub const HDT_DICTIONARY: &str = "<http://purl.org/HDT/hdt#dictionary>";
/// Links the format node to the triples description.
pub const HDT_TRIPLES: &str = "<http://purl.org/HDT/hdt#triples>";
/// Links a dataset to its statistics node.
pub const HDT_STATISTICAL_INFORMATION: &str = "<http://purl.org/HDT/hdt#statisticalInformation>";
/// Links a dataset to its publication node.
pub const HDT_PUBLICATION_INFORMATION: &str = "<http://purl.org/HDT/hdt#publicationInformation>";

/// Size of the source RDF text.
pub const ORIGINAL_SIZE: &str = "<http://purl.org/HDT/hdt#originalSize>";
/// Size of the compact representation.
pub const HDT_SIZE: &str = "<http://purl.org/HDT/hdt#hdtSize>";
/// Number of distinct shared terms.
pub const DICT_NUM_SHARED: &str = "<http://purl.org/HDT/hdt#dictionarynumSharedSubjectObject>";
/// Number of subjects.
pub const DICT_NUM_SUBJECTS: &str = "<http://purl.org/HDT/hdt#dictionarynumSubjects>";
/// Number of predicates.
pub const DICT_NUM_PREDICATES: &str = "<http://purl.org/HDT/hdt#dictionarynumPredicates>";
/// Number of objects.
pub const DICT_NUM_OBJECTS: &str = "<http://purl.org/HDT/hdt#dictionarynumObjects>";
/// Number of stored triples.
pub const TRIPLES_NUM_TRIPLES: &str = "<http://purl.org/HDT/hdt#triplesnumTriples>";
/// Component order of the triples section.
pub const TRIPLES_ORDER: &str = "<http://purl.org/HDT/hdt#triplesOrder>";

/// Dublin Core issue date.
pub const DC_ISSUED: &str = "<http://purl.org/dc/terms/issued>";
