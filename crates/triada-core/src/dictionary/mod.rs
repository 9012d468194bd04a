//! The four-partition string↔id dictionary.
//!
//! Strings are split into four partitions with contiguous id ranges:
//!
//! | Partition | Ids |
//! | --------- | --- |
//! | Shared (subject ∧ object) | `[1, |Shared|]` in both roles |
//! | Subjects-only | `[|Shared|+1, ..]` in the subject role |
//! | Objects-only | `[|Shared|+1, ..]` in the object role |
//! | Predicates | `[1, |Predicates|]`, independent |
//!
//! Two physical forms share the contract: [`PlainDictionary`] is the
//! hash-backed building form, [`PfcDictionary`] the immutable front-coded
//! form. [`Dictionary`] dispatches over whichever a façade currently
//! holds.

pub mod pfc;
pub mod plain;

use std::borrow::Cow;
use std::io::{BufRead, Write};

use triada_common::{Id, Result, TripleId, TripleRole, TripleString};

use crate::control::ControlInfo;
use crate::header::PlainHeader;

pub use pfc::{PfcDictionary, PfcSection, DEFAULT_BUCKET_SIZE};
pub use plain::PlainDictionary;

/// A dictionary in either physical form.
#[derive(Debug, Clone)]
pub enum Dictionary {
    /// Hash-backed building form.
    Plain(PlainDictionary),
    /// Front-coded compact form.
    Pfc(PfcDictionary),
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::Plain(PlainDictionary::new())
    }
}

impl Dictionary {
    /// Number of strings occurring as both subject and object.
    #[must_use]
    pub fn num_shared(&self) -> usize {
        match self {
            Dictionary::Plain(d) => d.num_shared(),
            Dictionary::Pfc(d) => d.num_shared(),
        }
    }

    /// Number of distinct subjects (shared included).
    #[must_use]
    pub fn num_subjects(&self) -> usize {
        match self {
            Dictionary::Plain(d) => d.num_subjects(),
            Dictionary::Pfc(d) => d.num_subjects(),
        }
    }

    /// Number of distinct objects (shared included).
    #[must_use]
    pub fn num_objects(&self) -> usize {
        match self {
            Dictionary::Plain(d) => d.num_objects(),
            Dictionary::Pfc(d) => d.num_objects(),
        }
    }

    /// Number of distinct predicates.
    #[must_use]
    pub fn num_predicates(&self) -> usize {
        match self {
            Dictionary::Plain(d) => d.num_predicates(),
            Dictionary::Pfc(d) => d.num_predicates(),
        }
    }

    /// Total number of distinct terms.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        match self {
            Dictionary::Plain(d) => d.num_elements(),
            Dictionary::Pfc(d) => d.num_elements(),
        }
    }

    /// Heap size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        match self {
            Dictionary::Plain(d) => d.size_bytes(),
            Dictionary::Pfc(d) => d.size_bytes(),
        }
    }

    /// Resolves a string under `role`, returning 0 when absent.
    #[must_use]
    pub fn string_to_id(&self, text: &str, role: TripleRole) -> Id {
        match self {
            Dictionary::Plain(d) => d.string_to_id(text, role),
            Dictionary::Pfc(d) => d.string_to_id(text, role),
        }
    }

    /// Resolves an id under `role` back to its string.
    ///
    /// # Errors
    ///
    /// `UnknownId` when the id is 0 or outside the partition's range.
    pub fn id_to_string(&self, id: Id, role: TripleRole) -> Result<Cow<'_, str>> {
        match self {
            Dictionary::Plain(d) => d.id_to_string(id, role).map(Cow::Borrowed),
            Dictionary::Pfc(d) => d.id_to_string(id, role).map(Cow::Owned),
        }
    }

    /// Translates a string triple to ids, mapping empty or unknown
    /// components to the wildcard 0.
    #[must_use]
    pub fn triple_to_ids(&self, triple: &TripleString) -> TripleId {
        let resolve = |text: &str, role| {
            if text.is_empty() {
                0
            } else {
                self.string_to_id(text, role)
            }
        };
        TripleId::new(
            resolve(&triple.subject, TripleRole::Subject),
            resolve(&triple.predicate, TripleRole::Predicate),
            resolve(&triple.object, TripleRole::Object),
        )
    }

    /// Decodes an id triple back to strings.
    ///
    /// # Errors
    ///
    /// `UnknownId` for any out-of-range component.
    pub fn ids_to_triple(&self, ids: &TripleId) -> Result<TripleString> {
        Ok(TripleString {
            subject: self.id_to_string(ids.subject, TripleRole::Subject)?.into_owned(),
            predicate: self.id_to_string(ids.predicate, TripleRole::Predicate)?.into_owned(),
            object: self.id_to_string(ids.object, TripleRole::Object)?.into_owned(),
        })
    }

    /// Adds this dictionary's statistics to the header under `node`.
    pub fn populate_header(&self, header: &mut PlainHeader, node: &str) {
        match self {
            Dictionary::Plain(d) => d.populate_header(header, node),
            Dictionary::Pfc(d) => d.populate_header(header, node),
        }
    }

    /// Writes the control block and partition payloads.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        match self {
            Dictionary::Plain(d) => d.save(writer),
            Dictionary::Pfc(d) => d.save(writer),
        }
    }

    /// Reads the variant named by the control block's format tag.
    ///
    /// # Errors
    ///
    /// `Format` for an unrecognized tag; `Parse`/`Io` for bad payloads.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        match ci.format() {
            crate::vocab::DICTIONARY_TYPE_PLAIN => {
                Ok(Dictionary::Plain(PlainDictionary::load(ci, reader)?))
            }
            crate::vocab::DICTIONARY_TYPE_PFC => {
                Ok(Dictionary::Pfc(PfcDictionary::load(ci, reader)?))
            }
            tag => Err(triada_common::Error::Format {
                section: "dictionary",
                tag: tag.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triada_common::Error;

    fn build() -> Dictionary {
        let mut plain = PlainDictionary::new();
        for (s, p, o) in [("<a>", "<p>", "<b>"), ("<a>", "<p>", "<c>"), ("<b>", "<q>", "<a>")] {
            plain.insert(s, TripleRole::Subject).unwrap();
            plain.insert(p, TripleRole::Predicate).unwrap();
            plain.insert(o, TripleRole::Object).unwrap();
        }
        plain.stop_processing().unwrap();
        Dictionary::Plain(plain)
    }

    #[test]
    fn triple_translation_with_wildcards() {
        let dict = build();
        let pattern = TripleString::new("<a>", "", "");
        assert_eq!(dict.triple_to_ids(&pattern), TripleId::new(1, 0, 0));

        let unknown = TripleString::new("<x>", "", "");
        assert_eq!(dict.triple_to_ids(&unknown), TripleId::new(0, 0, 0));
    }

    #[test]
    fn ids_round_trip_through_both_forms() {
        let plain = build();
        let Dictionary::Plain(ref p) = plain else { unreachable!() };
        let pfc = Dictionary::Pfc(PfcDictionary::import(p, DEFAULT_BUCKET_SIZE).unwrap());

        let tid = TripleId::new(1, 1, 2);
        let decoded = plain.ids_to_triple(&tid).unwrap();
        assert_eq!(decoded, TripleString::new("<a>", "<p>", "<b>"));
        assert_eq!(pfc.ids_to_triple(&tid).unwrap(), decoded);
        assert_eq!(pfc.triple_to_ids(&decoded), tid);
    }

    #[test]
    fn load_rejects_unknown_tag() {
        use crate::control::{ControlInfo, SectionKind};
        let mut ci = ControlInfo::new(SectionKind::Dictionary);
        ci.set_format("<http://example.org/not-a-dictionary>");
        assert!(matches!(
            Dictionary::load(&ci, &mut std::io::empty()),
            Err(Error::Format { section: "dictionary", .. })
        ));
    }
}
