//! Explicit reader selection for container sections.

use std::io::BufRead;

use triada_common::{Error, Result};
use triada_core::control::{ControlInfo, SectionKind};
use triada_core::{Dictionary, PlainHeader, Triples};

/// Maps control-block tags to concrete section readers.
///
/// One registry value is constructed per façade; it checks that each
/// control block announces the expected section kind before handing the
/// payload to the representation named by the block's format tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatRegistry;

impl FormatRegistry {
    /// Creates the registry of built-in representations.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn expect_kind(ci: &ControlInfo, kind: SectionKind) -> Result<()> {
        if ci.kind != kind {
            return Err(Error::parse(format!(
                "expected a {kind:?} section, found {:?}",
                ci.kind
            )));
        }
        Ok(())
    }

    /// Reads a header section.
    pub fn read_header<R: BufRead + ?Sized>(
        &self,
        ci: &ControlInfo,
        reader: &mut R,
    ) -> Result<PlainHeader> {
        Self::expect_kind(ci, SectionKind::Header)?;
        PlainHeader::load(ci, reader)
    }

    /// Reads a dictionary section in whichever form the tag names.
    pub fn read_dictionary<R: BufRead + ?Sized>(
        &self,
        ci: &ControlInfo,
        reader: &mut R,
    ) -> Result<Dictionary> {
        Self::expect_kind(ci, SectionKind::Dictionary)?;
        Dictionary::load(ci, reader)
    }

    /// Reads a triples section in whichever form the tag names.
    pub fn read_triples<R: BufRead + ?Sized>(
        &self,
        ci: &ControlInfo,
        reader: &mut R,
    ) -> Result<Triples> {
        Self::expect_kind(ci, SectionKind::Triples)?;
        Triples::load(ci, reader)
    }
}
