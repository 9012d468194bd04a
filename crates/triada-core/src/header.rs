//! The metadata header: an opaque set of RDF statements.
//!
//! The header describes the dataset (counts, sizes, format tags, issue
//! date) as N-Triples text. The core treats statements opaquely; it only
//! appends its own statistics and carries everything else through.

use std::io::{BufRead, Write};

use triada_common::{Error, Result, TripleString};

use crate::control::{ControlInfo, SectionKind, PROP_LENGTH};
use crate::vocab;

/// An in-memory header section.
#[derive(Debug, Clone, Default)]
pub struct PlainHeader {
    statements: Vec<TripleString>,
}

impl PlainHeader {
    /// Creates an empty header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the header holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All statements, in insertion order.
    #[must_use]
    pub fn statements(&self) -> &[TripleString] {
        &self.statements
    }

    /// Appends a statement.
    pub fn insert(
        &mut self,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) {
        self.statements.push(TripleString::new(subject, predicate, object));
    }

    /// Appends a statement whose object is a numeric literal.
    pub fn insert_number(
        &mut self,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        value: u64,
    ) {
        self.insert(subject, predicate, format!("\"{value}\""));
    }

    /// Drops every statement.
    pub fn clear(&mut self) {
        self.statements.clear();
    }

    /// Approximate heap size of the stored text.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.statements
            .iter()
            .map(|t| t.subject.len() + t.predicate.len() + t.object.len())
            .sum()
    }

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for t in &self.statements {
            out.extend_from_slice(t.subject.as_bytes());
            out.push(b' ');
            out.extend_from_slice(t.predicate.as_bytes());
            out.push(b' ');
            out.extend_from_slice(t.object.as_bytes());
            out.extend_from_slice(b" .\n");
        }
        out
    }

    /// Writes the control block and the N-Triples payload.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let payload = self.payload();
        let mut ci = ControlInfo::new(SectionKind::Header);
        ci.set_format(vocab::HEADER_NTRIPLES);
        ci.set(PROP_LENGTH, payload.len().to_string());
        ci.save(writer)?;
        writer.write_all(&payload)?;
        Ok(())
    }

    /// Reads a header section whose control block has already been parsed.
    pub fn load<R: BufRead + ?Sized>(ci: &ControlInfo, reader: &mut R) -> Result<Self> {
        if ci.format() != vocab::HEADER_NTRIPLES {
            return Err(Error::Format { section: "header", tag: ci.format().to_string() });
        }
        let length = ci
            .get_number(PROP_LENGTH)
            .ok_or_else(|| Error::parse("header block lacks a length property"))?;
        let mut payload = vec![0u8; usize::try_from(length).map_err(|_| Error::parse("header length exceeds address space"))?];
        reader.read_exact(&mut payload)?;
        let text = String::from_utf8(payload)
            .map_err(|_| Error::parse("header payload is not UTF-8"))?;

        let mut header = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            header.statements.push(parse_statement(line)?);
        }
        Ok(header)
    }
}

/// Splits one N-Triples line into its three terms.
///
/// Subjects and predicates never contain spaces; the object is the
/// remainder with the trailing dot removed, so literals keep their
/// embedded whitespace.
fn parse_statement(line: &str) -> Result<TripleString> {
    let body = line
        .strip_suffix('.')
        .ok_or_else(|| Error::parse(format!("header statement without final '.': {line:?}")))?
        .trim_end();
    let (subject, rest) = body
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::parse(format!("truncated header statement: {line:?}")))?;
    let (predicate, object) = rest
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::parse(format!("truncated header statement: {line:?}")))?;
    let object = object.trim_start();
    if object.is_empty() {
        return Err(Error::parse(format!("truncated header statement: {line:?}")));
    }
    Ok(TripleString::new(subject, predicate, object))
}
