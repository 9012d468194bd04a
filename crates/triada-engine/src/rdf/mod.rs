//! The RDF cursor interface and its N-Triples implementations.
//!
//! The ingest pipeline consumes triples through [`RdfParser`]: a
//! forward-only cursor with a [`reset`](RdfParser::reset) so the two-pass
//! build (dictionary pass, then triples pass) can rewind the input.
//! Terms are carried verbatim; IRIs keep their angle brackets and
//! literals their quoting.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;

use triada_common::{Error, Result, TripleString};

/// A rewindable cursor over textual RDF triples.
pub trait RdfParser {
    /// The next triple, `None` at end of input.
    fn next_triple(&mut self) -> Option<Result<TripleString>>;

    /// Rewinds to the first triple.
    fn reset(&mut self) -> Result<()>;

    /// Bytes (or items) consumed so far, for progress reporting.
    fn position(&self) -> u64 {
        0
    }

    /// Total bytes (or items), 0 when unknown.
    fn size(&self) -> u64 {
        0
    }
}

/// Splits one N-Triples line into its three terms.
///
/// Subjects and predicates never contain whitespace; the object is the
/// remainder with the trailing dot removed, so literals keep their
/// embedded spaces.
fn parse_line(line: &str) -> Result<TripleString> {
    let body = line
        .strip_suffix('.')
        .ok_or_else(|| Error::parse(format!("statement without final '.': {line:?}")))?
        .trim_end();
    let (subject, rest) = body
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::parse(format!("truncated statement: {line:?}")))?;
    let (predicate, object) = rest
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::parse(format!("truncated statement: {line:?}")))?;
    let object = object.trim_start();
    if object.is_empty() {
        return Err(Error::parse(format!("truncated statement: {line:?}")));
    }
    Ok(TripleString::new(subject, predicate, object))
}

/// A line-based N-Triples reader over any seekable source.
pub struct NtriplesReader<R> {
    inner: R,
    pos: u64,
    size: u64,
    line: u64,
}

impl<R: BufRead + Seek> NtriplesReader<R> {
    /// Wraps a seekable reader, measuring its total size.
    pub fn new(mut inner: R) -> Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, pos: 0, size, line: 0 })
    }
}

impl NtriplesReader<BufReader<File>> {
    /// Opens an N-Triples file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: BufRead + Seek> RdfParser for NtriplesReader<R> {
    fn next_triple(&mut self) -> Option<Result<TripleString>> {
        loop {
            let mut line = String::new();
            match self.inner.read_line(&mut line) {
                Ok(0) => return None,
                Ok(n) => self.pos += n as u64,
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(parse_line(trimmed).map_err(|e| {
                Error::parse(format!("line {}: {e}", self.line))
            }));
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        self.pos = 0;
        self.line = 0;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// An in-memory cursor, mainly for tests and programmatic building.
#[derive(Debug, Clone, Default)]
pub struct MemoryTriples {
    triples: Vec<TripleString>,
    cursor: usize,
}

impl MemoryTriples {
    /// Wraps a vector of triples.
    #[must_use]
    pub fn new(triples: Vec<TripleString>) -> Self {
        Self { triples, cursor: 0 }
    }
}

impl From<Vec<TripleString>> for MemoryTriples {
    fn from(triples: Vec<TripleString>) -> Self {
        Self::new(triples)
    }
}

impl RdfParser for MemoryTriples {
    fn next_triple(&mut self) -> Option<Result<TripleString>> {
        let t = self.triples.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Ok(t))
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.cursor as u64
    }

    fn size(&self) -> u64 {
        self.triples.len() as u64
    }
}

/// Serializes triples as N-Triples lines, returning how many were
/// written.
pub fn write_ntriples<W: Write + ?Sized>(
    triples: impl Iterator<Item = TripleString>,
    writer: &mut W,
) -> Result<u64> {
    let mut count = 0u64;
    for t in triples {
        writeln!(writer, "{} {} {} .", t.subject, t.predicate, t.object)?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
<http://example.org/a> <http://example.org/p> <http://example.org/b> .
# a comment line

<http://example.org/a> <http://example.org/p> \"literal with spaces\"@en .
";

    #[test]
    fn reads_skipping_comments_and_blanks() {
        let mut parser = NtriplesReader::new(Cursor::new(SAMPLE)).unwrap();
        let first = parser.next_triple().unwrap().unwrap();
        assert_eq!(first.subject, "<http://example.org/a>");
        let second = parser.next_triple().unwrap().unwrap();
        assert_eq!(second.object, "\"literal with spaces\"@en");
        assert!(parser.next_triple().is_none());
        assert_eq!(parser.position(), parser.size());
    }

    #[test]
    fn reset_rewinds_to_the_first_triple() {
        let mut parser = NtriplesReader::new(Cursor::new(SAMPLE)).unwrap();
        while parser.next_triple().is_some() {}
        parser.reset().unwrap();
        assert_eq!(parser.position(), 0);
        let again = parser.next_triple().unwrap().unwrap();
        assert_eq!(again.predicate, "<http://example.org/p>");
    }

    #[test]
    fn malformed_lines_carry_their_line_number() {
        let mut parser = NtriplesReader::new(Cursor::new("<s> <p>\n")).unwrap();
        let err = parser.next_triple().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 1"), "{err}");
    }

    #[test]
    fn memory_cursor_round_trips() {
        let triples = vec![
            TripleString::new("<a>", "<p>", "<b>"),
            TripleString::new("<b>", "<q>", "\"x\""),
        ];
        let mut parser = MemoryTriples::new(triples.clone());
        assert_eq!(parser.size(), 2);
        assert_eq!(parser.next_triple().unwrap().unwrap(), triples[0]);
        parser.reset().unwrap();
        assert_eq!(parser.next_triple().unwrap().unwrap(), triples[0]);
    }

    #[test]
    fn serializer_writes_parseable_lines() {
        let triples = vec![TripleString::new("<a>", "<p>", "\"v w\"")];
        let mut buf = Vec::new();
        let written = write_ntriples(triples.clone().into_iter(), &mut buf).unwrap();
        assert_eq!(written, 1);

        let mut parser = NtriplesReader::new(Cursor::new(buf)).unwrap();
        assert_eq!(parser.next_triple().unwrap().unwrap(), triples[0]);
    }
}
