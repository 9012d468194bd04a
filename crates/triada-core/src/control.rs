//! Control blocks: the framing that precedes each container section.
//!
//! A control block is one section-kind byte, then UTF-8 `key=value` lines
//! (LF-delimited) terminated by a blank line, then the section payload.
//! The reader inspects the block, selects the concrete representation via
//! the `format` property, and hands the payload stream to it.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use triada_common::{Error, Result};

/// The magic cookie opening every container.
pub const COOKIE: &[u8; 4] = b"$HDT";

/// Property key naming the implementation of a section.
pub const PROP_FORMAT: &str = "format";
/// Property key carrying a payload byte count.
pub const PROP_LENGTH: &str = "length";
/// Property key carrying a triples component order.
pub const PROP_ORDER: &str = "order";

/// Which section a control block introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SectionKind {
    /// Container-level block following the cookie.
    Global = 1,
    /// Metadata header section.
    Header = 2,
    /// Dictionary section.
    Dictionary = 3,
    /// Triples section.
    Triples = 4,
}

impl SectionKind {
    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(SectionKind::Global),
            2 => Ok(SectionKind::Header),
            3 => Ok(SectionKind::Dictionary),
            4 => Ok(SectionKind::Triples),
            other => Err(Error::parse(format!("unknown section kind tag {other}"))),
        }
    }
}

/// The parsed key/value preamble of one section.
///
/// Properties are kept sorted so that serialization is deterministic: a
/// loaded container saves back byte-identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInfo {
    /// The section this block introduces.
    pub kind: SectionKind,
    props: BTreeMap<String, String>,
}

impl ControlInfo {
    /// Creates an empty control block for `kind`.
    #[must_use]
    pub fn new(kind: SectionKind) -> Self {
        Self { kind, props: BTreeMap::new() }
    }

    /// Sets a property. Keys must not contain `=`; keys and values must
    /// not contain line breaks (enforced on save).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Looks up a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    /// The implementation tag, or an empty string when absent.
    #[must_use]
    pub fn format(&self) -> &str {
        self.get(PROP_FORMAT).unwrap_or("")
    }

    /// Sets the implementation tag.
    pub fn set_format(&mut self, tag: impl Into<String>) -> &mut Self {
        self.set(PROP_FORMAT, tag)
    }

    /// A numeric property, if present and well-formed.
    #[must_use]
    pub fn get_number(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Iterates over all properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Writes the kind byte, the property lines, and the blank terminator.
    pub fn save<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.kind as u8])?;
        for (key, value) in &self.props {
            if key.contains(['=', '\n']) || value.contains('\n') {
                return Err(Error::parse(format!("control property {key:?} is unencodable")));
            }
            writer.write_all(key.as_bytes())?;
            writer.write_all(b"=")?;
            writer.write_all(value.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Reads back one control block.
    pub fn load<R: BufRead + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut kind = [0u8; 1];
        reader.read_exact(&mut kind)?;
        let kind = SectionKind::from_byte(kind[0])?;

        let mut props = BTreeMap::new();
        loop {
            let mut line = String::new();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                return Err(Error::parse("unterminated control block"));
            }
            let line = line.trim_end_matches('\n');
            if line.is_empty() {
                break;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| Error::parse(format!("control line without '=': {line:?}")))?;
            props.insert(key.to_string(), value.to_string());
        }
        Ok(Self { kind, props })
    }
}

/// Writes the container cookie.
pub fn write_cookie<W: Write + ?Sized>(writer: &mut W) -> Result<()> {
    writer.write_all(COOKIE)?;
    Ok(())
}

/// Consumes and checks the container cookie.
pub fn read_cookie<R: BufRead + ?Sized>(reader: &mut R) -> Result<()> {
    let mut cookie = [0u8; 4];
    reader.read_exact(&mut cookie)?;
    if &cookie != COOKIE {
        return Err(Error::parse("missing $HDT cookie; not a container"));
    }
    Ok(())
}
