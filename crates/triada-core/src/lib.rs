//! # triada-core
//!
//! Core layer for Triada: the dictionary, the triples representations,
//! and the binary container formats that tie them together. This crate
//! depends only on `triada-common`.
//!
//! ## Modules
//!
//! - [`containers`] - vbyte, bit-packed sequences, rank/select bitmaps
//! - [`control`] - the control blocks framing each container section
//! - [`dictionary`] - four-partition string↔id map (plain and front-coded)
//! - [`triples`] - id-tuple stores (list, plain, compact, bitmap)
//! - [`header`] - the opaque metadata header
//! - [`vocab`] - format tags and header IRIs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod containers;
pub mod control;
pub mod dictionary;
pub mod header;
pub mod triples;
pub mod vocab;

pub use control::{ControlInfo, SectionKind};
pub use dictionary::{Dictionary, PfcDictionary, PlainDictionary};
pub use header::PlainHeader;
pub use triples::{BitmapTriples, CompactTriples, PlainTriples, Triples, TriplesList};
