//! Façade configuration.

use std::collections::BTreeMap;

use log::warn;
use triada_common::Order;

/// Key choosing the post-ingest dictionary form (`plain` | `pfc`).
pub const KEY_DICTIONARY_TYPE: &str = "dictionary.type";
/// Key choosing the post-ingest triples form
/// (`list` | `plain` | `compact` | `bitmap`).
pub const KEY_TRIPLES_TYPE: &str = "triples.type";
/// Key choosing the sort order for compact forms (`SPO` .. `OPS`).
pub const KEY_COMPONENT_ORDER: &str = "triples.component.order";
/// Key suppressing header statements when set to `true`.
pub const KEY_NO_HEADER: &str = "noheader";
/// Key naming a scratch directory for disk-backed triples building.
#[cfg(feature = "spill")]
pub const KEY_SPILL_DIRECTORY: &str = "spill.directory";

/// The post-ingest dictionary form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DictionaryKind {
    /// Keep the hash-backed form.
    #[default]
    Plain,
    /// Transcode to the front-coded form.
    Pfc,
}

/// The post-ingest triples form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriplesKind {
    /// Keep the sorted list.
    List,
    /// Three parallel columns.
    Plain,
    /// Run-length grouped streams.
    Compact,
    /// Bitmap-delimited streams.
    #[default]
    Bitmap,
}

/// A string-keyed property map understood by the façades.
///
/// Unrecognized keys are carried along untouched, so callers can hang
/// their own settings off the same map.
///
/// # Example
///
/// ```rust
/// use triada_engine::config::{Config, DictionaryKind};
///
/// let config = Config::new()
///     .with("dictionary.type", "pfc")
///     .with("triples.component.order", "POS");
/// assert_eq!(config.dictionary_kind(), DictionaryKind::Pfc);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    props: BTreeMap<String, String>,
}

impl Config {
    /// Creates an empty configuration (all defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Sets a property in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    /// Looks up a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    /// The configured dictionary form; defaults to `Plain`.
    #[must_use]
    pub fn dictionary_kind(&self) -> DictionaryKind {
        match self.get(KEY_DICTIONARY_TYPE) {
            None => DictionaryKind::default(),
            Some("plain") => DictionaryKind::Plain,
            Some("pfc") => DictionaryKind::Pfc,
            Some(other) => {
                warn!("unknown {KEY_DICTIONARY_TYPE} {other:?}, using the default");
                DictionaryKind::default()
            }
        }
    }

    /// The configured triples form; defaults to `Bitmap`.
    #[must_use]
    pub fn triples_kind(&self) -> TriplesKind {
        match self.get(KEY_TRIPLES_TYPE) {
            None => TriplesKind::default(),
            Some("list") => TriplesKind::List,
            Some("plain") => TriplesKind::Plain,
            Some("compact") => TriplesKind::Compact,
            Some("bitmap") => TriplesKind::Bitmap,
            Some(other) => {
                warn!("unknown {KEY_TRIPLES_TYPE} {other:?}, using the default");
                TriplesKind::default()
            }
        }
    }

    /// The sort order for compact forms; defaults to SPO.
    #[must_use]
    pub fn component_order(&self) -> Order {
        match self.get(KEY_COMPONENT_ORDER) {
            None => Order::Spo,
            Some(name) => match Order::parse(name) {
                Order::Unknown => {
                    warn!("unknown {KEY_COMPONENT_ORDER} {name:?}, using SPO");
                    Order::Spo
                }
                order => order,
            },
        }
    }

    /// Whether the header section should stay empty.
    #[must_use]
    pub fn no_header(&self) -> bool {
        self.get(KEY_NO_HEADER) == Some("true")
    }
}
