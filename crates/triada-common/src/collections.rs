//! Standard collection type aliases for Triada.
//!
//! Use these instead of direct HashMap/HashSet to allow future optimization
//! and ensure consistent hashing across the codebase.
//!
//! | Type | Use Case |
//! |------|----------|
//! | [`TriadaMap`] | Hash map with fast non-cryptographic hashing |
//! | [`TriadaSet`] | Hash set with the same hasher |
//!
//! # Example
//!
//! ```rust
//! use triada_common::collections::TriadaMap;
//!
//! let mut map: TriadaMap<String, u32> = TriadaMap::default();
//! map.insert("subject".to_string(), 1);
//! ```

use rustc_hash::FxBuildHasher;

/// Standard HashMap with FxHash (fast, non-cryptographic).
///
/// FxHash is optimized for small keys and performs well on the short IRI
/// and literal strings that dominate dictionary workloads.
pub type TriadaMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Standard HashSet with FxHash.
pub type TriadaSet<T> = hashbrown::HashSet<T, FxBuildHasher>;
