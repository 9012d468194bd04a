//! Show container statistics.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use triada_engine::Triada;

use crate::output::{self, format_bytes, Format};
use crate::OutputFormat;

/// Detailed container statistics.
#[derive(Serialize)]
struct InfoOutput {
    num_triples: usize,
    order: String,
    triples_format: String,
    num_shared: usize,
    num_subjects: usize,
    num_predicates: usize,
    num_objects: usize,
    dictionary_terms: usize,
    header_statements: usize,
    memory_bytes: usize,
}

/// Run the info command.
pub fn run(file: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let store = Triada::open(file).with_context(|| format!("cannot open {}", file.display()))?;
    let dict = store.dictionary();

    let info = InfoOutput {
        num_triples: store.num_triples(),
        order: store.triples().order().to_string(),
        triples_format: store.triples().format_tag().to_string(),
        num_shared: dict.num_shared(),
        num_subjects: dict.num_subjects(),
        num_predicates: dict.num_predicates(),
        num_objects: dict.num_objects(),
        dictionary_terms: dict.num_elements(),
        header_statements: store.header().len(),
        memory_bytes: store.size_bytes(),
    };

    let items = vec![
        ("Triples", info.num_triples.to_string()),
        ("Order", info.order.clone()),
        ("Triples Format", info.triples_format.clone()),
        ("Shared Terms", info.num_shared.to_string()),
        ("Subjects", info.num_subjects.to_string()),
        ("Predicates", info.num_predicates.to_string()),
        ("Objects", info.num_objects.to_string()),
        ("Dictionary Terms", info.dictionary_terms.to_string()),
        ("Header Statements", info.header_statements.to_string()),
        ("Memory Usage", format_bytes(info.memory_bytes)),
    ];

    output::print_key_value(&info, &items, Format::from(format), quiet)
}
