//! Evaluate a single triple pattern.

use std::path::Path;

use anyhow::{Context, Result};
use triada_engine::Triada;

fn term_or_wildcard(term: &str) -> &str {
    if term == "?" {
        ""
    } else {
        term
    }
}

/// Run the query command.
pub fn run(
    file: &Path,
    subject: &str,
    predicate: &str,
    object: &str,
    limit: Option<usize>,
) -> Result<()> {
    let store = Triada::open(file).with_context(|| format!("cannot open {}", file.display()))?;

    let results = store.search(
        term_or_wildcard(subject),
        term_or_wildcard(predicate),
        term_or_wildcard(object),
    );
    let limit = limit.unwrap_or(usize::MAX);
    for triple in results.take(limit) {
        println!("{} {} {} .", triple.subject, triple.predicate, triple.object);
    }
    Ok(())
}
