//! Integration tests for the CLI workflows.

use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use triada_engine::rdf::NtriplesReader;
use triada_engine::{Config, Triada};

const SAMPLE_NT: &str = "\
<http://example.org/a> <http://example.org/p> <http://example.org/b> .
<http://example.org/a> <http://example.org/p> <http://example.org/c> .
<http://example.org/b> <http://example.org/q> <http://example.org/a> .
";

/// Builds a container file the way `triada import` does.
fn import(dir: &Path, config: Config) -> std::path::PathBuf {
    let nt_path = dir.join("sample.nt");
    std::fs::File::create(&nt_path)
        .and_then(|mut f| f.write_all(SAMPLE_NT.as_bytes()))
        .expect("write sample");

    let mut parser = NtriplesReader::open(&nt_path).expect("open sample");
    let mut store = Triada::with_config(config);
    store.load_from_rdf(&mut parser, "<file://sample.nt>").expect("ingest");

    let out = dir.join("sample.hdt");
    store.save_to_file(&out).expect("save container");
    out
}

#[test]
fn import_then_open() {
    let dir = TempDir::new().expect("create temp dir");
    let path = import(dir.path(), Config::new().with("dictionary.type", "pfc"));

    let store = Triada::open(&path).expect("reopen container");
    assert_eq!(store.num_triples(), 3);
    assert_eq!(store.dictionary().num_shared(), 2);
}

#[test]
fn query_patterns_against_an_imported_container() {
    let dir = TempDir::new().expect("create temp dir");
    let path = import(dir.path(), Config::new());

    let store = Triada::open(&path).expect("reopen container");
    assert_eq!(store.search("<http://example.org/a>", "", "").count(), 2);
    assert_eq!(store.search("", "<http://example.org/q>", "").count(), 1);
    assert_eq!(store.search("<http://example.org/nope>", "", "").count(), 0);
}

#[test]
fn export_produces_reimportable_ntriples() {
    let dir = TempDir::new().expect("create temp dir");
    let path = import(dir.path(), Config::new());
    let store = Triada::open(&path).expect("reopen container");

    let export_path = dir.path().join("export.nt");
    let mut out = std::fs::File::create(&export_path).expect("create export");
    let written = store.save_to_rdf(&mut out).expect("export");
    assert_eq!(written, 3);

    let mut parser = NtriplesReader::open(&export_path).expect("open export");
    let mut reimported = Triada::new();
    reimported.load_from_rdf(&mut parser, "<file://export.nt>").expect("reingest");
    assert_eq!(reimported.num_triples(), 3);
}
