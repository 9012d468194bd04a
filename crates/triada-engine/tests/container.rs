//! Container round-trips, configuration effects, cancellation, and the
//! mutable façade.

use triada_common::progress::{Progress, ProgressListener};
use triada_common::{Error, TripleString};
use triada_engine::rdf::MemoryTriples;
use triada_engine::{Config, MutableTriada, Triada};

fn graph() -> Vec<TripleString> {
    vec![
        TripleString::new("<a>", "<p>", "<b>"),
        TripleString::new("<a>", "<p>", "<c>"),
        TripleString::new("<b>", "<q>", "<a>"),
        TripleString::new("<c>", "<q>", "\"a literal\""),
    ]
}

fn build(config: Config) -> Triada {
    let mut store = Triada::with_config(config);
    store.load_from_rdf(&mut MemoryTriples::new(graph()), "<http://example.org/g>").unwrap();
    store
}

#[test]
fn container_round_trip_is_byte_identical() {
    for config in [
        Config::new(),
        Config::new().with("dictionary.type", "pfc"),
        Config::new().with("triples.type", "list"),
        Config::new().with("triples.type", "plain"),
        Config::new().with("triples.type", "compact"),
        Config::new().with("noheader", "true"),
    ] {
        let store = build(config.clone());
        let mut first = Vec::new();
        store.save_to_hdt(&mut first).unwrap();

        let mut reloaded = Triada::new();
        reloaded.load_from_hdt(&mut first.as_slice()).unwrap();
        let mut second = Vec::new();
        reloaded.save_to_hdt(&mut second).unwrap();

        assert_eq!(first, second, "config {config:?}");
    }
}

#[test]
fn noheader_leaves_the_header_empty() {
    let store = build(Config::new().with("noheader", "true"));
    assert!(store.header().is_empty());
    // The section still frames correctly.
    let mut bytes = Vec::new();
    store.save_to_hdt(&mut bytes).unwrap();
    let mut reloaded = Triada::new();
    reloaded.load_from_hdt(&mut bytes.as_slice()).unwrap();
    assert!(reloaded.header().is_empty());
    assert_eq!(reloaded.num_triples(), 4);
}

#[test]
fn corrupt_container_leaves_an_empty_usable_store() {
    let mut store = build(Config::new());
    assert_eq!(store.num_triples(), 4);

    let err = store.load_from_hdt(&mut b"not a container at all".as_slice());
    assert!(err.is_err());
    assert_eq!(store.num_triples(), 0);

    // Still usable: a fresh ingest succeeds.
    store.load_from_rdf(&mut MemoryTriples::new(graph()), "<http://example.org/g>").unwrap();
    assert_eq!(store.num_triples(), 4);
}

#[test]
fn convert_is_not_implemented() {
    let mut store = build(Config::new());
    assert!(matches!(store.convert(&Config::new()), Err(Error::NotImplemented(_))));
}

struct AbortAt {
    stage: &'static str,
    stages_seen: Vec<String>,
}

impl ProgressListener for AbortAt {
    fn notify(&mut self, stage: &str, _done: u64, _total: u64) -> Progress {
        self.stages_seen.push(stage.to_string());
        if stage == self.stage {
            Progress::Abort
        } else {
            Progress::Continue
        }
    }
}

#[test]
fn listener_abort_cancels_and_resets() {
    let mut listener = AbortAt { stage: "sort", stages_seen: Vec::new() };
    let mut store = Triada::new();
    let result = store.load_from_rdf_with_listener(
        &mut MemoryTriples::new(graph()),
        "<http://example.org/g>",
        &mut listener,
    );
    assert!(matches!(result, Err(Error::Cancelled("sort"))));
    assert!(listener.stages_seen.contains(&"sort".to_string()));
    assert_eq!(store.num_triples(), 0);

    // The façade stays usable after the abort.
    store.load_from_rdf(&mut MemoryTriples::new(graph()), "<http://example.org/g>").unwrap();
    assert_eq!(store.num_triples(), 4);
}

#[test]
fn mutable_insert_remove_search() {
    let mut store = MutableTriada::new();
    store.insert(&TripleString::new("<a>", "<p>", "<b>")).unwrap();
    store.insert(&TripleString::new("<a>", "<p>", "<c>")).unwrap();
    store.insert(&TripleString::new("<b>", "<q>", "<a>")).unwrap();
    assert_eq!(store.num_triples(), 3);

    let hits: Vec<_> = store.search("<a>", "", "").collect();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|t| t.subject == "<a>"));

    // Pattern removal: all triples with subject <a>.
    assert_eq!(store.remove(&TripleString::new("<a>", "", "")), 2);
    assert_eq!(store.num_triples(), 1);

    // The dictionary keeps growing; removed terms stay resolvable.
    assert_ne!(
        store.dictionary().string_to_id("<c>", triada_common::TripleRole::Object),
        0
    );

    // Removing with an unknown bound term touches nothing.
    assert_eq!(store.remove(&TripleString::new("<zzz>", "", "")), 0);
    assert_eq!(store.num_triples(), 1);
}

#[test]
fn mutable_bulk_insert_is_not_implemented() {
    let mut store = MutableTriada::new();
    let mut iter = graph().into_iter();
    assert!(matches!(store.insert_all(&mut iter), Err(Error::NotImplemented(_))));
}

#[test]
fn mutable_store_persists_its_building_forms() {
    let mut store = MutableTriada::new();
    store.load_from_rdf(&mut MemoryTriples::new(graph())).unwrap();
    store.insert(&TripleString::new("<new>", "<p>", "<b>")).unwrap();

    let mut bytes = Vec::new();
    store.save_to_hdt(&mut bytes).unwrap();

    let mut reloaded = MutableTriada::new();
    reloaded.load_from_hdt(&mut bytes.as_slice()).unwrap();
    assert_eq!(reloaded.num_triples(), store.num_triples());
    assert_eq!(
        reloaded.search("<new>", "", "").collect::<Vec<_>>(),
        vec![TripleString::new("<new>", "<p>", "<b>")]
    );

    // Still mutable after the reload.
    reloaded.insert(&TripleString::new("<even-newer>", "<p>", "<b>")).unwrap();
    assert_eq!(reloaded.search("<even-newer>", "", "").count(), 1);
}

#[test]
fn immutable_container_does_not_load_into_the_mutable_facade() {
    let store = build(Config::new()); // bitmap triples
    let mut bytes = Vec::new();
    store.save_to_hdt(&mut bytes).unwrap();

    let mut mutable = MutableTriada::new();
    assert!(mutable.load_from_hdt(&mut bytes.as_slice()).is_err());
    assert_eq!(mutable.num_triples(), 0);
}

#[cfg(feature = "spill")]
#[test]
fn spill_ingest_matches_the_in_memory_path() {
    let dir = tempfile::tempdir().unwrap();
    let spill_config = Config::new()
        .with("spill.directory", dir.path().join("scratch").to_string_lossy())
        .with("dictionary.type", "pfc");

    let mut spilled = Triada::with_config(spill_config);
    spilled.load_from_rdf(&mut MemoryTriples::new(graph()), "<http://example.org/g>").unwrap();

    let reference = build(Config::new().with("dictionary.type", "pfc"));
    assert_eq!(
        spilled.search("", "", "").collect::<Vec<_>>(),
        reference.search("", "", "").collect::<Vec<_>>()
    );
}
