//! Build a container from an N-Triples file.

use std::path::Path;

use anyhow::{Context, Result};
use triada_common::progress::{NoListener, Progress, ProgressListener};
use triada_engine::rdf::NtriplesReader;
use triada_engine::{Config, Triada};

use crate::{DictionaryChoice, TriplesChoice};

/// Prints one line per pipeline stage transition.
struct ConsoleProgress {
    last_stage: String,
}

impl ProgressListener for ConsoleProgress {
    fn notify(&mut self, stage: &str, _done: u64, _total: u64) -> Progress {
        if stage != self.last_stage {
            eprintln!("  {stage}...");
            self.last_stage = stage.to_string();
        }
        Progress::Continue
    }
}

/// Run the import command.
#[allow(clippy::too_many_arguments)]
pub fn run(
    input: &Path,
    output: &Path,
    dictionary: DictionaryChoice,
    triples: TriplesChoice,
    order: &str,
    no_header: bool,
    base_uri: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let mut config = Config::new()
        .with("dictionary.type", dictionary.config_value())
        .with("triples.type", triples.config_value())
        .with("triples.component.order", order);
    if no_header {
        config.set("noheader", "true");
    }

    let mut parser = NtriplesReader::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let base = base_uri
        .map(str::to_string)
        .unwrap_or_else(|| format!("<file://{}>", input.display()));

    let mut store = Triada::with_config(config);
    if quiet {
        store.load_from_rdf_with_listener(&mut parser, &base, &mut NoListener)?;
    } else {
        let mut progress = ConsoleProgress { last_stage: String::new() };
        store.load_from_rdf_with_listener(&mut parser, &base, &mut progress)?;
    }

    store
        .save_to_file(output)
        .with_context(|| format!("cannot write {}", output.display()))?;

    if !quiet {
        eprintln!(
            "imported {} triples ({} dictionary terms) into {}",
            store.num_triples(),
            store.dictionary().num_elements(),
            output.display()
        );
    }
    Ok(())
}
