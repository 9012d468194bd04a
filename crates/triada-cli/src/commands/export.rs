//! Serialize a container back to N-Triples.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use triada_engine::Triada;

/// Run the export command.
pub fn run(input: &Path, output: Option<&Path>, quiet: bool) -> Result<()> {
    let store =
        Triada::open(input).with_context(|| format!("cannot open {}", input.display()))?;

    let written = match output {
        Some(path) => {
            let mut writer = BufWriter::new(
                File::create(path).with_context(|| format!("cannot write {}", path.display()))?,
            );
            let written = store.save_to_rdf(&mut writer)?;
            writer.flush()?;
            written
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            store.save_to_rdf(&mut lock)?
        }
    };

    if !quiet {
        eprintln!("exported {written} triples");
    }
    Ok(())
}
