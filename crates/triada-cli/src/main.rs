//! The `triada` binary: build, inspect, query and export containers.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Machine-readable JSON.
    Json,
}

/// Dictionary form for `import`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DictionaryChoice {
    /// Hash-backed form.
    Plain,
    /// Front-coded form.
    Pfc,
}

impl DictionaryChoice {
    fn config_value(self) -> &'static str {
        match self {
            DictionaryChoice::Plain => "plain",
            DictionaryChoice::Pfc => "pfc",
        }
    }
}

/// Triples form for `import`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TriplesChoice {
    /// Sorted list.
    List,
    /// Parallel columns.
    Plain,
    /// Grouped streams.
    Compact,
    /// Bitmap-delimited streams.
    Bitmap,
}

impl TriplesChoice {
    fn config_value(self) -> &'static str {
        match self {
            TriplesChoice::List => "list",
            TriplesChoice::Plain => "plain",
            TriplesChoice::Compact => "compact",
            TriplesChoice::Bitmap => "bitmap",
        }
    }
}

#[derive(Parser)]
#[command(name = "triada", version, about = "Compact, self-indexed RDF triple store")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress non-essential output.
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build a container from an N-Triples file.
    Import {
        /// Input N-Triples file.
        input: PathBuf,
        /// Output container file.
        output: PathBuf,
        /// Post-ingest dictionary form.
        #[arg(long, value_enum, default_value = "pfc")]
        dictionary: DictionaryChoice,
        /// Post-ingest triples form.
        #[arg(long, value_enum, default_value = "bitmap")]
        triples: TriplesChoice,
        /// Component order for the compact forms.
        #[arg(long, default_value = "SPO")]
        order: String,
        /// Skip the metadata header.
        #[arg(long)]
        no_header: bool,
        /// Base IRI for the header statements.
        #[arg(long)]
        base_uri: Option<String>,
    },

    /// Serialize a container back to N-Triples.
    Export {
        /// Input container file.
        input: PathBuf,
        /// Output file; stdout when omitted.
        output: Option<PathBuf>,
    },

    /// Evaluate a single triple pattern ('?' or '' is a wildcard).
    Query {
        /// Container file.
        file: PathBuf,
        /// Subject term or wildcard.
        subject: String,
        /// Predicate term or wildcard.
        predicate: String,
        /// Object term or wildcard.
        object: String,
        /// Print at most this many results.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show container statistics.
    Info {
        /// Container file.
        file: PathBuf,
        /// Output rendering.
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Import { input, output, dictionary, triples, order, no_header, base_uri } => {
            commands::import::run(
                &input,
                &output,
                dictionary,
                triples,
                &order,
                no_header,
                base_uri.as_deref(),
                cli.quiet,
            )
        }
        Command::Export { input, output } => {
            commands::export::run(&input, output.as_deref(), cli.quiet)
        }
        Command::Query { file, subject, predicate, object, limit } => {
            commands::query::run(&file, &subject, &predicate, &object, limit)
        }
        Command::Info { file, format } => commands::info::run(&file, format, cli.quiet),
    }
}
