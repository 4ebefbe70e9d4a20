use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use dexledger_core::{run, EditSettings, Language, Revision};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RevisionArg {
    Classic,
    Extended,
}

impl From<RevisionArg> for Revision {
    fn from(arg: RevisionArg) -> Revision {
        match arg {
            RevisionArg::Classic => Revision::Classic,
            RevisionArg::Extended => Revision::Extended,
        }
    }
}

fn parse_offset(token: &str) -> Result<usize, String> {
    let res = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16)
    } else {
        token.parse::<usize>()
    };
    res.map_err(|e| format!("invalid offset '{token}': {e}"))
}

fn parse_language(token: &str) -> Result<Language, String> {
    Language::from_name(token).ok_or_else(|| format!("unrecognized language '{token}'"))
}

#[derive(Debug, Parser)]
#[command(name = "dexledger", version, about = "Packed dex ledger save editor")]
struct Args {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    /// Byte offset of the ledger region inside the save file (decimal or
    /// 0x-prefixed hex).
    #[arg(long, default_value = "0", value_parser = parse_offset)]
    base_offset: usize,

    #[arg(long, value_enum, default_value_t = RevisionArg::Extended)]
    revision: RevisionArg,

    /// Catalog JSON with per-entity form counts and sex restrictions.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Save language recorded on caught entries (e.g. english, jpn, kor).
    #[arg(long, default_value = "english", value_parser = parse_language)]
    language: Language,

    #[arg(long, default_value_t = false)]
    seen_all: bool,

    #[arg(long, default_value_t = false)]
    caught_all: bool,

    #[arg(long, default_value_t = false)]
    caught_none: bool,

    #[arg(long, default_value_t = false)]
    clear_all: bool,

    #[arg(long, default_value_t = false)]
    complete_all: bool,

    /// Also populate the shiny planes for seen/caught/complete operations.
    #[arg(long, default_value_t = false)]
    shiny: bool,

    /// Write a summary log next to the output file.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let settings = EditSettings {
        input_path: args.input,
        output_path: args.output,
        base_offset: args.base_offset,
        revision: args.revision.into(),
        catalog_path: args.catalog,
        language: args.language,
        mark_all_seen: args.seen_all,
        mark_all_caught: args.caught_all,
        caught_none: args.caught_none,
        clear_all: args.clear_all,
        complete_all: args.complete_all,
        shiny_too: args.shiny,
        debug: args.debug,
    };

    match run(settings) {
        Ok(summary) => print!("{summary}"),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
