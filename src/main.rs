//! apidoc: generate a cross-linked static HTML API reference from a program
//! snapshot.
//!
//! The snapshot is a JSON dump of a program's libraries, types, and members
//! written by a reflection tool:
//!
//! - `apidoc snapshot.json` writes the site to `docs/`
//! - `apidoc --mode static --include-lib core -o out snapshot.json`

mod assets;
mod generate;
mod index;
mod inherit;
mod links;
mod model;
mod parser;
mod render;
mod resolve;
mod walk;

#[cfg(test)]
mod testutil;

use anyhow::{Context, Result};
use clap::Parser;
use generate::{DirSink, Generator, GeneratorOptions};
use index::SymbolIndex;
use parser::comments::SourceComments;
use render::nav::{create_navigation, NavMode};
use std::path::{Path, PathBuf};
use walk::LibraryFilter;

#[derive(Parser)]
#[command(
    name = "apidoc",
    about = "Generate a cross-linked HTML API reference from a program snapshot"
)]
struct Cli {
    /// Program snapshot (JSON) written by the reflection tool
    snapshot: PathBuf,

    /// Output directory; deleted and recreated on every run
    #[arg(short = 'o', long = "out", default_value = "docs")]
    out: PathBuf,

    /// How pages get their navigation sidebar
    #[arg(long, value_enum, default_value_t = NavMode::LiveNav)]
    mode: NavMode,

    /// Only document these libraries. Can be given multiple times or
    /// comma separated. Defaults to every library in the snapshot.
    #[arg(long = "include-lib", value_delimiter = ',')]
    include_lib: Vec<String>,

    /// Show each declaration's source below its documentation
    #[arg(long)]
    include_source: bool,

    /// Write appcache.manifest and reference it from every page
    #[arg(long)]
    generate_app_cache: bool,

    /// Leave the generation timestamp out so reruns are byte-identical
    #[arg(long)]
    omit_generation_time: bool,

    /// Base URL for types from libraries that are not documented here
    #[arg(long = "link-api", value_name = "URL")]
    link_api: Option<String>,

    /// Title of the index page
    #[arg(long, default_value = "API Reference")]
    title: String,

    /// Log every page written
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let program = parser::load_program(&cli.snapshot)
        .with_context(|| format!("failed to load {}", cli.snapshot.display()))?;

    let filter = LibraryFilter::from_names(cli.include_lib.clone());
    for name in &cli.include_lib {
        if !program.libraries.iter().any(|l| &l.name == name) {
            log::warn!("library {} is not in the snapshot", name);
        }
    }
    let index = SymbolIndex::build(&program, &filter);

    let generated_on = if cli.omit_generation_time {
        None
    } else {
        Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    };
    let options = GeneratorOptions {
        title: cli.title.clone(),
        include_source: cli.include_source,
        app_cache: cli.generate_app_cache,
        generated_on: generated_on.clone(),
        link_api: cli.link_api.clone(),
    };

    // Source paths in the snapshot are relative to the snapshot itself.
    let comments = SourceComments::new(snapshot_dir(&cli.snapshot));
    let navigation = create_navigation(cli.mode);

    let mut sink = DirSink::create(&cli.out);
    let summary = Generator::new(&index, &comments, navigation.as_ref(), &options).run(&mut sink)?;

    assets::write_assets(sink.root())?;
    if cli.generate_app_cache {
        assets::write_app_cache(sink.root(), generated_on.as_deref())?;
    }

    log::info!(
        "Documented {} libraries, {} types, and {} members.",
        summary.libraries,
        summary.types,
        summary.members
    );
    Ok(())
}

fn snapshot_dir(snapshot: &Path) -> PathBuf {
    match snapshot.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
