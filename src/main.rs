//! # resgen: The Main Entry Point
//!
//! Parses the command line, initializes logging and hands off to the
//! generator. `resgen <INPUT_DIR> <OUTPUT_FILE>` embeds every file under
//! `INPUT_DIR` into a C++ header at `OUTPUT_FILE`.
//!
//! Exit status is `0` on success, `2` on a usage error and `1` when the
//! header could not be generated.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

mod config;
mod emitter;
mod encoder;
mod error;
mod generator;
mod invariant_ppt;
mod naming;
mod system;

use config::{CollisionPolicy, GeneratorConfig, WalkOrder, DEFAULT_NAMESPACE, MAX_CHUNK_LENGTH};
use system::LocalFs;

/// Embed a directory of resource files into a single C++ header.
///
/// Each file becomes a `<NAME>_CHUNKS` vector of base64 string literals and a
/// `<NAME>_PATH` string holding its path relative to the input directory.
#[derive(Parser)]
#[command(name = "resgen", version)]
#[command(about = "Embed a directory of resources into a C++ header", long_about = None)]
struct Cli {
    /// Directory whose files are embedded.
    input_dir: PathBuf,

    /// Header to write. Replaced atomically if it exists.
    output_file: PathBuf,

    /// Longest string literal to emit, in characters.
    #[arg(long, default_value_t = MAX_CHUNK_LENGTH)]
    max_chunk_length: usize,

    /// Declaration order.
    #[arg(long, value_enum, default_value_t = WalkOrder::Sorted)]
    order: WalkOrder,

    /// What to do when two files map to the same identifier.
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Fail)]
    on_collision: CollisionPolicy,

    /// Descend into symlinked directories. Symlinked files are embedded either way.
    #[arg(long)]
    follow_links: bool,

    /// C++ namespace wrapping the declarations. Also names the include guard.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Report what would be embedded as JSON on stdout; write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Turn on verbose logging.
    ///
    /// - `-v`: Debug
    /// - `-vv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            max_chunk_length: self.max_chunk_length,
            order: self.order,
            on_collision: self.on_collision,
            follow_links: self.follow_links,
            namespace: self.namespace.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // All logging goes to stderr; stdout carries only the dry-run report.
    let _ = TermLogger::init(log_level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.generator_config();

    if cli.dry_run {
        let report = generator::dry_run(&LocalFs, &cli.input_dir, &config)
            .with_context(|| format!("dry run over {:?} failed", cli.input_dir))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!("Embedding {:?} into {:?}", cli.input_dir, cli.output_file);
    let result = if config == GeneratorConfig::default() {
        generator::generate(&cli.input_dir, &cli.output_file)
    } else {
        generator::generate_with(&LocalFs, &cli.input_dir, &cli.output_file, &config)
    };
    result.with_context(|| format!("failed to generate {:?}", cli.output_file))?;
    Ok(())
}
