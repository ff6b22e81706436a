use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use randtxt_core::io::read_tsv;
use randtxt_core::stats::write_entropy;
use randtxt_core::{Builder, Chain, Generator, MemoryChain, Model};

/// Random text from part-of-speech tagged corpora.
#[derive(Parser)]
#[command(name = "randtxt", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Learn tagged TSV files (one `text<TAB>POS` per line) into a chain file
    Build {
        /// Path of the output chain file
        #[arg(long)]
        chain: PathBuf,

        /// Add to the existing chain file instead of overwriting it
        #[arg(long)]
        update: bool,

        /// Ngram size
        #[arg(short, default_value_t = 3)]
        n: usize,

        /// Tagged corpus files, each learned as an independent stream
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },

    /// Generate paragraphs from a chain file
    Generate {
        /// Path of the chain file
        #[arg(long)]
        chain: PathBuf,

        /// Number of paragraphs to generate
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Random seed, 0 picks one and prints it to stderr
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Minimum number of sentences per paragraph
        #[arg(long, default_value_t = 3)]
        min: usize,

        /// Maximum number of sentences per paragraph (exclusive)
        #[arg(long, default_value_t = 6)]
        max: usize,
    },

    /// Write the entropy of each step of a walk until its mean settles
    Stats {
        /// Path of the chain file
        #[arg(long)]
        chain: PathBuf,

        /// Path of the entropy output file
        #[arg(long)]
        entropy: PathBuf,

        /// Random seed, 0 picks one and prints it to stderr
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    match Cli::parse().command {
        Command::Build { chain, update, n, sources } => build(chain, update, n, &sources),
        Command::Generate { chain, count, seed, min, max } => generate(chain, count, seed, min, max),
        Command::Stats { chain, entropy, seed } => stats(chain, entropy, seed),
    }
}

fn build(output: PathBuf, update: bool, n: usize, sources: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let tags = sources
        .iter()
        .map(|source| {
            read_tsv(source).map_err(|e| format!("file error ({}): {e}", source.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Updating reloads the whole chain, extends it and writes it back.
    let chain = if update {
        MemoryChain::open_or_default(&output)?
    } else {
        MemoryChain::default()
    };

    let mut builder = Builder::new(chain, n)?;
    builder.feed(tags)?;

    let chain = builder.into_inner();
    chain.save(&output)?;
    info!("wrote {} nodes to {}", chain.len(), output.display());

    Ok(())
}

fn generate(source: PathBuf, count: usize, seed: u64, min: usize, max: usize) -> Result<(), Box<dyn Error>> {
    let chain = MemoryChain::open(&source)
        .map_err(|e| format!("unable to read chain ({}): {e}", source.display()))?;

    let mut generator = Generator::new(Arc::new(chain))
        .map_err(|e| format!("invalid chain: {e}"))?
        .with_rng(StdRng::seed_from_u64(resolve_seed(seed)));

    let mut out = BufWriter::new(io::stdout().lock());
    for i in 0..count {
        generator
            .write_paragraph(&mut out, min, max)
            .map_err(|e| format!("unable to generate paragraph: {e}"))?;

        if i < count - 1 {
            out.write_all(b"\n\n")?;
        }
    }
    out.write_all(b"\n")?;
    out.flush()?;

    Ok(())
}

fn stats(source: PathBuf, entropy: PathBuf, seed: u64) -> Result<(), Box<dyn Error>> {
    let chain = MemoryChain::open(&source)
        .map_err(|e| format!("unable to read chain ({}): {e}", source.display()))?;

    let mut model = Model::new(Arc::new(chain), "", StdRng::seed_from_u64(resolve_seed(seed)))?;

    let mut out = BufWriter::new(File::create(&entropy)?);
    let steps = write_entropy(&mut out, &mut model).map_err(|e| format!("unable to find entropy: {e}"))?;
    out.flush()?;
    info!("entropy settled after {steps} steps");

    Ok(())
}

/// Replaces a zero seed with the process id, and reports it so the run can
/// be reproduced.
fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }

    let seed = u64::from(process::id());
    eprintln!("--seed={seed}");
    seed
}
