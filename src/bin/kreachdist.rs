use std::path::{Path, PathBuf};

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use kreachdist::config::kreachdist_config;
use kreachdist::constants::DIST_EXTENSION;
use kreachdist::error::Error;
use kreachdist::{distance, parser, summary};

/// Computes the minimum instruction distance from every reachable
/// instruction in an LLVM IR file to its first call to `@klee_reach()`.
#[derive(Parser, Debug)]
#[command(
    name = "kreachdist",
    about = "Compute distance-to-target for KLEE's search heuristic",
    author = "Shengtuo Hu <h1994st@gmail.com>",
    version
)]
struct KreachdistArgs {
    /// Input LLVM IR file (.ll)
    input: PathBuf,

    /// Pass the literal word "debug" to dump the parsed CFGs and summaries
    /// at debug log level
    debug_literal: Option<String>,

    /// Output .dist file path, overriding the input-adjacent default
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Verbose mode (repeatable)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Replaces the input file's extension with `.dist`, honoring the
/// configured output directory override if one is set.
fn default_output_path(input: &Path) -> PathBuf {
    let with_dist_ext = input.with_extension(DIST_EXTENSION);
    match kreachdist_config().output_dir() {
        Some(dir) => dir.join(with_dist_ext.file_name().unwrap_or_default()),
        None => with_dist_ext,
    }
}

pub fn main() -> Result<(), Error> {
    let args = KreachdistArgs::parse();

    // The `debug` positional stacks with `-v` as one more level of verbosity
    // (spec: passing `debug` is equivalent to `-vv` on top of whatever `-v`
    // flags were also given). CLI verbosity overrides the configured
    // default; with neither set we fall back to warnings only.
    let debug_verbosity = if args.debug_literal.is_some() { 2 } else { 0 };
    let effective_verbose = args.verbose as usize + debug_verbosity;
    let log_level = if effective_verbose > 0 {
        LevelFilter::iter()
            .nth(2 + effective_verbose)
            .unwrap_or(LevelFilter::max())
    } else {
        kreachdist_config().log_level()
    };
    SimpleLogger::new()
        .with_level(log_level)
        .init()
        .map_err(|err| Error::LoggerError(err.to_string()))?;

    if let Some(literal) = &args.debug_literal {
        if literal != "debug" {
            return Err(Error::InvalidArguments(format!(
                "unexpected second argument {literal:?}; the only accepted value is \"debug\""
            )));
        }
    }
    // Gated on the effective log level rather than `debug_literal` directly,
    // since `-vv`/`-vvv` reach the same level without the `debug` positional.
    let debug = log_level >= LevelFilter::Debug;

    let input_filepath = args.input.canonicalize().map_err(|err| {
        Error::MissingFile(format!(
            "input file does not exist: {:?}: {err}",
            args.input
        ))
    })?;

    let program = parser::parse(&input_filepath)?;

    if debug {
        program.log_debug_dump();
    }

    let summaries = summary::summarize_functions(&program);
    if debug {
        log::debug!("function summaries: {summaries:?}");
    }

    let dist = distance::compute_distances(&program, &summaries);

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&input_filepath));
    dist.write_to_file(&output_path)?;

    println!("Distances written to {}", output_path.display());

    Ok(())
}
