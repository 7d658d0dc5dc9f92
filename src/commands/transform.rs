use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::output::{correct_german_chars, write_corrected};
use crate::palette::Palette;
use crate::transform::{
    KeepOrder, OptionShuffle, RandomOrder, TransformOptions, TransformReport,
    transform_output_with,
};

#[derive(Clone, Debug, Default)]
pub struct TransformArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
    pub no_shuffle: bool,
    pub strict: bool,
}

/// Picks the option shuffler for a run: identity, seeded or thread-local.
pub fn shuffler_for(seed: Option<u64>, no_shuffle: bool) -> Box<dyn OptionShuffle> {
    match (no_shuffle, seed) {
        (true, _) => Box::new(KeepOrder),
        (false, Some(seed)) => Box::new(RandomOrder(StdRng::seed_from_u64(seed))),
        (false, None) => Box::new(RandomOrder(rand::rng())),
    }
}

pub fn run(args: TransformArgs) -> Result<()> {
    let raw = read_input(args.input.as_deref())?;
    let mut shuffler = shuffler_for(args.seed, args.no_shuffle);
    let options = TransformOptions {
        strict: args.strict,
    };

    let report = transform_output_with(&raw, &options, shuffler.as_mut());
    print_warnings(&report, args.strict);

    match args.output {
        Some(path) => {
            write_corrected(&path, &report.text)?;
            println!(
                "Wrote {}",
                Palette::paint(Palette::ACCENT, path.display())
            );
        }
        None => print_corrected(&mut io::stdout().lock(), &report.text)?,
    }
    Ok(())
}

/// Same `ß` correction as the file output.
fn print_corrected(out: &mut impl Write, text: &str) -> Result<()> {
    writeln!(out, "{}", correct_german_chars(text)).context("Failed to write stdout")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

fn print_warnings(report: &TransformReport, strict: bool) {
    if report.failed {
        eprintln!(
            "{}",
            Palette::paint(
                Palette::DANGER,
                "Input could not be transformed; the output holds the diagnostic."
            )
        );
    }
    if !strict {
        return;
    }
    for missing in &report.unmatched {
        eprintln!(
            "{} record {}: blank {:?} does not occur in its text",
            Palette::paint(Palette::WARNING, "warning:"),
            missing.record,
            missing.phrase
        );
    }
}
