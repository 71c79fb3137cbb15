//! Anonymize command implementation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gretch_core::anonymize::Anonymizer;

use crate::output;

#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Change snapshot to read
    pub infile: PathBuf,

    /// Where to write the anonymized copy
    pub outfile: PathBuf,
}

pub fn run(args: AnonymizeArgs) -> Result<()> {
    let content = fs::read_to_string(&args.infile)
        .with_context(|| format!("Cannot read {}", args.infile.display()))?;
    let mut value: serde_json::Value =
        serde_json::from_str(&content).context("Input is not valid JSON")?;

    let mut anonymizer = Anonymizer::new();
    anonymizer.scrub(&mut value);

    let out = serde_json::to_string_pretty(&value)?;
    fs::write(&args.outfile, out)
        .with_context(|| format!("Cannot write {}", args.outfile.display()))?;

    output::success(&format!(
        "Anonymized snapshot written to {}",
        args.outfile.display()
    ));
    Ok(())
}
