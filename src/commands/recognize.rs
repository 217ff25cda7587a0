use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::info;

use crate::pipeline::{MatcherKind, Pipeline, Recognition};

/// Print the cards found in every screenshot of `screens`
pub fn recognize(screens: &Path, data_dir: &Path, matcher: MatcherKind, json: bool) -> Result<()> {
    let pipeline = Pipeline::load(data_dir, matcher)?;
    let mut failed = None;

    pipeline.recognize_dir(screens, |r| {
        if json {
            match serde_json::to_string(r) {
                Ok(line) => println!("{}", line),
                Err(e) => failed = Some(e),
            }
        } else {
            println!("{} - {}", r.file_name(), r.hand);
        }
    })?;

    if let Some(e) = failed {
        return Err(e).context("Failed to serialize recognition");
    }
    Ok(())
}

/// Recognize every screenshot and compare with the cards named by its file
pub fn verify(screens: &Path, data_dir: &Path, matcher: MatcherKind) -> Result<()> {
    let pipeline = Pipeline::load(data_dir, matcher)?;
    let results = pipeline.recognize_dir(screens, |r| {
        println!("{} - {}", r.file_name(), r.hand);
    })?;

    let mismatches: Vec<&Recognition> = results.iter().filter(|r| !r.is_expected()).collect();
    if !mismatches.is_empty() {
        let details: Vec<String> = mismatches
            .iter()
            .map(|r| format!("{}: expected {}, actual {}", r.file_name(), r.expected(), r.hand))
            .collect();
        bail!(
            "{} of {} screenshot(s) misread:\n{}",
            mismatches.len(),
            results.len(),
            details.join("\n")
        );
    }

    info!("All {} screenshot(s) read correctly", results.len());
    Ok(())
}
