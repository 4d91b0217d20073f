//! Runs every fixture document through the synthesizer and checks each
//! answer against the oracle.
//!
//! ```text
//! cargo run -p dev-test-runner -- [NAME_REGEX] [--depth N] [--dir PATH]
//! ```
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;

use jq_synth::{Document, Jaq, Oracle, SynthConfig, Synthesizer};

static DEFAULT_FIXTURES: Lazy<PathBuf> =
    Lazy::new(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures"));

/// run the fixture documents through the synthesizer
#[derive(Parser, Debug)]
struct Options {
    /// only run fixtures whose file stem matches this regex
    filter: Option<Regex>,

    /// maximum number of operators in a pipeline
    #[arg(long, default_value_t = SynthConfig::default().depth)]
    depth: usize,

    /// directory holding the fixture documents
    #[arg(long, default_value_os_t = (*DEFAULT_FIXTURES).clone())]
    dir: PathBuf,
}

fn fixture_paths(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = dir.join("*.json");
    let pattern = pattern.to_string_lossy();
    let mut paths = glob::glob(&pattern)
        .with_context(|| format!("invalid fixture pattern {pattern}"))?
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

enum Status {
    Pass { text: String, matches_reference: bool },
    Unsound { text: String },
    Failed(String),
}

fn run_fixture(synthesizer: &Synthesizer<Jaq>, doc: &Document) -> Status {
    let text = match synthesizer.run(&doc.examples, &doc.constants) {
        Ok(programs) => programs.first().map(|p| p.render()).unwrap_or_default(),
        Err(error) => return Status::Failed(error.to_string()),
    };
    let sound = doc
        .examples
        .iter()
        .all(|ex| Jaq.run(&text, &ex.input).is_ok_and(|out| out == ex.output));
    if !sound {
        return Status::Unsound { text };
    }
    let matches_reference = doc.expression.as_deref().is_none_or(|r| r == text);
    Status::Pass { text, matches_reference }
}

fn main() -> anyhow::Result<ExitCode> {
    let opts = Options::parse();
    let synthesizer = Synthesizer::new(Jaq, SynthConfig::default().with_depth(opts.depth));

    let (mut passed, mut failed) = (0usize, 0usize);
    for path in fixture_paths(&opts.dir)? {
        let name = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        if opts.filter.as_ref().is_some_and(|rx| !rx.is_match(&name)) {
            continue;
        }
        let doc = match Document::read(&path) {
            Ok(doc) => doc,
            Err(error) => {
                failed += 1;
                println!("{} {name}: {}", "✘".red(), error.to_string().red());
                continue;
            }
        };
        match run_fixture(&synthesizer, &doc) {
            Status::Pass { text, matches_reference } => {
                passed += 1;
                let note = if matches_reference {
                    String::new()
                } else {
                    format!(" (reference: {})", doc.expression.unwrap_or_default())
                        .dimmed()
                        .to_string()
                };
                println!("{} {name}: {text}{note}", "✔".green());
            }
            Status::Unsound { text } => {
                failed += 1;
                println!("{} {name}: `{text}` does not reproduce the examples", "✘".red());
            }
            Status::Failed(error) => {
                failed += 1;
                println!("{} {name}: {}", "✘".red(), error.red());
            }
        }
    }

    println!("\n{passed} passed, {failed} failed");
    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_filter_parse() {
        let opts = Options::parse_from(["dev-test-runner", "^sort", "--depth", "2"]);
        assert_eq!(opts.depth, 2);
        assert_eq!(opts.dir, *DEFAULT_FIXTURES);
        assert!(opts.filter.is_some_and(|rx| rx.is_match("sort_by") && !rx.is_match("keys")));
    }

    #[test]
    fn fixtures_are_globbed_in_order() {
        let paths = fixture_paths(&DEFAULT_FIXTURES).unwrap();
        assert!(paths.iter().any(|p| p.ends_with("sort.json")));
        assert!(paths.windows(2).all(|w| w[0] < w[1]));
        assert!(paths.iter().all(|p| p.extension().is_some_and(|ext| ext == "json")));
    }
}
