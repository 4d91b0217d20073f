//! Minimal CLI: documents → (synth | schema | check)
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use jq_synth::{Document, Jaq, Schema, ScorePolicy, Spec, SynthConfig, Synthesizer};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// synthesize jq expressions from input/output examples
#[derive(Parser, Debug)]
#[command(name = "jq-synth")]
pub struct CommandLineInterface {
    /// log search progress to stderr (see also JQ_SYNTH_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// synthesize an expression for each specification document
    Synth(SynthOut),
    /// print the inferred input and output schemas
    Schema(SchemaOut),
    /// run a given expression against each document and report its score
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more specification documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct SearchSettings {
    /// maximum number of operators in a pipeline
    #[arg(long, default_value_t = SynthConfig::default().depth)]
    depth: usize,

    /// stop after this many satisfying expressions
    #[arg(long, default_value_t = SynthConfig::default().max_results)]
    max_results: usize,

    /// how candidates failing some example are ranked
    #[arg(long, value_enum, default_value_t = ScorePolicy::FirstMismatch)]
    score_policy: ScorePolicy,

    /// accept per-field records without re-checking them against the examples
    #[arg(long, default_value_t = false)]
    no_verify_union: bool,
}

#[derive(clap::Parser, Debug)]
struct SynthOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    search: SearchSettings,

    /// output .json report (stdout text if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// expression to verify
    #[arg(long, short = 'e')]
    expr: String,

    #[arg(long, value_enum, default_value_t = ScorePolicy::FirstMismatch)]
    score_policy: ScorePolicy,
}

#[derive(Debug, Serialize)]
struct SynthReport {
    file: String,
    expressions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    elapsed_ms: i64,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> anyhow::Result<Vec<(PathBuf, Document)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        source_paths
            .into_iter()
            .map(|path| {
                let doc = Document::read(&path)
                    .with_context(|| format!("loading {}", path.display()))?;
                Ok((path, doc))
            })
            .collect()
    }
}

impl SearchSettings {
    fn config(&self) -> SynthConfig {
        SynthConfig {
            score_policy: self.score_policy,
            verify_union: !self.no_verify_union,
            ..SynthConfig::default()
        }
        .with_depth(self.depth)
        .with_max_results(self.max_results)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        jq_synth::logging::init_tracing(self.verbose);
        match &self.cmd {
            Command::Synth(target) => target.run(),
            Command::Schema(target) => target.run(),
            Command::Check(target) => target.run(),
        }
    }
}

impl SynthOut {
    fn run(&self) -> anyhow::Result<()> {
        let documents = self.input_settings.load()?;
        let synthesizer = Synthesizer::new(Jaq, self.search.config());

        // Documents are independent; each synthesis stays single-threaded.
        let reports = documents
            .par_iter()
            .map(|(path, doc)| synth_one(&synthesizer, path, doc))
            .collect::<Vec<_>>();

        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let src = serde_json::to_string_pretty(&reports)?;
            std::fs::write(out, src).with_context(|| format!("writing {}", out.display()))?;
        } else {
            for report in &reports {
                print_report(report);
            }
        }

        let failed = reports.iter().filter(|r| r.error.is_some()).count();
        if failed > 0 {
            anyhow::bail!("{failed} of {} documents could not be synthesized", reports.len());
        }
        Ok(())
    }
}

fn synth_one(synthesizer: &Synthesizer<Jaq>, path: &Path, doc: &Document) -> SynthReport {
    let started = chrono::Utc::now();
    let result = synthesizer.run(&doc.examples, &doc.constants);
    let elapsed_ms = (chrono::Utc::now() - started).num_milliseconds();
    let (expressions, error) = match result {
        Ok(programs) => (programs.iter().map(|p| p.render()).collect(), None),
        Err(error) => (Vec::new(), Some(error.to_string())),
    };
    SynthReport {
        file: path.display().to_string(),
        expressions,
        error,
        reference: doc.expression.clone(),
        elapsed_ms,
    }
}

fn print_report(report: &SynthReport) {
    let timing = format!("({} ms)", report.elapsed_ms).dimmed();
    match &report.error {
        None => {
            println!("{} {} {timing}", "✔".green(), report.file.bold());
            for expr in &report.expressions {
                println!("    {expr}");
            }
        }
        Some(error) => {
            println!("{} {} {timing}", "✘".red(), report.file.bold());
            println!("    {}", error.red());
        }
    }
}

impl SchemaOut {
    fn run(&self) -> anyhow::Result<()> {
        for (path, doc) in self.input_settings.load()? {
            let input = Schema::common(doc.examples.iter().map(|ex| &ex.input));
            let output = Schema::common(doc.examples.iter().flat_map(|ex| &ex.output));
            let view = serde_json::json!({
                "file": path.display().to_string(),
                "input": input,
                "output": output,
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Ok(())
    }
}

impl CheckOut {
    fn run(&self) -> anyhow::Result<()> {
        let mut failed = 0usize;
        for (path, doc) in self.input_settings.load()? {
            let spec = Spec::new(doc.examples, &doc.constants).with_policy(self.score_policy);
            let verdict = spec.verify_text(&Jaq, &self.expr);
            if verdict.is_match() {
                println!("{} {}", "✔".green(), path.display());
            } else {
                failed += 1;
                println!("{} {} (score {})", "✘".red(), path.display(), verdict.score);
            }
        }
        if failed > 0 {
            anyhow::bail!("`{}` does not satisfy {failed} document(s)", self.expr);
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_flags_map_onto_config() {
        let cli = CommandLineInterface::parse_from([
            "jq-synth", "synth", "-i", "a.json", "--depth", "5", "--max-results", "2",
            "--score-policy", "aggregate", "--no-verify-union",
        ]);
        let Command::Synth(target) = cli.cmd else {
            panic!("expected synth");
        };
        let cfg = target.search.config();
        assert_eq!(cfg.depth, 5);
        assert_eq!(cfg.max_results, 2);
        assert_eq!(cfg.score_policy, ScorePolicy::Aggregate);
        assert!(!cfg.verify_union);
    }

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["fixtures/sort.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("fixtures/sort.json")]);
    }

    #[test]
    fn unmatched_globs_are_errors() {
        assert!(resolve_file_path_patterns(["/nonexistent/*.json"]).is_err());
    }
}
