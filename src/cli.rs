//! Command-line interface
//!
//! Walks a repository, analyzes each TypeScript file with an
//! independent engine pass, and renders the combined report.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{self, RuleConfig};
use crate::engine;
use crate::models::{AnalysisReport, Finding, Severity};
use crate::parsers;
use crate::reporters::{self, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "veritype",
    version,
    about = "Flags TypeScript declarations whose type complexity calls for an explicit runtime check"
)]
pub struct Cli {
    /// Repository or directory to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format: text or json
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Config file (defaults to veritype.toml in PATH)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum score requiring an explicit check on a plain type
    #[arg(long)]
    pub base_threshold: Option<f64>,

    /// Severity tier forwarded to the reporter
    #[arg(long)]
    pub warn_threshold: Option<f64>,

    /// Severity tier; also derives the accumulation ceiling
    #[arg(long)]
    pub error_threshold: Option<f64>,

    /// Interface base score and its reporting floor
    #[arg(long)]
    pub interface_penalty: Option<f64>,

    /// Disable ceiling-capped accumulation
    #[arg(long)]
    pub no_performance_mode: bool,
}

pub fn run(cli: Cli) -> Result<()> {
    let format = OutputFormat::from_str(&cli.format)?;
    let mut rule_config = config::load(&cli.path, cli.config.as_deref()).thresholds;
    apply_overrides(&mut rule_config, &cli);

    let report = analyze(&cli.path, &rule_config);
    let has_high = report
        .findings
        .iter()
        .any(|f| f.severity >= Severity::High);

    println!("{}", reporters::report(&report, format)?);

    if has_high {
        std::process::exit(1);
    }
    Ok(())
}

/// Analyze every supported file under `root` with the given policy.
/// Each file gets an independent pass; no state crosses files.
pub fn analyze(root: &Path, rule_config: &RuleConfig) -> AnalysisReport {
    let files = collect_files(root);

    let results: Vec<(Vec<Finding>, usize)> = files
        .par_iter()
        .filter_map(|path| match parsers::parse_file(path) {
            Ok(parsed) => {
                let findings = engine::findings_for_file(rule_config, &parsed, path);
                Some((findings, parsed.declarations.len()))
            }
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let total_declarations = results.iter().map(|(_, count)| count).sum();
    let mut findings: Vec<Finding> = results
        .into_iter()
        .flat_map(|(findings, _)| findings)
        .collect();
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line_start.cmp(&b.line_start))
    });

    info!(
        "{} findings across {} files",
        findings.len(),
        files.len()
    );

    AnalysisReport::new(findings, files.len(), total_declarations)
}

fn apply_overrides(config: &mut RuleConfig, cli: &Cli) {
    if let Some(v) = cli.base_threshold {
        config.base_threshold = v;
    }
    if let Some(v) = cli.warn_threshold {
        config.warn_threshold = v;
    }
    if let Some(v) = cli.error_threshold {
        config.error_threshold = v;
    }
    if let Some(v) = cli.interface_penalty {
        config.interface_penalty = v;
    }
    if cli.no_performance_mode {
        config.performance_mode = false;
    }
}

fn collect_files(root: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build();

    let mut files = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if parsers::supported_extensions().contains(&ext) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}
