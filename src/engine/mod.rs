//! The complexity engine: scoring plus the two-phase reporting protocol
//!
//! # Architecture
//!
//! ```text
//! ParsedFile ──► AnalysisPass
//!                 │  Pass 1: scan declarations in source order
//!                 │    - type alias:  record static-of exemption, or
//!                 │                   score and report immediately
//!                 │    - interface:   score and report immediately
//!                 │    - validator:   flat-score and defer
//!                 │  Pass 2: flush deferred validator reports,
//!                 │          suppressing exempted names
//!                 ▼
//!               Reports ──► Findings
//! ```
//!
//! Exemption aliases and the validators they name may appear in either
//! order in the source, so deferred entries are only resolved once the
//! whole file has been scanned; the lookup never observes a partially
//! populated exemption record. All state here is scoped to one pass
//! over one file and dropped at its end.

pub mod exemption;
pub mod scorer;
pub mod threshold;
pub mod validators;

use std::path::Path;

use crate::ast::{Declaration, ParsedFile, Span, TypeExprArena};
use crate::config::RuleConfig;
use crate::models::{deterministic_finding_id, Finding};
use exemption::ExemptionTracker;
use scorer::ComplexityScorer;
use threshold::{Decision, ThresholdEvaluator};

/// Depth at which declarations enter the scorer. The decay multiplier
/// `log2(depth + 1)` zeroes anything computed at depth 0, so the pass
/// starts one level down.
pub const DECLARATION_DEPTH: u32 = 1;

/// A reporting decision anchored to a source location
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub decision: Decision,
    pub span: Span,
}

#[derive(Debug)]
struct DeferredReport {
    name: String,
    score: f64,
    span: Span,
}

/// One analysis pass over one file. Owns all pass-scoped state: the
/// score cache, the active-visit set, the exemption record, and the
/// deferred-report queue. Never reused across files.
pub struct AnalysisPass<'a> {
    config: &'a RuleConfig,
    scorer: ComplexityScorer<'a>,
    thresholds: ThresholdEvaluator<'a>,
    exemptions: ExemptionTracker,
    deferred: Vec<DeferredReport>,
    reports: Vec<Report>,
}

impl<'a> AnalysisPass<'a> {
    pub fn new(config: &'a RuleConfig) -> Self {
        Self {
            config,
            scorer: ComplexityScorer::new(config),
            thresholds: ThresholdEvaluator::new(config),
            exemptions: ExemptionTracker::new(),
            deferred: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Run both phases over a parsed file and return the final reports.
    pub fn run(config: &RuleConfig, file: &ParsedFile) -> Vec<Report> {
        let mut pass = AnalysisPass::new(config);
        for declaration in &file.declarations {
            pass.scan(&file.arena, declaration);
        }
        pass.flush()
    }

    /// Pass 1: judge one declaration. Type aliases and interfaces are
    /// decided immediately; validator constructions are deferred until
    /// the exemption record is complete.
    pub fn scan(&mut self, arena: &TypeExprArena, declaration: &Declaration) {
        match declaration {
            Declaration::TypeAlias {
                ty,
                static_of,
                span,
                ..
            } => {
                if let Some(validator) = static_of {
                    // The alias re-exposes an already-checked validator's
                    // static type; record the name and do not judge it.
                    self.exemptions.record(validator.clone());
                    return;
                }
                let score = self.scorer.score(arena, *ty, DECLARATION_DEPTH);
                if let decision @ Decision::MissingExplicitCheck { .. } =
                    self.thresholds.evaluate_plain(score)
                {
                    self.reports.push(Report {
                        decision,
                        span: *span,
                    });
                }
            }
            Declaration::Interface { name, ty, span } => {
                let score = self.scorer.score(arena, *ty, DECLARATION_DEPTH);
                if let decision @ Decision::ComplexInterfaceNeedsCheck { .. } =
                    self.thresholds.evaluate_interface(name, score)
                {
                    self.reports.push(Report {
                        decision,
                        span: *span,
                    });
                }
            }
            Declaration::ValidatorConstruction {
                name,
                call,
                has_type_annotation,
                span,
            } => {
                if *has_type_annotation {
                    return;
                }
                let score = validators::flat_score(call);
                if let Decision::MissingExplicitCheck { score } =
                    self.thresholds.evaluate_plain(score)
                {
                    self.deferred.push(DeferredReport {
                        name: name.clone(),
                        score,
                        span: *span,
                    });
                }
            }
        }
    }

    /// Pass 2: resolve the deferred queue against the now-complete
    /// exemption record.
    pub fn flush(mut self) -> Vec<Report> {
        let deferred = std::mem::take(&mut self.deferred);
        for entry in deferred {
            if self.exemptions.is_exempt(&entry.name) {
                continue;
            }
            self.reports.push(Report {
                decision: Decision::MissingExplicitCheck { score: entry.score },
                span: entry.span,
            });
        }
        self.reports
    }
}

/// Analyze one parsed file and render its reports as findings.
pub fn findings_for_file(config: &RuleConfig, file: &ParsedFile, path: &Path) -> Vec<Finding> {
    let thresholds = ThresholdEvaluator::new(config);
    let file_str = path.display().to_string();

    AnalysisPass::run(config, file)
        .into_iter()
        .map(|report| {
            let (rule, title, description, score) = match &report.decision {
                Decision::MissingExplicitCheck { score } => (
                    "missing-explicit-check",
                    format!("Missing explicit check (score {score:.1})"),
                    format!(
                        "This declaration's structural complexity scored {score:.1}, at or \
                         above the threshold of {}. Complex types drift out of sync with \
                         runtime data unless an explicit check accompanies them.",
                        config.base_threshold
                    ),
                    *score,
                ),
                Decision::ComplexInterfaceNeedsCheck { name, score } => (
                    "complex-interface-needs-check",
                    format!("Complex interface `{name}` needs a check (score {score:.1})"),
                    format!(
                        "Interface `{name}` scored {score:.1}, at or above the interface \
                         floor of {}. Pair it with a runtime validator so values crossing \
                         a trust boundary are actually checked.",
                        config.interface_penalty
                    ),
                    *score,
                ),
                Decision::NoReport => unreachable!("NoReport decisions are never queued"),
            };

            Finding {
                id: deterministic_finding_id(rule, &file_str, report.span.line_start, &title),
                rule: rule.to_string(),
                severity: thresholds.severity(score),
                title,
                description,
                file: path.to_path_buf(),
                line_start: Some(report.span.line_start),
                line_end: Some(report.span.line_end),
                score,
                suggested_fix: Some(
                    "Annotate the declaration with the validated type, or alias the \
                     validator's static type:\n\
                     ```typescript\n\
                     type Thing = Static<typeof isThing>;\n\
                     ```"
                    .to_string(),
                ),
            }
        })
        .collect()
}
