use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use claimcheck_common::{DomainClass, ScanMode, Severity, StratifyBy};

/// One detected quality issue in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, TypedBuilder)]
pub struct Concern {
    #[serde(rename = "type")]
    #[builder(setter(into))]
    pub kind: String,
    pub severity: Severity,
    /// The matched text (or URL, or metadata value).
    #[builder(setter(into))]
    pub excerpt: String,
    /// Text surrounding the match.
    #[builder(default, setter(into))]
    pub context: String,
    /// Byte offset into the plain text (prose) or raw source (links).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub line: Option<usize>,
    #[builder(setter(into))]
    pub remediation: String,
}

impl Concern {
    /// Two concerns in the same document are duplicates iff these are equal.
    pub fn dedup_key(&self) -> (&str, &str, Option<usize>) {
        (&self.kind, &self.excerpt, self.offset.or(self.line))
    }
}

/// Corpus-wide rollup of one concern type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PatternAggregate {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub occurrences: usize,
    pub documents: usize,
    /// First few affected document ids, for readability. Counts above are exact.
    pub affected: Vec<String>,
    pub remediation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeveritySummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeveritySummary {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Four sub-scores and their weighted total, each in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreCard {
    pub source: f64,
    pub methodology: f64,
    pub technical: f64,
    pub consistency: f64,
    pub overall: f64,
    pub band: String,
}

impl fmt::Display for ScoreCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "overall={:.1} ({}) source={:.1} methodology={:.1} technical={:.1} consistency={:.1}",
            self.overall, self.band, self.source, self.methodology, self.technical, self.consistency,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Patterns,
    Scan,
}

/// A recoverable problem with the audit process itself, as opposed to a
/// content concern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct ProcessIssue {
    pub level: IssueLevel,
    pub stage: Stage,
    pub subject: String,
    pub message: String,
}

impl ProcessIssue {
    pub fn warning(stage: Stage, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            stage,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn info(stage: Stage, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Info,
            stage,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentReport {
    pub id: String,
    pub category: String,
    pub verdict: String,
    pub concerns: Vec<Concern>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CorpusSummary {
    pub metadata_records: usize,
    pub documents_found: usize,
    pub documents_loaded: usize,
    pub documents_scanned: usize,
    pub missing_documents: usize,
}

impl fmt::Display for CorpusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "records={} found={} loaded={} scanned={} missing={}",
            self.metadata_records,
            self.documents_found,
            self.documents_loaded,
            self.documents_scanned,
            self.missing_documents,
        )
    }
}

/// Structural findings over the scanned documents. These feed the technical
/// score and are not concerns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructureSummary {
    pub styling_violations: usize,
    pub documents_with_visual: usize,
    pub documents_without_visual: Vec<String>,
}

/// Everything one audit run produced. Written once as a single artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditResult {
    pub generated_at: DateTime<Utc>,
    pub mode: ScanMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratify_by: Option<StratifyBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub pattern_table_version: String,
    pub corpus: CorpusSummary,
    pub total_concerns: usize,
    pub severity: SeveritySummary,
    pub documents: Vec<DocumentReport>,
    pub patterns: Vec<PatternAggregate>,
    pub link_classes: BTreeMap<DomainClass, usize>,
    pub balance_score: f64,
    pub structure: StructureSummary,
    pub scores: ScoreCard,
    pub issues: Vec<ProcessIssue>,
    pub recommendations: Vec<String>,
}
