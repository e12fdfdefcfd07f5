use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use claimcheck_common::ScanMode;

use crate::types::{AuditResult, IssueLevel};

/// Root data directory, controlled by `DATA_DIR` env var (default: `"data"`).
fn data_dir() -> PathBuf {
    PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// `$DATA_DIR/audit-reports/audit-<date>-<mode>.json`
pub fn default_report_path(mode: ScanMode) -> PathBuf {
    let date = Utc::now().format("%Y-%m-%d");
    data_dir()
        .join("audit-reports")
        .join(format!("audit-{date}-{mode}.json"))
}

// =============================================================================
// JSON artifact
// =============================================================================

/// Write the result as pretty JSON, creating parent directories. Returns the path.
pub fn write_report(result: &AuditResult, path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!(path = %path.display(), "Audit report saved");

    Ok(path.to_path_buf())
}

// =============================================================================
// Markdown summary
// =============================================================================

/// Write the Markdown summary next to a JSON report (same stem, `.md`).
pub fn write_markdown(result: &AuditResult, json_path: &Path) -> Result<PathBuf> {
    let path = json_path.with_extension("md");
    std::fs::write(&path, render_markdown(result))
        .with_context(|| format!("Failed to write summary {}", path.display()))?;
    info!(path = %path.display(), "Audit summary saved");
    Ok(path)
}

pub fn render_markdown(result: &AuditResult) -> String {
    let mut out = String::new();
    let s = &result.scores;

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "# Content Quality Audit: {}\n",
        result.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        out,
        "Mode: **{}** | Scanned: {} of {} loaded | Pattern table: `{}`{}\n",
        result.mode,
        result.corpus.documents_scanned,
        result.corpus.documents_loaded,
        result.pattern_table_version,
        result
            .seed
            .map(|seed| format!(" | Seed: `{seed}`"))
            .unwrap_or_default(),
    );

    let _ = writeln!(out, "## Scores\n");
    let _ = writeln!(out, "| Dimension | Score |");
    let _ = writeln!(out, "|-----------|-------|");
    for (name, value) in [
        ("Source", s.source),
        ("Methodology", s.methodology),
        ("Technical", s.technical),
        ("Consistency", s.consistency),
    ] {
        let _ = writeln!(out, "| {name} | {value:.1} |");
    }
    let _ = writeln!(out, "| **Overall** | **{:.1} ({})** |\n", s.overall, s.band);

    let _ = writeln!(
        out,
        "Concerns: {} (high {}, medium {}, low {}) | Balance: {:.2}\n",
        result.total_concerns,
        result.severity.high,
        result.severity.medium,
        result.severity.low,
        result.balance_score,
    );

    if !result.patterns.is_empty() {
        let _ = writeln!(out, "## Top concern types\n");
        let _ = writeln!(out, "| Type | Severity | Occurrences | Documents |");
        let _ = writeln!(out, "|------|----------|-------------|-----------|");
        for p in &result.patterns {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                p.kind, p.severity, p.occurrences, p.documents
            );
        }
        out.push('\n');
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "## Recommendations\n");
        for (i, rec) in result.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. {rec}", i + 1);
        }
        out.push('\n');
    }

    let flagged: Vec<_> = result
        .documents
        .iter()
        .filter(|d| !d.concerns.is_empty())
        .collect();
    if !flagged.is_empty() {
        let _ = writeln!(out, "## Documents\n");
        for doc in flagged {
            let _ = writeln!(out, "### {} ({}, {})\n", doc.id, doc.category, doc.verdict);
            for c in &doc.concerns {
                let _ = writeln!(
                    out,
                    "- **{}** [{}]: `{}`",
                    c.kind,
                    c.severity,
                    truncate(&c.excerpt, 80)
                );
            }
            out.push('\n');
        }
    }

    let warnings: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.level == IssueLevel::Warning)
        .collect();
    if !warnings.is_empty() {
        let _ = writeln!(out, "## Process warnings\n");
        for issue in warnings {
            let _ = writeln!(out, "- {}: {}", issue.subject, issue.message);
        }
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    }
}
