//! Test harness: writes fixture corpora into temporary directories.
//!
//! Each fixture owns its `TempDir`, so the corpus lives exactly as long as
//! the test that built it.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

use claimcheck_common::{AuditConfig, ScanMode};

pub struct FixtureCorpus {
    dir: TempDir,
    records: Vec<Value>,
}

impl FixtureCorpus {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("reports")).expect("create reports dir");
        Self {
            dir,
            records: Vec::new(),
        }
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.dir.path().join("reports")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.path().join("claims.json")
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Add a metadata record and its document.
    pub fn report(
        mut self,
        id: &str,
        category: &str,
        verdict: &str,
        sources: u32,
        html: &str,
    ) -> Self {
        self.records.push(json!({
            "id": id,
            "title": format!("Fact check: {id}"),
            "category": category,
            "verdict": verdict,
            "sources": sources,
            "date": "2025-06-01",
        }));
        self.write_document(id, html);
        self
    }

    /// Add a metadata record with no document on disk.
    pub fn record_only(mut self, id: &str, verdict: &str) -> Self {
        self.records.push(json!({ "id": id, "category": "politics", "verdict": verdict }));
        self
    }

    pub fn write_document(&self, id: &str, html: &str) {
        let path = self.reports_dir().join(format!("{id}.html"));
        std::fs::write(path, page(html)).expect("write document");
    }

    /// Write the metadata listing as a JSON array.
    pub fn build(self) -> Self {
        let listing = serde_json::to_string_pretty(&self.records).expect("serialize records");
        std::fs::write(self.metadata_path(), listing).expect("write metadata");
        self
    }

    /// Overwrite the metadata listing with arbitrary text.
    pub fn raw_metadata(self, text: &str) -> Self {
        std::fs::write(self.metadata_path(), text).expect("write metadata");
        self
    }

    pub fn config(&self, mode: ScanMode) -> AuditConfig {
        AuditConfig {
            documents_dir: self.reports_dir(),
            metadata_path: self.metadata_path(),
            mode,
            ..Default::default()
        }
    }
}

/// Wrap body markup in a minimal report page.
fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Report</title><style>body {{ margin: 0 }}</style></head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

/// The three-document corpus: a thinly sourced `false` with absolutist
/// phrasing, an undefined verdict citing an encyclopedia, and a clean `true`.
pub fn three_document_corpus() -> FixtureCorpus {
    FixtureCorpus::new()
        .report(
            "a-gas-stove-ban",
            "politics",
            "false",
            3,
            r#"<h1>Did the city ban gas stoves?</h1>
<p>The viral post is 100% false. The <a href="https://www.census.gov/housing">Census Bureau housing tables</a> list no such rule.</p>"#,
        )
        .report(
            "b-grocery-tariffs",
            "economy",
            "undefined",
            10,
            r#"<h1>Did tariffs double grocery prices?</h1>
<p>A post claims tariffs doubled grocery prices. The <a href="https://en.wikipedia.org/wiki/Tariff">encyclopedia entry on tariffs</a> summarizes their history.</p>"#,
        )
        .report(
            "c-bridge-opening",
            "history",
            "true",
            12,
            r#"<h1>Did the bridge open in 1931?</h1>
<p>The bridge opened in 1931, per the <a href="https://www.transportation.gov/history">Department of Transportation archive</a>.</p>"#,
        )
        .build()
}

/// `n` clean reports spread over the given verdicts, round-robin.
pub fn varied_corpus(n: usize, verdicts: &[&str]) -> FixtureCorpus {
    let mut corpus = FixtureCorpus::new();
    for i in 0..n {
        let verdict = verdicts[i % verdicts.len()];
        corpus = corpus.report(
            &format!("report-{i:03}"),
            if i % 3 == 0 { "health" } else { "economy" },
            verdict,
            8 + (i % 5) as u32,
            &format!(
                r#"<p>Report {i} cites the <a href="https://www.bls.gov/series/{i}">BLS release</a>.</p><svg></svg>"#
            ),
        );
    }
    corpus.build()
}
