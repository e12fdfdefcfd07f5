use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use rand::Rng;
use tracing::info;

use claimcheck_common::{AuditConfig, AuditError, DomainClass, ScanMode};

use crate::aggregate;
use crate::checks::{PatternSet, ScanOutcome, Scanner, StructureRules};
use crate::corpus::{load_corpus, Corpus, Document};
use crate::domains::DomainClassifier;
use crate::sampler::sample_documents;
use crate::scoring::{self, balance_score, ScoreInputs};
use crate::types::{AuditResult, CorpusSummary, DocumentReport, ProcessIssue, StructureSummary};

/// Recommendations carried in the result.
const MAX_RECOMMENDATIONS: usize = 5;

/// The audit engine: loads the corpus, samples, scans, aggregates, scores.
pub struct Auditor {
    config: AuditConfig,
    scanner: Scanner,
    /// Issues found while compiling patterns and rules.
    issues: Vec<ProcessIssue>,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        config.validate()?;

        let (patterns, mut issues) = PatternSet::from_config(&config);
        let (structure, structure_issues) = StructureRules::compile(&config.structure);
        issues.extend(structure_issues);

        info!(
            patterns = patterns.len(),
            version = patterns.version.as_str(),
            skipped = issues.len(),
            "Pattern table compiled"
        );

        let scanner = Scanner::new(
            patterns,
            DomainClassifier::new(config.domains.clone()),
            structure,
            config.context_chars,
        );

        Ok(Self {
            config,
            scanner,
            issues,
        })
    }

    /// Replace the compiled pattern table.
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.scanner = self.scanner.with_patterns(patterns);
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Load the configured corpus and audit it.
    pub async fn run(&self) -> Result<AuditResult> {
        let corpus = load_corpus(
            &self.config.documents_dir,
            &self.config.metadata_path,
            &self.config.document_extension,
        )
        .context("Failed to load corpus")?;

        self.audit_corpus(corpus).await
    }

    pub async fn audit_corpus(&self, corpus: Corpus) -> Result<AuditResult> {
        let Corpus {
            documents,
            metadata_records,
            documents_found,
            missing,
            issues: load_issues,
        } = corpus;

        let mut issues = self.issues.clone();
        issues.extend(load_issues);
        let documents_loaded = documents.len();

        // Phase 1: Sample (or take everything in full mode)
        let (documents, seed, stratify_by) = match self.config.mode {
            ScanMode::Full => (documents, None, None),
            ScanMode::Sample => {
                let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
                let by = self.config.stratify_by;
                let sample = sample_documents(documents, self.config.sample_size, by, seed);
                info!(
                    seed,
                    stratify_by = %by,
                    drawn = sample.len(),
                    loaded = documents_loaded,
                    "Sample drawn"
                );
                (sample, Some(seed), Some(by))
            }
        };
        let documents: Vec<Arc<Document>> = documents.into_iter().map(Arc::new).collect();

        // Phase 2: Scan documents in parallel
        let outcomes = self.scan_all(&documents).await?;
        info!(documents = outcomes.len(), "Scanning complete");

        // Phase 3: Dedup per document, then roll up by type
        let mut reports = Vec::with_capacity(outcomes.len());
        let mut link_classes: BTreeMap<DomainClass, usize> = BTreeMap::new();
        let mut structure = StructureSummary::default();
        for (doc, outcome) in documents.iter().zip(outcomes) {
            let mut concerns = aggregate::dedup(outcome.concerns);
            aggregate::sort_concerns(&mut concerns);

            for (class, count) in outcome.link_classes {
                *link_classes.entry(class).or_insert(0) += count;
            }
            structure.styling_violations += outcome.styling_violations;
            if outcome.has_visual {
                structure.documents_with_visual += 1;
            } else {
                structure.documents_without_visual.push(outcome.id.clone());
            }

            reports.push(DocumentReport {
                id: outcome.id,
                category: doc.meta.category.clone(),
                verdict: doc.meta.verdict.label(),
                concerns,
            });
        }

        let aggregation =
            aggregate::aggregate(reports.iter().map(|r| (r.id.as_str(), r.concerns.as_slice())));
        info!(
            total = aggregation.total_concerns,
            types = aggregation.patterns.len(),
            high = aggregation.severity.high,
            "Concerns aggregated"
        );

        // Phase 4: Score
        let mut inputs = ScoreInputs::from_metadata(
            documents.iter().map(|d| &d.meta),
            self.config.scoring.min_sources,
        );
        inputs.classified_links = link_classes.values().sum();
        inputs.authoritative_links = link_classes
            .iter()
            .filter(|(class, _)| class.is_authoritative())
            .map(|(_, count)| count)
            .sum();
        inputs.encyclopedia_links = link_classes
            .get(&DomainClass::Encyclopedia)
            .copied()
            .unwrap_or(0);
        inputs.styling_violations = structure.styling_violations;
        inputs.documents_with_visual = structure.documents_with_visual;
        inputs.metadata_records = metadata_records;
        inputs.documents_found = documents_found;

        let balance = balance_score(&inputs.category_counts);
        let scores = scoring::score(&inputs, &self.config.scoring, &self.config.weights);
        info!("Scoring complete. {scores}");

        let mut recommendations: Vec<String> = Vec::new();
        for pattern in &aggregation.patterns {
            if recommendations.len() == MAX_RECOMMENDATIONS {
                break;
            }
            if !pattern.remediation.is_empty() && !recommendations.contains(&pattern.remediation) {
                recommendations.push(pattern.remediation.clone());
            }
        }

        Ok(AuditResult {
            generated_at: Utc::now(),
            mode: self.config.mode,
            stratify_by,
            seed,
            pattern_table_version: self.scanner.patterns().version.clone(),
            corpus: CorpusSummary {
                metadata_records,
                documents_found,
                documents_loaded,
                documents_scanned: documents.len(),
                missing_documents: missing.len(),
            },
            total_concerns: aggregation.total_concerns,
            severity: aggregation.severity,
            documents: reports,
            patterns: aggregation.patterns,
            link_classes,
            balance_score: balance,
            structure,
            scores,
            issues,
            recommendations,
        })
    }

    /// Scan on blocking tasks, `concurrency` at a time. Results come back in
    /// the order of `documents`.
    async fn scan_all(&self, documents: &[Arc<Document>]) -> Result<Vec<ScanOutcome>> {
        let results: Vec<Result<ScanOutcome>> =
            stream::iter(documents.iter().cloned().map(|doc| {
                let scanner = self.scanner.clone();
                async move {
                    let id = doc.id().to_string();
                    tokio::task::spawn_blocking(move || scanner.scan(&doc))
                        .await
                        .with_context(|| format!("Scan task for {id} failed"))
                }
            }))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let mut outcomes = results.into_iter().collect::<Result<Vec<_>>>()?;
        let order: BTreeMap<&str, usize> = documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id(), i))
            .collect();
        outcomes.sort_by_key(|o| order.get(o.id.as_str()).copied());
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::kinds;
    use claimcheck_common::{DocumentMeta, Verdict};

    fn doc(id: &str, category: &str, verdict: Verdict, sources: u32, html: &str) -> Document {
        let mut meta = DocumentMeta::unknown(id);
        meta.category = category.to_string();
        meta.verdict = verdict;
        meta.sources = Some(sources);
        Document::from_html(meta, html.to_string())
    }

    fn corpus(documents: Vec<Document>) -> Corpus {
        Corpus {
            metadata_records: documents.len(),
            documents_found: documents.len(),
            documents,
            ..Default::default()
        }
    }

    fn full_config() -> AuditConfig {
        AuditConfig {
            mode: ScanMode::Full,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn full_mode_scans_everything_without_seed() {
        let docs = (0..12)
            .map(|i| doc(&format!("d{i:02}"), "health", Verdict::Mixed, 8, "<p>Plain.</p>"))
            .collect();
        let auditor = Auditor::new(full_config()).unwrap();
        let result = auditor.audit_corpus(corpus(docs)).await.unwrap();

        assert_eq!(result.corpus.documents_scanned, 12);
        assert_eq!(result.seed, None);
        assert_eq!(result.stratify_by, None);
        let ids: Vec<_> = result.documents.iter().map(|d| d.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn sample_mode_records_seed_and_respects_size() {
        let docs = (0..40)
            .map(|i| {
                let verdict = if i % 4 == 0 { Verdict::False } else { Verdict::True };
                doc(&format!("d{i:02}"), "politics", verdict, 9, "<p>Plain.</p>")
            })
            .collect();
        let config = AuditConfig {
            sample_size: 6,
            seed: Some(11),
            concurrency: 2,
            ..Default::default()
        };
        let result = Auditor::new(config)
            .unwrap()
            .audit_corpus(corpus(docs))
            .await
            .unwrap();

        assert_eq!(result.corpus.documents_loaded, 40);
        assert_eq!(result.corpus.documents_scanned, 6);
        assert_eq!(result.seed, Some(11));
        let verdicts: std::collections::BTreeSet<_> =
            result.documents.iter().map(|d| d.verdict.as_str()).collect();
        assert_eq!(verdicts.len(), 2);
    }

    #[tokio::test]
    async fn injected_patterns_replace_the_table() {
        let docs = vec![doc(
            "a",
            "health",
            Verdict::Undefined,
            1,
            "<p>Experts say it is 100% false.</p>",
        )];
        let auditor = Auditor::new(full_config())
            .unwrap()
            .with_patterns(PatternSet::builtin().only(kinds::VAGUE_AUTHORITY));
        let result = auditor.audit_corpus(corpus(docs)).await.unwrap();

        assert_eq!(result.total_concerns, 1);
        assert_eq!(result.patterns[0].kind, kinds::VAGUE_AUTHORITY);
        assert_eq!(
            result.recommendations,
            vec![result.patterns[0].remediation.clone()]
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AuditConfig::default();
        config.weights.source = 0.9;
        assert!(matches!(
            Auditor::new(config),
            Err(AuditError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn link_classes_and_structure_are_tallied() {
        let docs = vec![
            doc(
                "a",
                "health",
                Verdict::Mixed,
                8,
                r#"<p>See the <a href="https://www.cdc.gov/x">CDC guidance</a> and <a href="https://www.reuters.com/y">Reuters report</a>.</p><svg></svg>"#,
            ),
            doc(
                "b",
                "economy",
                Verdict::Mixed,
                8,
                r#"<p style="color: red !important">The <a href="https://www.bls.gov/z">BLS series</a>.</p>"#,
            ),
        ];
        let result = Auditor::new(full_config())
            .unwrap()
            .audit_corpus(corpus(docs))
            .await
            .unwrap();

        assert_eq!(result.link_classes.get(&DomainClass::Government), Some(&2));
        assert_eq!(result.link_classes.get(&DomainClass::News), Some(&1));
        assert_eq!(result.structure.styling_violations, 1);
        assert_eq!(result.structure.documents_with_visual, 1);
        assert_eq!(result.structure.documents_without_visual, vec!["b"]);
        assert_eq!(result.balance_score, 1.0);
    }
}
