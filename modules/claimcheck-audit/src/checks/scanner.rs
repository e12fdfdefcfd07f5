use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use claimcheck_common::DomainClass;

use super::metadata;
use super::patterns::{ConcernPattern, Matcher, PatternSet};
use super::structure::StructureRules;
use crate::corpus::html::context_window;
use crate::corpus::{Document, Link};
use crate::domains::DomainClassifier;
use crate::types::Concern;

/// Everything learned from scanning one document.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub id: String,
    /// Raw occurrences, not yet deduplicated.
    pub concerns: Vec<Concern>,
    /// Domain classes of the document's external links.
    pub link_classes: BTreeMap<DomainClass, usize>,
    pub styling_violations: usize,
    pub has_visual: bool,
}

/// Runs a pattern table against documents. Holds no per-document state, so
/// one scanner can be shared across worker tasks.
#[derive(Debug, Clone)]
pub struct Scanner {
    patterns: Arc<PatternSet>,
    classifier: Arc<DomainClassifier>,
    structure: Arc<StructureRules>,
    context_chars: usize,
}

impl Scanner {
    pub fn new(
        patterns: PatternSet,
        classifier: DomainClassifier,
        structure: StructureRules,
        context_chars: usize,
    ) -> Self {
        Self {
            patterns: Arc::new(patterns),
            classifier: Arc::new(classifier),
            structure: Arc::new(structure),
            context_chars,
        }
    }

    /// Swap in a different pattern table, keeping classifier and structure rules.
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = Arc::new(patterns);
        self
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn scan(&self, doc: &Document) -> ScanOutcome {
        let classes: Vec<DomainClass> = doc
            .links
            .iter()
            .map(|link| self.classifier.classify(&link.url))
            .collect();

        let mut concerns = Vec::new();
        for pattern in &self.patterns.patterns {
            self.apply(pattern, doc, &classes, &mut concerns);
        }

        let mut link_classes = BTreeMap::new();
        for (link, class) in doc.links.iter().zip(&classes) {
            if link.is_external() {
                *link_classes.entry(*class).or_insert(0) += 1;
            }
        }

        debug!(
            doc = doc.id(),
            concerns = concerns.len(),
            links = doc.links.len(),
            "Document scanned"
        );

        ScanOutcome {
            id: doc.id().to_string(),
            concerns,
            link_classes,
            styling_violations: self.structure.styling_violations(&doc.raw),
            has_visual: self.structure.has_visual(&doc.raw),
        }
    }

    fn apply(
        &self,
        pattern: &ConcernPattern,
        doc: &Document,
        classes: &[DomainClass],
        out: &mut Vec<Concern>,
    ) {
        match &pattern.matcher {
            Matcher::Prose(re) => {
                for m in re.find_iter(&doc.text) {
                    out.push(
                        Concern::builder()
                            .kind(pattern.kind.as_str())
                            .severity(pattern.severity)
                            .excerpt(m.as_str())
                            .context(context_window(
                                &doc.text,
                                m.start(),
                                m.end(),
                                self.context_chars,
                            ))
                            .offset(m.start())
                            .remediation(pattern.remediation.as_str())
                            .build(),
                    );
                }
            }
            Matcher::LinkUrl(re) => {
                for link in doc.links.iter().filter(|l| re.is_match(&l.url)) {
                    out.push(link_concern(pattern, link, &link.url, &link.anchor_text));
                }
            }
            Matcher::LinkText(re) => {
                for link in doc.links.iter().filter(|l| re.is_match(&l.anchor_text)) {
                    out.push(link_concern(pattern, link, &link.anchor_text, &link.url));
                }
            }
            Matcher::LinkClass(wanted) => {
                for (link, _) in doc.links.iter().zip(classes).filter(|(_, c)| *c == wanted) {
                    out.push(link_concern(pattern, link, &link.url, &link.anchor_text));
                }
            }
            Matcher::Metadata(check) => {
                if let Some(excerpt) = metadata::evaluate(check, doc) {
                    out.push(
                        Concern::builder()
                            .kind(pattern.kind.as_str())
                            .severity(pattern.severity)
                            .excerpt(excerpt)
                            .remediation(pattern.remediation.as_str())
                            .build(),
                    );
                }
            }
        }
    }
}

fn link_concern(pattern: &ConcernPattern, link: &Link, excerpt: &str, context: &str) -> Concern {
    Concern::builder()
        .kind(pattern.kind.as_str())
        .severity(pattern.severity)
        .excerpt(excerpt)
        .context(context)
        .offset(link.offset)
        .line(link.line)
        .remediation(pattern.remediation.as_str())
        .build()
}
