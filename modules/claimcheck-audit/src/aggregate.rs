use std::collections::{BTreeMap, BTreeSet, HashSet};

use claimcheck_common::Severity;

use crate::types::{Concern, PatternAggregate, SeveritySummary};

/// Affected document ids kept per aggregate.
pub const AFFECTED_SAMPLE: usize = 5;

/// Collapse duplicate concerns within one document. First occurrence wins,
/// and survivors keep their original relative order.
pub fn dedup(concerns: Vec<Concern>) -> Vec<Concern> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(concerns.len());
    for concern in concerns {
        let (kind, excerpt, at) = concern.dedup_key();
        if seen.insert((kind.to_string(), excerpt.to_string(), at)) {
            kept.push(concern);
        }
    }
    kept
}

/// High severity first, then by position, then by type.
pub fn sort_concerns(concerns: &mut [Concern]) {
    concerns.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.offset.or(a.line).cmp(&b.offset.or(b.line)))
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.excerpt.cmp(&b.excerpt))
    });
}

/// Rollup of deduplicated concerns across documents.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub patterns: Vec<PatternAggregate>,
    pub severity: SeveritySummary,
    pub total_concerns: usize,
}

#[derive(Default)]
struct Tally<'a> {
    severity: Option<Severity>,
    occurrences: usize,
    documents: BTreeSet<&'a str>,
    remediation: &'a str,
}

/// Group per-document concerns by type. Grouping is keyed, so the input order
/// of documents does not change the result.
pub fn aggregate<'a, I>(documents: I) -> Aggregation
where
    I: IntoIterator<Item = (&'a str, &'a [Concern])>,
{
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut severity = SeveritySummary::default();

    for (id, concerns) in documents {
        for concern in concerns {
            severity.record(concern.severity);
            let tally = tallies.entry(concern.kind.as_str()).or_default();
            tally.occurrences += 1;
            tally.documents.insert(id);
            tally.severity = tally.severity.max(Some(concern.severity));
            // Lexicographically smallest non-empty hint keeps the choice order-independent.
            if !concern.remediation.is_empty()
                && (tally.remediation.is_empty() || concern.remediation.as_str() < tally.remediation)
            {
                tally.remediation = concern.remediation.as_str();
            }
        }
    }

    let mut patterns: Vec<PatternAggregate> = tallies
        .into_iter()
        .map(|(kind, tally)| PatternAggregate {
            kind: kind.to_string(),
            severity: tally.severity.unwrap_or(Severity::Low),
            occurrences: tally.occurrences,
            documents: tally.documents.len(),
            affected: tally
                .documents
                .iter()
                .take(AFFECTED_SAMPLE)
                .map(|id| id.to_string())
                .collect(),
            remediation: tally.remediation.to_string(),
        })
        .collect();
    patterns.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.kind.cmp(&b.kind))
    });

    Aggregation {
        total_concerns: severity.total(),
        patterns,
        severity,
    }
}
