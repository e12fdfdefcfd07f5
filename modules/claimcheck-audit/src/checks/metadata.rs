use claimcheck_common::Verdict;

use super::patterns::MetadataCheck;
use crate::corpus::Document;

/// Evaluate a metadata check. Returns the excerpt to report when it fires.
pub fn evaluate(check: &MetadataCheck, doc: &Document) -> Option<String> {
    let meta = &doc.meta;
    match check {
        MetadataCheck::UndefinedVerdict => {
            (meta.verdict == Verdict::Undefined).then(|| "verdict: undefined".to_string())
        }
        // An undeclared source count is not a thin one.
        MetadataCheck::ThinEvidence { min_sources } => match meta.sources {
            Some(sources) if meta.verdict.is_strong() && sources < *min_sources => Some(format!(
                "verdict: {}, sources: {sources}",
                meta.verdict
            )),
            _ => None,
        },
        MetadataCheck::MissingCounterpoint(phrasing) => (meta.verdict.is_negative()
            && !meta.verdict.is_strong()
            && !phrasing.is_match(&doc.text))
        .then(|| format!("verdict: {}", meta.verdict)),
    }
}
