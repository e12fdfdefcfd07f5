use std::collections::BTreeMap;

use claimcheck_common::{DocumentMeta, ScoreWeights, ScoringConfig, Verdict};

use crate::types::ScoreCard;

/// Everything the scoring engine looks at. Source, methodology and technical
/// inputs cover the scanned documents; consistency inputs cover the corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreInputs {
    pub documents: usize,
    /// Declared source counts of the documents that declared one.
    pub declared_sources: Vec<u32>,
    /// Strong verdicts with fewer than `min_sources` declared sources.
    pub thin_documents: usize,
    pub category_counts: Vec<usize>,
    /// Per-verdict counts, excluding undefined verdicts.
    pub verdict_counts: Vec<usize>,
    pub classified_links: usize,
    pub authoritative_links: usize,
    pub encyclopedia_links: usize,
    pub styling_violations: usize,
    pub documents_with_visual: usize,
    pub metadata_records: usize,
    pub documents_found: usize,
}

impl ScoreInputs {
    /// Metadata-derived inputs. Link, structure and corpus counts stay zero.
    pub fn from_metadata<'a>(
        metas: impl IntoIterator<Item = &'a DocumentMeta>,
        min_sources: u32,
    ) -> Self {
        let mut inputs = Self::default();
        let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
        let mut verdicts: BTreeMap<String, usize> = BTreeMap::new();

        for meta in metas {
            inputs.documents += 1;
            if let Some(sources) = meta.sources {
                inputs.declared_sources.push(sources);
                if meta.verdict.is_strong() && sources < min_sources {
                    inputs.thin_documents += 1;
                }
            }
            *categories.entry(meta.category.as_str()).or_default() += 1;
            if meta.verdict != Verdict::Undefined {
                *verdicts.entry(meta.verdict.label()).or_default() += 1;
            }
        }

        inputs.category_counts = categories.into_values().collect();
        inputs.verdict_counts = verdicts.into_values().collect();
        inputs
    }
}

/// Normalized Shannon entropy of a categorical distribution, in `[0, 1]`.
///
/// Only categories with a non-zero count take part. With zero or one such
/// category the entropy is 0/0; that case is defined as `1.0`, maximal balance.
pub fn balance_score(counts: &[usize]) -> f64 {
    let present: Vec<f64> = counts.iter().filter(|&&c| c > 0).map(|&c| c as f64).collect();
    if present.len() <= 1 {
        return 1.0;
    }
    let total: f64 = present.iter().sum();
    let entropy: f64 = present
        .iter()
        .map(|c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum();
    (entropy / (present.len() as f64).log2()).clamp(0.0, 1.0)
}

/// Letter grade for an overall score.
pub fn band(overall: f64) -> &'static str {
    match overall {
        s if s >= 90.0 => "A",
        s if s >= 80.0 => "B",
        s if s >= 70.0 => "C",
        s if s >= 60.0 => "D",
        _ => "F",
    }
}

fn bounded(score: f64) -> f64 {
    let score = score.clamp(0.0, 100.0);
    (score * 10.0).round() / 10.0
}

pub fn source_score(inputs: &ScoreInputs, config: &ScoringConfig) -> f64 {
    if inputs.documents == 0 {
        return 100.0;
    }
    let mut score = 100.0;

    if !inputs.declared_sources.is_empty() {
        let total: f64 = inputs.declared_sources.iter().map(|&s| f64::from(s)).sum();
        let avg = total / inputs.declared_sources.len() as f64;
        if avg < config.target_avg_sources {
            score -= (config.target_avg_sources - avg) * config.avg_sources_penalty_per_point;
        } else if avg > config.bonus_avg_sources {
            score += config.avg_sources_bonus;
        }
    }

    score -= (inputs.encyclopedia_links as f64 * config.encyclopedia_penalty_per_link)
        .min(config.encyclopedia_penalty_cap);

    if inputs.classified_links > 0 {
        let fraction = inputs.authoritative_links as f64 / inputs.classified_links as f64;
        score += fraction * config.authoritative_bonus_max;
    }

    score -= (inputs.thin_documents as f64 * config.thin_doc_source_penalty)
        .min(config.thin_doc_source_cap);

    bounded(score)
}

pub fn methodology_score(inputs: &ScoreInputs, config: &ScoringConfig) -> f64 {
    if inputs.documents == 0 {
        return 100.0;
    }
    let mut score = 100.0;

    score -= (inputs.thin_documents as f64 * config.thin_doc_method_penalty)
        .min(config.thin_doc_method_cap);

    let balance = balance_score(&inputs.category_counts);
    if balance < config.balance_threshold {
        score -= (config.balance_threshold - balance) * config.balance_penalty_scale;
    }

    let issued: usize = inputs.verdict_counts.iter().sum();
    if let Some(&top) = inputs.verdict_counts.iter().max() {
        let share = top as f64 / issued as f64;
        if share > config.dominance_threshold {
            score -= (share - config.dominance_threshold) * config.dominance_penalty_scale;
        }
    }

    bounded(score)
}

pub fn technical_score(inputs: &ScoreInputs, config: &ScoringConfig) -> f64 {
    if inputs.documents == 0 {
        return 100.0;
    }
    let mut score = 100.0;

    score -= (inputs.styling_violations as f64 * config.styling_penalty_per_violation)
        .min(config.styling_penalty_cap);

    let visual = inputs.documents_with_visual as f64 / inputs.documents as f64;
    score += (visual - config.visual_target_fraction) * config.visual_scale;

    score -= (inputs.encyclopedia_links as f64 * config.encyclopedia_technical_penalty)
        .min(config.encyclopedia_technical_cap);

    bounded(score)
}

pub fn consistency_score(inputs: &ScoreInputs, config: &ScoringConfig) -> f64 {
    let gap = inputs.metadata_records.abs_diff(inputs.documents_found);
    bounded(100.0 - gap as f64 * config.consistency_penalty_per_document)
}

pub fn score(inputs: &ScoreInputs, config: &ScoringConfig, weights: &ScoreWeights) -> ScoreCard {
    let source = source_score(inputs, config);
    let methodology = methodology_score(inputs, config);
    let technical = technical_score(inputs, config);
    let consistency = consistency_score(inputs, config);

    let overall = bounded(
        weights.source * source
            + weights.methodology * methodology
            + weights.technical * technical
            + weights.consistency * consistency,
    );

    ScoreCard {
        source,
        methodology,
        technical,
        consistency,
        overall,
        band: band(overall).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    fn card(inputs: &ScoreInputs) -> ScoreCard {
        score(inputs, &config(), &ScoreWeights::default())
    }

    #[test]
    fn balance_even_distribution_is_one() {
        assert!((balance_score(&[10, 10, 10, 10]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn balance_single_present_category_is_one_by_convention() {
        // Entropy of a single value is 0/0; defined as maximal balance.
        assert_eq!(balance_score(&[40, 0, 0, 0]), 1.0);
        assert_eq!(balance_score(&[]), 1.0);
    }

    #[test]
    fn balance_skewed_distribution_is_low() {
        let b = balance_score(&[97, 1, 1, 1]);
        assert!(b > 0.0 && b < 0.2, "{b}");
    }

    #[test]
    fn empty_corpus_scores_100() {
        let card = card(&ScoreInputs::default());
        assert_eq!(card.source, 100.0);
        assert_eq!(card.methodology, 100.0);
        assert_eq!(card.technical, 100.0);
        assert_eq!(card.consistency, 100.0);
        assert_eq!(card.overall, 100.0);
        assert_eq!(card.band, "A");
    }

    #[test]
    fn low_average_sources_penalized_and_high_rewarded() {
        let low = ScoreInputs {
            documents: 2,
            declared_sources: vec![4, 6],
            ..Default::default()
        };
        assert_eq!(source_score(&low, &config()), 85.0);

        let high = ScoreInputs {
            documents: 2,
            declared_sources: vec![11, 13],
            classified_links: 4,
            authoritative_links: 2,
            ..Default::default()
        };
        // Clamped after +5 and +5.
        assert_eq!(source_score(&high, &config()), 100.0);
    }

    #[test]
    fn average_of_huge_source_counts_does_not_overflow() {
        let inputs = ScoreInputs {
            documents: 2,
            declared_sources: vec![u32::MAX, u32::MAX],
            ..Default::default()
        };
        // Average is u32::MAX, well above the bonus threshold.
        assert_eq!(source_score(&inputs, &config()), 100.0);
    }

    #[test]
    fn encyclopedia_penalty_is_capped() {
        let inputs = ScoreInputs {
            documents: 1,
            declared_sources: vec![8],
            encyclopedia_links: 40,
            classified_links: 40,
            ..Default::default()
        };
        assert_eq!(source_score(&inputs, &config()), 75.0);
        assert_eq!(technical_score(&inputs, &config()), 80.0);
    }

    #[test]
    fn dominant_verdict_penalized() {
        let inputs = ScoreInputs {
            documents: 10,
            category_counts: vec![5, 5],
            verdict_counts: vec![9, 1],
            ..Default::default()
        };
        // (0.9 - 0.5) * 40 = 16
        assert_eq!(methodology_score(&inputs, &config()), 84.0);
    }

    #[test]
    fn consistency_tracks_listing_vs_disk_gap() {
        let inputs = ScoreInputs {
            metadata_records: 10,
            documents_found: 7,
            ..Default::default()
        };
        assert_eq!(consistency_score(&inputs, &config()), 85.0);

        let far = ScoreInputs {
            metadata_records: 100,
            documents_found: 0,
            ..Default::default()
        };
        assert_eq!(consistency_score(&far, &config()), 0.0);
    }

    #[test]
    fn scores_stay_in_bounds_for_extreme_inputs() {
        let inputs = ScoreInputs {
            documents: 3,
            declared_sources: vec![0, 0, 0],
            thin_documents: 3,
            category_counts: vec![3],
            verdict_counts: vec![3],
            classified_links: 1000,
            encyclopedia_links: 1000,
            styling_violations: 1000,
            documents_with_visual: 0,
            metadata_records: 1000,
            documents_found: 0,
            ..Default::default()
        };
        let card = card(&inputs);
        for value in [
            card.source,
            card.methodology,
            card.technical,
            card.consistency,
            card.overall,
        ] {
            assert!((0.0..=100.0).contains(&value), "{card}");
        }
        assert_eq!(card.band, "F");
    }

    #[test]
    fn metadata_inputs_count_thin_and_skip_undefined_verdicts() {
        let mut a = DocumentMeta::unknown("a");
        a.verdict = Verdict::False;
        a.sources = Some(3);
        let mut b = DocumentMeta::unknown("b");
        b.sources = Some(10);
        let mut c = DocumentMeta::unknown("c");
        c.verdict = Verdict::True;
        c.sources = None;
        c.category = "health".to_string();

        let inputs = ScoreInputs::from_metadata([&a, &b, &c], 6);
        assert_eq!(inputs.documents, 3);
        assert_eq!(inputs.declared_sources, vec![3, 10]);
        assert_eq!(inputs.thin_documents, 1);
        assert_eq!(inputs.category_counts.iter().sum::<usize>(), 3);
        assert_eq!(inputs.verdict_counts, vec![1, 1]);
    }

    #[test]
    fn bands() {
        assert_eq!(band(90.0), "A");
        assert_eq!(band(89.9), "B");
        assert_eq!(band(70.0), "C");
        assert_eq!(band(60.0), "D");
        assert_eq!(band(59.9), "F");
    }
}
