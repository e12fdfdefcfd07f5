use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use claimcheck_common::StratifyBy;

use crate::corpus::Document;

/// Stratum key of a document: its verdict label or its category.
pub fn stratum_key(doc: &Document, by: StratifyBy) -> String {
    match by {
        StratifyBy::Verdict => doc.meta.verdict.label(),
        StratifyBy::Category => doc.meta.category.clone(),
    }
}

/// Draw a seedable stratified sample of documents.
pub fn sample_documents(
    documents: Vec<Document>,
    target: usize,
    by: StratifyBy,
    seed: u64,
) -> Vec<Document> {
    let mut rng = StdRng::seed_from_u64(seed);
    stratified_sample(documents, target, |doc| stratum_key(doc, by), &mut rng)
}

/// Select `min(target, items.len())` items spread across strata.
///
/// Each stratum contributes up to `ceil(target / strata)` items drawn uniformly
/// without replacement. Any excess is removed at random, taking only from
/// strata that keep at least one member, so every stratum survives whenever
/// `target >= strata`. If small strata leave the union short of `target`, the
/// remainder is drawn uniformly from the unselected items. Output keeps the
/// input order.
pub fn stratified_sample<T, K, F, R>(items: Vec<T>, target: usize, key: F, rng: &mut R) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
    R: Rng,
{
    if target >= items.len() {
        return items;
    }

    let mut strata: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (index, item) in items.iter().enumerate() {
        strata.entry(key(item)).or_default().push(index);
    }
    let per_stratum = target.div_ceil(strata.len());

    // (stratum, item index) pairs
    let mut selected: Vec<(usize, usize)> = Vec::new();
    let mut per_count = vec![0usize; strata.len()];
    for (stratum, indices) in strata.values_mut().enumerate() {
        indices.shuffle(rng);
        for &index in indices.iter().take(per_stratum) {
            selected.push((stratum, index));
            per_count[stratum] += 1;
        }
    }

    while selected.len() > target {
        let removable: Vec<usize> = (0..selected.len())
            .filter(|&pos| per_count[selected[pos].0] > 1)
            .collect();
        let pos = if removable.is_empty() {
            rng.random_range(0..selected.len())
        } else {
            removable[rng.random_range(0..removable.len())]
        };
        let (stratum, _) = selected.swap_remove(pos);
        per_count[stratum] -= 1;
    }

    let mut chosen = vec![false; items.len()];
    for &(_, index) in &selected {
        chosen[index] = true;
    }

    if selected.len() < target {
        let mut rest: Vec<usize> = (0..items.len()).filter(|&i| !chosen[i]).collect();
        rest.shuffle(rng);
        for index in rest.into_iter().take(target - selected.len()) {
            chosen[index] = true;
        }
    }

    items
        .into_iter()
        .zip(chosen)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}
