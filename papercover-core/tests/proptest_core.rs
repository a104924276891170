//! Property-based tests for the indexer, classifier, and reducer using proptest.

use proptest::prelude::*;
use std::collections::BTreeSet;

use papercover_core::classify::{ActiveAuthorSet, ActivityThresholds, EdgeRule, classify};
use papercover_core::corpus::{Corpus, Paper};
use papercover_core::index::{PositionIndex, SoloAuthorPolicy};
use papercover_core::reduce::{greedy_cover, verify_coverage};

type RawPaper = (String, Vec<u8>);

fn raw_papers(max_papers: usize) -> impl Strategy<Value = Vec<RawPaper>> {
    prop::collection::vec(prop::collection::vec(0u8..10, 0..5), 1..=max_papers).prop_map(
        |papers| {
            papers
                .into_iter()
                .enumerate()
                .map(|(i, authors)| (format!("p{i:02}"), authors))
                .collect()
        },
    )
}

fn thresholds() -> impl Strategy<Value = ActivityThresholds> {
    (0u32..4, 0u32..4, prop_oneof![Just(EdgeRule::Combined), Just(EdgeRule::Either)])
        .prop_map(|(edge, middle, rule)| ActivityThresholds::new(edge, middle).with_edge_rule(rule))
}

fn build(raw: &[RawPaper]) -> Corpus {
    Corpus::from_papers(
        raw.iter()
            .map(|(id, authors)| Paper::new(id.clone(), authors.iter().map(|a| format!("a{a}"))))
            .collect(),
    )
    .unwrap()
}

fn active_for(corpus: &Corpus, t: &ActivityThresholds) -> ActiveAuthorSet {
    classify(&PositionIndex::build(corpus, SoloAuthorPolicy::FirstOnly), t)
}

fn active_on(corpus: &Corpus, active: &ActiveAuthorSet, paper: usize) -> BTreeSet<String> {
    corpus.papers()[paper]
        .authors
        .iter()
        .filter(|a| active.contains(a))
        .cloned()
        .collect()
}

/// Smallest number of papers whose active authors cover `active`, by exhaustive search.
fn brute_force_optimum(corpus: &Corpus, active: &ActiveAuthorSet) -> usize {
    let universe: BTreeSet<String> = active.iter().map(str::to_string).collect();
    let sets: Vec<BTreeSet<String>> = (0..corpus.len())
        .map(|i| active_on(corpus, active, i))
        .filter(|s| !s.is_empty())
        .collect();
    let mut best = usize::MAX;
    for mask in 0u32..(1 << sets.len()) {
        let size = mask.count_ones() as usize;
        if size >= best {
            continue;
        }
        let union: BTreeSet<String> = sets
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u32 << *i) != 0)
            .flat_map(|(_, s)| s.iter().cloned())
            .collect();
        if union == universe {
            best = size;
        }
    }
    best
}

fn harmonic(n: usize) -> f64 {
    (1..=n).map(|k| 1.0 / k as f64).sum()
}

// --- Reducer properties ---

proptest! {
    #[test]
    fn cover_includes_every_active_author(raw in raw_papers(12), t in thresholds()) {
        let corpus = build(&raw);
        let active = active_for(&corpus, &t);
        let cover = greedy_cover(&corpus, &active).unwrap();
        let check = verify_coverage(&corpus, &active, cover.paper_ids()).unwrap();
        prop_assert_eq!(check.covered_authors, active.len());
    }

    #[test]
    fn cover_has_no_duplicates_and_only_known_papers(raw in raw_papers(12), t in thresholds()) {
        let corpus = build(&raw);
        let active = active_for(&corpus, &t);
        let cover = greedy_cover(&corpus, &active).unwrap();
        let ids: Vec<&str> = cover.paper_ids().collect();
        let unique: BTreeSet<&str> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
        for id in ids {
            prop_assert!(corpus.get(id).is_some());
        }
    }

    #[test]
    fn every_selection_makes_progress(raw in raw_papers(12), t in thresholds()) {
        let corpus = build(&raw);
        let active = active_for(&corpus, &t);
        let cover = greedy_cover(&corpus, &active).unwrap();
        let gains: Vec<usize> = cover.selections.iter().map(|s| s.newly_covered).collect();
        prop_assert!(gains.iter().all(|&g| g > 0));
        prop_assert!(gains.windows(2).all(|w| w[0] >= w[1]));
        prop_assert_eq!(gains.iter().sum::<usize>(), active.len());
    }

    #[test]
    fn cover_is_independent_of_paper_order(
        (raw, shuffled) in raw_papers(12).prop_flat_map(|raw| (Just(raw.clone()), Just(raw).prop_shuffle())),
        t in thresholds(),
    ) {
        let a = build(&raw);
        let b = build(&shuffled);
        let cover_a = greedy_cover(&a, &active_for(&a, &t)).unwrap();
        let cover_b = greedy_cover(&b, &active_for(&b, &t)).unwrap();
        prop_assert_eq!(&cover_a, &cover_b);
        prop_assert_eq!(cover_a.digest(), cover_b.digest());
    }

    #[test]
    fn cover_size_within_harmonic_bound(raw in raw_papers(8), t in thresholds()) {
        let corpus = build(&raw);
        let active = active_for(&corpus, &t);
        let cover = greedy_cover(&corpus, &active).unwrap();
        let optimum = brute_force_optimum(&corpus, &active);
        let d = (0..corpus.len())
            .map(|i| active_on(&corpus, &active, i).len())
            .max()
            .unwrap_or(0);
        prop_assert!(cover.len() >= optimum);
        prop_assert!(cover.len() as f64 <= optimum as f64 * harmonic(d) + 1e-9);
    }
}

// --- Classification properties ---

proptest! {
    #[test]
    fn classification_is_idempotent(raw in raw_papers(12), t in thresholds()) {
        let corpus = build(&raw);
        let index = PositionIndex::build(&corpus, SoloAuthorPolicy::FirstOnly);
        prop_assert_eq!(classify(&index, &t), classify(&index, &t));
    }

    #[test]
    fn adding_papers_never_removes_active_authors(
        base in raw_papers(8),
        extra in prop::collection::vec(prop::collection::vec(0u8..10, 0..5), 0..6),
        t in thresholds(),
    ) {
        let mut grown = base.clone();
        grown.extend(
            extra
                .into_iter()
                .enumerate()
                .map(|(i, authors)| (format!("x{i:02}"), authors)),
        );
        let small = build(&base);
        let large = build(&grown);

        let small_index = PositionIndex::build(&small, SoloAuthorPolicy::FirstOnly);
        let large_index = PositionIndex::build(&large, SoloAuthorPolicy::FirstOnly);
        for (author, counts) in small_index.iter() {
            let grown_counts = large_index.get(author).copied().unwrap_or_default();
            prop_assert!(grown_counts.first >= counts.first);
            prop_assert!(grown_counts.last >= counts.last);
            prop_assert!(grown_counts.middle >= counts.middle);
        }

        let small_active = classify(&small_index, &t);
        let large_active = classify(&large_index, &t);
        for author in small_active.iter() {
            prop_assert!(large_active.contains(author));
        }
    }

    #[test]
    fn sharded_index_equals_single_pass(raw in raw_papers(12), shard in 1usize..5) {
        let corpus = build(&raw);
        let whole = PositionIndex::build(&corpus, SoloAuthorPolicy::FirstOnly);
        let merged = PositionIndex::from_shards(
            corpus
                .papers()
                .chunks(shard)
                .map(|chunk| PositionIndex::from_papers(chunk, SoloAuthorPolicy::FirstOnly)),
        );
        prop_assert_eq!(whole, merged);
    }
}
