use criterion::{Criterion, black_box, criterion_group, criterion_main};
use papercover_core::classify::{ActivityThresholds, classify};
use papercover_core::corpus::{Corpus, Paper, parse_records};
use papercover_core::index::{PositionIndex, SoloAuthorPolicy};
use papercover_core::reduce::{greedy_cover, verify_coverage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic synthetic corpus: `papers` papers drawn from a pool of
/// `authors` names with a skewed author distribution.
fn synthetic_corpus(papers: usize, authors: usize) -> Corpus {
    let mut rng = StdRng::seed_from_u64(42);

    let list = (0..papers)
        .map(|i| {
            let len = rng.gen_range(1..=8);
            let names: Vec<String> = (0..len)
                .map(|_| {
                    // Square the draw to favour low ids, giving prolific authors.
                    let r = rng.gen_range(0..authors);
                    format!("Author {}", r * r / authors)
                })
                .collect();
            Paper::new(format!("paper-{i:06}"), names)
        })
        .collect();
    Corpus::from_papers(list).unwrap()
}

fn bench_loader(c: &mut Criterion) {
    let records: Vec<String> = (0..1_000)
        .map(|i| {
            format!(
                r#"{{"id": "p{i}", "title": "Paper {i}", "authors": ["A{a}", "B{b}", "C{i}"]}}"#,
                a = i % 97,
                b = i % 31
            )
        })
        .collect();
    let json = format!("[{}]", records.join(","));

    c.bench_function("parse_records_1k", |b| {
        b.iter(|| parse_records(black_box(&json), "iclr_2024_papers"))
    });
}

fn bench_index(c: &mut Criterion) {
    let corpus = synthetic_corpus(10_000, 5_000);

    c.bench_function("index_build_10k", |b| {
        b.iter(|| PositionIndex::build(black_box(&corpus), SoloAuthorPolicy::FirstOnly))
    });

    c.bench_function("index_sharded_10k", |b| {
        b.iter(|| {
            PositionIndex::from_shards(
                corpus
                    .papers()
                    .chunks(1_000)
                    .map(|chunk| PositionIndex::from_papers(chunk, SoloAuthorPolicy::FirstOnly)),
            )
        })
    });
}

fn bench_classify(c: &mut Criterion) {
    let corpus = synthetic_corpus(10_000, 5_000);
    let index = PositionIndex::build(&corpus, SoloAuthorPolicy::FirstOnly);
    let thresholds = ActivityThresholds::default();

    c.bench_function("classify_10k", |b| {
        b.iter(|| classify(black_box(&index), black_box(&thresholds)))
    });
}

fn bench_reduce(c: &mut Criterion) {
    let corpus = synthetic_corpus(10_000, 5_000);
    let index = PositionIndex::build(&corpus, SoloAuthorPolicy::FirstOnly);
    let active = classify(&index, &ActivityThresholds::default());

    c.bench_function("greedy_cover_10k", |b| {
        b.iter(|| greedy_cover(black_box(&corpus), black_box(&active)))
    });

    let cover = greedy_cover(&corpus, &active).unwrap();
    c.bench_function("verify_coverage_10k", |b| {
        b.iter(|| verify_coverage(black_box(&corpus), black_box(&active), cover.paper_ids()))
    });

    c.bench_function("cover_digest", |b| b.iter(|| black_box(&cover).digest()));
}

criterion_group!(benches, bench_loader, bench_index, bench_classify, bench_reduce);
criterion_main!(benches);
