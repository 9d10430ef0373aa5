use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fake::Fake;
use fake::faker::lorem::en::Words;
use lab_crypto::cancel::CancelToken;
use lab_crypto::preset::Language;
use lab_crypto::trithemius::analysis::{SearchOptions, find_key_with, frequency_attack_with};
use lab_crypto::trithemius::{PolyKey, encrypt};

fn make_string(len: usize) -> String {
    let mut s = String::with_capacity(len);
    while s.len() < len {
        let words: Vec<String> = Words(10..20).fake();
        if !s.is_empty() {
            s.push(' ');
        }
        s.push_str(&words.join(" "));
    }
    s.truncate(len);
    s
}

fn options(threads: usize) -> SearchOptions {
    SearchOptions {
        threads,
        cancel: CancelToken::new(),
    }
}

fn bench_frequency_attack(c: &mut Criterion) {
    let key = PolyKey::Linear { a: 5, b: 9 };
    let mut group = c.benchmark_group("Frequency attack");

    for (len, label) in [(100usize, "100"), (1_000, "1k")] {
        let cipher = encrypt(&make_string(len), &key, Language::English).expect("encrypt");
        for threads in [1usize, 4] {
            group.bench_with_input(
                BenchmarkId::new(format!("{}-threads", threads), label),
                &cipher,
                |b, cipher| {
                    b.iter(|| {
                        frequency_attack_with(black_box(cipher), Language::English, &options(threads))
                            .expect("attack")
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_exhaustive_search(c: &mut Criterion) {
    // Z_26 has no inverse for the quadratic Vandermonde determinant, so this
    // always takes the exhaustive branch
    let plain = make_string(200);
    let cipher = encrypt(&plain, &PolyKey::Quadratic { a: 11, b: 4, c: 17 }, Language::English)
        .expect("encrypt");
    let mut group = c.benchmark_group("Exhaustive key search");

    for threads in [1usize, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                find_key_with(black_box(&plain), &cipher, Language::English, &options(threads))
                    .expect("search")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frequency_attack, bench_exhaustive_search);
criterion_main!(benches);
