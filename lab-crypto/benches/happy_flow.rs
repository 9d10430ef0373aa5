use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lab_crypto::knapsack::{self, KnapsackKeyPair};
use lab_crypto::preset::Language;
use lab_crypto::rsa;
use lab_crypto::trithemius::{PolyKey, TrithemiusCipher};

const MESSAGE: &str = "Heh safasdkjfhkjas fha sdf asda";

fn bench_rsa(c: &mut Criterion) {
    // one-time setup
    let keys = rsa::generate_keys(256, 20).expect("generate rsa keys");

    c.bench_function("rsa_happy_flow", |b| {
        b.iter(|| {
            let cipher = rsa::encrypt(MESSAGE, &keys.e, &keys.n).expect("encrypt");
            let decoded = rsa::decrypt(&cipher, &keys.d, &keys.n).expect("decrypt");
            black_box(decoded);
        })
    });
}

fn bench_knapsack(c: &mut Criterion) {
    let pair = KnapsackKeyPair::generate(8).expect("generate knapsack keys");

    c.bench_function("knapsack_happy_flow", |b| {
        b.iter(|| {
            let cipher =
                knapsack::encrypt(MESSAGE, &pair.public_key, Language::English).expect("encrypt");
            let decoded = knapsack::decrypt(&cipher, &pair.private_key, pair.m, pair.n, Language::English)
                .expect("decrypt");
            black_box(decoded);
        })
    });
}

fn bench_trithemius(c: &mut Criterion) {
    let cipher = TrithemiusCipher::for_language(Language::English).expect("cipher");
    let key = PolyKey::Quadratic { a: 7, b: 3, c: 11 };

    c.bench_function("trithemius_happy_flow", |b| {
        b.iter(|| {
            let encrypted = cipher.encrypt(black_box(MESSAGE), &key).expect("encrypt");
            let decoded = cipher.decrypt(&encrypted, &key).expect("decrypt");
            black_box(decoded);
        })
    });
}

criterion_group!(benches, bench_rsa, bench_knapsack, bench_trithemius);
criterion_main!(benches);
