use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{thread_rng, Rng};
use std::time::Duration;
use veil::index::{BooleanOperator, SearchEngine};
use veil::paillier::{ParametersBuilder, Plaintext};
use veil::sss::ShamirSecretSharing;
use veil_traits::HomomorphicEncrypter;

pub fn paillier_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("paillier");
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(2));

    let mut rng = thread_rng();
    for key_bits in [1024, 2048] {
        let par = ParametersBuilder::new()
            .set_key_bits(key_bits)
            .build_arc()
            .unwrap();
        let engine = SearchEngine::new(&par, &mut rng).unwrap();
        let pk = engine.public_key().clone();
        let pt = Plaintext::from(1234);

        group.bench_function(BenchmarkId::new("encrypt", key_bits), |b| {
            b.iter(|| pk.try_encrypt(&pt, &mut rng).unwrap());
        });

        let ct1 = engine.encrypt(1234).unwrap();
        let ct2 = engine.encrypt(1234).unwrap();
        group.bench_function(BenchmarkId::new("add", key_bits), |b| {
            b.iter(|| ct1.try_add(&ct2).unwrap());
        });
        group.bench_function(BenchmarkId::new("equality_match", key_bits), |b| {
            b.iter(|| engine.equality_match(&ct1, &ct2).unwrap());
        });
    }

    group.finish();
}

pub fn search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(2));

    let mut rng = thread_rng();
    let par = ParametersBuilder::new().set_key_bits(1024).build_arc().unwrap();
    let engine = SearchEngine::new(&par, &mut rng).unwrap();
    for i in 0..64 {
        let session_id = format!("session-{}", i);
        engine.build_numeric_entry(&session_id, i % 8).unwrap();
        engine.build_keyword_entry(&session_id, [format!("k{}", i % 4), format!("k{}", i % 7)]);
    }

    for terms in [1, 2] {
        let query = (0..terms as i64).collect::<Vec<_>>();
        group.bench_function(BenchmarkId::new("numeric/64", terms), |b| {
            b.iter(|| engine.search_numeric(&query, BooleanOperator::Or).unwrap());
        });
    }
    group.bench_function("keywords/64", |b| {
        b.iter(|| engine.search_keywords(["k1", "k2"], BooleanOperator::And));
    });

    group.finish();
}

pub fn sss_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sss");
    group.sample_size(10);

    let mut rng = thread_rng();
    for (threshold, n) in [(2, 3), (3, 5), (7, 10)] {
        let sss = ShamirSecretSharing::new(threshold, n).unwrap();
        for len in [64, 4096] {
            let secret = (0..len).map(|_| rng.gen::<u8>()).collect::<Vec<_>>();
            let shares = sss.split(&secret, &mut rng).unwrap();

            group.bench_function(
                BenchmarkId::new(format!("split/{}-of-{}", threshold, n), len),
                |b| {
                    b.iter(|| sss.split(&secret, &mut rng).unwrap());
                },
            );
            group.bench_function(
                BenchmarkId::new(format!("reconstruct/{}-of-{}", threshold, n), len),
                |b| {
                    b.iter(|| ShamirSecretSharing::reconstruct(&shares[..threshold]).unwrap());
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, paillier_benchmark, search_benchmark, sss_benchmark);
criterion_main!(benches);
