//! Benchmarks for encoding, commitment, opening and folding.
//!
//! Run with: cargo bench -p da-circuits

use std::hint::black_box;

use ark_ff::UniformRand;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use da_circuits::{
    commit, config::F, encode_bytes, fold, open, prove_bytes, verify, Commitment, OpeningProof,
    Srs,
};

const SRS_SIZE: usize = 1 << 12;

fn bench_srs() -> Srs {
    Srs::insecure_from_seed(SRS_SIZE, b"bench").unwrap()
}

fn random_point() -> F {
    let mut rng = ark_std::test_rng();
    F::rand(&mut rng)
}

/// Benchmark the dense bit-packing encoder.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size_kb in [4, 32, 127].iter() {
        let data = vec![0xABu8; size_kb * 1024];
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_kb), &data, |b, data| {
            b.iter(|| encode_bytes(black_box(data)));
        });
    }

    group.finish();
}

/// Benchmark KZG commitment for growing polynomial sizes.
fn bench_commit(c: &mut Criterion) {
    let srs = bench_srs();
    let mut group = c.benchmark_group("commit");

    for size_kb in [4, 32, 127].iter() {
        let coefficients = encode_bytes(&vec![0x12u8; size_kb * 1024]);
        group.bench_with_input(
            BenchmarkId::from_parameter(size_kb),
            &coefficients,
            |b, coefficients| {
                b.iter(|| commit(&srs, black_box(coefficients)).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark opening a 32 KiB file at a random point.
fn bench_open(c: &mut Criterion) {
    let srs = bench_srs();
    let coefficients = encode_bytes(&vec![0x34u8; 32 * 1024]);
    let z = random_point();

    c.bench_function("open_32kb", |b| {
        b.iter(|| open(&srs, black_box(&coefficients), black_box(z)).unwrap());
    });
}

/// Benchmark the pairing check.
fn bench_verify(c: &mut Criterion) {
    let srs = bench_srs();
    let z = random_point();
    let (commitment, proof) = prove_bytes(&srs, &vec![0x56u8; 4096], z).unwrap();

    c.bench_function("verify", |b| {
        b.iter(|| verify(&srs, black_box(&commitment), black_box(z), black_box(&proof)));
    });
}

/// Benchmark folding a full round of slots.
fn bench_fold(c: &mut Criterion) {
    let srs = bench_srs();
    let z = random_point();
    let mut group = c.benchmark_group("fold");

    for slots in [10usize, 100, 1000].iter() {
        let (commitment, proof) = prove_bytes(&srs, b"fold benchmark file", z).unwrap();
        let commitments: Vec<Commitment> = vec![commitment; *slots];
        let proofs: Vec<OpeningProof> = vec![proof; *slots];

        group.bench_with_input(BenchmarkId::from_parameter(slots), slots, |b, _| {
            b.iter(|| fold(black_box(&commitments), black_box(&proofs)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_commit,
    bench_open,
    bench_verify,
    bench_fold,
);

criterion_main!(benches);
