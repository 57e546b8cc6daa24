//! # Threshold Combiner Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | tc-01 Crypto Combiner | BLS combine-then-verify, with and without a bad share |
//! | tc-01 Crypto Combiner | POPRF blind aggregation |
//! | tc-02 State Reconciler | Quota and domain-state reconciliation |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shared_crypto::testing::ThresholdKeySet;
use shared_types::{DomainState, KeyVersionInfo, PnpQuotaResponse, VERSION};
use std::time::Duration;
use tc_01_crypto_combiner::{BlsCombiner, PartialSignatureShare, PoprfCombiner, ThresholdCombiner};
use tc_02_state_reconciler::{reconcile_domain_state, reconcile_quota};

fn key_version(keys: &ThresholdKeySet) -> KeyVersionInfo {
    KeyVersionInfo {
        key_version: 1,
        threshold: keys.threshold(),
        public_key: keys.public_key_bytes(),
        polynomial: keys.polynomial_bytes(),
    }
}

// ============================================================================
// TC-01: Threshold BLS
// ============================================================================

fn bench_bls_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("tc-01-bls-combine");
    group.measurement_time(Duration::from_secs(10));

    for (threshold, replicas) in [(2, 3), (5, 7), (9, 13)] {
        let keys = ThresholdKeySet::from_seed(threshold, replicas, 42);
        let info = key_version(&keys);
        let blinded = ThresholdKeySet::blind_message(b"+14155550123");
        let shares: Vec<PartialSignatureShare> = (0..threshold as u32)
            .map(|i| {
                PartialSignatureShare::new(
                    format!("http://signer{i}"),
                    keys.sign_partial(i, &blinded).unwrap(),
                )
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("honest", format!("{threshold}-of-{replicas}")),
            &shares,
            |b, shares| {
                b.iter(|| {
                    let mut combiner = BlsCombiner::from_key_version(&info).unwrap();
                    for share in shares {
                        combiner.add_share(share.clone());
                    }
                    black_box(combiner.combine(&blinded).unwrap())
                })
            },
        );

        // One corrupt share forces the verify-and-prune path.
        let mut with_bad = shares.clone();
        let other = ThresholdKeySet::blind_message(b"some other message");
        with_bad[0] = PartialSignatureShare::new("http://signer0", keys.sign_partial(0, &other).unwrap());
        with_bad.push(PartialSignatureShare::new(
            format!("http://signer{threshold}"),
            keys.sign_partial(threshold as u32, &blinded).unwrap(),
        ));

        group.bench_with_input(
            BenchmarkId::new("one_bad_share", format!("{threshold}-of-{replicas}")),
            &with_bad,
            |b, shares| {
                b.iter(|| {
                    let mut combiner = BlsCombiner::from_key_version(&info).unwrap();
                    for share in shares {
                        combiner.add_share(share.clone());
                    }
                    black_box(combiner.combine(&blinded).unwrap())
                })
            },
        );
    }

    group.finish();
}

fn bench_poprf_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("tc-01-poprf-aggregate");

    let keys = ThresholdKeySet::from_seed(3, 5, 7);
    let input = ThresholdKeySet::poprf_input(b"password");
    let shares: Vec<PartialSignatureShare> = (0..3u32)
        .map(|i| {
            PartialSignatureShare::new(
                format!("http://signer{i}"),
                keys.evaluate_poprf_partial(i, &input).unwrap(),
            )
        })
        .collect();

    group.bench_function("3-of-5", |b| {
        b.iter(|| {
            let mut combiner = PoprfCombiner::new(3);
            for share in &shares {
                combiner.add_share(share.clone());
            }
            black_box(combiner.combine(&input).unwrap())
        })
    });

    group.finish();
}

// ============================================================================
// TC-02: State Reconciliation
// ============================================================================

fn bench_reconciliation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tc-02-reconcile");

    let quotas: Vec<PnpQuotaResponse> = (0..13u64)
        .map(|i| PnpQuotaResponse::ok(VERSION, i, 100 + i % 2, Some(1_000 + i), vec![]))
        .collect();
    group.bench_function("quota_13_signers", |b| {
        b.iter(|| black_box(reconcile_quota(9, quotas.iter(), 2.0).unwrap()))
    });

    let states: Vec<DomainState> = (0..13u64)
        .map(|i| DomainState {
            counter: i,
            timer: 50 + i,
            disabled: false,
            now: 100,
        })
        .collect();
    group.bench_function("domain_state_13_signers", |b| {
        b.iter(|| black_box(reconcile_domain_state(9, 13, &states).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_bls_combine, bench_poprf_aggregate, bench_reconciliation);
criterion_main!(benches);
