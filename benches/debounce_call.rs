use std::{hint::black_box, time::Duration};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use quiescent::{DebouncePolicy, Debounced, ManualClock};

fn controller(policy: DebouncePolicy) -> (ManualClock, Debounced<u64, u64>) {
    let clock = ManualClock::new();
    let debounced = Debounced::new(|value: u64| value, policy, clock.clone()).unwrap();
    (clock, debounced)
}

fn bench_coalesced_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("debounce/coalesced_call");
    group.sample_size(200);

    group.bench_function("trailing", |b| {
        let (_clock, debounced) = controller(DebouncePolicy::new(Duration::from_secs(60)));

        b.iter(|| {
            black_box(debounced.call(black_box(1)));
        });
    });

    group.bench_function("trailing+max_wait", |b| {
        let (_clock, debounced) = controller(
            DebouncePolicy::new(Duration::from_secs(60)).max_wait(Duration::from_secs(120)),
        );

        b.iter(|| {
            black_box(debounced.call(black_box(1)));
        });
    });

    group.finish();
}

fn bench_leading_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("debounce/leading_call");
    group.sample_size(200);

    group.bench_function("force_next", |b| {
        let (_clock, debounced) = controller(DebouncePolicy::new(Duration::from_secs(60)));

        b.iter(|| {
            debounced.force_next();
            black_box(debounced.call(black_box(1)));
        });
    });

    group.finish();
}

fn bench_burst_then_fire(c: &mut Criterion) {
    let mut group = c.benchmark_group("debounce/burst_then_fire");

    for burst in [1_u64, 10, 100] {
        group.bench_function(format!("burst={burst}"), |b| {
            b.iter_batched(
                || controller(DebouncePolicy::new(Duration::from_millis(10))),
                |(clock, debounced)| {
                    for i in 0..burst {
                        debounced.call(i);
                    }
                    black_box(clock.advance(Duration::from_millis(10)));
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_coalesced_call,
    bench_leading_call,
    bench_burst_then_fire
);
criterion_main!(benches);
