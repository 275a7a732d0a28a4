/*!
 * Counter Property Integration Tests
 *
 * No-lost-update, linearizable return values, and snapshot sanity for the
 * exclusive-lock, spin-lock, and lock-free strategies
 */

use pretty_assertions::assert_eq;
use proptest::prelude::{prop_assert_eq, prop_oneof, proptest, Just, ProptestConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::thread;
use sync_counter::{busy_teardowns, CounterConfig, SpinConfig, Strategy, SynchronizedCounter};

const THREAD_COUNTS: [usize; 4] = [1, 2, 8, 64];
const INCREMENT_COUNTS: [u64; 3] = [1, 1_000, 10_000];

fn hammer(counter: &SynchronizedCounter, threads: usize, increments: u64) {
    thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                for _ in 0..increments {
                    counter.increment();
                }
            });
        }
    });
}

fn assert_no_lost_updates(strategy: Strategy) {
    for threads in THREAD_COUNTS {
        for increments in INCREMENT_COUNTS {
            let initial = 7;
            let counter = SynchronizedCounter::with_initial(strategy, initial);
            hammer(&counter, threads, increments);

            assert_eq!(
                counter.get(),
                initial + (threads as u64 * increments) as i64,
                "{strategy} lost updates with {threads} threads x {increments}"
            );
        }
    }
}

#[test]
fn test_exclusive_lock_no_lost_updates() {
    assert_no_lost_updates(Strategy::ExclusiveLock);
}

#[test]
fn test_spin_lock_no_lost_updates() {
    assert_no_lost_updates(Strategy::SpinLock);
}

#[test]
fn test_lock_free_no_lost_updates() {
    assert_no_lost_updates(Strategy::LockFree);
}

fn collect_returns(counter: &SynchronizedCounter, threads: usize, increments: u64) -> Vec<i64> {
    let mut all: Vec<i64> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    (0..increments)
                        .map(|_| counter.increment())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    all.sort_unstable();
    all
}

#[test]
fn test_returns_are_linearizable() {
    for strategy in Strategy::CONCRETE {
        for (threads, increments) in [(8usize, 10_000u64), (64, 1_000)] {
            let initial = -50;
            let counter = SynchronizedCounter::with_initial(strategy, initial);
            let returns = collect_returns(&counter, threads, increments);

            let total = threads as i64 * increments as i64;
            let expected: Vec<i64> = (initial + 1..=initial + total).collect();
            assert_eq!(returns.len(), expected.len(), "{strategy}");
            assert!(returns == expected, "{strategy} returned duplicates or gaps");
        }
    }
}

#[test]
fn test_get_never_behind_completed_increments() {
    for strategy in Strategy::CONCRETE {
        let counter = SynchronizedCounter::new(strategy);
        let published = AtomicI64::new(0);
        let done = AtomicBool::new(false);
        let violations = AtomicU64::new(0);

        thread::scope(|s| {
            let writers: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        for _ in 0..5_000 {
                            let value = counter.increment();
                            published.fetch_max(value, Ordering::Release);
                        }
                    })
                })
                .collect();

            s.spawn(|| {
                let mut last = i64::MIN;
                while !done.load(Ordering::Acquire) {
                    let floor = published.load(Ordering::Acquire);
                    let value = counter.get();
                    if value < floor || value < last {
                        violations.fetch_add(1, Ordering::Relaxed);
                    }
                    last = value;
                }
            });

            for writer in writers {
                writer.join().unwrap();
            }
            done.store(true, Ordering::Release);
        });

        assert_eq!(violations.into_inner(), 0, "{strategy}");
        assert_eq!(counter.get(), 20_000);
    }
}

#[test]
fn test_sequential_gets_are_stable_when_idle() {
    for strategy in Strategy::CONCRETE {
        let counter = SynchronizedCounter::new(strategy);
        hammer(&counter, 4, 100);

        let first = counter.get();
        for _ in 0..100 {
            assert_eq!(counter.get(), first);
        }
    }
}

#[test]
fn test_uneven_workloads() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let per_thread: Vec<u64> = (0..16).map(|_| rng.gen_range(1..2_000)).collect();
    let total: u64 = per_thread.iter().sum();

    for strategy in Strategy::CONCRETE {
        let counter = SynchronizedCounter::new(strategy);
        thread::scope(|s| {
            for &count in &per_thread {
                let counter = &counter;
                s.spawn(move || {
                    for _ in 0..count {
                        counter.increment();
                    }
                });
            }
        });
        assert_eq!(counter.get(), total as i64, "{strategy}");
    }
}

#[test]
fn test_construct_destruct_cycles() {
    let before = busy_teardowns();

    for _ in 0..10_000 {
        for strategy in Strategy::CONCRETE {
            let counter = SynchronizedCounter::new(strategy);
            drop(counter);
        }
    }

    let config = CounterConfig {
        strategy: Strategy::SpinLock,
        initial: 0,
        spin: SpinConfig {
            spin_limit: 1,
            yield_limit: 1,
        },
    };
    for _ in 0..1_000 {
        let counter = SynchronizedCounter::from_config(&config).unwrap();
        counter.increment();
    }

    assert_eq!(busy_teardowns(), before);
}

fn strategy_strategy() -> impl proptest::strategy::Strategy<Value = Strategy> {
    prop_oneof![
        Just(Strategy::ExclusiveLock),
        Just(Strategy::SpinLock),
        Just(Strategy::LockFree),
        Just(Strategy::Auto),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_final_value_is_initial_plus_total(
        strategy in strategy_strategy(),
        threads in 1usize..8,
        increments in 1u64..300,
        initial in -100_000i64..100_000,
    ) {
        let counter = SynchronizedCounter::with_initial(strategy, initial);
        hammer(&counter, threads, increments);
        prop_assert_eq!(counter.get(), initial + (threads as u64 * increments) as i64);
    }

    #[test]
    fn prop_returns_form_contiguous_range(
        strategy in strategy_strategy(),
        threads in 1usize..6,
        increments in 1u64..200,
    ) {
        let counter = SynchronizedCounter::new(strategy);
        let returns = collect_returns(&counter, threads, increments);
        let expected: Vec<i64> = (1..=(threads as u64 * increments) as i64).collect();
        prop_assert_eq!(returns, expected);
    }
}
