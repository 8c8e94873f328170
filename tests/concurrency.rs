//! Concurrent use of the balancer from many threads.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use conn_balancer::config::PolicyKind;
use conn_balancer::load_balancer::{LeastConnections, SelectionPolicy};
use conn_balancer::Balancer;

const BACKENDS: [&str; 5] = [
    "localhost:8081",
    "localhost:8082",
    "localhost:8083",
    "localhost:8084",
    "localhost:8085",
];

fn loads(balancer: &Balancer) -> HashMap<String, u64> {
    balancer
        .active_connections()
        .expect("least connections tracks load")
        .into_iter()
        .map(|l| (l.backend, l.active_connections))
        .collect()
}

#[test]
fn test_concurrent_selections_stay_balanced() {
    let balancer = Arc::new(Balancer::new(BACKENDS, PolicyKind::LeastConnections).unwrap());
    let threads = 8;
    let per_thread = 125;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let balancer = balancer.clone();
            thread::spawn(move || {
                for _ in 0..per_thread {
                    balancer.select_backend().unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every selection took a minimum, so with no releases the spread is at most one.
    let loads = loads(&balancer);
    let total: u64 = loads.values().sum();
    assert_eq!(total, (threads * per_thread) as u64);
    let max = *loads.values().max().unwrap();
    let min = *loads.values().min().unwrap();
    assert!(max - min <= 1, "unbalanced: {:?}", loads);
}

#[test]
fn test_concurrent_acquire_release_returns_to_zero() {
    let balancer = Arc::new(Balancer::new(BACKENDS, PolicyKind::LeastConnections).unwrap());

    thread::scope(|s| {
        for _ in 0..8 {
            let balancer = &balancer;
            s.spawn(move || {
                for i in 0..200 {
                    let guard = balancer.acquire().unwrap();
                    assert!(BACKENDS.contains(&guard.backend()));
                    if i % 2 == 0 {
                        guard.release().unwrap();
                    }
                }
            });
        }
    });

    assert!(loads(&balancer).values().all(|&c| c == 0));
}

#[test]
fn test_policy_is_correct_without_facade() {
    let policy = Arc::new(LeastConnections::new(["a", "b"]).unwrap());

    thread::scope(|s| {
        for _ in 0..4 {
            let policy = &policy;
            s.spawn(move || {
                for _ in 0..50 {
                    let backend = policy.select_backend().unwrap();
                    policy.release_connection(&backend).unwrap();
                }
            });
        }
    });

    assert_eq!(policy.connection_count("a").unwrap(), 0);
    assert_eq!(policy.connection_count("b").unwrap(), 0);
}

#[test]
fn test_round_robin_spreads_evenly_across_threads() {
    let balancer = Arc::new(Balancer::new(BACKENDS, PolicyKind::RoundRobin).unwrap());
    let counts = std::sync::Mutex::new(HashMap::<String, u64>::new());

    thread::scope(|s| {
        for _ in 0..5 {
            s.spawn(|| {
                for _ in 0..100 {
                    let backend = balancer.select_backend().unwrap();
                    *counts.lock().unwrap().entry(backend).or_default() += 1;
                }
            });
        }
    });

    let counts = counts.into_inner().unwrap();
    assert_eq!(counts.len(), BACKENDS.len());
    assert!(counts.values().all(|&c| c == 100));
}
