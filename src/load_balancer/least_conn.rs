//! Least Connections load balancing strategy.

use crate::load_balancer::{BackendGuard, BackendPool, LoadBalancer};

/// Least connections selector.
/// Selects the backend with the minimum number of in-flight requests.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, pool: &BackendPool) -> Option<BackendGuard> {
        // Scan and increment share the tracker lock; ties go to config order
        pool.acquire_least()
    }

    fn name(&self) -> &'static str {
        "least_connections"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::Strategy;
    use std::sync::Arc;

    fn pool() -> BackendPool {
        let addresses = vec![
            "http://127.0.0.1:8080".to_string(),
            "http://127.0.0.1:8081".to_string(),
        ];
        BackendPool::from_config(&addresses, None, Strategy::LeastConnections).unwrap()
    }

    #[test]
    fn test_least_conn() {
        let pool = pool();
        let lb = LeastConnections::new();
        let (b1, b2) = (pool.backends()[0].clone(), pool.backends()[1].clone());

        // artificially increase connections on b1
        pool.tracker().increment(&b1);

        // Should pick b2 (0 connections)
        let s1 = lb.next_server(&pool).unwrap();
        assert_eq!(s1.backend(), &b2);

        // b2 now has 2, b1 has 1
        pool.tracker().increment(&b2);

        let s2 = lb.next_server(&pool).unwrap();
        assert_eq!(s2.backend(), &b1);
    }

    #[test]
    fn test_tie_goes_to_first_configured() {
        let pool = pool();
        let guard = LeastConnections::new().next_server(&pool).unwrap();
        assert_eq!(guard.backend(), &pool.backends()[0]);
    }

    #[test]
    fn test_never_above_minimum() {
        let addresses: Vec<String> = (0..4).map(|i| format!("http://10.0.1.{}", i)).collect();
        let pool = BackendPool::from_config(&addresses, None, Strategy::LeastConnections).unwrap();
        let lb = LeastConnections::new();

        let mut held = Vec::new();
        for step in 0..100usize {
            let before = pool.tracker().snapshot();
            let min = before.iter().map(|(_, c)| *c).min().unwrap();
            let guard = lb.next_server(&pool).unwrap();
            let picked = before.iter().find(|(b, _)| b == guard.backend()).unwrap().1;
            assert_eq!(picked, min);

            held.push(guard);
            // release an older request every few steps to unbalance counts
            if step % 3 == 0 && held.len() > 1 {
                held.remove(step % held.len());
            }
        }
        drop(held);
        assert!(pool.tracker().snapshot().iter().all(|(_, c)| *c == 0));
    }

    #[test]
    fn test_concurrent_selection_net_zero() {
        let pool = Arc::new(pool());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    let lb = LeastConnections::new();
                    for _ in 0..500 {
                        let _guard = lb.next_server(&pool).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let total: usize = pool.tracker().snapshot().iter().map(|(_, c)| c).sum();
        assert_eq!(total, 0);
    }
}
