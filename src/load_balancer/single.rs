//! Pass-through selection: every request goes to the first backend.

use crate::load_balancer::{BackendGuard, BackendPool, LoadBalancer};

#[derive(Debug, Default)]
pub struct Single;

impl LoadBalancer for Single {
    fn next_server(&self, pool: &BackendPool) -> Option<BackendGuard> {
        pool.acquire(0)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::Strategy;

    #[test]
    fn test_single_always_first() {
        let addresses = vec!["http://localhost:3000".to_string(), "http://localhost:4000".to_string()];
        let pool = BackendPool::from_config(&addresses, None, Strategy::None).unwrap();
        for _ in 0..5 {
            let guard = Single.next_server(&pool).unwrap();
            assert_eq!(guard.as_str(), "http://localhost:3000/");
        }
    }

    #[test]
    fn test_single_empty_pool() {
        let pool = BackendPool::from_config(&[], None, Strategy::None).unwrap();
        assert!(Single.next_server(&pool).is_none());
    }
}
