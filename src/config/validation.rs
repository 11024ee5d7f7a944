//! Configuration validation.
//!
//! Semantic checks serde cannot express: address syntax, backend presence
//! for the chosen strategy, and weight/backend agreement. These are the same
//! checks `Engine::setup` runs, so a file that validates will set up.

use crate::config::schema::EngineConfig;
use crate::error::EngineError;
use crate::load_balancer::backend::register;

/// Validate `config`, returning the first setup error it would cause.
pub fn validate_config(config: &EngineConfig) -> Result<(), EngineError> {
    register(&config.backends, config.weights.as_deref(), config.strategy)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::Strategy;

    #[test]
    fn test_valid_round_robin() {
        let config = EngineConfig::with_backends(
            Strategy::RoundRobin,
            ["http://localhost:3000", "http://localhost:4000"],
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_no_backends_without_strategy() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_configs() {
        let bad_address =
            EngineConfig::with_backends(Strategy::None, [" http://foo.com", "http://localhost:4000"]);
        assert!(matches!(
            validate_config(&bad_address),
            Err(EngineError::InvalidAddress { .. })
        ));

        let no_backends = EngineConfig::with_backends(Strategy::RoundRobin, Vec::<String>::new());
        assert!(matches!(
            validate_config(&no_backends),
            Err(EngineError::NoBackends(Strategy::RoundRobin))
        ));

        let mut weighted =
            EngineConfig::with_backends(Strategy::WeightedRoundRobin, ["http://localhost:3000"]);
        assert!(matches!(
            validate_config(&weighted),
            Err(EngineError::WeightMismatch(_))
        ));
        weighted.weights = Some(vec![1]);
        assert!(validate_config(&weighted).is_ok());
    }
}
