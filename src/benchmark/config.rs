//! Benchmark configuration.

use std::time::Duration;

use super::error::BenchmarkError;

/// How a benchmark sweep is run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use satplan::benchmark::BenchmarkConfig;
///
/// let config = BenchmarkConfig::default()
///     .with_time_budget(Duration::from_secs(5))
///     .with_seed_count(3);
/// assert_eq!(config.seeds, vec![0, 1, 2]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Wall-clock budget handed to each `plan` call.
    pub time_budget: Duration,

    /// Extra time the supervisor waits past the budget before it detaches a
    /// worker that has not answered.
    pub grace: Duration,

    /// Seeds evaluated for every (instance, scheduler) pair.
    pub seeds: Vec<u64>,

    /// Evaluate in parallel (only effective with the `parallel` feature).
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(10),
            grace: Duration::from_millis(500),
            seeds: vec![0],
            parallel: true,
        }
    }
}

impl BenchmarkConfig {
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = u64>) -> Self {
        self.seeds = seeds.into_iter().collect();
        self
    }

    /// Uses seeds `0..n`.
    pub fn with_seed_count(self, n: u64) -> Self {
        self.with_seeds(0..n)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), BenchmarkError> {
        if self.seeds.is_empty() {
            return Err(BenchmarkError::InvalidConfig("at least one seed is required".into()));
        }
        if self.time_budget.is_zero() {
            return Err(BenchmarkError::InvalidConfig("time_budget must be positive".into()));
        }
        let mut seeds = self.seeds.clone();
        seeds.sort_unstable();
        if seeds.windows(2).any(|w| w[0] == w[1]) {
            return Err(BenchmarkError::InvalidConfig("seeds must be distinct".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BenchmarkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_no_seeds_rejected() {
        let config = BenchmarkConfig::default().with_seeds(Vec::new());
        assert!(matches!(config.validate(), Err(BenchmarkError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = BenchmarkConfig::default().with_time_budget(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_seeds_rejected() {
        let config = BenchmarkConfig::default().with_seeds([3, 1, 3]);
        assert_eq!(
            config.validate(),
            Err(BenchmarkError::InvalidConfig("seeds must be distinct".into()))
        );
    }
}
