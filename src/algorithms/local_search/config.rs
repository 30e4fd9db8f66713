//! Local search configuration.

/// Configuration for [`LocalSearch`](super::LocalSearch).
///
/// The search is bounded by iterations rather than wall time so that a given
/// seed always yields the same schedule.
///
/// # Examples
///
/// ```
/// use satplan::algorithms::LocalSearchConfig;
///
/// let config = LocalSearchConfig::default()
///     .with_max_iterations(2_000)
///     .with_stall_limit(100)
///     .with_perturbation_strength(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LocalSearchConfig {
    /// Neighbour evaluations before the search stops.
    pub max_iterations: usize,

    /// Consecutive non-improving moves that trigger a perturbation restart.
    pub stall_limit: usize,

    /// Random swaps applied to the best order on restart.
    pub perturbation_strength: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            stall_limit: 60,
            perturbation_strength: 3,
        }
    }
}

impl LocalSearchConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_stall_limit(mut self, n: usize) -> Self {
        self.stall_limit = n;
        self
    }

    pub fn with_perturbation_strength(mut self, n: usize) -> Self {
        self.perturbation_strength = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.stall_limit == 0 {
            return Err("stall_limit must be positive".into());
        }
        if self.perturbation_strength == 0 {
            return Err("perturbation_strength must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LocalSearchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_stall_limit_rejected() {
        let config = LocalSearchConfig::default().with_stall_limit(0);
        assert_eq!(config.validate().unwrap_err(), "stall_limit must be positive");
    }

    #[test]
    fn test_zero_perturbation_rejected() {
        let config = LocalSearchConfig::default().with_perturbation_strength(0);
        assert!(config.validate().is_err());
    }
}
