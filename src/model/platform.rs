//! Platforms (satellites or sensors) and their onboard resource budgets.

use std::collections::BTreeMap;

use super::agility::AgilityModel;
use super::error::InstanceError;
use crate::units::Time;
use crate::Id;

/// A step increase of the available budget at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStep {
    pub at: Time,
    pub increment: f64,
}

/// Monotone non-decreasing curve `A(t)` of cumulative budget available on a
/// platform for one named resource.
///
/// The curve starts at `initial` and jumps by each step's `increment` at the
/// step's instant (right-continuous). A schedule is within budget when the
/// cumulative consumption `C(t)` never exceeds `A(t)`. A curve without steps
/// models a constant capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetCurve {
    initial: f64,
    steps: Vec<BudgetStep>,
}

impl BudgetCurve {
    /// Constant capacity.
    pub fn constant(capacity: f64) -> Result<Self, InstanceError> {
        Self::replenishing(capacity, Vec::new())
    }

    /// Initial level plus replenishment steps, given in any order.
    ///
    /// # Errors
    ///
    /// Fails with [`InstanceError::InvalidValue`] if the initial level or any
    /// increment is negative or not finite, or if a step time is not finite.
    pub fn replenishing(
        initial: f64,
        steps: impl IntoIterator<Item = (Time, f64)>,
    ) -> Result<Self, InstanceError> {
        if !initial.is_finite() || initial < 0.0 {
            return Err(invalid("initial budget", initial));
        }
        let mut steps: Vec<BudgetStep> = steps
            .into_iter()
            .map(|(at, increment)| BudgetStep { at, increment })
            .collect();
        for step in &steps {
            if !step.at.value().is_finite() {
                return Err(invalid("budget step time", step.at.value()));
            }
            if !step.increment.is_finite() || step.increment < 0.0 {
                return Err(invalid("budget increment", step.increment));
            }
        }
        steps.sort_by(|a, b| a.at.value().total_cmp(&b.at.value()));
        Ok(Self { initial, steps })
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn steps(&self) -> &[BudgetStep] {
        &self.steps
    }

    /// `A(t)`: budget available at `t`, steps at exactly `t` included.
    pub fn available_at(&self, t: Time) -> f64 {
        self.initial
            + self
                .steps
                .iter()
                .take_while(|s| s.at.value() <= t.value())
                .map(|s| s.increment)
                .sum::<f64>()
    }

    /// `A(t⁻)`: budget available just before `t`.
    pub fn available_before(&self, t: Time) -> f64 {
        self.initial
            + self
                .steps
                .iter()
                .take_while(|s| s.at.value() < t.value())
                .map(|s| s.increment)
                .sum::<f64>()
    }

    /// Budget available once every step has been applied.
    pub fn total(&self) -> f64 {
        self.initial + self.steps.iter().map(|s| s.increment).sum::<f64>()
    }
}

fn invalid(field: &'static str, value: f64) -> InstanceError {
    InstanceError::InvalidValue {
        owner: "budget".to_string(),
        field,
        value,
    }
}

/// A schedulable spacecraft or sensor.
#[derive(Debug, Clone)]
pub struct Platform {
    id: Id,
    budgets: BTreeMap<String, BudgetCurve>,
    agility: AgilityModel,
}

impl Platform {
    /// Creates a platform without resource budgets and with instant transitions.
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            budgets: BTreeMap::new(),
            agility: AgilityModel::Instant,
        }
    }

    /// Adds (or replaces) the budget curve for a named resource.
    pub fn with_budget(mut self, resource: impl Into<String>, curve: BudgetCurve) -> Self {
        self.budgets.insert(resource.into(), curve);
        self
    }

    pub fn with_agility(mut self, agility: AgilityModel) -> Self {
        self.agility = agility;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn budget(&self, resource: &str) -> Option<&BudgetCurve> {
        self.budgets.get(resource)
    }

    /// Iterates budgets in resource-name order.
    pub fn budgets(&self) -> impl Iterator<Item = (&str, &BudgetCurve)> {
        self.budgets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn agility(&self) -> &AgilityModel {
        &self.agility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::secs;

    #[test]
    fn constant_curve() {
        let curve = BudgetCurve::constant(100.0).unwrap();
        assert_eq!(curve.available_at(secs(0.0)), 100.0);
        assert_eq!(curve.available_at(secs(1e6)), 100.0);
        assert_eq!(curve.total(), 100.0);
    }

    #[test]
    fn replenishing_curve_is_right_continuous() {
        let curve =
            BudgetCurve::replenishing(10.0, [(secs(200.0), 5.0), (secs(100.0), 5.0)]).unwrap();
        assert_eq!(curve.steps()[0].at.value(), 100.0);
        assert_eq!(curve.available_before(secs(100.0)), 10.0);
        assert_eq!(curve.available_at(secs(100.0)), 15.0);
        assert_eq!(curve.available_at(secs(250.0)), 20.0);
        assert_eq!(curve.total(), 20.0);
    }

    #[test]
    fn negative_values_rejected() {
        assert!(BudgetCurve::constant(-1.0).is_err());
        assert!(BudgetCurve::replenishing(1.0, [(secs(5.0), -2.0)]).is_err());
        assert!(BudgetCurve::constant(f64::NAN).is_err());
    }

    #[test]
    fn platform_budgets_sorted_by_name() {
        let platform = Platform::new("sat-1")
            .with_budget("storage", BudgetCurve::constant(5.0).unwrap())
            .with_budget("energy", BudgetCurve::constant(7.0).unwrap());
        let names: Vec<&str> = platform.budgets().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["energy", "storage"]);
        assert_eq!(platform.budget("energy").unwrap().initial(), 7.0);
        assert!(platform.budget("fuel").is_none());
    }
}
