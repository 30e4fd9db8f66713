//! Objective specification declared per problem instance.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::InstanceError;

/// Named scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ObjectiveKind {
    /// Σ priority × quality over all assignments.
    WeightedReward,
    /// Fraction of tasks scheduled at least once.
    CoverageFraction,
    /// Reward per unit of (weighted) resource consumed.
    ResourceEfficiency,
}

impl ObjectiveKind {
    pub const ALL: [ObjectiveKind; 3] = [
        ObjectiveKind::WeightedReward,
        ObjectiveKind::CoverageFraction,
        ObjectiveKind::ResourceEfficiency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveKind::WeightedReward => "weighted-reward",
            ObjectiveKind::CoverageFraction => "coverage-fraction",
            ObjectiveKind::ResourceEfficiency => "resource-efficiency",
        }
    }

    /// True when adding an assignment can never lower the objective.
    pub fn is_monotone(&self) -> bool {
        !matches!(self, ObjectiveKind::ResourceEfficiency)
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectiveKind {
    type Err = InstanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectiveKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| InstanceError::UnknownObjective(s.to_string()))
    }
}

/// Objective function plus its weights.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveSpec {
    kind: ObjectiveKind,
    resource_weights: BTreeMap<String, f64>,
}

impl ObjectiveSpec {
    pub fn new(kind: ObjectiveKind) -> Self {
        Self {
            kind,
            resource_weights: BTreeMap::new(),
        }
    }

    /// Weight applied to `resource` when aggregating consumption.
    pub fn with_resource_weight(mut self, resource: impl Into<String>, weight: f64) -> Self {
        self.resource_weights.insert(resource.into(), weight);
        self
    }

    pub fn kind(&self) -> ObjectiveKind {
        self.kind
    }

    /// Weight of `resource`; resources without an explicit weight count 1.0.
    pub fn resource_weight(&self, resource: &str) -> f64 {
        self.resource_weights.get(resource).copied().unwrap_or(1.0)
    }

    pub fn resource_weights(&self) -> impl Iterator<Item = (&str, f64)> {
        self.resource_weights.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for ObjectiveSpec {
    fn default() -> Self {
        Self::new(ObjectiveKind::WeightedReward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ObjectiveKind::ALL {
            assert_eq!(kind.name().parse::<ObjectiveKind>().unwrap(), kind);
        }
        assert!(matches!(
            "makespan".parse::<ObjectiveKind>(),
            Err(InstanceError::UnknownObjective(_))
        ));
    }

    #[test]
    fn default_weight_is_one() {
        let spec = ObjectiveSpec::new(ObjectiveKind::ResourceEfficiency).with_resource_weight("energy", 0.25);
        assert_eq!(spec.resource_weight("energy"), 0.25);
        assert_eq!(spec.resource_weight("storage"), 1.0);
    }

    #[test]
    fn monotonicity() {
        assert!(ObjectiveKind::WeightedReward.is_monotone());
        assert!(ObjectiveKind::CoverageFraction.is_monotone());
        assert!(!ObjectiveKind::ResourceEfficiency.is_monotone());
    }
}
