//! Name-keyed registry of scheduler constructors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::{ExactSolver, GreedyByReward, GreedyByWindowCount, LocalSearch, Scheduler};

/// Builds a fresh scheduler for one evaluation.
pub type SchedulerFactory = Arc<dyn Fn() -> Box<dyn Scheduler> + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown scheduler '{name}' (available: {})", .available.join(", "))]
    UnknownScheduler { name: String, available: Vec<String> },

    #[error("Scheduler '{0}' is already registered")]
    DuplicateScheduler(String),
}

/// Maps scheduler names to factories.
///
/// Populated once at startup, then shared read-only.
#[derive(Clone, Default)]
pub struct SchedulerRegistry {
    factories: BTreeMap<String, SchedulerFactory>,
}

impl SchedulerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in scheduler with default settings.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert_default::<GreedyByReward>(GreedyByReward::NAME);
        registry.insert_default::<GreedyByWindowCount>(GreedyByWindowCount::NAME);
        registry.insert_default::<LocalSearch>(LocalSearch::NAME);
        registry.insert_default::<ExactSolver>(ExactSolver::NAME);
        registry
    }

    fn insert_default<S>(&mut self, name: &str)
    where
        S: Scheduler + Default + 'static,
    {
        let factory: SchedulerFactory = Arc::new(|| Box::new(S::default()) as Box<dyn Scheduler>);
        self.factories.insert(name.to_string(), factory);
    }

    /// Registers `factory` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateScheduler`] if `name` is taken.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn Scheduler> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateScheduler(name));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn factory(&self, name: &str) -> Result<&SchedulerFactory, RegistryError> {
        self.factories.get(name).ok_or_else(|| RegistryError::UnknownScheduler {
            name: name.to_string(),
            available: self.names().map(str::to_string).collect(),
        })
    }

    /// Builds a new instance of the scheduler registered as `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Scheduler>, RegistryError> {
        self.factory(name).map(|factory| factory())
    }

    /// Looks up every name, failing on the first unknown one.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<(String, SchedulerFactory)>, RegistryError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.factory(name).map(|f| (name.to_string(), Arc::clone(f)))
            })
            .collect()
    }
}

impl fmt::Debug for SchedulerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
