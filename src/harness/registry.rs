//! Explicit benchmark registration and selection.

use std::fmt;
use std::hint::black_box;
use std::sync::Arc;

use crate::error::{BenchError, Result};
use crate::harness::options::{Mode, Scope, TimeUnit};

type Routine = Arc<dyn Fn() + Send + Sync>;

/// A registered benchmark: its name, measurement defaults and routine.
#[derive(Clone)]
pub struct BenchmarkDef {
    name: String,
    mode: Mode,
    time_unit: TimeUnit,
    scope: Scope,
    routine: Routine,
}

impl BenchmarkDef {
    /// Wraps `routine`; its return value is fed to [`black_box`] on every call.
    pub fn new<F, T>(name: impl Into<String>, routine: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            mode: Mode::AverageTime,
            time_unit: TimeUnit::Microseconds,
            scope: Scope::Thread,
            routine: Arc::new(move || {
                black_box(routine());
            }),
        }
    }

    /// Sets the default measurement mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the default output unit.
    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = unit;
        self
    }

    /// Sets the state scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Fully qualified benchmark name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default measurement mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Default output unit.
    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// State scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Invokes the routine once.
    pub fn invoke(&self) {
        (self.routine)();
    }
}

impl fmt::Debug for BenchmarkDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkDef")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("time_unit", &self.time_unit)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Explicitly registered benchmarks, kept in registration order.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    defs: Vec<BenchmarkDef>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `routine` under `name` with default settings.
    pub fn register<F, T>(&mut self, name: impl Into<String>, routine: F) -> Result<&mut Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_def(BenchmarkDef::new(name, routine))
    }

    /// Registers a fully described benchmark.
    pub fn register_def(&mut self, def: BenchmarkDef) -> Result<&mut Self> {
        if self.get(def.name()).is_some() {
            return Err(BenchError::DuplicateBenchmark(def.name().to_string()));
        }
        self.defs.push(def);
        Ok(self)
    }

    /// Looks up a benchmark by exact name.
    pub fn get(&self, name: &str) -> Option<&BenchmarkDef> {
        self.defs.iter().find(|def| def.name() == name)
    }

    /// All registered benchmarks.
    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkDef> {
        self.defs.iter()
    }

    /// Number of registered benchmarks.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Selects every benchmark whose name contains one of `includes`.
    ///
    /// An empty selector list selects everything. Selecting nothing is an
    /// error.
    pub fn resolve(&self, includes: &[String]) -> Result<Vec<&BenchmarkDef>> {
        let selected: Vec<&BenchmarkDef> = self
            .defs
            .iter()
            .filter(|def| {
                includes.is_empty() || includes.iter().any(|inc| def.name().contains(inc.as_str()))
            })
            .collect();
        if selected.is_empty() {
            return Err(BenchError::TargetNotFound {
                includes: includes.to_vec(),
            });
        }
        Ok(selected)
    }
}
