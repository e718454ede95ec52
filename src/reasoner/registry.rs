use super::{builtins, Reasoner};
use crate::error::RegistryError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

static GLOBAL: OnceLock<ReasonerRegistry> = OnceLock::new();

/// Maps reasoner ids to reasoners.
///
/// The process-wide instance is populated once and read-only afterwards, so lookups need no
/// synchronization.
///
/// ```
/// use seqprove::reasoner::{Hyp, ReasonerRegistry};
///
/// let mut registry = ReasonerRegistry::new();
/// registry.register(Box::new(Hyp)).unwrap();
/// assert!(registry.get("hyp").is_some());
/// assert!(registry.register(Box::new(Hyp)).is_err());
/// ```
#[derive(Default)]
pub struct ReasonerRegistry {
    reasoners: BTreeMap<&'static str, Box<dyn Reasoner>>,
}

impl ReasonerRegistry {
    pub fn new() -> Self {
        ReasonerRegistry {
            reasoners: BTreeMap::new(),
        }
    }

    /// A registry containing every reasoner of [`builtins`](super::builtins)
    pub fn with_builtins() -> Self {
        let mut registry = ReasonerRegistry::new();
        for reasoner in builtins() {
            let id = reasoner.id();
            registry.reasoners.insert(id, reasoner);
        }
        registry
    }

    /// Adds `reasoner`.
    ///
    /// # Errors
    /// Returns `DuplicateId` if a reasoner with the same id is already registered.
    pub fn register(&mut self, reasoner: Box<dyn Reasoner>) -> Result<(), RegistryError> {
        let id = reasoner.id();
        if self.reasoners.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_owned()));
        }
        self.reasoners.insert(id, reasoner);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Reasoner> {
        self.reasoners.get(id).map(|r| r.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.reasoners.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.reasoners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasoners.is_empty()
    }

    /// Returns the process-wide registry, installing the built-ins if nothing was installed yet
    pub fn global() -> &'static ReasonerRegistry {
        GLOBAL.get_or_init(|| {
            let registry = ReasonerRegistry::with_builtins();
            info!(reasoners = registry.len(), "installed default reasoner registry");
            registry
        })
    }

    /// Installs `registry` as the process-wide registry.
    ///
    /// # Errors
    /// Returns `AlreadyInstalled` if a registry was installed or [`global`](#method.global) was
    /// called before.
    pub fn install_global(registry: ReasonerRegistry) -> Result<(), RegistryError> {
        let reasoners = registry.len();
        GLOBAL
            .set(registry)
            .map_err(|_| RegistryError::AlreadyInstalled)?;
        info!(reasoners, "installed reasoner registry");
        Ok(())
    }
}

impl fmt::Debug for ReasonerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.reasoners.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = ReasonerRegistry::with_builtins();
        for id in [
            "hyp",
            "trueGoal",
            "falseHyp",
            "contradiction",
            "conjI",
            "conjE",
            "disjE",
            "impI",
            "impE",
            "mp",
            "allI",
            "allE",
            "exE",
            "cut",
            "review",
            "mngHyp",
            "mbGoal",
        ] {
            assert_eq!(registry.get(id).map(|r| r.id()), Some(id));
        }
        assert_eq!(registry.len(), 17);
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn global_is_installed_once() {
        assert!(ReasonerRegistry::global().get("hyp").is_some());
        assert_eq!(
            ReasonerRegistry::install_global(ReasonerRegistry::new()),
            Err(RegistryError::AlreadyInstalled)
        );
    }
}
