//! Cache generation naming.
//!
//! A generation is a named, versioned cache partition. Three generations are
//! current for a build; any other name found in storage is stale and is purged
//! when the build activates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a generation within a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// Pre-seeded at install, immutable afterwards.
    Static,
    /// Populated at runtime by the strategies.
    Dynamic,
    /// Marker name kept so caches written under it by this build survive activation.
    Legacy,
}

/// One logical cache partition: name prefix, role and version tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeneration {
    pub prefix: String,
    pub kind: GenerationKind,
    pub version: String,
}

impl CacheGeneration {
    pub fn new(prefix: &str, kind: GenerationKind, version: &str) -> Self {
        Self { prefix: prefix.to_string(), kind, version: version.to_string() }
    }

    /// Storage name, e.g. `smarttask-static-v1.0.0`.
    pub fn name(&self) -> String {
        match self.kind {
            GenerationKind::Static => format!("{}-static-v{}", self.prefix, self.version),
            GenerationKind::Dynamic => format!("{}-dynamic-v{}", self.prefix, self.version),
            GenerationKind::Legacy => format!("{}-v{}", self.prefix, self.version),
        }
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The generations that are current for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSet {
    pub static_gen: CacheGeneration,
    pub dynamic_gen: CacheGeneration,
    pub legacy_gen: CacheGeneration,
}

impl GenerationSet {
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            static_gen: CacheGeneration::new(prefix, GenerationKind::Static, version),
            dynamic_gen: CacheGeneration::new(prefix, GenerationKind::Dynamic, version),
            legacy_gen: CacheGeneration::new(prefix, GenerationKind::Legacy, version),
        }
    }

    pub fn names(&self) -> [String; 3] {
        [self.static_gen.name(), self.dynamic_gen.name(), self.legacy_gen.name()]
    }

    /// Whether `name` belongs to this build.
    pub fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|n| n == name)
    }

    /// Names from `existing` that are not current and must be deleted.
    pub fn stale<'a>(&self, existing: &'a [String]) -> Vec<&'a str> {
        existing
            .iter()
            .map(String::as_str)
            .filter(|name| !self.contains(name))
            .collect()
    }
}
