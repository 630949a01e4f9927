use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::Arc};

pub mod builtin;
pub mod cache;
pub mod dispatcher;
pub mod errors;
pub mod failure_tracker;

pub use cache::{CacheKey, ResultCache};
pub use dispatcher::{DispatcherStats, HookDispatcher};
pub use errors::HookError;
pub use failure_tracker::FailureTracker;

/// An advisory check or side effect run through the dispatcher.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Evaluate the hook against a JSON context object.
    async fn execute(&self, context: &Value) -> Result<HookResult>;

    /// Get a description of what this hook does
    fn description(&self) -> &'static str;

    /// Whether the dispatcher may replay this hook's allow results from cache.
    /// Hooks with side effects or time-varying readings return `false`.
    fn cacheable(&self) -> bool {
        true
    }
}

/// Decision returned by a hook, or synthesized by the dispatcher on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookResult {
    pub allow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
    /// Set on results the dispatcher made up instead of a hook producing them.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl HookResult {
    pub fn allow() -> Self {
        Self {
            allow: true,
            message: None,
            warning: None,
            failed: false,
            disabled: false,
            cached: false,
            fallback: false,
            metadata: Map::new(),
        }
    }

    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            allow: false,
            message: Some(message.into()),
            ..Self::allow()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn not_found(name: &str) -> Self {
        Self {
            fallback: true,
            message: Some(format!("handler not found: {}", name)),
            ..Self::allow()
        }
    }

    pub fn failed(warning: impl Into<String>) -> Self {
        Self {
            failed: true,
            fallback: true,
            warning: Some(warning.into()),
            ..Self::allow()
        }
    }

    pub fn disabled(name: &str) -> Self {
        Self {
            disabled: true,
            fallback: true,
            warning: Some(format!("{} disabled due to failures", name)),
            ..Self::allow()
        }
    }

    /// Only genuine allow decisions are worth replaying from cache.
    pub fn is_cacheable(&self) -> bool {
        self.allow && !self.fallback && !self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedHookResult {
    pub hook: String,
    #[serde(flatten)]
    pub result: HookResult,
}

/// Hook registry keyed by name. Registering an existing name replaces it.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Arc<dyn Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    pub fn with_hook(mut self, name: impl Into<String>, hook: Arc<dyn Hook>) -> Self {
        self.register(name, hook);
        self
    }

    /// Returns the hook previously registered under `name`, if any.
    pub fn register(&mut self, name: impl Into<String>, hook: Arc<dyn Hook>) -> Option<Arc<dyn Hook>> {
        self.hooks.insert(name.into(), hook)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Hook>> {
        self.hooks.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Hook>> {
        self.hooks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// (name, description) pairs sorted by name.
    pub fn list_hooks(&self) -> Vec<(String, &'static str)> {
        let mut hooks: Vec<_> = self
            .hooks
            .iter()
            .map(|(name, hook)| (name.clone(), hook.description()))
            .collect();
        hooks.sort();
        hooks
    }
}
