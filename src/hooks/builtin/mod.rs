use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

use crate::config::HookSettings;
use crate::console::Console;
use crate::hooks::HookRegistry;

pub mod completion;
pub mod policy;
pub mod quality;
pub mod resource;
pub mod security;

pub use completion::{
    CommandNotifier, CompletionHook, ConsoleNotifier, Notifier, NotifyOptions, NotifyOutcome,
};
pub use policy::PolicyHook;
pub use quality::{IssueKind, QualityHook, QualityIssue};
pub use resource::{MemorySampler, ResourceHook, SysinfoSampler};
pub use security::{matches_pattern, SecurityHook, Violation, ViolationKind};

pub const SECURITY: &str = "security";
pub const RESOURCE: &str = "resource";
pub const POLICY: &str = "policy";
pub const QUALITY: &str = "quality";
pub const COMPLETION: &str = "completion";

/// String field of a JSON object, or `""` when absent or not a string.
pub(crate) fn string_field<'a>(context: &'a Value, field: &str) -> &'a str {
    context.get(field).and_then(Value::as_str).unwrap_or("")
}

/// String elements of a JSON array field. Non-string elements are skipped.
pub(crate) fn string_list(context: &Value, field: &str) -> Vec<String> {
    context
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Sound files when a sounds directory is configured, console output otherwise.
pub fn default_notifier(settings: &HookSettings, console: Console) -> Arc<dyn Notifier> {
    match &settings.sounds_dir {
        Some(dir) => Arc::new(CommandNotifier::new(
            settings.notification_player.clone(),
            dir.clone(),
        )),
        None => Arc::new(ConsoleNotifier::new(console)),
    }
}

/// Registry holding the five built-in hooks under their standard names.
pub fn register_builtin_hooks(
    settings: &HookSettings,
    notifier: Option<Arc<dyn Notifier>>,
    sampler: Arc<dyn MemorySampler>,
) -> Result<HookRegistry> {
    let registry = HookRegistry::new()
        .with_hook(SECURITY, Arc::new(SecurityHook::new(settings)?))
        .with_hook(
            RESOURCE,
            Arc::new(ResourceHook::with_sampler(settings.memory_limit_mb, sampler)),
        )
        .with_hook(POLICY, Arc::new(PolicyHook::new()))
        .with_hook(QUALITY, Arc::new(QualityHook::new()))
        .with_hook(COMPLETION, Arc::new(CompletionHook::new(notifier)));
    Ok(registry)
}
