use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::config::DispatcherSettings;
use crate::console::Logger;
use crate::hooks::{
    CacheKey, FailureTracker, Hook, HookError, HookRegistry, HookResult, ResultCache,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub executions: u64,
    pub cache_hits: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub short_circuits: u64,
    pub not_found: u64,
    pub cache_size: usize,
}

#[derive(Debug, Default)]
struct Counters {
    executions: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
    short_circuits: AtomicU64,
    not_found: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Runs registered hooks with caching, a hard timeout and failure tracking.
///
/// `execute` never fails: unknown hooks, errors, panics and timeouts all come
/// back as `allow = true` results carrying a warning. A hook with too many
/// recent failures is short-circuited (not invoked) until its failures age
/// out of the window.
pub struct HookDispatcher {
    registry: RwLock<HookRegistry>,
    cache: Mutex<ResultCache>,
    failures: Mutex<FailureTracker>,
    timeout: Duration,
    logger: Arc<dyn Logger>,
    counters: Counters,
}

impl HookDispatcher {
    pub fn new(
        registry: HookRegistry,
        settings: &DispatcherSettings,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            registry: RwLock::new(registry),
            cache: Mutex::new(ResultCache::new(
                settings.cache_ttl(),
                settings.cache_capacity,
            )),
            failures: Mutex::new(FailureTracker::new(
                settings.failure_window(),
                settings.failure_threshold,
            )),
            timeout: settings.timeout(),
            logger,
            counters: Counters::default(),
        }
    }

    /// Results cached for a previous registration under `name` are discarded.
    pub async fn register(&self, name: impl Into<String>, hook: Arc<dyn Hook>) {
        let name = name.into();
        let replaced = self.registry.write().await.register(name.clone(), hook);
        if replaced.is_some() {
            self.forget(&name).await;
        }
    }

    pub async fn unregister(&self, name: &str) -> bool {
        let removed = self.registry.write().await.unregister(name).is_some();
        self.forget(name).await;
        removed
    }

    async fn forget(&self, name: &str) {
        self.failures.lock().await.reset(name);
        self.cache.lock().await.forget_hook(name);
    }

    pub async fn hook_names(&self) -> Vec<String> {
        self.describe()
            .await
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub async fn describe(&self) -> Vec<(String, &'static str)> {
        self.registry.read().await.list_hooks()
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.registry.read().await.contains(name)
    }

    pub async fn execute(&self, name: &str, context: &Value) -> HookResult {
        Counters::bump(&self.counters.executions);

        let hook = match self.registry.read().await.get(name) {
            Some(hook) => hook,
            None => {
                Counters::bump(&self.counters.not_found);
                let err = HookError::NotFound(name.to_string());
                self.logger.info(&err.to_string(), &json!({ "hook": name }));
                return HookResult::not_found(name);
            }
        };

        let now = Instant::now();
        {
            let mut failures = self.failures.lock().await;
            if failures.is_disabled(name, now) {
                let count = failures.failure_count(name, now);
                drop(failures);
                Counters::bump(&self.counters.short_circuits);
                self.logger.warn(
                    &format!("Hook {} is disabled, skipping", name),
                    &json!({ "hook": name, "failures": count }),
                );
                return HookResult::disabled(name).with_metadata("failure_count", json!(count));
            }
        }

        let key = match CacheKey::new(name, context) {
            Ok(key) if hook.cacheable() => Some(key),
            Ok(_) => None,
            Err(err) => {
                self.logger.warn(
                    "Hook context not cacheable, executing without cache",
                    &json!({ "hook": name, "error": err.to_string() }),
                );
                None
            }
        };

        if let Some(key) = &key {
            if let Some(hit) = self.cache.lock().await.get(key, now) {
                Counters::bump(&self.counters.cache_hits);
                return hit;
            }
        }

        match self.run_guarded(name, hook, context).await {
            Ok(result) => {
                if let Some(key) = key.filter(|_| result.is_cacheable()) {
                    self.cache
                        .lock()
                        .await
                        .insert(key, result.clone(), Instant::now());
                }
                self.failures.lock().await.reset(name);
                result
            }
            Err(err) => self.record_failure(name, err).await,
        }
    }

    async fn run_guarded(
        &self,
        name: &str,
        hook: Arc<dyn Hook>,
        context: &Value,
    ) -> Result<HookResult, HookError> {
        let context = context.clone();
        let mut task = tokio::spawn(async move { hook.execute(&context).await });

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(e))) => Err(HookError::Execution {
                name: name.to_string(),
                message: format!("{:#}", e),
            }),
            Ok(Err(join_err)) => Err(HookError::Execution {
                name: name.to_string(),
                message: if join_err.is_panic() {
                    "hook panicked".to_string()
                } else {
                    "hook task was cancelled".to_string()
                },
            }),
            Err(_) => {
                task.abort();
                Err(HookError::Timeout {
                    name: name.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn record_failure(&self, name: &str, err: HookError) -> HookResult {
        Counters::bump(&self.counters.failures);
        if err.is_timeout() {
            Counters::bump(&self.counters.timeouts);
        }

        let (count, threshold) = {
            let mut failures = self.failures.lock().await;
            (
                failures.record_failure(name, Instant::now()),
                failures.threshold(),
            )
        };

        self.logger.warn(
            &err.to_string(),
            &json!({ "hook": name, "failures": count, "threshold": threshold }),
        );
        if count >= threshold {
            self.logger.warn(
                &format!("Hook {} disabled after {} failures", name, count),
                &json!({ "hook": name }),
            );
        }

        HookResult::failed(err.to_string()).with_metadata("failure_count", json!(count))
    }

    pub async fn is_disabled(&self, name: &str) -> bool {
        self.failures.lock().await.is_disabled(name, Instant::now())
    }

    pub async fn failure_count(&self, name: &str) -> usize {
        self.failures.lock().await.failure_count(name, Instant::now())
    }

    pub async fn reset_failures(&self, name: &str) {
        self.failures.lock().await.reset(name);
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn stats(&self) -> DispatcherStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        DispatcherStats {
            executions: load(&self.counters.executions),
            cache_hits: load(&self.counters.cache_hits),
            failures: load(&self.counters.failures),
            timeouts: load(&self.counters.timeouts),
            short_circuits: load(&self.counters.short_circuits),
            not_found: load(&self.counters.not_found),
            cache_size: self.cache.lock().await.len(),
        }
    }
}
