use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use sysinfo::System;

use crate::hooks::{Hook, HookResult};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of the current process's resident memory.
pub trait MemorySampler: Send + Sync {
    fn resident_mb(&self) -> Option<f64>;
}

/// Reads resident memory of this process through `sysinfo`.
#[derive(Debug, Default)]
pub struct SysinfoSampler;

impl MemorySampler for SysinfoSampler {
    fn resident_mb(&self) -> Option<f64> {
        let pid = sysinfo::get_current_pid().ok()?;
        let mut system = System::new();
        if !system.refresh_process(pid) {
            return None;
        }
        system
            .process(pid)
            .map(|process| process.memory() as f64 / BYTES_PER_MB)
    }
}

pub struct ResourceHook {
    limit_mb: u64,
    sampler: Arc<dyn MemorySampler>,
}

impl ResourceHook {
    pub fn new(limit_mb: u64) -> Self {
        Self::with_sampler(limit_mb, Arc::new(SysinfoSampler))
    }

    pub fn with_sampler(limit_mb: u64, sampler: Arc<dyn MemorySampler>) -> Self {
        Self { limit_mb, sampler }
    }
}

#[async_trait]
impl Hook for ResourceHook {
    async fn execute(&self, _context: &Value) -> Result<HookResult> {
        let sampler = self.sampler.clone();
        let sampled = tokio::task::spawn_blocking(move || sampler.resident_mb()).await?;

        let Some(memory_mb) = sampled else {
            return Ok(HookResult::allow()
                .with_warning("process memory unavailable")
                .with_metadata("limit_mb", json!(self.limit_mb)));
        };

        let result = if memory_mb < self.limit_mb as f64 {
            HookResult::allow()
        } else {
            HookResult::deny(format!(
                "memory {:.1}MB exceeds limit {}MB",
                memory_mb, self.limit_mb
            ))
        };

        Ok(result
            .with_metadata("memory_mb", json!((memory_mb * 10.0).round() / 10.0))
            .with_metadata("limit_mb", json!(self.limit_mb)))
    }

    fn description(&self) -> &'static str {
        "Checks process memory against the configured limit"
    }

    fn cacheable(&self) -> bool {
        false
    }
}
