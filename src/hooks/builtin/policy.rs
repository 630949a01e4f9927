use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::string_field;
use crate::hooks::{Hook, HookResult};

pub const MIN_ALIGNMENT: f64 = 0.7;
pub const MIN_SUSTAINABILITY: f64 = 0.6;

const BASE_ALIGNMENT: f64 = 0.8;
const BASE_SUSTAINABILITY: f64 = 0.7;

const HARMFUL: &[&str] = &[
    "malware",
    "ransomware",
    "keylogger",
    "phishing",
    "credential stuffing",
    "ddos",
    "botnet",
    "spyware",
];
const ALIGNED: &[&str] = &["accessibility", "privacy", "consent", "secure", "inclusive", "user"];
const MISALIGNED: &[&str] = &["dark pattern", "bypass", "scrape", "track users", "exploit"];
const SUSTAINABLE: &[&str] = &["maintainable", "documented", "test", "reusable", "modular"];
const UNSUSTAINABLE: &[&str] = &["quick hack", "hardcode", "workaround", "temporary", "copy-paste"];

/// Ethics gate. The only built-in hook that is expected to deny.
///
/// Reads `task` (the task text) and `content`; numeric `alignment_score` or
/// `sustainability_score` in the context replace the keyword heuristics.
#[derive(Debug, Clone, Default)]
pub struct PolicyHook;

impl PolicyHook {
    pub fn new() -> Self {
        Self
    }

    fn keyword_score(text: &str, base: f64, up: &[&str], down: &[&str], step_up: f64, step_down: f64) -> f64 {
        let ups = up.iter().filter(|w| text.contains(*w)).count() as f64;
        let downs = down.iter().filter(|w| text.contains(*w)).count() as f64;
        (base + ups * step_up - downs * step_down).clamp(0.0, 1.0)
    }

    pub fn alignment(text: &str) -> f64 {
        Self::keyword_score(text, BASE_ALIGNMENT, ALIGNED, MISALIGNED, 0.05, 0.2)
    }

    pub fn sustainability(text: &str) -> f64 {
        Self::keyword_score(text, BASE_SUSTAINABILITY, SUSTAINABLE, UNSUSTAINABLE, 0.05, 0.1)
    }

    pub fn harmful_terms(text: &str) -> Vec<&'static str> {
        HARMFUL.iter().copied().filter(|w| text.contains(w)).collect()
    }
}

#[async_trait]
impl Hook for PolicyHook {
    async fn execute(&self, context: &Value) -> Result<HookResult> {
        let text = format!(
            "{} {}",
            string_field(context, "task"),
            string_field(context, "content")
        )
        .to_lowercase();

        let alignment = context
            .get("alignment_score")
            .and_then(Value::as_f64)
            .unwrap_or_else(|| Self::alignment(&text));
        let sustainability = context
            .get("sustainability_score")
            .and_then(Value::as_f64)
            .unwrap_or_else(|| Self::sustainability(&text));
        let harmful = Self::harmful_terms(&text);

        let mut reasons = Vec::new();
        if alignment < MIN_ALIGNMENT {
            reasons.push(format!("alignment {:.2} below {}", alignment, MIN_ALIGNMENT));
        }
        if sustainability < MIN_SUSTAINABILITY {
            reasons.push(format!(
                "sustainability {:.2} below {}",
                sustainability, MIN_SUSTAINABILITY
            ));
        }
        if !harmful.is_empty() {
            reasons.push(format!("harmful intent: {}", harmful.join(", ")));
        }

        let result = if reasons.is_empty() {
            HookResult::allow().with_message("policy check passed")
        } else {
            HookResult::deny(reasons.join("; "))
        };

        Ok(result
            .with_metadata("alignment_score", json!(alignment))
            .with_metadata("sustainability_score", json!(sustainability))
            .with_metadata("harmful_terms", json!(harmful)))
    }

    fn description(&self) -> &'static str {
        "Checks alignment, sustainability and harmful intent"
    }
}
