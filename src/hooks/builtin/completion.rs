use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

use super::string_field;
use crate::console::Console;
use crate::hooks::{Hook, HookResult};

const DEFAULT_EVENT: &str = "task-complete";
const FALLBACK_PLAYERS: &[&str] = &["afplay", "paplay", "aplay"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifyOptions {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifyOutcome {
    pub success: bool,
    pub method: String,
}

/// Plays an audible or visual signal for a named event.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn play(&self, event: &str, options: &NotifyOptions) -> Result<NotifyOutcome>;
}

/// Plays `<sounds_dir>/<event>.wav` through the first audio player found on PATH.
pub struct CommandNotifier {
    players: Vec<String>,
    sounds_dir: PathBuf,
}

impl CommandNotifier {
    pub fn new(preferred_player: Option<String>, sounds_dir: PathBuf) -> Self {
        let mut players: Vec<String> = preferred_player.into_iter().collect();
        players.extend(FALLBACK_PLAYERS.iter().map(|p| p.to_string()));
        Self {
            players,
            sounds_dir,
        }
    }

    fn locate_player(&self) -> Option<(String, PathBuf)> {
        self.players
            .iter()
            .find_map(|name| which::which(name).ok().map(|path| (name.clone(), path)))
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn play(&self, event: &str, _options: &NotifyOptions) -> Result<NotifyOutcome> {
        let sound = self.sounds_dir.join(format!("{event}.wav"));
        if !sound.is_file() {
            bail!("no sound file for event '{}' at {}", event, sound.display());
        }

        let Some((name, player)) = self.locate_player() else {
            bail!("no audio player found (tried {})", self.players.join(", "));
        };

        let status = Command::new(&player)
            .arg(&sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("failed to run {}", player.display()))?;

        Ok(NotifyOutcome {
            success: status.success(),
            method: name,
        })
    }
}

/// Prints the event as a success line.
pub struct ConsoleNotifier {
    console: Console,
}

impl ConsoleNotifier {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn play(&self, event: &str, options: &NotifyOptions) -> Result<NotifyOutcome> {
        let text = match &options.message {
            Some(message) => format!("{event}: {message}"),
            None => event.to_string(),
        };
        self.console.success(&text);
        Ok(NotifyOutcome {
            success: true,
            method: "console".to_string(),
        })
    }
}

/// Best-effort notification after a task passes its checks. Never blocks.
pub struct CompletionHook {
    notifier: Option<Arc<dyn Notifier>>,
}

impl CompletionHook {
    pub fn new(notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Hook for CompletionHook {
    async fn execute(&self, context: &Value) -> Result<HookResult> {
        let Some(notifier) = &self.notifier else {
            return Ok(HookResult::allow()
                .with_metadata("notified", json!(false))
                .with_metadata("method", Value::Null));
        };

        let event = match string_field(context, "event") {
            "" => DEFAULT_EVENT,
            event => event,
        };
        let message = match string_field(context, "message") {
            "" => None,
            message => Some(message.to_string()),
        };

        let outcome = notifier.play(event, &NotifyOptions { message }).await;
        let result = match outcome {
            Ok(outcome) => HookResult::allow()
                .with_metadata("notified", json!(outcome.success))
                .with_metadata("method", json!(outcome.method)),
            Err(e) => HookResult::allow()
                .with_warning(format!("notification failed: {e}"))
                .with_metadata("notified", json!(false))
                .with_metadata("method", Value::Null),
        };
        Ok(result)
    }

    fn description(&self) -> &'static str {
        "Signals task completion through the configured notifier"
    }

    fn cacheable(&self) -> bool {
        false
    }
}
