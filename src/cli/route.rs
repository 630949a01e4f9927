use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::console::{Console, Logger};
use crate::hooks::builtin::{default_notifier, register_builtin_hooks, SysinfoSampler};
use crate::hooks::HookDispatcher;
use crate::routing::{HookPlan, IntelligentRouter, TaskRequest};

/// Router and dispatcher wired from configuration, shared by the subcommands.
pub struct App {
    pub router: IntelligentRouter,
    pub dispatcher: Arc<HookDispatcher>,
    pub console: Console,
}

impl App {
    pub fn from_config(config: &AppConfig, console: Console) -> Result<Self> {
        let logger: Arc<dyn Logger> = Arc::new(console.clone());
        let notifier = default_notifier(&config.hooks, console.clone());
        let registry =
            register_builtin_hooks(&config.hooks, Some(notifier), Arc::new(SysinfoSampler))
                .context("Failed to build built-in hooks")?;

        let dispatcher = Arc::new(HookDispatcher::new(
            registry,
            &config.dispatcher,
            logger.clone(),
        ));
        let router = IntelligentRouter::new(
            &config.routing,
            HookPlan::from(&config.hooks),
            dispatcher.clone(),
            logger,
        )?;

        Ok(Self {
            router,
            dispatcher,
            console,
        })
    }
}

fn parse_context(raw: Option<&str>) -> Result<Value> {
    match raw {
        None => Ok(json!({})),
        Some(raw) => serde_json::from_str(raw).context("--context must be valid JSON"),
    }
}

fn request_from(command: &str, args: &[String], context: Option<&str>) -> Result<TaskRequest> {
    let context = parse_context(context)?;
    let request = TaskRequest::from_json(&json!({
        "command": command,
        "args": args,
        "context": context,
    }))?;
    Ok(request)
}

pub async fn handle_route(
    app: &App,
    command: &str,
    args: &[String],
    context: Option<&str>,
) -> Result<()> {
    let request = request_from(command, args, context)?;
    let result = app.router.route_request(&request).await;

    if !result.allowed
        && let Some(hook) = &result.blocked_by
    {
        app.console.warning(&format!("Blocked by hook '{}'", hook));
    }
    app.console.plain(&serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub fn handle_analyze(
    app: &App,
    command: &str,
    args: &[String],
    context: Option<&str>,
) -> Result<()> {
    let request = request_from(command, args, context)?;
    let analysis = app.router.analyze(&request);

    app.console.verbose(&analysis.reasoning);
    app.console.plain(&serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

pub async fn handle_hook(app: &App, name: &str, context: Option<&str>) -> Result<()> {
    let context = parse_context(context)?;
    if !context.is_object() {
        anyhow::bail!("--context must be a JSON object");
    }
    if !app.dispatcher.is_registered(name).await {
        app.console.warning(&format!("Hook '{}' is not registered", name));
    }

    let result = app.dispatcher.execute(name, &context).await;
    app.console.plain(&serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn handle_hooks(app: &App) -> Result<()> {
    let hooks = app.dispatcher.describe().await;
    if hooks.is_empty() {
        app.console.info("No hooks registered");
        return Ok(());
    }

    app.console.plain("Registered hooks:");
    for (name, description) in hooks {
        app.console.hook_line(&name, description);
    }
    Ok(())
}
