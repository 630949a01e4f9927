use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{HookSettings, RoutingSettings, RoutingThresholds};
use crate::console::Logger;
use crate::hooks::{HookDispatcher, NamedHookResult};
use crate::routing::{
    ComplexityAnalyzer, Department, DepartmentSelector, KeywordComplexityAnalyzer,
    RoutingAnalysis, RoutingError, RoutingKind, RoutingResult, StrategySelector, TaskRequest,
};

/// Which hooks run at each stage of `route_and_execute`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookPlan {
    pub pre_execution: Vec<String>,
    pub coordinated: Vec<String>,
    pub post_execution: Vec<String>,
}

impl From<&HookSettings> for HookPlan {
    fn from(settings: &HookSettings) -> Self {
        Self {
            pre_execution: settings.pre_execution.clone(),
            coordinated: settings.coordinated.clone(),
            post_execution: settings.post_execution.clone(),
        }
    }
}

/// Classifies tasks and runs the hook plan for the chosen route.
pub struct IntelligentRouter {
    analyzer: Box<dyn ComplexityAnalyzer>,
    selector: DepartmentSelector,
    strategy: StrategySelector,
    dispatcher: Arc<HookDispatcher>,
    plan: HookPlan,
    logger: Arc<dyn Logger>,
}

impl IntelligentRouter {
    pub fn new(
        settings: &RoutingSettings,
        plan: HookPlan,
        dispatcher: Arc<HookDispatcher>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, RoutingError> {
        check_thresholds(&settings.thresholds)?;

        Ok(Self {
            analyzer: Box::new(KeywordComplexityAnalyzer::new(settings.weights.clone())),
            selector: DepartmentSelector::new(settings.departments.clone()),
            strategy: StrategySelector::new(settings),
            dispatcher,
            plan,
            logger,
        })
    }

    /// Replace the keyword scorer.
    pub fn with_analyzer(mut self, analyzer: Box<dyn ComplexityAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }

    pub fn plan(&self) -> &HookPlan {
        &self.plan
    }

    /// Classify a request without running any hooks.
    pub fn analyze(&self, request: &TaskRequest) -> RoutingAnalysis {
        let text = request.text();
        let complexity = self.analyzer.score(request);
        let departments = self.selector.select_text(&text);
        let executive_need = self.strategy.executive_need(&text, complexity);
        let decision = self
            .strategy
            .decide(complexity, &departments, executive_need);

        let reasoning = reasoning(
            complexity,
            &departments,
            executive_need,
            decision.kind(),
            self.strategy.thresholds(),
        );

        RoutingAnalysis {
            complexity,
            departments: departments.into_iter().collect(),
            executive_need,
            decision,
            reasoning,
        }
    }

    /// Route a task and run its hooks.
    ///
    /// Only a malformed request is an error; hook trouble is reported inside
    /// the result.
    pub async fn route_and_execute(
        &self,
        command: &str,
        args: &[String],
        context: Value,
    ) -> Result<RoutingResult, RoutingError> {
        if !(context.is_object() || context.is_null()) {
            return Err(RoutingError::InvalidArgument {
                field: "context".to_string(),
                reason: "expected an object".to_string(),
            });
        }
        let request = TaskRequest::new(command, args.to_vec(), context);
        Ok(self.route_request(&request).await)
    }

    /// Like `route_and_execute`, for `{"command", "args", "context"}` JSON.
    pub async fn route_json(&self, value: &Value) -> Result<RoutingResult, RoutingError> {
        let request = TaskRequest::from_json(value)?;
        Ok(self.route_request(&request).await)
    }

    pub async fn route_request(&self, request: &TaskRequest) -> RoutingResult {
        let analysis = self.analyze(request);
        let context = hook_context(request, &analysis);

        let mut results = Vec::new();
        for name in &self.plan.pre_execution {
            let result = self.dispatcher.execute(name, &context).await;
            results.push(NamedHookResult {
                hook: name.clone(),
                result,
            });
        }

        if analysis.kind() >= RoutingKind::MultiDomain {
            let coordinated = join_all(self.plan.coordinated.iter().map(|name| {
                let context = &context;
                async move {
                    NamedHookResult {
                        hook: name.clone(),
                        result: self.dispatcher.execute(name, context).await,
                    }
                }
            }))
            .await;
            results.extend(coordinated);
        }

        let mut blocked_by = first_denial(&results);
        let mut skipped = Vec::new();
        if blocked_by.is_none() {
            for name in &self.plan.post_execution {
                let result = self.dispatcher.execute(name, &context).await;
                results.push(NamedHookResult {
                    hook: name.clone(),
                    result,
                });
            }
            blocked_by = first_denial(&results);
        } else {
            skipped = self.plan.post_execution.clone();
        }

        let routing = RoutingResult {
            request_id: Uuid::new_v4().to_string(),
            routed_at: Utc::now(),
            kind: analysis.kind(),
            complexity: analysis.complexity,
            departments: analysis.decision.departments(),
            decision: analysis.decision,
            allowed: blocked_by.is_none(),
            blocked_by,
            skipped,
            dispatcher_results: results,
        };

        self.logger.info(
            &format!("Routed task as {}", routing.kind),
            &json!({
                "request_id": routing.request_id,
                "complexity": routing.complexity,
                "domains": routing.departments,
                "allowed": routing.allowed,
                "blocked_by": routing.blocked_by,
            }),
        );

        routing
    }
}

fn first_denial(results: &[NamedHookResult]) -> Option<String> {
    results
        .iter()
        .find(|named| !named.result.allow)
        .map(|named| named.hook.clone())
}

fn check_thresholds(thresholds: &RoutingThresholds) -> Result<(), RoutingError> {
    let ordered = [
        thresholds.simple,
        thresholds.moderate,
        thresholds.complex,
        thresholds.enterprise,
    ];
    if ordered.iter().any(|t| !(0.0..=1.0).contains(t)) {
        return Err(RoutingError::InvalidConfig(
            "thresholds must be within [0, 1]".to_string(),
        ));
    }
    if ordered.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(RoutingError::InvalidConfig(
            "thresholds must be non-decreasing".to_string(),
        ));
    }
    Ok(())
}

fn reasoning(
    complexity: f32,
    departments: &BTreeSet<Department>,
    executive_need: bool,
    kind: RoutingKind,
    thresholds: RoutingThresholds,
) -> String {
    let names: Vec<&str> = departments.iter().map(Department::as_str).collect();
    let why = match kind {
        RoutingKind::Executive if executive_need => "organization-wide signals".to_string(),
        RoutingKind::Executive => format!("complexity above {}", thresholds.enterprise),
        RoutingKind::MultiDomain => format!("complexity above {}", thresholds.complex),
        RoutingKind::DomainWithHelpers => format!("complexity above {}", thresholds.moderate),
        RoutingKind::SingleDomain => format!("complexity at most {}", thresholds.moderate),
    };
    format!(
        "complexity {:.2} across [{}]; {} route: {}",
        complexity,
        names.join(", "),
        kind,
        why
    )
}

/// The JSON object every hook receives.
///
/// `command` is the shell command the caller is about to run, taken from the
/// caller context; task prose goes in `task` and is never checked as a command.
fn hook_context(request: &TaskRequest, analysis: &RoutingAnalysis) -> Value {
    let session = request.context();
    let task = if request.args().is_empty() {
        request.command().to_string()
    } else {
        format!("{} {}", request.command(), request.args().join(" "))
    };
    let from_session = |field: &str, default: Value| {
        session
            .get(field)
            .filter(|value| !value.is_null())
            .cloned()
            .unwrap_or(default)
    };
    let shell_command = session
        .get("command")
        .and_then(Value::as_str)
        .unwrap_or_default();

    json!({
        "command": shell_command,
        "task": task,
        "args": request.args(),
        "text": request.text(),
        "content": from_session("content", json!(task)),
        "paths": from_session("paths", json!([])),
        "permissions": from_session("permissions", json!([])),
        "routing": analysis.kind(),
        "departments": analysis.departments,
        "complexity": analysis.complexity,
        "session": session,
    })
}
