#[cfg(test)]
mod pipeline_tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    use crate::config::{DispatcherSettings, HookSettings, RoutingSettings};
    use crate::console::NullLogger;
    use crate::hooks::builtin::{register_builtin_hooks, MemorySampler};
    use crate::hooks::{Hook, HookDispatcher, HookRegistry, HookResult};
    use crate::routing::{
        ComplexityAnalyzer, Department, HookPlan, IntelligentRouter, RoutingDecision,
        RoutingError, RoutingKind, TaskRequest,
    };

    /// Records every context it sees and answers with a fixed decision.
    struct CapturingHook {
        allow: bool,
        seen: Arc<Mutex<Vec<Value>>>,
    }

    #[async_trait]
    impl Hook for CapturingHook {
        async fn execute(&self, context: &Value) -> Result<HookResult> {
            self.seen.lock().unwrap().push(context.clone());
            Ok(if self.allow {
                HookResult::allow()
            } else {
                HookResult::deny("blocked by test")
            })
        }

        fn description(&self) -> &'static str {
            "Captures contexts"
        }
    }

    struct FailingHook;

    #[async_trait]
    impl Hook for FailingHook {
        async fn execute(&self, _context: &Value) -> Result<HookResult> {
            anyhow::bail!("check crashed")
        }

        fn description(&self) -> &'static str {
            "Always errors"
        }
    }

    struct QuietSampler;

    impl MemorySampler for QuietSampler {
        fn resident_mb(&self) -> Option<f64> {
            Some(64.0)
        }
    }

    struct FixedScore(f32);

    impl ComplexityAnalyzer for FixedScore {
        fn score(&self, _request: &TaskRequest) -> f32 {
            self.0
        }
    }

    fn plan() -> HookPlan {
        HookPlan {
            pre_execution: vec!["pre".to_string()],
            coordinated: vec!["peer-a".to_string(), "peer-b".to_string()],
            post_execution: vec!["post".to_string()],
        }
    }

    fn capturing(allow: bool) -> (Arc<CapturingHook>, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hook = Arc::new(CapturingHook {
            allow,
            seen: seen.clone(),
        });
        (hook, seen)
    }

    fn router_with(registry: HookRegistry, plan: HookPlan) -> IntelligentRouter {
        let dispatcher = Arc::new(HookDispatcher::new(
            registry,
            &DispatcherSettings::default(),
            Arc::new(NullLogger),
        ));
        IntelligentRouter::new(
            &RoutingSettings::default(),
            plan,
            dispatcher,
            Arc::new(NullLogger),
        )
        .unwrap()
    }

    fn allow_all() -> HookRegistry {
        ["pre", "peer-a", "peer-b", "post"]
            .into_iter()
            .fold(HookRegistry::new(), |registry, name| {
                registry.with_hook(name, capturing(true).0)
            })
    }

    fn hook_names(result: &crate::routing::RoutingResult) -> Vec<&str> {
        result
            .dispatcher_results
            .iter()
            .map(|named| named.hook.as_str())
            .collect()
    }

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_enterprise_task_routes_executive_and_runs_coordinated_hooks() {
        let router = router_with(allow_all(), plan());

        let result = router
            .route_and_execute(
                "implement",
                &args(&["complete", "enterprise", "platform"]),
                json!({}),
            )
            .await
            .unwrap();

        assert_eq!(result.kind, RoutingKind::Executive);
        assert_eq!(result.complexity, 1.0);
        assert!(result.allowed);
        assert_eq!(hook_names(&result), vec!["pre", "peer-a", "peer-b", "post"]);
        assert!(matches!(
            result.decision,
            RoutingDecision::Executive { .. }
        ));
    }

    #[tokio::test]
    async fn test_simple_task_skips_coordinated_hooks() {
        let router = router_with(allow_all(), plan());

        let result = router
            .route_and_execute("fix", &args(&["typo"]), json!({}))
            .await
            .unwrap();

        assert_eq!(result.kind, RoutingKind::SingleDomain);
        assert_eq!(result.departments, vec![Department::Strategic]);
        assert_eq!(hook_names(&result), vec!["pre", "post"]);
    }

    #[tokio::test]
    async fn test_denial_skips_post_execution() {
        let (post, post_seen) = capturing(true);
        let registry = HookRegistry::new()
            .with_hook("pre", capturing(false).0)
            .with_hook("post", post);
        let router = router_with(registry, plan());

        let result = router
            .route_and_execute("fix", &args(&["typo"]), json!({}))
            .await
            .unwrap();

        assert!(!result.allowed);
        assert_eq!(result.blocked_by.as_deref(), Some("pre"));
        assert_eq!(result.skipped, vec!["post"]);
        assert!(post_seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_block_route() {
        let registry = allow_all().with_hook("pre", Arc::new(FailingHook));
        let router = router_with(registry, plan());

        let result = router
            .route_and_execute("fix", &args(&["typo"]), json!({}))
            .await
            .unwrap();

        assert!(result.allowed);
        let pre = &result.dispatcher_results[0];
        assert!(pre.result.allow);
        assert!(pre.result.failed);
        assert!(pre.result.warning.as_deref().unwrap().contains("check crashed"));
    }

    #[tokio::test]
    async fn test_unregistered_plan_entries_fail_open() {
        let router = router_with(HookRegistry::new(), plan());

        let result = router
            .route_and_execute("fix", &args(&["typo"]), json!({}))
            .await
            .unwrap();

        assert!(result.allowed);
        assert!(result
            .dispatcher_results
            .iter()
            .all(|named| named.result.allow && named.result.fallback));
    }

    #[tokio::test]
    async fn test_hook_context_shape() {
        let (pre, seen) = capturing(true);
        let registry = HookRegistry::new().with_hook("pre", pre);
        let router = router_with(registry, plan());

        router
            .route_and_execute(
                "Fix",
                &args(&["Typo"]),
                json!({"sessionId": "s-1", "paths": ["/tmp/a.txt"]}),
            )
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let context = &seen[0];
        assert_eq!(context["command"], json!(""));
        assert_eq!(context["task"], json!("Fix Typo"));
        assert_eq!(context["text"], json!("fix typo"));
        assert_eq!(context["content"], json!("Fix Typo"));
        assert_eq!(context["paths"], json!(["/tmp/a.txt"]));
        assert_eq!(context["permissions"], json!([]));
        assert_eq!(context["routing"], json!("single-domain"));
        assert_eq!(context["session"]["sessionId"], json!("s-1"));
    }

    #[tokio::test]
    async fn test_builtin_security_blocks_destructive_command() {
        let registry =
            register_builtin_hooks(&HookSettings::default(), None, Arc::new(QuietSampler)).unwrap();
        let router = router_with(registry, HookPlan::from(&HookSettings::default()));

        let result = router
            .route_and_execute(
                "clean",
                &args(&["build", "output"]),
                json!({"command": "rm -rf /"}),
            )
            .await
            .unwrap();

        assert!(!result.allowed);
        assert_eq!(result.blocked_by.as_deref(), Some("security"));
        assert_eq!(result.skipped, vec!["quality", "completion"]);
        let security = &result.dispatcher_results[0];
        assert_eq!(
            security.result.metadata["violations"][0]["kind"],
            json!("command_validation")
        );
    }

    #[tokio::test]
    async fn test_task_prose_is_not_checked_as_a_command() {
        let registry =
            register_builtin_hooks(&HookSettings::default(), None, Arc::new(QuietSampler)).unwrap();
        let router = router_with(registry, HookPlan::from(&HookSettings::default()));

        for (command, words) in [
            ("write", vec!["graceful", "shutdown", "handler"]),
            ("asphalt", vec!["pricing", "page"]),
            ("halt", vec!["the", "rollout", "email"]),
        ] {
            let result = router
                .route_and_execute(command, &args(&words), json!({}))
                .await
                .unwrap();
            assert!(result.allowed, "{} {:?} was denied", command, words);
            assert_eq!(result.blocked_by, None);
        }
    }

    #[tokio::test]
    async fn test_builtin_plan_allows_ordinary_task() {
        let registry =
            register_builtin_hooks(&HookSettings::default(), None, Arc::new(QuietSampler)).unwrap();
        let router = router_with(registry, HookPlan::from(&HookSettings::default()));

        let result = router
            .route_and_execute("fix", &args(&["typo"]), json!({}))
            .await
            .unwrap();

        assert!(result.allowed);
        assert_eq!(
            hook_names(&result),
            vec!["security", "resource", "quality", "completion"]
        );
    }

    #[tokio::test]
    async fn test_non_object_context_is_rejected() {
        let router = router_with(allow_all(), plan());

        let err = router
            .route_and_execute("fix", &[], json!(["not", "an", "object"]))
            .await
            .unwrap_err();

        assert!(matches!(err, RoutingError::InvalidArgument { ref field, .. } if field == "context"));
    }

    #[tokio::test]
    async fn test_route_json_rejects_nested_args() {
        let router = router_with(allow_all(), plan());

        let err = router
            .route_json(&json!({"command": "build", "args": ["ok", {"nested": true}]}))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RoutingError::InvalidArgument {
                field: "args[1]".to_string(),
                reason: "expected a string, got object".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_route_json_coerces_scalar_args() {
        let router = router_with(allow_all(), plan());

        let result = router
            .route_json(&json!({"command": "fix", "args": ["typo", 3, true]}))
            .await
            .unwrap();

        assert_eq!(result.kind, RoutingKind::SingleDomain);
    }

    #[test]
    fn test_analyze_experience_task() {
        let router = router_with(HookRegistry::new(), HookPlan::default());
        let request = TaskRequest::new("design", args(&["a responsive ui component"]), json!({}));

        let analysis = router.analyze(&request);

        assert_eq!(analysis.departments, vec![Department::Experience]);
        assert!(!analysis.executive_need);
        assert_eq!(
            analysis.decision,
            RoutingDecision::SingleDomain {
                department: Department::Experience
            }
        );
        assert!(analysis.reasoning.contains("single-domain"));
    }

    #[test]
    fn test_analyze_moderate_task_gets_helpers() {
        let router = router_with(HookRegistry::new(), HookPlan::default());
        let request = TaskRequest::new(
            "migrate",
            args(&["the backend database to the cloud"]),
            json!({}),
        );

        let analysis = router.analyze(&request);

        assert!(analysis.complexity > 0.6 && analysis.complexity <= 0.8);
        match analysis.decision {
            RoutingDecision::DomainWithHelpers {
                primary,
                helpers,
                supporting,
            } => {
                assert_eq!(primary, Department::Technical);
                assert!(helpers.contains(&"backend-engineering".to_string()));
                assert!(supporting.is_empty());
            }
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_custom_analyzer_drives_tier() {
        let router = router_with(HookRegistry::new(), HookPlan::default())
            .with_analyzer(Box::new(FixedScore(0.95)));
        let request = TaskRequest::new("fix", args(&["typo"]), json!({}));

        assert_eq!(router.analyze(&request).kind(), RoutingKind::Executive);
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let mut settings = RoutingSettings::default();
        settings.thresholds.moderate = 0.95;
        let dispatcher = Arc::new(HookDispatcher::new(
            HookRegistry::new(),
            &DispatcherSettings::default(),
            Arc::new(NullLogger),
        ));

        let err = IntelligentRouter::new(
            &settings,
            HookPlan::default(),
            dispatcher,
            Arc::new(NullLogger),
        )
        .err()
        .unwrap();

        assert!(matches!(err, RoutingError::InvalidConfig(_)));
    }
}
