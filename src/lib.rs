pub mod cli;
pub mod config;
pub mod console;
pub mod hooks;
pub mod routing;

pub use config::{AppConfig, DispatcherSettings, HookSettings, RoutingSettings};
pub use console::{Console, Logger, NullLogger, VerbosityLevel};
pub use hooks::{Hook, HookDispatcher, HookRegistry, HookResult, NamedHookResult};
pub use routing::{
    Department, HookPlan, IntelligentRouter, RoutingAnalysis, RoutingDecision, RoutingError,
    RoutingKind, RoutingResult, TaskRequest,
};
