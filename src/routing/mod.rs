pub mod complexity_analyzer;
pub mod department_selector;
pub mod errors;
pub mod router;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod tests;

pub use complexity_analyzer::{ComplexityAnalyzer, KeywordComplexityAnalyzer};
pub use department_selector::DepartmentSelector;
pub use errors::RoutingError;
pub use router::{HookPlan, IntelligentRouter};
pub use strategy::StrategySelector;
pub use types::{
    CoordinationMode, Department, RoutingAnalysis, RoutingDecision, RoutingKind, RoutingResult,
    TaskRequest,
};
