use bumba::routing::{
    ComplexityAnalyzer, Department, DepartmentSelector, KeywordComplexityAnalyzer,
    StrategySelector, TaskRequest,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

fn request(command: &str, args: &[String], previous: usize) -> TaskRequest {
    let history = vec!["done"; previous];
    TaskRequest::new(command, args.to_vec(), json!({ "previousTasks": history }))
}

proptest! {
    #[test]
    fn prop_score_stays_in_unit_interval(
        command in ".{0,40}",
        args in proptest::collection::vec(".{0,24}", 0..60),
        previous in 0..200usize,
    ) {
        let score = KeywordComplexityAnalyzer::default().score(&request(&command, &args, previous));
        prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }

    #[test]
    fn prop_classification_is_deterministic(
        command in "[a-z ]{0,30}",
        args in proptest::collection::vec("[a-z-]{0,16}", 0..8),
    ) {
        let analyzer = KeywordComplexityAnalyzer::default();
        let selector = DepartmentSelector::default();
        let req = request(&command, &args, 0);

        prop_assert_eq!(analyzer.score(&req), analyzer.score(&req));
        prop_assert_eq!(selector.select(&req), selector.select(&req));
    }

    #[test]
    fn prop_unknown_words_engage_every_department(text in "[qjxz ]{0,30}") {
        let selected = DepartmentSelector::default().select_text(&text);
        prop_assert_eq!(selected, Department::all());
    }

    #[test]
    fn prop_routing_tier_never_drops_as_complexity_rises(
        departments in proptest::sample::subsequence(Department::ALL.to_vec(), 0..=3),
        mut scores in proptest::collection::vec(0.0f32..=1.0, 2..10),
    ) {
        let departments: BTreeSet<Department> = departments.into_iter().collect();
        let strategy = StrategySelector::default();
        scores.sort_by(|a, b| a.total_cmp(b));

        let tiers: Vec<_> = scores
            .iter()
            .map(|score| strategy.decide(*score, &departments, false).kind())
            .collect();
        prop_assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]), "tiers {:?}", tiers);
    }
}

#[test]
fn test_fixed_ladder_is_monotonic() {
    let strategy = StrategySelector::default();
    let departments = BTreeSet::from([Department::Technical]);

    let tiers: Vec<_> = [0.1, 0.5, 0.7, 0.95]
        .iter()
        .map(|score| strategy.decide(*score, &departments, false).kind())
        .collect();

    assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_nonsense_text_selects_all_departments() {
    let selector = DepartmentSelector::default();
    let req = TaskRequest::new("xyzzy", vec!["plugh".to_string()], json!({}));
    assert_eq!(selector.select(&req), Department::all());
}
