use std::collections::BTreeSet;

use crate::config::DepartmentKeywords;
use crate::routing::{Department, TaskRequest};

/// Maps task text to the departments whose keywords it mentions.
#[derive(Debug, Clone, Default)]
pub struct DepartmentSelector {
    keywords: DepartmentKeywords,
}

impl DepartmentSelector {
    pub fn new(keywords: DepartmentKeywords) -> Self {
        Self { keywords }
    }

    /// Never empty: when nothing matches, every department is engaged.
    pub fn select(&self, request: &TaskRequest) -> BTreeSet<Department> {
        self.select_text(&request.text())
    }

    pub fn select_text(&self, text: &str) -> BTreeSet<Department> {
        let matched: BTreeSet<Department> = Department::ALL
            .into_iter()
            .filter(|dept| {
                self.keywords
                    .for_department(*dept)
                    .iter()
                    .any(|keyword| text.contains(keyword.as_str()))
            })
            .collect();

        if matched.is_empty() {
            Department::all()
        } else {
            matched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn select(command: &str, args: &[&str]) -> BTreeSet<Department> {
        let request = TaskRequest::new(
            command,
            args.iter().map(|a| a.to_string()).collect(),
            Value::Null,
        );
        DepartmentSelector::default().select(&request)
    }

    #[test]
    fn test_experience_only() {
        let selected = select("design", &["a responsive ui component"]);
        assert_eq!(selected, BTreeSet::from([Department::Experience]));
    }

    #[test]
    fn test_unknown_text_selects_everyone() {
        assert_eq!(select("xyzzy", &["plugh"]), Department::all());
        assert_eq!(select("", &[]), Department::all());
    }

    #[test]
    fn test_multiple_departments() {
        let selected = select("plan", &["pricing", "backend"]);
        assert_eq!(
            selected,
            BTreeSet::from([Department::Strategic, Department::Technical])
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let selected = select("Review", &["DATABASE"]);
        assert_eq!(selected, BTreeSet::from([Department::Technical]));
    }

    #[test]
    fn test_custom_keywords() {
        let selector = DepartmentSelector::new(DepartmentKeywords {
            strategic: vec!["okr".to_string()],
            experience: vec![],
            technical: vec![],
        });
        assert_eq!(
            selector.select_text("draft okr list"),
            BTreeSet::from([Department::Strategic])
        );
    }
}
