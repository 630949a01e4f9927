use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::string_field;
use crate::hooks::{Hook, HookResult};

const MAX_LINE_LENGTH: usize = 120;
const PENALTY_PER_ISSUE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    EmptyContent,
    DebugStatement,
    TodoMarker,
    LongLine,
    UncheckedUnwrap,
}

impl IssueKind {
    fn recommendation(&self) -> &'static str {
        match self {
            IssueKind::EmptyContent => "Provide the content to review",
            IssueKind::DebugStatement => "Remove leftover debug output before committing",
            IssueKind::TodoMarker => "Resolve or track TODO/FIXME markers in an issue",
            IssueKind::LongLine => "Wrap lines longer than 120 characters",
            IssueKind::UncheckedUnwrap => "Propagate errors instead of calling unwrap()",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityIssue {
    pub kind: IssueKind,
    pub line: Option<usize>,
}

/// Advisory review of `content`. Always allows; reports a score and recommendations.
#[derive(Debug, Clone, Default)]
pub struct QualityHook;

impl QualityHook {
    pub fn new() -> Self {
        Self
    }

    pub fn find_issues(content: &str) -> Vec<QualityIssue> {
        if content.trim().is_empty() {
            return vec![QualityIssue {
                kind: IssueKind::EmptyContent,
                line: None,
            }];
        }

        let mut issues = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line_no = Some(index + 1);
            let trimmed = line.trim_start();

            if ["console.log(", "dbg!(", "println!(\"debug", "print(\"debug"]
                .iter()
                .any(|marker| trimmed.contains(marker))
            {
                issues.push(QualityIssue {
                    kind: IssueKind::DebugStatement,
                    line: line_no,
                });
            }
            if line.contains("TODO") || line.contains("FIXME") {
                issues.push(QualityIssue {
                    kind: IssueKind::TodoMarker,
                    line: line_no,
                });
            }
            if line.chars().count() > MAX_LINE_LENGTH {
                issues.push(QualityIssue {
                    kind: IssueKind::LongLine,
                    line: line_no,
                });
            }
            if line.contains(".unwrap()") {
                issues.push(QualityIssue {
                    kind: IssueKind::UncheckedUnwrap,
                    line: line_no,
                });
            }
        }
        issues
    }

    pub fn score(issue_count: usize) -> u32 {
        100u32.saturating_sub(PENALTY_PER_ISSUE.saturating_mul(issue_count as u32))
    }

    fn recommendations(issues: &[QualityIssue]) -> Vec<&'static str> {
        let mut recommendations: Vec<&'static str> = Vec::new();
        for issue in issues {
            let text = issue.kind.recommendation();
            if !recommendations.contains(&text) {
                recommendations.push(text);
            }
        }
        recommendations
    }
}

#[async_trait]
impl Hook for QualityHook {
    async fn execute(&self, context: &Value) -> Result<HookResult> {
        let issues = Self::find_issues(string_field(context, "content"));
        let score = Self::score(issues.len());

        Ok(HookResult::allow()
            .with_message(format!("quality score {}", score))
            .with_metadata("quality_score", json!(score))
            .with_metadata("issues", serde_json::to_value(&issues)?)
            .with_metadata("recommendations", json!(Self::recommendations(&issues))))
    }

    fn description(&self) -> &'static str {
        "Scores content quality and suggests improvements (advisory)"
    }
}
