use std::collections::BTreeSet;

use crate::config::{RoutingSettings, RoutingThresholds, SpecialistRoster};
use crate::routing::{CoordinationMode, Department, RoutingDecision};

/// Chooses the routing shape from a complexity score and the detected departments.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    thresholds: RoutingThresholds,
    executive_keywords: Vec<String>,
    coordination_terms: Vec<String>,
    specialists: SpecialistRoster,
}

impl StrategySelector {
    pub fn new(settings: &RoutingSettings) -> Self {
        Self {
            thresholds: settings.thresholds,
            executive_keywords: settings.executive_keywords.clone(),
            coordination_terms: settings.coordination_terms.clone(),
            specialists: settings.specialists.clone(),
        }
    }

    pub fn thresholds(&self) -> RoutingThresholds {
        self.thresholds
    }

    /// True when the text names an org-wide concern, uses coordination
    /// language, or the score is already past the complex threshold.
    pub fn executive_need(&self, text: &str, complexity: f32) -> bool {
        let explicit = self
            .executive_keywords
            .iter()
            .any(|keyword| text.contains(keyword.as_str()));
        let coordination = self
            .coordination_terms
            .iter()
            .any(|term| text.contains(term.as_str()));

        explicit || complexity > self.thresholds.complex || coordination
    }

    /// First match wins: executive, multi-domain, domain-with-helpers, single-domain.
    pub fn decide(
        &self,
        complexity: f32,
        departments: &BTreeSet<Department>,
        executive_need: bool,
    ) -> RoutingDecision {
        if executive_need || complexity > self.thresholds.enterprise {
            let departments = if departments.is_empty() {
                Department::ALL.to_vec()
            } else {
                departments.iter().copied().collect()
            };
            return RoutingDecision::Executive {
                departments,
                coordination: CoordinationMode::Hierarchical,
            };
        }

        if complexity > self.thresholds.complex {
            let padded = padding_for(departments);
            let mut engaged: Vec<Department> = departments.iter().copied().collect();
            engaged.extend(padded.iter().copied());
            engaged.sort();
            return RoutingDecision::MultiDomain {
                departments: engaged,
                coordination: CoordinationMode::PeerToPeer,
                padded,
            };
        }

        let primary = departments
            .iter()
            .next()
            .copied()
            .unwrap_or(Department::Strategic);

        if complexity > self.thresholds.moderate {
            return RoutingDecision::DomainWithHelpers {
                primary,
                helpers: self.specialists.for_department(primary).to_vec(),
                supporting: departments
                    .iter()
                    .copied()
                    .filter(|dept| *dept != primary)
                    .collect(),
            };
        }

        RoutingDecision::SingleDomain {
            department: primary,
        }
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(&RoutingSettings::default())
    }
}

/// Peer coordination needs two parties: the undetected departments, in
/// priority order, needed to bring `departments` up to two.
fn padding_for(departments: &BTreeSet<Department>) -> Vec<Department> {
    let missing = 2usize.saturating_sub(departments.len());
    Department::ALL
        .into_iter()
        .filter(|dept| !departments.contains(dept))
        .take(missing)
        .collect()
}
