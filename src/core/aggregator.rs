use crate::core::catalog::Catalog;
use crate::domain::model::{ComplexityLevel, RiskLevel, Summary, Totals};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bounds (inclusive) on the number of distinct layers touched by a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityPolicy {
    pub simple_max: usize,
    pub moderate_max: usize,
    pub complex_max: usize,
}

impl Default for ComplexityPolicy {
    fn default() -> Self {
        Self {
            simple_max: 2,
            moderate_max: 3,
            complex_max: 4,
        }
    }
}

impl ComplexityPolicy {
    pub fn classify(&self, layer_count: usize) -> ComplexityLevel {
        if layer_count <= self.simple_max {
            ComplexityLevel::Simple
        } else if layer_count <= self.moderate_max {
            ComplexityLevel::Moderate
        } else if layer_count <= self.complex_max {
            ComplexityLevel::Complex
        } else {
            ComplexityLevel::VeryComplex
        }
    }
}

/// Exclusive upper bounds on effort in person-days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub low_below: f64,
    pub medium_below: f64,
    pub high_below: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            low_below: 500.0,
            medium_below: 1000.0,
            high_below: 2000.0,
        }
    }
}

impl RiskPolicy {
    pub fn classify(&self, effort_days: f64) -> RiskLevel {
        if effort_days < self.low_below {
            RiskLevel::Low
        } else if effort_days < self.medium_below {
            RiskLevel::Medium
        } else if effort_days < self.high_below {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Policies {
    #[serde(default)]
    pub complexity: ComplexityPolicy,
    #[serde(default)]
    pub risk: RiskPolicy,
}

pub fn compute_totals(catalog: &Catalog) -> Totals {
    let mut totals = Totals::default();

    for package in catalog.packages() {
        if package.selected {
            totals.effort_days += package.total_effort_days;
            totals.cost += package.price_amount;
            totals.package_count += 1;
            totals.module_count += package.modules.len();
            continue;
        }

        let selected = package.selected_module_count();
        if selected == 0 {
            continue;
        }

        totals.effort_days += package
            .modules
            .iter()
            .filter(|m| m.selected)
            .map(|m| m.effort_days)
            .sum::<f64>();
        // Module prices are not modelled; approximate by the selected share.
        totals.cost += package.price_amount * (selected as f64 / package.modules.len() as f64);
        totals.module_count += selected;
    }

    totals
}

/// Number of distinct layers among packages with a whole or partial selection.
pub fn selected_layer_count(catalog: &Catalog) -> usize {
    catalog
        .packages()
        .iter()
        .filter(|p| p.has_any_selection())
        .map(|p| p.layer())
        .collect::<HashSet<_>>()
        .len()
}

pub fn classify_complexity(catalog: &Catalog) -> ComplexityLevel {
    classify_complexity_with(catalog, &ComplexityPolicy::default())
}

pub fn classify_complexity_with(catalog: &Catalog, policy: &ComplexityPolicy) -> ComplexityLevel {
    policy.classify(selected_layer_count(catalog))
}

pub fn classify_risk(effort_days: f64) -> RiskLevel {
    RiskPolicy::default().classify(effort_days)
}

pub fn summarize(catalog: &Catalog, policies: &Policies) -> Summary {
    let totals = compute_totals(catalog);
    Summary {
        totals,
        complexity: classify_complexity_with(catalog, &policies.complexity),
        risk: policies.risk.classify(totals.effort_days),
    }
}
