use crate::core::aggregator::{self, Policies};
use crate::core::catalog::Catalog;
use crate::core::validator;
use crate::domain::model::{
    ClientProfile, EntityKind, EstimateItem, EstimateRequest, SelectionAction, SelectionSnapshot, Summary,
    Totals, ValidationResult,
};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// The change passed validation and was applied.
    Applied(ValidationResult),
    /// Validation failed; the catalog is unchanged.
    Rejected(ValidationResult),
    /// Module toggles are disabled while the parent package is wholly selected.
    Ignored,
}

impl ToggleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ToggleOutcome::Applied(_))
    }

    pub fn result(&self) -> Option<&ValidationResult> {
        match self {
            ToggleOutcome::Applied(r) | ToggleOutcome::Rejected(r) => Some(r),
            ToggleOutcome::Ignored => None,
        }
    }
}

/// One configuration session: owns the catalog and runs validate, apply, recompute.
pub struct Configurator {
    catalog: Catalog,
    policies: Policies,
}

impl Configurator {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_policies(catalog, Policies::default())
    }

    pub fn with_policies(catalog: Catalog, policies: Policies) -> Self {
        Self { catalog, policies }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    pub fn select_package(&mut self, package_id: &str) -> Result<ToggleOutcome> {
        self.apply_package_action(package_id, SelectionAction::Select)
    }

    pub fn deselect_package(&mut self, package_id: &str) -> Result<ToggleOutcome> {
        self.apply_package_action(package_id, SelectionAction::Deselect)
    }

    pub fn toggle_package(&mut self, package_id: &str) -> Result<ToggleOutcome> {
        let action = if self.catalog.is_selected(package_id) {
            SelectionAction::Deselect
        } else {
            SelectionAction::Select
        };
        self.apply_package_action(package_id, action)
    }

    fn apply_package_action(
        &mut self,
        package_id: &str,
        action: SelectionAction,
    ) -> Result<ToggleOutcome> {
        let result = validator::validate_package_action(&self.catalog, package_id, action);
        for warning in &result.warnings {
            tracing::warn!("⚠️  {}", warning);
        }

        if !result.valid {
            for error in &result.errors {
                tracing::info!("⛔ {:?} '{}' rejected: {}", action, package_id, error);
            }
            return Ok(ToggleOutcome::Rejected(result));
        }

        self.catalog
            .set_package_selected(package_id, action == SelectionAction::Select)?;
        tracing::debug!("{:?} package '{}'", action, package_id);
        Ok(ToggleOutcome::Applied(result))
    }

    pub fn toggle_module(&mut self, package_id: &str, module_id: &str) -> Result<ToggleOutcome> {
        let result = {
            let Some(package) = self.catalog.package(package_id) else {
                return Ok(ToggleOutcome::Rejected(ValidationResult::not_found(
                    EntityKind::Package,
                    package_id,
                )));
            };

            if package.selected {
                tracing::debug!(
                    "Ignoring module toggle '{}/{}': package is wholly selected",
                    package_id,
                    module_id
                );
                return Ok(ToggleOutcome::Ignored);
            }

            match package.module(module_id) {
                Some(module) if module.selected => {
                    validator::validate_module_deselect(package, module_id)
                }
                _ => validator::validate_module_action(package, module_id, &self.catalog),
            }
        };

        for warning in &result.warnings {
            tracing::warn!("⚠️  {}", warning);
        }
        if !result.valid {
            for error in &result.errors {
                tracing::info!("⛔ module '{}/{}' rejected: {}", package_id, module_id, error);
            }
            return Ok(ToggleOutcome::Rejected(result));
        }

        let currently = self
            .catalog
            .package(package_id)
            .and_then(|p| p.module(module_id))
            .map(|m| m.selected)
            .unwrap_or(false);
        self.catalog
            .set_module_selected(package_id, module_id, !currently)?;
        tracing::debug!(
            "Module '{}/{}' is now {}",
            package_id,
            module_id,
            if currently { "deselected" } else { "selected" }
        );
        Ok(ToggleOutcome::Applied(result))
    }

    pub fn totals(&self) -> Totals {
        aggregator::compute_totals(&self.catalog)
    }

    pub fn summary(&self) -> Summary {
        aggregator::summarize(&self.catalog, &self.policies)
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.catalog.snapshot()
    }

    pub fn import_snapshot(&mut self, snapshot: &SelectionSnapshot) -> Result<Summary> {
        self.catalog.apply_snapshot(snapshot)?;
        let summary = self.summary();
        tracing::info!(
            "📥 Imported selection: {} packages, {} modules, {:.1} days",
            summary.totals.package_count,
            summary.totals.module_count,
            summary.totals.effort_days
        );
        Ok(summary)
    }

    /// Whole packages only; partial module selections are not sent to estimators.
    pub fn estimate_request(&self, profile: ClientProfile) -> EstimateRequest {
        let items = self
            .catalog
            .packages()
            .iter()
            .filter(|p| p.selected)
            .map(|p| EstimateItem {
                package_id: p.id.clone(),
                effort_days: p.total_effort_days,
                price_amount: p.price_amount,
            })
            .collect();

        EstimateRequest { items, profile }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Module, Package, ValidationError};

    fn configurator() -> Configurator {
        let catalog = Catalog::new(vec![
            Package::new("A", "Alpha", "Core", 40.0, 4000.0),
            Package::new("B", "Beta", "Core", 60.0, 6000.0).with_prerequisites(["A"]),
            Package::new("C", "Gamma", "Analytics", 30.0, 3000.0).with_modules(vec![
                Module::new("m1", "One", 10.0),
                Module::new("m2", "Two", 15.0).with_prerequisites(["m1"]),
            ]),
        ])
        .unwrap();
        Configurator::new(catalog)
    }

    #[test]
    fn test_package_order_scenario() {
        let mut session = configurator();

        let outcome = session.select_package("B").unwrap();
        match outcome {
            ToggleOutcome::Rejected(result) => {
                assert_eq!(
                    result.errors,
                    vec![ValidationError::MissingPrerequisite {
                        target: "B".into(),
                        prerequisite: "A".into()
                    }]
                );
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(!session.catalog().is_selected("B"));

        assert!(session.select_package("A").unwrap().is_applied());
        assert!(session.select_package("B").unwrap().is_applied());
        assert_eq!(session.totals().effort_days, 100.0);
    }

    #[test]
    fn test_module_order_scenario() {
        let mut session = configurator();

        let outcome = session.toggle_module("C", "m2").unwrap();
        assert!(matches!(outcome, ToggleOutcome::Rejected(_)));

        assert!(session.toggle_module("C", "m1").unwrap().is_applied());
        assert!(session.toggle_module("C", "m2").unwrap().is_applied());

        let totals = session.totals();
        assert_eq!(totals.effort_days, 25.0);
        assert_eq!(totals.module_count, 2);
    }

    #[test]
    fn test_module_toggle_ignored_while_package_selected() {
        let mut session = configurator();
        session.select_package("C").unwrap();

        let outcome = session.toggle_module("C", "m1").unwrap();
        assert_eq!(outcome, ToggleOutcome::Ignored);
        assert!(outcome.result().is_none());

        let package = session.catalog().package("C").unwrap();
        assert!(!package.module("m1").unwrap().selected);
    }

    #[test]
    fn test_toggle_package_blocks_deselect_with_dependents() {
        let mut session = configurator();
        session.toggle_package("A").unwrap();
        session.toggle_package("B").unwrap();

        let outcome = session.toggle_package("A").unwrap();
        assert!(matches!(outcome, ToggleOutcome::Rejected(_)));
        assert!(session.catalog().is_selected("A"));

        assert!(session.toggle_package("B").unwrap().is_applied());
        assert!(session.toggle_package("A").unwrap().is_applied());
        assert_eq!(session.totals(), Totals::default());
    }

    #[test]
    fn test_module_deselect_blocked_by_dependent_sibling() {
        let mut session = configurator();
        session.toggle_module("C", "m1").unwrap();
        session.toggle_module("C", "m2").unwrap();

        assert!(matches!(
            session.toggle_module("C", "m1").unwrap(),
            ToggleOutcome::Rejected(_)
        ));
        assert!(session.toggle_module("C", "m2").unwrap().is_applied());
        assert!(session.toggle_module("C", "m1").unwrap().is_applied());
        assert_eq!(session.totals().module_count, 0);
    }

    #[test]
    fn test_unknown_ids_are_rejected_not_errors() {
        let mut session = configurator();
        assert!(matches!(
            session.select_package("Z").unwrap(),
            ToggleOutcome::Rejected(_)
        ));
        assert!(matches!(
            session.toggle_module("Z", "m1").unwrap(),
            ToggleOutcome::Rejected(_)
        ));
        assert!(matches!(
            session.toggle_module("C", "m9").unwrap(),
            ToggleOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_estimate_request_lists_whole_packages() {
        let mut session = configurator();
        session.select_package("A").unwrap();
        session.toggle_module("C", "m1").unwrap();

        let request = session.estimate_request(ClientProfile::default());
        assert_eq!(request.package_ids(), vec!["A"]);
        assert_eq!(request.items[0].effort_days, 40.0);
    }
}
