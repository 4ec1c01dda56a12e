//! Selection rules. Every function here is a pure decision over the current
//! catalog state; applying the change is the caller's job.
//!
//! Only direct prerequisites are checked. An already selected package is
//! trusted to have had its own prerequisites satisfied when it was selected.

use crate::core::catalog::Catalog;
use crate::domain::model::{
    EntityKind, Package, SelectionAction, ValidationError, ValidationResult, ValidationWarning,
};

pub fn validate_package_action(
    catalog: &Catalog,
    package_id: &str,
    action: SelectionAction,
) -> ValidationResult {
    let Some(package) = catalog.package(package_id) else {
        return ValidationResult::not_found(EntityKind::Package, package_id);
    };

    match action {
        SelectionAction::Select => validate_package_select(catalog, package),
        SelectionAction::Deselect => validate_package_deselect(catalog, package),
    }
}

fn validate_package_select(catalog: &Catalog, package: &Package) -> ValidationResult {
    let errors = package
        .prerequisites
        .iter()
        .filter(|id| !catalog.is_selected(id))
        .map(|id| ValidationError::MissingPrerequisite {
            target: package.id.clone(),
            prerequisite: id.clone(),
        })
        .collect();

    let mut warnings = Vec::new();

    for rule in &catalog.rules().companions {
        if rule.category != package.category
            || rule.package == package.id
            || catalog.is_selected(&rule.package)
        {
            continue;
        }
        warnings.push(ValidationWarning::RecommendedCompanionMissing {
            target: package.id.clone(),
            companion: rule.package.clone(),
        });
    }

    let layer = package.layer();
    for other in catalog.packages() {
        if other.id != package.id && other.critical && !other.selected && other.layer() == layer {
            warnings.push(ValidationWarning::CriticalPathIncomplete {
                target: package.id.clone(),
                layer: layer.to_string(),
                package: other.id.clone(),
            });
        }
    }

    ValidationResult::new(errors, warnings)
}

fn validate_package_deselect(catalog: &Catalog, package: &Package) -> ValidationResult {
    let errors = catalog
        .packages()
        .iter()
        .filter(|other| {
            other.id != package.id
                && other.selected
                && other.prerequisites.iter().any(|p| p == &package.id)
        })
        .map(|dependent| ValidationError::HasDependents {
            target: package.id.clone(),
            dependent: dependent.id.clone(),
        })
        .collect();

    ValidationResult::new(errors, Vec::new())
}

/// Checks selecting `module_id` inside `package`.
///
/// Callers must not offer module toggles while `package` is wholly selected;
/// that state is not reported here.
pub fn validate_module_action(
    package: &Package,
    module_id: &str,
    catalog: &Catalog,
) -> ValidationResult {
    let Some(module) = package.module(module_id) else {
        return ValidationResult::not_found(EntityKind::Module, module_id);
    };

    let errors = module
        .prerequisites
        .iter()
        .filter(|id| !package.module(id).map(|m| m.selected).unwrap_or(false))
        .map(|id| ValidationError::MissingPrerequisite {
            target: module.id.clone(),
            prerequisite: id.clone(),
        })
        .collect();

    let warnings = package
        .prerequisites
        .iter()
        .filter(|id| !catalog.is_selected(id))
        .map(|id| ValidationWarning::PackagePrerequisiteUnmet {
            package: package.id.clone(),
            prerequisite: id.clone(),
        })
        .collect();

    ValidationResult::new(errors, warnings)
}

/// Checks deselecting `module_id`: blocked while a selected sibling depends on it.
pub fn validate_module_deselect(package: &Package, module_id: &str) -> ValidationResult {
    if package.module(module_id).is_none() {
        return ValidationResult::not_found(EntityKind::Module, module_id);
    }

    let errors = package
        .modules
        .iter()
        .filter(|m| m.selected && m.prerequisites.iter().any(|p| p == module_id))
        .map(|dependent| ValidationError::HasDependents {
            target: module_id.to_string(),
            dependent: dependent.id.clone(),
        })
        .collect();

    ValidationResult::new(errors, Vec::new())
}
