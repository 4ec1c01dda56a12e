use crate::domain::model::{AdvisoryRules, Package, SelectionSnapshot};
use crate::utils::error::{Result, ScopeError};
use crate::utils::validation::{validate_non_empty_string, validate_non_negative};
use chrono::Utc;
use std::collections::{HashMap, HashSet};

/// The mutable store of packages for one configuration session.
///
/// Construction validates the whole definition: ids, numbers, prerequisite
/// references and prerequisite cycles. After that, selection flags are the only
/// thing that changes.
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    packages: Vec<Package>,
    index: HashMap<String, usize>,
    rules: AdvisoryRules,
}

impl Catalog {
    pub fn new(packages: Vec<Package>) -> Result<Self> {
        Self::with_rules("catalog", packages, AdvisoryRules::default())
    }

    pub fn with_rules(
        name: impl Into<String>,
        packages: Vec<Package>,
        rules: AdvisoryRules,
    ) -> Result<Self> {
        let index = Self::build_index(&packages)?;
        for package in &packages {
            Self::check_package(package, &index)?;
        }
        Self::check_package_cycles(&packages)?;
        for package in &packages {
            Self::check_module_cycles(package)?;
        }
        Self::check_rules(&rules, &index)?;

        let name = name.into();
        tracing::debug!(
            "Catalog '{}' loaded with {} packages and {} modules",
            name,
            packages.len(),
            packages.iter().map(|p| p.modules.len()).sum::<usize>()
        );

        Ok(Self {
            name,
            packages,
            index,
            rules,
        })
    }

    fn build_index(packages: &[Package]) -> Result<HashMap<String, usize>> {
        let mut index = HashMap::with_capacity(packages.len());
        for (position, package) in packages.iter().enumerate() {
            validate_non_empty_string("packages.id", &package.id)?;
            if index.insert(package.id.clone(), position).is_some() {
                return Err(ScopeError::catalog(format!(
                    "duplicate package id '{}'",
                    package.id
                )));
            }
        }
        Ok(index)
    }

    fn check_package(package: &Package, index: &HashMap<String, usize>) -> Result<()> {
        validate_non_negative(
            &format!("packages.{}.total_effort_days", package.id),
            package.total_effort_days,
        )?;
        validate_non_negative(
            &format!("packages.{}.price_amount", package.id),
            package.price_amount,
        )?;

        let mut seen = HashSet::new();
        for prerequisite in &package.prerequisites {
            if prerequisite == &package.id {
                return Err(ScopeError::catalog(format!(
                    "package '{}' lists itself as a prerequisite",
                    package.id
                )));
            }
            if !seen.insert(prerequisite.as_str()) {
                return Err(ScopeError::catalog(format!(
                    "package '{}' lists prerequisite '{}' more than once",
                    package.id, prerequisite
                )));
            }
            if !index.contains_key(prerequisite) {
                return Err(ScopeError::catalog(format!(
                    "package '{}' requires unknown package '{}'",
                    package.id, prerequisite
                )));
            }
        }

        let mut module_ids = HashSet::new();
        for module in &package.modules {
            validate_non_empty_string(&format!("packages.{}.modules.id", package.id), &module.id)?;
            if !module_ids.insert(module.id.as_str()) {
                return Err(ScopeError::catalog(format!(
                    "duplicate module id '{}' in package '{}'",
                    module.id, package.id
                )));
            }
            validate_non_negative(
                &format!("packages.{}.modules.{}.effort_days", package.id, module.id),
                module.effort_days,
            )?;
        }

        for module in &package.modules {
            let mut seen = HashSet::new();
            for prerequisite in &module.prerequisites {
                if prerequisite == &module.id {
                    return Err(ScopeError::catalog(format!(
                        "module '{}/{}' lists itself as a prerequisite",
                        package.id, module.id
                    )));
                }
                if !seen.insert(prerequisite.as_str()) {
                    return Err(ScopeError::catalog(format!(
                        "module '{}/{}' lists prerequisite '{}' more than once",
                        package.id, module.id, prerequisite
                    )));
                }
                if !module_ids.contains(prerequisite.as_str()) {
                    return Err(ScopeError::catalog(format!(
                        "module '{}/{}' requires '{}', which is not a module of the same package",
                        package.id, module.id, prerequisite
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_package_cycles(packages: &[Package]) -> Result<()> {
        let graph: Vec<(&str, &[String])> = packages
            .iter()
            .map(|p| (p.id.as_str(), p.prerequisites.as_slice()))
            .collect();

        match find_cycle(&graph) {
            Some(path) => Err(ScopeError::PrerequisiteCycle {
                kind: "package".to_string(),
                path,
            }),
            None => Ok(()),
        }
    }

    fn check_module_cycles(package: &Package) -> Result<()> {
        let graph: Vec<(&str, &[String])> = package
            .modules
            .iter()
            .map(|m| (m.id.as_str(), m.prerequisites.as_slice()))
            .collect();

        match find_cycle(&graph) {
            Some(path) => Err(ScopeError::PrerequisiteCycle {
                kind: format!("module ({})", package.id),
                path,
            }),
            None => Ok(()),
        }
    }

    fn check_rules(rules: &AdvisoryRules, index: &HashMap<String, usize>) -> Result<()> {
        for rule in &rules.companions {
            if !index.contains_key(&rule.package) {
                return Err(ScopeError::ConfigValidationError {
                    field: "rules.companions".to_string(),
                    message: format!(
                        "companion package '{}' for category '{}' is not in the catalog",
                        rule.package, rule.category
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Packages in definition order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package(&self, package_id: &str) -> Option<&Package> {
        self.index.get(package_id).map(|&i| &self.packages[i])
    }

    pub fn contains(&self, package_id: &str) -> bool {
        self.index.contains_key(package_id)
    }

    pub fn rules(&self) -> &AdvisoryRules {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn module_total(&self) -> usize {
        self.packages.iter().map(|p| p.modules.len()).sum()
    }

    pub fn is_selected(&self, package_id: &str) -> bool {
        self.package(package_id).map(|p| p.selected).unwrap_or(false)
    }

    fn package_mut(&mut self, package_id: &str) -> Result<&mut Package> {
        match self.index.get(package_id) {
            Some(&i) => Ok(&mut self.packages[i]),
            None => Err(ScopeError::not_found("Package", package_id)),
        }
    }

    /// Raw mutation; does not consult the validator.
    ///
    /// Selecting a package clears its individual module selections.
    pub fn set_package_selected(&mut self, package_id: &str, selected: bool) -> Result<()> {
        let package = self.package_mut(package_id)?;
        package.selected = selected;
        if selected {
            for module in &mut package.modules {
                module.selected = false;
            }
        }
        Ok(())
    }

    /// Raw mutation; does not consult the validator.
    pub fn set_module_selected(
        &mut self,
        package_id: &str,
        module_id: &str,
        selected: bool,
    ) -> Result<()> {
        let package = self.package_mut(package_id)?;
        let module = package
            .modules
            .iter_mut()
            .find(|m| m.id == module_id)
            .ok_or_else(|| ScopeError::not_found("Module", format!("{}/{}", package_id, module_id)))?;
        module.selected = selected;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for package in &mut self.packages {
            package.selected = false;
            for module in &mut package.modules {
                module.selected = false;
            }
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let mut snapshot = SelectionSnapshot {
            catalog: Some(self.name.clone()),
            exported_at: Some(Utc::now()),
            ..SelectionSnapshot::default()
        };

        for package in &self.packages {
            if package.selected {
                snapshot.packages.insert(package.id.clone());
                continue;
            }
            let modules: std::collections::BTreeSet<String> = package
                .modules
                .iter()
                .filter(|m| m.selected)
                .map(|m| m.id.clone())
                .collect();
            if !modules.is_empty() {
                snapshot.modules.insert(package.id.clone(), modules);
            }
        }

        snapshot
    }

    /// Replaces the current selection with `snapshot`.
    ///
    /// All ids are resolved before anything changes, so an unknown id leaves the
    /// catalog untouched. Prerequisites are not re-checked.
    pub fn apply_snapshot(&mut self, snapshot: &SelectionSnapshot) -> Result<()> {
        for package_id in &snapshot.packages {
            if !self.contains(package_id) {
                return Err(ScopeError::not_found("Package", package_id.as_str()));
            }
        }
        for (package_id, module_ids) in &snapshot.modules {
            let package = self
                .package(package_id)
                .ok_or_else(|| ScopeError::not_found("Package", package_id.as_str()))?;
            for module_id in module_ids {
                if package.module(module_id).is_none() {
                    return Err(ScopeError::not_found(
                        "Module",
                        format!("{}/{}", package_id, module_id),
                    ));
                }
            }
        }

        if let Some(source) = &snapshot.catalog {
            if source != &self.name {
                tracing::warn!(
                    "Applying a snapshot taken from catalog '{}' to catalog '{}'",
                    source,
                    self.name
                );
            }
        }

        self.clear_selection();
        for package_id in &snapshot.packages {
            self.set_package_selected(package_id, true)?;
        }
        for (package_id, module_ids) in &snapshot.modules {
            if snapshot.packages.contains(package_id) {
                continue;
            }
            for module_id in module_ids {
                self.set_module_selected(package_id, module_id, true)?;
            }
        }

        Ok(())
    }
}

/// Depth-first search with a recursion stack. Returns the first cycle found as a
/// path that starts and ends on the same node.
fn find_cycle(graph: &[(&str, &[String])]) -> Option<Vec<String>> {
    let edges: HashMap<&str, &[String]> = graph.iter().copied().collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = Vec::new();

    for &(node, _) in graph {
        if !visited.contains(node) {
            if let Some(cycle) = visit(node, &edges, &mut visited, &mut stack) {
                return Some(cycle);
            }
        }
    }
    None
}

fn visit<'a>(
    node: &'a str,
    edges: &HashMap<&'a str, &'a [String]>,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    stack.push(node);

    if let Some(&deps) = edges.get(node) {
        for dep in deps.iter() {
            let dep = dep.as_str();
            if let Some(start) = stack.iter().position(|n| *n == dep) {
                let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(dep.to_string());
                return Some(cycle);
            }
            if !visited.contains(dep) {
                if let Some(cycle) = visit(dep, edges, visited, stack) {
                    return Some(cycle);
                }
            }
        }
    }

    stack.pop();
    None
}
