use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A selectable sub-unit of a [`Package`].
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub description: String,
    pub effort_days: f64,
    /// Sibling module ids that must be selected first.
    pub prerequisites: Vec<String>,
    pub selected: bool,
}

impl Module {
    pub fn new(id: impl Into<String>, name: impl Into<String>, effort_days: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            effort_days,
            prerequisites: Vec::new(),
            selected: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }
}

/// Top-level catalog entry.
///
/// `total_effort_days` and `price_amount` describe the fully selected package and
/// are authored independently of the module efforts.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub category: String,
    pub layer: Option<String>,
    pub description: String,
    pub total_effort_days: f64,
    pub price_amount: f64,
    /// Package ids that must be selected before this one.
    pub prerequisites: Vec<String>,
    pub critical: bool,
    pub modules: Vec<Module>,
    pub selected: bool,
}

impl Package {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        total_effort_days: f64,
        price_amount: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            layer: None,
            description: String::new(),
            total_effort_days,
            price_amount,
            prerequisites: Vec::new(),
            critical: false,
            modules: Vec::new(),
            selected: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_modules(mut self, modules: Vec<Module>) -> Self {
        self.modules = modules;
        self
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Grouping used for complexity and critical-path checks; falls back to the category.
    pub fn layer(&self) -> &str {
        self.layer.as_deref().unwrap_or(&self.category)
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub fn selected_module_count(&self) -> usize {
        self.modules.iter().filter(|m| m.selected).count()
    }

    /// Whole or partial selection.
    pub fn has_any_selection(&self) -> bool {
        self.selected || self.modules.iter().any(|m| m.selected)
    }
}

/// Category-level advice: packages in `category` usually ship with `package`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionRule {
    pub category: String,
    pub package: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRules {
    #[serde(default)]
    pub companions: Vec<CompanionRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    Select,
    Deselect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Package,
    Module,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Package => write!(f, "Package"),
            EntityKind::Module => write!(f, "Module"),
        }
    }
}

/// Hard validation failures. Any of these blocks the requested action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationError {
    NotFound { kind: EntityKind, id: String },
    MissingPrerequisite { target: String, prerequisite: String },
    HasDependents { target: String, dependent: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotFound { kind, id } => write!(f, "{} '{}' not found", kind, id),
            ValidationError::MissingPrerequisite {
                target,
                prerequisite,
            } => write!(f, "'{}' requires '{}' to be selected first", target, prerequisite),
            ValidationError::HasDependents { target, dependent } => {
                write!(f, "'{}' is still required by selected '{}'", target, dependent)
            }
        }
    }
}

/// Advisories. Never block an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationWarning {
    RecommendedCompanionMissing { target: String, companion: String },
    CriticalPathIncomplete {
        target: String,
        layer: String,
        package: String,
    },
    PackagePrerequisiteUnmet { package: String, prerequisite: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::RecommendedCompanionMissing { target, companion } => {
                write!(f, "'{}' is usually combined with '{}'", target, companion)
            }
            ValidationWarning::CriticalPathIncomplete {
                target,
                layer,
                package,
            } => write!(
                f,
                "'{}': critical package '{}' in layer '{}' is not selected",
                target, package, layer
            ),
            ValidationWarning::PackagePrerequisiteUnmet {
                package,
                prerequisite,
            } => write!(
                f,
                "package '{}' still needs '{}' before it is complete",
                package, prerequisite
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::new(
            vec![ValidationError::NotFound {
                kind,
                id: id.to_string(),
            }],
            Vec::new(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub effort_days: f64,
    pub cost: f64,
    pub package_count: usize,
    pub module_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl ComplexityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ComplexityLevel::Simple => "Simple",
            ComplexityLevel::Moderate => "Moderate",
            ComplexityLevel::Complex => "Complex",
            ComplexityLevel::VeryComplex => "Very Complex",
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub totals: Totals,
    pub complexity: ComplexityLevel,
    pub risk: RiskLevel,
}

/// Derived view of what is selected. Never a source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub packages: BTreeSet<String>,
    /// Module selections of packages that are not wholly selected.
    #[serde(default)]
    pub modules: BTreeMap<String, BTreeSet<String>>,
}

impl SelectionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.modules.values().all(BTreeSet::is_empty)
    }

    /// Compares only the selection, ignoring export metadata.
    pub fn same_selection(&self, other: &SelectionSnapshot) -> bool {
        self.packages == other.packages && self.modules == other.modules
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
    Enterprise,
}

impl FromStr for CompanySize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(CompanySize::Small),
            "medium" => Ok(CompanySize::Medium),
            "large" => Ok(CompanySize::Large),
            "enterprise" => Ok(CompanySize::Enterprise),
            other => Err(format!(
                "unknown company size '{}' (expected small, medium, large or enterprise)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub company_size: CompanySize,
    pub industry: String,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            company_size: CompanySize::Medium,
            industry: "general".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateItem {
    pub package_id: String,
    pub effort_days: f64,
    pub price_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub items: Vec<EstimateItem>,
    pub profile: ClientProfile,
}

impl EstimateRequest {
    pub fn package_ids(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.package_id.as_str()).collect()
    }
}

/// A non-authoritative figure shown next to the catalog totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub effort_days: f64,
    pub cost: f64,
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_defaults_to_category() {
        let pkg = Package::new("fi", "Finance", "Core", 10.0, 100.0);
        assert_eq!(pkg.layer(), "Core");
        let pkg = pkg.with_layer("Foundation");
        assert_eq!(pkg.layer(), "Foundation");
    }

    #[test]
    fn test_validation_result_validity_follows_errors() {
        let ok = ValidationResult::new(
            vec![],
            vec![ValidationWarning::RecommendedCompanionMissing {
                target: "a".into(),
                companion: "b".into(),
            }],
        );
        assert!(ok.valid);

        let missing = ValidationResult::not_found(EntityKind::Module, "m9");
        assert!(!missing.valid);
        assert_eq!(missing.errors[0].to_string(), "Module 'm9' not found");
    }

    #[test]
    fn test_company_size_parsing() {
        assert_eq!("Enterprise".parse::<CompanySize>(), Ok(CompanySize::Enterprise));
        assert!("huge".parse::<CompanySize>().is_err());
    }

    #[test]
    fn test_snapshot_same_selection_ignores_metadata() {
        let mut a = SelectionSnapshot::default();
        a.packages.insert("fi".into());
        let mut b = a.clone();
        b.catalog = Some("demo".into());
        b.exported_at = Some(Utc::now());
        assert!(a.same_selection(&b));
        assert_ne!(a, b);
    }
}
