use crate::adapters::estimator::EstimationSettings;
use crate::core::aggregator::Policies;
use crate::core::catalog::Catalog;
use crate::core::engine::Configurator;
use crate::domain::model::{AdvisoryRules, Module, Package};
use crate::utils::error::{Result, ScopeError};
use crate::utils::validation::{
    validate_ascending, validate_non_empty_string, validate_non_negative, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Static catalog definition as authored in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub catalog: CatalogInfo,
    #[serde(default)]
    pub packages: Vec<PackageDefinition>,
    #[serde(default)]
    pub rules: AdvisoryRules,
    #[serde(default)]
    pub policy: Policies,
    #[serde(default)]
    pub estimation: EstimationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    pub layer: Option<String>,
    pub description: Option<String>,
    pub total_effort_days: f64,
    pub price_amount: f64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub critical: Option<bool>,
    #[serde(default)]
    pub modules: Vec<ModuleDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub effort_days: f64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl CatalogConfig {
    /// Loads a catalog definition from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScopeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScopeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScopeError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("catalog.name", &self.catalog.name)?;

        if self.packages.is_empty() {
            return Err(ScopeError::ConfigValidationError {
                field: "packages".to_string(),
                message: "catalog defines no packages".to_string(),
            });
        }

        let complexity = &self.policy.complexity;
        validate_ascending(
            "policy.complexity",
            &[
                complexity.simple_max,
                complexity.moderate_max,
                complexity.complex_max,
            ],
        )?;
        let risk = &self.policy.risk;
        validate_non_negative("policy.risk.low_below", risk.low_below)?;
        validate_non_negative("policy.risk.medium_below", risk.medium_below)?;
        validate_non_negative("policy.risk.high_below", risk.high_below)?;
        validate_ascending(
            "policy.risk",
            &[risk.low_below, risk.medium_below, risk.high_below],
        )?;

        self.estimation.validate_settings()?;

        Ok(())
    }

    /// Builds the runtime catalog; structural checks (ids, references, cycles) happen here.
    pub fn build_catalog(&self) -> Result<Catalog> {
        let packages = self.packages.iter().map(PackageDefinition::to_package).collect();
        Catalog::with_rules(self.catalog.name.clone(), packages, self.rules.clone())
    }

    pub fn build_configurator(&self) -> Result<Configurator> {
        Ok(Configurator::with_policies(self.build_catalog()?, self.policy))
    }
}

impl PackageDefinition {
    fn to_package(&self) -> Package {
        let mut package = Package::new(
            self.id.clone(),
            self.name.clone(),
            self.category.clone(),
            self.total_effort_days,
            self.price_amount,
        )
        .with_prerequisites(self.prerequisites.iter().cloned())
        .critical(self.critical.unwrap_or(false))
        .with_modules(self.modules.iter().map(ModuleDefinition::to_module).collect());

        if let Some(layer) = &self.layer {
            package = package.with_layer(layer.clone());
        }
        if let Some(description) = &self.description {
            package = package.with_description(description.clone());
        }
        package
    }
}

impl ModuleDefinition {
    fn to_module(&self) -> Module {
        let module = Module::new(self.id.clone(), self.name.clone(), self.effort_days)
            .with_prerequisites(self.prerequisites.iter().cloned());
        match &self.description {
            Some(description) => module.with_description(description.clone()),
            None => module,
        }
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
