use crate::domain::model::{CompanySize, Estimate, EstimateRequest};
use crate::domain::ports::Estimator;
use crate::utils::error::{Result, ScopeError};
use crate::utils::validation::{validate_non_negative, validate_required_field, validate_url};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeMultipliers {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
    pub enterprise: f64,
}

impl Default for SizeMultipliers {
    fn default() -> Self {
        Self {
            small: 0.8,
            medium: 1.0,
            large: 1.3,
            enterprise: 1.6,
        }
    }
}

impl SizeMultipliers {
    pub fn for_size(&self, size: CompanySize) -> f64 {
        match size {
            CompanySize::Small => self.small,
            CompanySize::Medium => self.medium,
            CompanySize::Large => self.large,
            CompanySize::Enterprise => self.enterprise,
        }
    }
}

/// Rule table for the local estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierTable {
    #[serde(default)]
    pub company_size: SizeMultipliers,
    /// Keyed by lowercase industry name; unknown industries use 1.0.
    #[serde(default)]
    pub industry: HashMap<String, f64>,
    #[serde(default = "default_contingency")]
    pub contingency: f64,
}

fn default_contingency() -> f64 {
    0.10
}

impl Default for MultiplierTable {
    fn default() -> Self {
        Self {
            company_size: SizeMultipliers::default(),
            industry: HashMap::new(),
            contingency: default_contingency(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub multipliers: MultiplierTable,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for EstimationSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Local,
            endpoint: None,
            timeout_seconds: default_timeout_seconds(),
            multipliers: MultiplierTable::default(),
        }
    }
}

impl EstimationSettings {
    pub fn validate_settings(&self) -> Result<()> {
        let m = &self.multipliers;
        for (field, value) in [
            ("estimation.multipliers.company_size.small", m.company_size.small),
            ("estimation.multipliers.company_size.medium", m.company_size.medium),
            ("estimation.multipliers.company_size.large", m.company_size.large),
            ("estimation.multipliers.company_size.enterprise", m.company_size.enterprise),
            ("estimation.multipliers.contingency", m.contingency),
        ] {
            validate_non_negative(field, value)?;
        }
        for (industry, value) in &m.industry {
            validate_non_negative(&format!("estimation.multipliers.industry.{}", industry), *value)?;
        }

        if self.provider == ProviderKind::Remote {
            let endpoint = validate_required_field("estimation.endpoint", &self.endpoint)?;
            validate_url("estimation.endpoint", endpoint)?;
        }
        Ok(())
    }
}

/// Multiplier-based estimate computed in-process.
#[derive(Debug, Clone, Default)]
pub struct LocalEstimator {
    table: MultiplierTable,
}

impl LocalEstimator {
    pub fn new(table: MultiplierTable) -> Self {
        Self { table }
    }

    fn factor(&self, request: &EstimateRequest) -> f64 {
        let profile = &request.profile;
        let industry = self
            .table
            .industry
            .get(&profile.industry.to_lowercase())
            .copied()
            .unwrap_or(1.0);
        self.table.company_size.for_size(profile.company_size) * industry * (1.0 + self.table.contingency)
    }
}

#[async_trait]
impl Estimator for LocalEstimator {
    fn name(&self) -> &str {
        "local"
    }

    async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate> {
        let factor = self.factor(request);
        let effort: f64 = request.items.iter().map(|i| i.effort_days).sum();
        let cost: f64 = request.items.iter().map(|i| i.price_amount).sum();

        Ok(Estimate {
            effort_days: effort * factor,
            cost: cost * factor,
            provider: self.name().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RemoteEstimate {
    effort_days: f64,
    cost: f64,
}

/// Posts the request as JSON to an external estimation service.
pub struct HttpEstimator {
    client: Client,
    endpoint: String,
}

impl HttpEstimator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Estimator for HttpEstimator {
    fn name(&self) -> &str {
        "remote"
    }

    async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate> {
        tracing::debug!(
            "Requesting estimate for {} packages from {}",
            request.items.len(),
            self.endpoint
        );
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        tracing::debug!("Estimation response status: {}", status);
        if !status.is_success() {
            return Err(ScopeError::EstimationError {
                message: format!("{} returned HTTP {}", self.endpoint, status),
            });
        }

        let body: RemoteEstimate = response.json().await?;
        if validate_non_negative("effort_days", body.effort_days).is_err()
            || validate_non_negative("cost", body.cost).is_err()
        {
            return Err(ScopeError::EstimationError {
                message: format!(
                    "{} returned unusable figures (effort_days={}, cost={})",
                    self.endpoint, body.effort_days, body.cost
                ),
            });
        }

        Ok(Estimate {
            effort_days: body.effort_days,
            cost: body.cost,
            provider: self.name().to_string(),
        })
    }
}

/// Chooses the configured provider. A failing remote provider is answered by the
/// local rule table instead.
pub struct EstimationAdapter {
    local: LocalEstimator,
    remote: Option<HttpEstimator>,
}

impl EstimationAdapter {
    pub fn from_settings(settings: &EstimationSettings) -> Result<Self> {
        settings.validate_settings()?;

        let remote = match settings.provider {
            ProviderKind::Local => None,
            ProviderKind::Remote => {
                let endpoint = validate_required_field("estimation.endpoint", &settings.endpoint)?;
                Some(HttpEstimator::new(
                    endpoint.clone(),
                    Duration::from_secs(settings.timeout_seconds),
                )?)
            }
        };

        Ok(Self {
            local: LocalEstimator::new(settings.multipliers.clone()),
            remote,
        })
    }

    pub fn local_only(table: MultiplierTable) -> Self {
        Self {
            local: LocalEstimator::new(table),
            remote: None,
        }
    }
}

#[async_trait]
impl Estimator for EstimationAdapter {
    fn name(&self) -> &str {
        match &self.remote {
            Some(remote) => remote.name(),
            None => self.local.name(),
        }
    }

    async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate> {
        if let Some(remote) = &self.remote {
            match remote.estimate(request).await {
                Ok(estimate) => return Ok(estimate),
                Err(e) => {
                    tracing::warn!("Remote estimate failed, using local rules: {}", e);
                }
            }
        }
        self.local.estimate(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ClientProfile, EstimateItem};

    fn request(size: CompanySize, industry: &str) -> EstimateRequest {
        EstimateRequest {
            items: vec![
                EstimateItem {
                    package_id: "a".into(),
                    effort_days: 40.0,
                    price_amount: 4000.0,
                },
                EstimateItem {
                    package_id: "b".into(),
                    effort_days: 60.0,
                    price_amount: 6000.0,
                },
            ],
            profile: ClientProfile {
                company_size: size,
                industry: industry.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_local_estimate_applies_multipliers() {
        let mut table = MultiplierTable::default();
        table.industry.insert("utilities".into(), 1.5);
        table.contingency = 0.0;
        let estimator = LocalEstimator::new(table);

        let estimate = estimator
            .estimate(&request(CompanySize::Large, "Utilities"))
            .await
            .unwrap();
        assert_eq!(estimate.provider, "local");
        assert!((estimate.effort_days - 100.0 * 1.3 * 1.5).abs() < 1e-9);
        assert!((estimate.cost - 10000.0 * 1.3 * 1.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_local_estimate_defaults() {
        let estimator = LocalEstimator::default();
        let estimate = estimator
            .estimate(&request(CompanySize::Medium, "unknown"))
            .await
            .unwrap();
        assert!((estimate.effort_days - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_remote_provider_requires_endpoint() {
        let settings = EstimationSettings {
            provider: ProviderKind::Remote,
            ..EstimationSettings::default()
        };
        assert!(matches!(
            settings.validate_settings(),
            Err(ScopeError::MissingConfigError { .. })
        ));

        let settings = EstimationSettings {
            provider: ProviderKind::Remote,
            endpoint: Some("not a url".into()),
            ..EstimationSettings::default()
        };
        assert!(EstimationAdapter::from_settings(&settings).is_err());
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let mut settings = EstimationSettings::default();
        settings.multipliers.company_size.small = -1.0;
        assert!(settings.validate_settings().is_err());
    }

    #[test]
    fn test_local_only_adapter_name() {
        let adapter = EstimationAdapter::local_only(MultiplierTable::default());
        assert_eq!(adapter.name(), "local");
    }
}
