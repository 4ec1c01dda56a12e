use httpmock::prelude::*;
use scopekit::adapters::estimator::{EstimationSettings, ProviderKind};
use scopekit::domain::model::{ClientProfile, CompanySize};
use scopekit::domain::ports::Estimator;
use scopekit::{CatalogConfig, EstimationAdapter};

const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/catalog.example.toml");

fn remote_settings(endpoint: String) -> EstimationSettings {
    EstimationSettings {
        provider: ProviderKind::Remote,
        endpoint: Some(endpoint),
        timeout_seconds: 5,
        ..EstimationSettings::default()
    }
}

fn request() -> scopekit::domain::model::EstimateRequest {
    let mut session = CatalogConfig::from_file(CATALOG)
        .unwrap()
        .build_configurator()
        .unwrap();
    session.select_package("basis").unwrap();
    session.select_package("fi").unwrap();
    session.estimate_request(ClientProfile {
        company_size: CompanySize::Large,
        industry: "Retail".to_string(),
    })
}

#[tokio::test]
async fn test_remote_estimate_is_used_when_available() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/estimate")
            .json_body_partial(r#"{ "profile": { "company_size": "large" } }"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "effort_days": 210.0, "cost": 140000.0 }));
    });

    let adapter = EstimationAdapter::from_settings(&remote_settings(server.url("/estimate"))).unwrap();
    assert_eq!(adapter.name(), "remote");

    let estimate = adapter.estimate(&request()).await.unwrap();
    api_mock.assert();
    assert_eq!(estimate.provider, "remote");
    assert_eq!(estimate.effort_days, 210.0);
    assert_eq!(estimate.cost, 140000.0);
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_local_rules() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/estimate");
        then.status(503);
    });

    let adapter = EstimationAdapter::from_settings(&remote_settings(server.url("/estimate"))).unwrap();
    let estimate = adapter.estimate(&request()).await.unwrap();

    api_mock.assert();
    assert_eq!(estimate.provider, "local");
    // basis 45 + fi 120, large 1.3, default contingency 10%
    assert!((estimate.effort_days - 165.0 * 1.3 * 1.1).abs() < 1e-6);
}

#[tokio::test]
async fn test_unusable_remote_figures_fall_back() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/estimate");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "effort_days": -4.0, "cost": 10.0 }));
    });

    let adapter = EstimationAdapter::from_settings(&remote_settings(server.url("/estimate"))).unwrap();
    let estimate = adapter.estimate(&request()).await.unwrap();
    assert_eq!(estimate.provider, "local");
}

#[tokio::test]
async fn test_example_catalog_uses_local_multipliers() {
    let config = CatalogConfig::from_file(CATALOG).unwrap();
    let adapter = EstimationAdapter::from_settings(&config.estimation).unwrap();

    let estimate = adapter.estimate(&request()).await.unwrap();
    assert_eq!(estimate.provider, "local");
    // large 1.3, retail 1.1, contingency 15%
    assert!((estimate.effort_days - 165.0 * 1.3 * 1.1 * 1.15).abs() < 1e-6);
    assert!((estimate.cost - 111000.0 * 1.3 * 1.1 * 1.15).abs() < 1e-6);
}

#[test]
fn test_estimate_never_changes_catalog_totals() {
    let mut session = CatalogConfig::from_file(CATALOG)
        .unwrap()
        .build_configurator()
        .unwrap();
    session.select_package("basis").unwrap();
    let before = session.totals();

    let adapter = EstimationAdapter::from_settings(&EstimationSettings::default()).unwrap();
    let request = session.estimate_request(ClientProfile::default());
    let estimate = tokio_test::block_on(adapter.estimate(&request)).unwrap();

    assert!(estimate.effort_days > before.effort_days);
    assert_eq!(session.totals(), before);
}
