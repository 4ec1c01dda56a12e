use anyhow::Result;
use scopekit::core::Storage;
use scopekit::domain::model::SelectionSnapshot;
use scopekit::{CatalogConfig, Configurator, LocalStorage, ScopeError};
use tempfile::TempDir;

const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/catalog.example.toml");

fn fresh_session() -> Result<Configurator> {
    Ok(CatalogConfig::from_file(CATALOG)?.build_configurator()?)
}

#[tokio::test]
async fn test_export_then_import_reproduces_totals() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());

    let mut session = fresh_session()?;
    session.select_package("basis")?;
    session.select_package("fi")?;
    session.toggle_module("co", "cca")?;
    session.toggle_module("co", "pca")?;
    let expected = session.summary();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.catalog.as_deref(), Some("erp-rollout"));
    assert!(snapshot.exported_at.is_some());
    storage
        .write_file("selection.json", &serde_json::to_vec_pretty(&snapshot)?)
        .await?;

    let data = storage.read_file("selection.json").await?;
    let restored: SelectionSnapshot = serde_json::from_slice(&data)?;
    assert!(restored.same_selection(&snapshot));

    let mut reloaded = fresh_session()?;
    let summary = reloaded.import_snapshot(&restored)?;
    assert_eq!(summary, expected);
    assert_eq!(reloaded.totals(), session.totals());
    Ok(())
}

#[test]
fn test_snapshot_json_layout() -> Result<()> {
    let mut session = fresh_session()?;
    session.select_package("basis")?;
    session.toggle_module("fi", "gl")?;

    let value = serde_json::to_value(session.snapshot())?;
    assert_eq!(value["packages"], serde_json::json!(["basis"]));
    assert_eq!(value["modules"], serde_json::json!({ "fi": ["gl"] }));
    Ok(())
}

#[test]
fn test_import_accepts_minimal_snapshot() -> Result<()> {
    let snapshot: SelectionSnapshot =
        serde_json::from_str(r#"{ "packages": ["basis", "bw"] }"#)?;

    let mut session = fresh_session()?;
    let summary = session.import_snapshot(&snapshot)?;
    assert_eq!(summary.totals.package_count, 2);
    assert_eq!(summary.totals.effort_days, 115.0);
    Ok(())
}

#[test]
fn test_import_with_unknown_module_is_rejected() -> Result<()> {
    let snapshot: SelectionSnapshot =
        serde_json::from_str(r#"{ "packages": ["basis"], "modules": { "fi": ["payroll"] } }"#)?;

    let mut session = fresh_session()?;
    session.select_package("basis")?;
    session.select_package("bw")?;
    let before = session.totals();

    let err = session.import_snapshot(&snapshot).unwrap_err();
    assert!(matches!(err, ScopeError::NotFound { .. }));
    assert_eq!(session.totals(), before);
    Ok(())
}

#[test]
fn test_empty_snapshot_clears_selection() -> Result<()> {
    let mut session = fresh_session()?;
    session.select_package("basis")?;

    let summary = session.import_snapshot(&SelectionSnapshot::default())?;
    assert_eq!(summary.totals.effort_days, 0.0);
    assert_eq!(summary.totals.cost, 0.0);
    assert_eq!(summary.totals.package_count, 0);
    assert_eq!(summary.totals.module_count, 0);
    assert!(session.snapshot().is_empty());
    Ok(())
}
