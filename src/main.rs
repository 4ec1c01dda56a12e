use anyhow::Context;
use clap::Parser;
use scopekit::config::cli::{Command, LogFormat, SelectionArgs};
use scopekit::core::Storage;
use scopekit::domain::model::{ClientProfile, SelectionSnapshot, Summary};
use scopekit::domain::ports::Estimator;
use scopekit::utils::error::ErrorSeverity;
use scopekit::utils::{logger, validation::Validate};
use scopekit::{
    CatalogConfig, CliConfig, Configurator, EstimationAdapter, LocalStorage, ScopeError,
    ToggleOutcome,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        let Some(scope_error) = e.downcast_ref::<ScopeError>() else {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        };

        tracing::error!(
            "❌ {:#} (Category: {:?}, Severity: {:?})",
            e,
            scope_error.category(),
            scope_error.severity()
        );
        eprintln!("❌ {}", scope_error.user_friendly_message());
        eprintln!("💡 Suggestion: {}", scope_error.recovery_suggestion());

        std::process::exit(exit_code(scope_error.severity()));
    }
}

/// Every failed command exits non-zero; severity only picks the code.
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

async fn run(config: CliConfig) -> anyhow::Result<()> {
    tracing::info!("📁 Loading catalog from: {}", config.catalog);
    let catalog_config = CatalogConfig::from_file(&config.catalog)
        .with_context(|| format!("failed to load catalog '{}'", config.catalog))?;
    catalog_config.validate()?;
    let mut session = catalog_config.build_configurator()?;

    // Paths on the command line are taken as given, relative to the working directory.
    let storage = LocalStorage::new(".");

    match config.command {
        Command::Check => {
            let catalog = session.catalog();
            println!(
                "✅ Catalog '{}' is valid: {} packages, {} modules",
                catalog.name(),
                catalog.len(),
                catalog.module_total()
            );
        }
        Command::Totals(selection) => {
            apply_selection(&mut session, &selection, &storage).await?;
            print_summary(&session.summary(), catalog_config.catalog.currency.as_deref());
        }
        Command::Export { selection, output } => {
            apply_selection(&mut session, &selection, &storage).await?;
            let snapshot = session.snapshot();
            let json = serde_json::to_vec_pretty(&snapshot)?;
            storage.write_file(&output, &json).await?;
            tracing::info!("📁 Snapshot saved to: {}", output);
            println!("✅ Selection exported to {}", output);
        }
        Command::Estimate {
            selection,
            company_size,
            industry,
        } => {
            apply_selection(&mut session, &selection, &storage).await?;
            let summary = session.summary();
            print_summary(&summary, catalog_config.catalog.currency.as_deref());

            let adapter = EstimationAdapter::from_settings(&catalog_config.estimation)?;
            let request = session.estimate_request(ClientProfile {
                company_size,
                industry,
            });
            if request.items.is_empty() {
                println!("ℹ️  No whole packages selected; nothing to estimate");
                return Ok(());
            }

            let estimate = adapter.estimate(&request).await?;
            println!(
                "🔮 Estimate ({}): {:.1} days, {:.2} cost (catalog totals: {:.1} days, {:.2})",
                estimate.provider,
                estimate.effort_days,
                estimate.cost,
                summary.totals.effort_days,
                summary.totals.cost
            );
        }
    }

    Ok(())
}

async fn apply_selection(
    session: &mut Configurator,
    selection: &SelectionArgs,
    storage: &LocalStorage,
) -> anyhow::Result<()> {
    if let Some(path) = &selection.import {
        let data = storage
            .read_file(path)
            .await
            .with_context(|| format!("failed to read snapshot '{}'", path))?;
        let snapshot: SelectionSnapshot = serde_json::from_slice(&data)
            .map_err(ScopeError::from)
            .with_context(|| format!("failed to parse snapshot '{}'", path))?;
        session.import_snapshot(&snapshot)?;
    }

    for package_id in &selection.select {
        report(&format!("package {}", package_id), session.select_package(package_id)?);
    }

    for (package_id, module_id) in selection.module_pairs()? {
        report(
            &format!("module {}/{}", package_id, module_id),
            session.toggle_module(&package_id, &module_id)?,
        );
    }

    Ok(())
}

fn report(subject: &str, outcome: ToggleOutcome) {
    match outcome {
        ToggleOutcome::Applied(result) => {
            println!("✅ {}", subject);
            for warning in &result.warnings {
                println!("   ⚠️  {}", warning);
            }
        }
        ToggleOutcome::Rejected(result) => {
            println!("⛔ {}", subject);
            for error in &result.errors {
                println!("   - {}", error);
            }
        }
        ToggleOutcome::Ignored => {
            println!("➖ {} (package already selected as a whole)", subject);
        }
    }
}

fn print_summary(summary: &Summary, currency: Option<&str>) {
    let totals = &summary.totals;
    println!("📊 Packages: {}", totals.package_count);
    println!("📊 Modules: {}", totals.module_count);
    println!("📊 Effort: {:.1} person-days", totals.effort_days);
    println!("📊 Cost: {:.2} {}", totals.cost, currency.unwrap_or(""));
    println!("📊 Complexity: {}", summary.complexity);
    println!("📊 Risk: {}", summary.risk);
}
