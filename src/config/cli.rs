use crate::domain::model::CompanySize;
use crate::utils::error::{Result, ScopeError};
use crate::utils::validation::{validate_path, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "scopekit")]
#[command(about = "Select catalog packages and modules, check prerequisites and compute totals")]
pub struct CliConfig {
    /// Path to the TOML catalog definition
    #[arg(short, long, default_value = "catalog.toml")]
    pub catalog: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load and validate the catalog
    Check,
    /// Apply a selection and print totals
    Totals(SelectionArgs),
    /// Apply a selection and write it as a snapshot file
    Export {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Where to write the snapshot JSON
        #[arg(short, long)]
        output: String,
    },
    /// Apply a selection and request an estimate for it
    Estimate {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long, default_value = "medium")]
        company_size: CompanySize,

        #[arg(long, default_value = "general")]
        industry: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Snapshot file to start from
    #[arg(long)]
    pub import: Option<String>,

    /// Package ids to select, in order
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Modules to toggle as package:module, in order
    #[arg(long, value_delimiter = ',')]
    pub modules: Vec<String>,
}

impl SelectionArgs {
    pub fn module_pairs(&self) -> Result<Vec<(String, String)>> {
        self.modules
            .iter()
            .map(|entry| match entry.split_once(':') {
                Some((package, module)) if !package.is_empty() && !module.is_empty() => {
                    Ok((package.to_string(), module.to_string()))
                }
                _ => Err(ScopeError::InvalidConfigValueError {
                    field: "--modules".to_string(),
                    value: entry.clone(),
                    reason: "expected <package>:<module>".to_string(),
                }),
            })
            .collect()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("--catalog", &self.catalog)?;

        let selection = match &self.command {
            Command::Check => return Ok(()),
            Command::Totals(selection) => selection,
            Command::Export { selection, output } => {
                validate_path("--output", output)?;
                selection
            }
            Command::Estimate { selection, .. } => selection,
        };

        if let Some(import) = &selection.import {
            validate_path("--import", import)?;
        }
        selection.module_pairs()?;
        Ok(())
    }
}
