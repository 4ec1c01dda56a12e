use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Estimation request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Circular {kind} prerequisites: {}", path.join(" -> "))]
    PrerequisiteCycle { kind: String, path: Vec<String> },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    #[error("Estimation error: {message}")]
    EstimationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Catalog,
    Network,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScopeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScopeError::HttpError(_) | ScopeError::EstimationError { .. } => ErrorCategory::Network,
            ScopeError::IoError(_) => ErrorCategory::Storage,
            ScopeError::SerializationError(_) | ScopeError::NotFound { .. } => ErrorCategory::Data,
            ScopeError::CatalogError { .. } | ScopeError::PrerequisiteCycle { .. } => {
                ErrorCategory::Catalog
            }
            ScopeError::ConfigError { .. }
            | ScopeError::ConfigValidationError { .. }
            | ScopeError::InvalidConfigValueError { .. }
            | ScopeError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // The estimate is advisory; the authoritative totals are still available.
            ErrorCategory::Network => ErrorSeverity::Low,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Catalog => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScopeError::HttpError(_) | ScopeError::EstimationError { .. } => {
                "Check the estimation endpoint or switch the provider to \"local\""
            }
            ScopeError::IoError(_) => "Check that the path exists and is readable/writable",
            ScopeError::SerializationError(_) => "Make sure the snapshot file is valid JSON",
            ScopeError::NotFound { .. } => {
                "The snapshot was probably taken from a different catalog version"
            }
            ScopeError::PrerequisiteCycle { .. } => {
                "Remove one of the prerequisites listed in the cycle"
            }
            ScopeError::CatalogError { .. } => "Fix the package or module definition in the catalog",
            ScopeError::ConfigError { .. }
            | ScopeError::ConfigValidationError { .. }
            | ScopeError::InvalidConfigValueError { .. }
            | ScopeError::MissingConfigError { .. } => {
                "Review the catalog TOML file against the documented layout"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Catalog => format!("The catalog could not be loaded: {}", self),
            ErrorCategory::Network => format!("Estimate unavailable: {}", self),
            ErrorCategory::Storage => format!("File access failed: {}", self),
            ErrorCategory::Data => format!("Could not read selection data: {}", self),
        }
    }

    pub fn not_found(kind: &str, id: impl Into<String>) -> Self {
        ScopeError::NotFound {
            kind: kind.to_string(),
            id: id.into(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        ScopeError::CatalogError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScopeError>;
