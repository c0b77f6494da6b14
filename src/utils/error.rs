use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{key} not found.")]
    NotFound { key: String },

    #[error("Flight {fr24_id} cannot be added to the system: {reason}")]
    CannotPersist { fr24_id: String, reason: String },

    #[error("Store unavailable during {operation}: {message}")]
    StoreUnavailable { operation: String, message: String },

    #[error("Row mapping error: {message}")]
    RowMapping { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Persistence,
    Store,
    Config,
    Input,
}

impl TrackerError {
    pub fn flight_id_not_found(flight_id: i64) -> Self {
        Self::NotFound {
            key: format!("Flight with id: {}", flight_id),
        }
    }

    pub fn fr24_id_not_found(fr24_id: &str) -> Self {
        Self::NotFound {
            key: format!("Flight with FR24 ID: {}", fr24_id),
        }
    }

    pub fn store(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::StoreUnavailable {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::CannotPersist { .. } => ErrorCategory::Persistence,
            Self::StoreUnavailable { .. } | Self::RowMapping { .. } => ErrorCategory::Store,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Config,
            Self::IoError(_) | Self::SerializationError(_) | Self::ValidationError { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::NotFound => 4,
            ErrorCategory::Persistence | ErrorCategory::Store => 2,
            ErrorCategory::Config | ErrorCategory::Input => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
