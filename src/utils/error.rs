use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("unexpected status {status} from {endpoint}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Connect REST API not ready after {attempts} attempts")]
    ReadinessTimeout { attempts: u32 },

    #[error("failed to retrieve reports after {attempts} retry rounds")]
    TooManyRetries { attempts: u32 },

    #[error("worker process exited unexpectedly (code: {code:?})")]
    WorkerExited { code: Option<i32> },

    #[error("command failed: {command} (code: {code:?})")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("interrupted by shutdown signal")]
    Interrupted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Process,
    Data,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OpsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_)
            | Self::UnexpectedStatus { .. }
            | Self::ReadinessTimeout { .. }
            | Self::TooManyRetries { .. } => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::WorkerExited { .. } | Self::CommandFailed { .. } | Self::Interrupted => {
                ErrorCategory::Process
            }
            Self::SerializationError(_) | Self::CsvError(_) | Self::ZipError(_) => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Interrupted => ErrorSeverity::Low,
            Self::ApiError(_) | Self::ReadinessTimeout { .. } | Self::TooManyRetries { .. } => {
                ErrorSeverity::Medium
            }
            Self::UnexpectedStatus { .. }
            | Self::SerializationError(_)
            | Self::CsvError(_)
            | Self::ZipError(_)
            | Self::CommandFailed { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::WorkerExited { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) => format!("Could not reach the Connect REST API: {}", e),
            Self::UnexpectedStatus {
                endpoint, status, ..
            } => format!(
                "The Connect REST API rejected {} with HTTP {}",
                endpoint, status
            ),
            Self::ReadinessTimeout { attempts } => format!(
                "The Connect worker did not become ready within {} attempts",
                attempts
            ),
            Self::TooManyRetries { attempts } => format!(
                "Some reports were still pending after {} retry rounds",
                attempts
            ),
            Self::WorkerExited { code } => {
                format!("The Connect worker process died (exit code {:?})", code)
            }
            Self::CommandFailed { command, .. } => format!("External command failed: {}", command),
            Self::Interrupted => "Interrupted, shutting down".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) | Self::ReadinessTimeout { .. } => {
                "Check that the Connect worker is running and [connect].base_url points at it"
            }
            Self::UnexpectedStatus { .. } => {
                "Inspect the response body above; the connector configuration may have been rejected"
            }
            Self::TooManyRetries { .. } => {
                "Re-run pull-reports later; AppsFlyer export endpoints throttle aggressively"
            }
            Self::WorkerExited { .. } => "Check the worker logs for the crash cause",
            Self::CommandFailed { .. } => {
                "Check that docker-compose is installed and the compose file path is correct"
            }
            Self::Interrupted => "No action needed",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the settings file and try again",
            Self::IoError(_) => "Check file paths and permissions",
            Self::SerializationError(_) => {
                "Check that the connector config files contain valid JSON"
            }
            Self::CsvError(_) => "The downloaded report is not valid CSV; inspect the saved file",
            Self::ZipError(_) => "Check free disk space and the reports output path",
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsError>;
