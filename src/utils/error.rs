use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupError {
    #[error("Flat {flat} does not exist")]
    NotFound { flat: String },

    #[error("Flat {flat} already exists")]
    DuplicateFlat { flat: String },

    #[error("Payment already exists for flat {flat}, {month} {year}")]
    DuplicatePayment {
        flat: String,
        month: String,
        year: i32,
    },

    #[error("No payment for flat {flat}, {month} {year}")]
    PaymentNotFound {
        flat: String,
        month: String,
        year: i32,
    },

    #[error("Flat {flat} was modified concurrently (expected version {expected}, found {found})")]
    Conflict {
        flat: String,
        expected: u64,
        found: u64,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfig { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GroupError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Consistency,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GroupError {
    pub fn validation(message: impl Into<String>) -> Self {
        GroupError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(flat: impl Into<String>) -> Self {
        GroupError::NotFound { flat: flat.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GroupError::NotFound { .. }
            | GroupError::DuplicateFlat { .. }
            | GroupError::DuplicatePayment { .. }
            | GroupError::PaymentNotFound { .. }
            | GroupError::Validation { .. } => ErrorCategory::Input,
            GroupError::Conflict { .. } => ErrorCategory::Consistency,
            GroupError::Config { .. }
            | GroupError::InvalidConfigValue { .. }
            | GroupError::MissingConfig { .. } => ErrorCategory::Configuration,
            GroupError::Io(_) | GroupError::Serialization(_) | GroupError::Csv(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            // the operation can be re-run on a fresh snapshot
            ErrorCategory::Consistency => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GroupError::NotFound { .. } => "Create the flat first or check the flat number",
            GroupError::DuplicateFlat { .. } => "Pick a flat number that is not in use",
            GroupError::DuplicatePayment { .. } => {
                "List the flat's payments; the period is already settled"
            }
            GroupError::PaymentNotFound { .. } => "List the flat's payments to see what is recorded",
            GroupError::Conflict { .. } => "Another change landed first; run the command again",
            GroupError::Validation { .. } => "Check the command arguments",
            GroupError::Config { .. }
            | GroupError::InvalidConfigValue { .. }
            | GroupError::MissingConfig { .. } => "Fix the configuration file and try again",
            GroupError::Io(_) => "Check that the store path exists and is writable",
            GroupError::Serialization(_) => "The store file is corrupt or not valid JSON",
            GroupError::Csv(_) => "Check that the export path is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::System => format!("Storage problem: {}", self),
            _ => self.to_string(),
        }
    }
}
