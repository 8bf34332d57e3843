use thiserror::Error;

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("Agent server request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Agent server returned {status} for {endpoint}: {body}")]
    HttpStatusError {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Template error: {message}")]
    TemplateError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, TutorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl TutorError {
    pub fn validation(message: impl Into<String>) -> Self {
        TutorError::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TutorError::ApiError(_) | TutorError::HttpStatusError { .. } => ErrorCategory::Network,
            TutorError::MissingConfigError { .. }
            | TutorError::InvalidConfigValueError { .. }
            | TutorError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            TutorError::SerializationError(_)
            | TutorError::YamlError(_)
            | TutorError::TemplateError { .. }
            | TutorError::ValidationError { .. } => ErrorCategory::Data,
            TutorError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可以重試
            TutorError::ApiError(_) | TutorError::HttpStatusError { .. } => ErrorSeverity::Medium,
            TutorError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TutorError::ApiError(e) if e.is_connect() => {
                "Make sure the agent server is running and --server-url points at it".to_string()
            }
            TutorError::ApiError(e) if e.is_timeout() => {
                "The agent server is slow to answer; retry or raise --timeout".to_string()
            }
            TutorError::ApiError(_) => "Check the agent server logs and retry".to_string(),
            TutorError::HttpStatusError { status: 404, .. } => {
                "Check the assistant or thread id; list agents with `runbook-tutor agents`"
                    .to_string()
            }
            TutorError::HttpStatusError { .. } => {
                "The agent server rejected the request; check its logs".to_string()
            }
            TutorError::IoError(_) => {
                "Check that the file exists and is readable by the current user".to_string()
            }
            TutorError::SerializationError(_) | TutorError::YamlError(_) => {
                "The document is malformed; validate its syntax".to_string()
            }
            TutorError::MissingConfigError { field } => {
                format!("Provide a value for '{}' via flag, environment or config file", field)
            }
            TutorError::InvalidConfigValueError { field, .. }
            | TutorError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' and try again", field)
            }
            TutorError::TemplateError { .. } => {
                "Check the agent bundle template (s4d-bundle.agents[0].agent)".to_string()
            }
            TutorError::ValidationError { .. } => "Correct the input and try again".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not talk to the agent server: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Invalid data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_severity() {
        let err = TutorError::HttpStatusError {
            endpoint: "/assistants/x".to_string(),
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("runbook-tutor agents"));

        let err = TutorError::MissingConfigError {
            field: "desktop_home".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity().exit_code(), 1);
        assert!(err.recovery_suggestion().contains("desktop_home"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: TutorError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("System error"));
    }
}
