use thiserror::Error;

/// Exit code contract shared by every guardrail surface.
///
/// 0 clean, 1 internal fault, 10 missing precondition, 11 validation
/// failures, 12 naming violation, 13 unsafe pattern.
pub const EXIT_OK: i32 = 0;
pub const EXIT_EXECUTION: i32 = 1;
pub const EXIT_PRECONDITION: i32 = 10;
pub const EXIT_VALIDATION: i32 = 11;
pub const EXIT_NAMING: i32 = 12;
pub const EXIT_UNSAFE: i32 = 13;

#[derive(Error, Debug)]
pub enum GuardrailError {
    /// Required external tool or credential missing or unreachable.
    /// Fatal, never retried.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// One or more policy checks did not pass. Always fully enumerated.
    #[error("validation failed: {0} issue(s)")]
    ValidationFailed(usize),

    /// Strict subtype of validation failure reserved for dangerous-pattern
    /// hits, so CI can treat "unsafe" as more severe than "non-compliant".
    #[error("unsafe pattern detected: {0}")]
    UnsafePatternDetected(String),

    /// Branch/commit/PR-title format violation or lifecycle drift.
    #[error("naming violation: {0}")]
    NamingViolation(String),

    /// Malformed configuration or other unexpected internal fault.
    #[error("config error: {0}")]
    Config(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl GuardrailError {
    /// Map an error to the process exit code contract above.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PreconditionFailed(_) => EXIT_PRECONDITION,
            Self::ValidationFailed(_) => EXIT_VALIDATION,
            Self::UnsafePatternDetected(_) => EXIT_UNSAFE,
            Self::NamingViolation(_) => EXIT_NAMING,
            Self::Config(_) => EXIT_EXECUTION,
            Self::Execution(_) => EXIT_EXECUTION,
            Self::Io(_) => EXIT_EXECUTION,
            Self::Serde(_) => EXIT_EXECUTION,
            Self::Anyhow(_) => EXIT_EXECUTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_contract() {
        assert_eq!(
            GuardrailError::PreconditionFailed("gh missing".into()).exit_code(),
            EXIT_PRECONDITION
        );
        assert_eq!(GuardrailError::ValidationFailed(3).exit_code(), EXIT_VALIDATION);
        assert_eq!(
            GuardrailError::UnsafePatternDetected("eval".into()).exit_code(),
            EXIT_UNSAFE
        );
        assert_eq!(
            GuardrailError::NamingViolation("bad branch".into()).exit_code(),
            EXIT_NAMING
        );
        assert_eq!(GuardrailError::Config("bad toml".into()).exit_code(), EXIT_EXECUTION);
    }
}
