//! Crate error type.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by optimizer entry points.
///
/// Search strategies never fail because of an infeasible result; they return
/// their best solution. Errors are reserved for bad input and for the
/// outcomes the caller must handle explicitly.
#[derive(Debug, Error)]
pub enum OptimizeError {
    /// The input solution is structurally broken.
    #[error("invalid solution: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidSolution(Vec<ValidationError>),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two solutions that must share a session list do not.
    #[error("session list mismatch: expected {expected} sessions, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Strict acceptance rejected a result with hard violations.
    #[error("result is infeasible: {hard_violations} hard violation(s)")]
    Infeasible { hard_violations: u32 },

    /// Every island failed or timed out.
    #[error("no island produced a result")]
    NoSurvivingIsland,

    /// Configuration could not be parsed.
    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_messages() {
        let err = OptimizeError::InvalidSolution(vec![ValidationError {
            kind: ValidationErrorKind::DuplicateId,
            message: "Duplicate session ID: S1".into(),
        }]);
        assert_eq!(
            err.to_string(),
            "invalid solution: 1 problem(s), first: Duplicate session ID: S1"
        );

        let err = OptimizeError::ShapeMismatch {
            expected: 4,
            found: 3,
        };
        assert!(err.to_string().contains("expected 4"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: OptimizeError = parse.into();
        assert!(matches!(err, OptimizeError::Config(_)));
    }
}
