use thiserror::Error;

pub type CalcFieldResult<T> = Result<T, CalcFieldError>;

#[derive(Error, Debug)]
pub enum CalcFieldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Watch error: {0}")]
    Watch(String),
}

/// Structural problems found in a formula.
///
/// Messages are shown verbatim next to the formula input, so they are part
/// of the public contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

/// Reasons a session refuses to emit a calculated field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("Field alias is required")]
    MissingAlias,

    #[error("Formula is required")]
    EmptyFormula,

    #[error("{0}")]
    Invalid(FormulaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_error_messages() {
        assert_eq!(
            FormulaError::UnbalancedParentheses.to_string(),
            "Unbalanced parentheses"
        );
        assert_eq!(
            FormulaError::UnknownField("dues".to_string()).to_string(),
            "Unknown field: dues"
        );
        assert_eq!(
            FormulaError::UnknownFunction("FOO".to_string()).to_string(),
            "Unknown function: FOO"
        );
    }

    #[test]
    fn test_save_error_carries_validation_message() {
        let err = SaveError::Invalid(FormulaError::UnknownField("x".to_string()));
        assert_eq!(err.to_string(), "Unknown field: x");
        assert_eq!(SaveError::MissingAlias.to_string(), "Field alias is required");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CalcFieldError = io.into();
        assert!(err.to_string().starts_with("IO error"));
    }
}
