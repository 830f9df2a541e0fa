//! Structural validation of calculated-field formulas
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. parenthesis counts match (textual count, not nesting)
//! 2. every `{field}` reference resolves in the field registry
//! 3. every `NAME(` call resolves in the function catalog
//!
//! Arity, argument types and evaluation are out of scope: a balanced formula
//! that only mentions known names is valid even if it would not compute.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::catalog::FunctionCatalog;
use super::fields::FieldRegistry;
use crate::error::FormulaError;

static FIELD_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("field reference pattern"));

static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z_]+)\(").expect("function call pattern"));

/// Outcome of validating one formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Blank input; neither valid nor an error
    Empty,
    Valid,
    Invalid(FormulaError),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn error(&self) -> Option<&FormulaError> {
        match self {
            Validation::Invalid(e) => Some(e),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    /// Short state label for listings and API responses
    pub fn state_name(&self) -> &'static str {
        match self {
            Validation::Empty => "empty",
            Validation::Valid => "valid",
            Validation::Invalid(_) => "invalid",
        }
    }
}

/// Field ids and function names mentioned by a formula
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormulaReferences {
    pub fields: Vec<String>,
    pub functions: Vec<String>,
}

/// Validator bound to one field registry and one function catalog
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    fields: &'a FieldRegistry,
    catalog: &'a FunctionCatalog,
}

impl<'a> Validator<'a> {
    pub fn new(fields: &'a FieldRegistry, catalog: &'a FunctionCatalog) -> Self {
        Self { fields, catalog }
    }

    pub fn fields(&self) -> &'a FieldRegistry {
        self.fields
    }

    pub fn catalog(&self) -> &'a FunctionCatalog {
        self.catalog
    }

    /// Validate a formula. Never fails; problems come back as `Invalid`.
    pub fn validate(&self, formula: &str) -> Validation {
        if formula.trim().is_empty() {
            return Validation::Empty;
        }

        let result = match self.check(formula) {
            Ok(()) => Validation::Valid,
            Err(e) => Validation::Invalid(e),
        };
        debug!(formula, state = result.state_name(), "validated formula");
        result
    }

    fn check(&self, formula: &str) -> Result<(), FormulaError> {
        check_parentheses(formula)?;

        if let Some(id) = field_refs(formula).find(|id| self.fields.lookup_field(id).is_none()) {
            return Err(FormulaError::UnknownField(id.to_string()));
        }

        if let Some(name) =
            function_refs(formula).find(|name| self.catalog.lookup_function(name).is_none())
        {
            return Err(FormulaError::UnknownFunction(name.to_string()));
        }

        Ok(())
    }
}

/// Counts only: `)(` passes.
fn check_parentheses(formula: &str) -> Result<(), FormulaError> {
    let open = formula.chars().filter(|&c| c == '(').count();
    let close = formula.chars().filter(|&c| c == ')').count();
    if open != close {
        return Err(FormulaError::UnbalancedParentheses);
    }
    Ok(())
}

fn field_refs(formula: &str) -> impl Iterator<Item = &str> {
    FIELD_REF
        .captures_iter(formula)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
}

fn function_refs(formula: &str) -> impl Iterator<Item = &str> {
    FUNCTION_CALL
        .captures_iter(formula)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// Collect the distinct field ids and function names a formula mentions,
/// in order of first appearance
pub fn references(formula: &str) -> FormulaReferences {
    let mut refs = FormulaReferences::default();
    for id in field_refs(formula) {
        if !refs.fields.iter().any(|f| f == id) {
            refs.fields.push(id.to_string());
        }
    }
    for name in function_refs(formula) {
        if !refs.functions.iter().any(|f| f == name) {
            refs.functions.push(name.to_string());
        }
    }
    refs
}
