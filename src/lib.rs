//! calcfield - calculated-field formulas for report builders
//!
//! This library validates the formulas users write when they add calculated
//! fields to a report, and models the editor session that composes them.
//!
//! # Features
//!
//! - Static function catalog (math, string, date, aggregate, conditional, conversion)
//! - Per-session field registry for the selected data source
//! - Structural validation: parentheses, then `{field}` references, then `NAME(` calls
//! - Editor sessions with cursor-based insertion and save gating
//! - Report definition files (YAML), a CLI and an HTTP API
//!
//! # Example
//!
//! ```
//! use calcfield::core::{FieldRegistry, FunctionCatalog, Validation, Validator};
//! use calcfield::types::{DataField, FieldType};
//!
//! let fields = FieldRegistry::new(vec![DataField::new(
//!     "claim_amount",
//!     "Claim Amount",
//!     FieldType::Number,
//! )]);
//! let validator = Validator::new(&fields, FunctionCatalog::standard());
//!
//! assert_eq!(validator.validate("SUM({claim_amount})"), Validation::Valid);
//! assert_eq!(
//!     validator.validate("SUM({claim_amount}").error_message().as_deref(),
//!     Some("Unbalanced parentheses"),
//! );
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use error::{CalcFieldError, CalcFieldResult, FormulaError, SaveError};
pub use types::{DataField, FieldType, FormulaField, ReportDefinition};
