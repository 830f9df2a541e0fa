//! Function catalog for calculated-field formulas
//!
//! The catalog is built once and only read afterwards. Validators and editor
//! sessions borrow it, so many sessions can share one instance.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Function categories, in the order the builder UI groups them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCategory {
    Math,
    String,
    Date,
    Aggregate,
    Conditional,
    Conversion,
}

impl FunctionCategory {
    pub const ALL: [FunctionCategory; 6] = [
        FunctionCategory::Math,
        FunctionCategory::String,
        FunctionCategory::Date,
        FunctionCategory::Aggregate,
        FunctionCategory::Conditional,
        FunctionCategory::Conversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionCategory::Math => "math",
            FunctionCategory::String => "string",
            FunctionCategory::Date => "date",
            FunctionCategory::Aggregate => "aggregate",
            FunctionCategory::Conditional => "conditional",
            FunctionCategory::Conversion => "conversion",
        }
    }
}

impl std::fmt::Display for FunctionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCategoryError {
    #[error("Unknown function category: '{0}' (expected math, string, date, aggregate, conditional or conversion)")]
    Category(String),

    /// A listing filter also accepts `all`
    #[error("Unknown function category: '{0}' (expected all, math, string, date, aggregate, conditional or conversion)")]
    Filter(String),
}

impl FromStr for FunctionCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ParseCategoryError::Category(s.to_string()))
    }
}

/// Category selector for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(FunctionCategory),
}

impl CategoryFilter {
    fn matches(&self, category: FunctionCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl From<FunctionCategory> for CategoryFilter {
    fn from(category: FunctionCategory) -> Self {
        CategoryFilter::Only(category)
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<FunctionCategory>()
            .map(CategoryFilter::Only)
            .map_err(|_| ParseCategoryError::Filter(s.to_string()))
    }
}

/// A callable available in the formula language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaFunction {
    pub name: String,
    pub category: FunctionCategory,
    /// Display names only; arity is never checked
    pub parameters: Vec<String>,
    pub description: String,
}

impl FormulaFunction {
    pub fn new(
        name: impl Into<String>,
        category: FunctionCategory,
        parameters: &[&str],
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            description: description.into(),
        }
    }

    /// Insertion template, e.g. `ROUND(<number>, <digits>)`
    pub fn template(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| format!("<{}>", p))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate function name in catalog: {0}")]
    DuplicateFunction(String),
}

/// Immutable registry of formula functions
#[derive(Debug, Clone)]
pub struct FunctionCatalog {
    functions: Vec<FormulaFunction>,
    index: HashMap<String, usize>,
}

impl FunctionCatalog {
    /// Build a catalog; names must be unique
    pub fn new(functions: Vec<FormulaFunction>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(functions.len());
        for (i, func) in functions.iter().enumerate() {
            if index.insert(func.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateFunction(func.name.clone()));
            }
        }
        Ok(Self { functions, index })
    }

    /// The process-wide standard catalog
    pub fn standard() -> &'static FunctionCatalog {
        &STANDARD_CATALOG
    }

    /// Exact, case-sensitive lookup
    pub fn lookup_function(&self, name: &str) -> Option<&FormulaFunction> {
        self.index.get(name).map(|&i| &self.functions[i])
    }

    /// Functions in definition order, optionally restricted to one category
    pub fn list_by_category(&self, filter: impl Into<CategoryFilter>) -> Vec<&FormulaFunction> {
        let filter = filter.into();
        self.functions
            .iter()
            .filter(|f| filter.matches(f.category))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

static STANDARD_CATALOG: LazyLock<FunctionCatalog> = LazyLock::new(|| {
    FunctionCatalog::new(standard_functions()).expect("standard catalog has unique names")
});

fn standard_functions() -> Vec<FormulaFunction> {
    use FunctionCategory::{Aggregate, Conditional, Conversion, Date, Math, String as Text};

    vec![
        // Math
        FormulaFunction::new("ABS", Math, &["number"], "Absolute value"),
        FormulaFunction::new("ROUND", Math, &["number", "digits"], "Rounds to specified digits"),
        FormulaFunction::new("CEILING", Math, &["number"], "Rounds up to the nearest integer"),
        FormulaFunction::new("FLOOR", Math, &["number"], "Rounds down to the nearest integer"),
        FormulaFunction::new("SQRT", Math, &["number"], "Square root"),
        FormulaFunction::new("POWER", Math, &["number", "exponent"], "Raises to power"),
        FormulaFunction::new("MOD", Math, &["number", "divisor"], "Returns remainder"),
        // String
        FormulaFunction::new("CONCAT", Text, &["text1", "text2"], "Joins text strings"),
        FormulaFunction::new("UPPER", Text, &["text"], "Converts to uppercase"),
        FormulaFunction::new("LOWER", Text, &["text"], "Converts to lowercase"),
        FormulaFunction::new("TRIM", Text, &["text"], "Removes surrounding whitespace"),
        FormulaFunction::new("LEN", Text, &["text"], "Number of characters"),
        FormulaFunction::new(
            "SUBSTRING",
            Text,
            &["text", "start", "length"],
            "Extracts part of a string",
        ),
        FormulaFunction::new(
            "REPLACE",
            Text,
            &["text", "search", "replacement"],
            "Replaces occurrences of a substring",
        ),
        // Date
        FormulaFunction::new("NOW", Date, &[], "Current date and time"),
        FormulaFunction::new("TODAY", Date, &[], "Current date"),
        FormulaFunction::new("YEAR", Date, &["date"], "Year of a date"),
        FormulaFunction::new("MONTH", Date, &["date"], "Month of a date"),
        FormulaFunction::new("DAY", Date, &["date"], "Day of month of a date"),
        FormulaFunction::new(
            "DATE_DIFF",
            Date,
            &["start_date", "end_date", "unit"],
            "Difference between two dates",
        ),
        FormulaFunction::new(
            "DATE_ADD",
            Date,
            &["date", "amount", "unit"],
            "Adds an interval to a date",
        ),
        // Aggregate
        FormulaFunction::new("SUM", Aggregate, &["field"], "Sum of values"),
        FormulaFunction::new("AVG", Aggregate, &["field"], "Average of values"),
        FormulaFunction::new("COUNT", Aggregate, &["field"], "Number of values"),
        FormulaFunction::new(
            "COUNT_DISTINCT",
            Aggregate,
            &["field"],
            "Number of distinct values",
        ),
        FormulaFunction::new("MIN", Aggregate, &["field"], "Smallest value"),
        FormulaFunction::new("MAX", Aggregate, &["field"], "Largest value"),
        // Conditional
        FormulaFunction::new(
            "IF",
            Conditional,
            &["condition", "value_if_true", "value_if_false"],
            "Conditional logic",
        ),
        FormulaFunction::new("AND", Conditional, &["condition1", "condition2"], "True if all are true"),
        FormulaFunction::new("OR", Conditional, &["condition1", "condition2"], "True if any is true"),
        FormulaFunction::new("NOT", Conditional, &["condition"], "Reverses a condition"),
        FormulaFunction::new(
            "COALESCE",
            Conditional,
            &["value1", "value2"],
            "First non-empty value",
        ),
        // Conversion
        FormulaFunction::new("TO_NUMBER", Conversion, &["value"], "Converts to a number"),
        FormulaFunction::new("TO_STRING", Conversion, &["value"], "Converts to text"),
        FormulaFunction::new("TO_DATE", Conversion, &["value"], "Converts to a date"),
    ]
}
