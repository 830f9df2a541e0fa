use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//==============================================================================
// Data Source Fields
//==============================================================================

/// Declared type of a data source field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
}

impl FieldType {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A field exposed by the selected data source, referenced in formulas as `{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl DataField {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type,
        }
    }

    /// The text inserted into a formula to reference this field
    pub fn reference(&self) -> String {
        format!("{{{}}}", self.id)
    }
}

//==============================================================================
// Calculated Fields
//==============================================================================

/// A calculated field definition emitted by an editor session.
///
/// Only sessions create these, and only when the alias is set and the
/// formula validated cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaField {
    pub id: Uuid,
    pub alias: String,
    pub formula: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

//==============================================================================
// Report Definition Files
//==============================================================================

/// A calculated field as written in a report definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedFieldDefinition {
    #[serde(default)]
    pub alias: String,
    pub formula: String,
}

/// A report definition: one data source, its fields, and the calculated
/// fields built on top of them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub fields: Vec<DataField>,
    #[serde(default)]
    pub calculated_fields: Vec<CalculatedFieldDefinition>,
}
