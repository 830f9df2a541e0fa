//! Editor sessions for building calculated fields
//!
//! A session owns the formula text, a cursor and the latest validation
//! result. Every change, typed or inserted, goes through the same
//! validation path. The cursor counts characters, not bytes.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::catalog::{FormulaFunction, FunctionCatalog};
use super::fields::FieldRegistry;
use super::validator::{Validation, Validator};
use crate::error::SaveError;
use crate::types::{DataField, FormulaField};

/// Receives the outcome of a session
pub trait SessionHandler {
    /// Called once with the emitted field; ownership passes to the handler
    fn on_save(&mut self, field: FormulaField);

    /// Called when the session is abandoned
    fn on_close(&mut self) {}
}

/// One in-progress calculated field
#[derive(Debug, Clone)]
pub struct EditorSession<'a> {
    validator: Validator<'a>,
    id: Uuid,
    alias: String,
    formula: String,
    cursor: usize,
    validation: Validation,
}

impl<'a> EditorSession<'a> {
    /// Start a blank session
    pub fn new(fields: &'a FieldRegistry, catalog: &'a FunctionCatalog) -> Self {
        Self {
            validator: Validator::new(fields, catalog),
            id: Uuid::new_v4(),
            alias: String::new(),
            formula: String::new(),
            cursor: 0,
            validation: Validation::Empty,
        }
    }

    /// Reopen a previously saved field for editing. The id is kept and the
    /// formula is re-validated against the current registry.
    pub fn from_existing(
        field: &FormulaField,
        fields: &'a FieldRegistry,
        catalog: &'a FunctionCatalog,
    ) -> Self {
        let mut session = Self::new(fields, catalog);
        session.id = field.id;
        session.alias = field.alias.clone();
        session.set_formula(field.formula.clone());
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias = alias.into();
    }

    /// Replace the whole formula, as when the user types. The cursor moves
    /// to the end of the new text.
    pub fn set_formula(&mut self, formula: impl Into<String>) {
        self.formula = formula.into();
        self.cursor = self.char_len();
        self.revalidate();
    }

    /// Replace the formula and place the cursor where the host's caret is
    /// (clamped to the end)
    pub fn set_formula_with_cursor(&mut self, formula: impl Into<String>, cursor: usize) {
        self.formula = formula.into();
        self.cursor = cursor.min(self.char_len());
        self.revalidate();
    }

    /// Move the cursor; positions past the end clamp to the end
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = position.min(self.char_len());
    }

    /// Insert `NAME(<p1>, <p2>, ...)` at the cursor
    pub fn insert_function_template(&mut self, function: &FormulaFunction) {
        self.insert_text(&function.template());
    }

    /// Insert `{id}` at the cursor
    pub fn insert_field_reference(&mut self, field: &DataField) {
        self.insert_text(&field.reference());
    }

    /// Insert a literal token such as ` + ` or `()` at the cursor
    pub fn insert_operator(&mut self, token: &str) {
        self.insert_text(token);
    }

    fn insert_text(&mut self, text: &str) {
        let at = self.byte_offset(self.cursor);
        self.formula.insert_str(at, text);
        self.cursor += text.chars().count();
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.validation = self.validator.validate(&self.formula);
    }

    fn char_len(&self) -> usize {
        self.formula.chars().count()
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.formula
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.formula.len())
    }

    /// Build the field this session would emit, without emitting it
    pub fn build(&self) -> Result<FormulaField, SaveError> {
        if self.alias.trim().is_empty() {
            return Err(SaveError::MissingAlias);
        }
        match &self.validation {
            Validation::Empty => Err(SaveError::EmptyFormula),
            Validation::Invalid(e) => Err(SaveError::Invalid(e.clone())),
            Validation::Valid => Ok(FormulaField {
                id: self.id,
                alias: self.alias.trim().to_string(),
                formula: self.formula.clone(),
                is_valid: true,
                validation_error: None,
                created_at: Utc::now(),
            }),
        }
    }

    /// Emit the field to `handler`. Nothing is emitted on error.
    pub fn save<H: SessionHandler + ?Sized>(&self, handler: &mut H) -> Result<(), SaveError> {
        match self.build() {
            Ok(field) => {
                info!(id = %field.id, alias = %field.alias, "calculated field saved");
                handler.on_save(field);
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "save blocked");
                Err(e)
            }
        }
    }

    /// Abandon the session without emitting anything
    pub fn close<H: SessionHandler + ?Sized>(self, handler: &mut H) {
        handler.on_close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(vec![DataField::new(
            "dues",
            "Monthly Dues",
            FieldType::Number,
        )])
    }

    #[test]
    fn test_new_session_is_empty() {
        let fields = registry();
        let session = EditorSession::new(&fields, FunctionCatalog::standard());
        assert_eq!(session.validation(), &Validation::Empty);
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_valid());
    }

    #[test]
    fn test_set_formula_moves_cursor_to_end() {
        let fields = registry();
        let mut session = EditorSession::new(&fields, FunctionCatalog::standard());
        session.set_formula("{dues} * 12");
        assert_eq!(session.cursor(), 11);
        session.set_cursor(100);
        assert_eq!(session.cursor(), 11);
        session.set_formula("1");
        assert_eq!(session.cursor(), 1);
        session.set_formula("12");
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn test_set_formula_with_cursor_clamps() {
        let fields = registry();
        let mut session = EditorSession::new(&fields, FunctionCatalog::standard());
        session.set_formula_with_cursor("SUM()", 4);
        assert_eq!(session.cursor(), 4);
        session.set_formula_with_cursor("{dues}", 50);
        assert_eq!(session.cursor(), 6);
    }

    #[test]
    fn test_insert_in_middle_of_multibyte_text() {
        let fields = registry();
        let mut session = EditorSession::new(&fields, FunctionCatalog::standard());
        session.set_formula("\"é\"");
        session.set_cursor(2);
        session.insert_operator("x");
        assert_eq!(session.formula(), "\"éx\"");
        assert_eq!(session.cursor(), 3);
    }

    #[test]
    fn test_build_trims_alias() {
        let fields = registry();
        let mut session = EditorSession::new(&fields, FunctionCatalog::standard());
        session.set_alias("  Annual Dues ");
        session.set_formula("{dues} * 12");
        let field = session.build().unwrap();
        assert_eq!(field.alias, "Annual Dues");
        assert!(field.is_valid);
        assert_eq!(field.id, session.id());
    }

    #[test]
    fn test_whitespace_alias_is_missing() {
        let fields = registry();
        let mut session = EditorSession::new(&fields, FunctionCatalog::standard());
        session.set_alias("   ");
        session.set_formula("{dues}");
        assert_eq!(session.build().unwrap_err(), SaveError::MissingAlias);
    }
}
