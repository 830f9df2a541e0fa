//! Editor session integration tests

use calcfield::core::{EditorSession, FieldRegistry, FunctionCatalog, SessionHandler, Validation};
use calcfield::error::{FormulaError, SaveError};
use calcfield::types::{DataField, FieldType, FormulaField};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Recorder {
    saved: Vec<FormulaField>,
    closed: usize,
}

impl SessionHandler for Recorder {
    fn on_save(&mut self, field: FormulaField) {
        self.saved.push(field);
    }

    fn on_close(&mut self) {
        self.closed += 1;
    }
}

fn members_registry() -> FieldRegistry {
    FieldRegistry::new(vec![
        DataField::new("dues", "Monthly Dues", FieldType::Number),
        DataField::new("joined_on", "Joined On", FieldType::Date),
    ])
}

fn catalog() -> &'static FunctionCatalog {
    FunctionCatalog::standard()
}

// ═══════════════════════════════════════════════════════════════════════════
// STATE TRANSITIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_typing_moves_between_states() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    assert_eq!(session.validation(), &Validation::Empty);

    session.set_formula("SUM({dues}");
    assert_eq!(
        session.validation(),
        &Validation::Invalid(FormulaError::UnbalancedParentheses)
    );

    session.set_formula("SUM({dues})");
    assert_eq!(session.validation(), &Validation::Valid);

    session.set_formula("");
    assert_eq!(session.validation(), &Validation::Empty);
}

// ═══════════════════════════════════════════════════════════════════════════
// INSERTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_function_template_insertion_advances_cursor() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let round = catalog().lookup_function("ROUND").unwrap();

    session.insert_function_template(round);
    assert_eq!(session.formula(), "ROUND(<number>, <digits>)");
    assert_eq!(session.cursor(), "ROUND(<number>, <digits>)".len());
}

#[test]
fn test_chained_insertions_compose_left_to_right() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let dues = fields.lookup_field("dues").unwrap().clone();

    session.insert_field_reference(&dues);
    assert_eq!(session.cursor(), 6);
    session.insert_operator(" * ");
    session.insert_operator("12");

    assert_eq!(session.formula(), "{dues} * 12");
    assert_eq!(session.cursor(), 11);
    assert_eq!(session.validation(), &Validation::Valid);
}

#[test]
fn test_insertion_at_cursor_inside_parens() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let sum = catalog().lookup_function("SUM").unwrap();
    let dues = fields.lookup_field("dues").unwrap().clone();

    session.insert_operator("SUM()");
    session.set_cursor(4);
    session.insert_field_reference(&dues);

    assert_eq!(session.formula(), "SUM({dues})");
    assert_eq!(session.cursor(), 10);
    assert!(session.is_valid());

    // a template inserted after the reference lands after it, not inside it
    session.insert_operator(" + ");
    session.insert_function_template(sum);
    assert_eq!(session.formula(), "SUM({dues} + SUM(<field>))");
}

#[test]
fn test_insert_after_typed_text() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());

    session.set_formula("{dues}");
    session.insert_operator(" * 12");

    assert_eq!(session.formula(), "{dues} * 12");
    assert_eq!(session.cursor(), 11);
    assert!(session.is_valid());
}

#[test]
fn test_retyping_keeps_insertions_at_the_end() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());

    session.set_formula("1");
    session.set_formula("12");
    session.insert_operator(" + 3");

    assert_eq!(session.formula(), "12 + 3");
}

#[test]
fn test_insert_at_host_caret_position() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let dues = fields.lookup_field("dues").unwrap().clone();

    session.set_formula_with_cursor("SUM()", 4);
    session.insert_field_reference(&dues);

    assert_eq!(session.formula(), "SUM({dues})");
    assert_eq!(session.cursor(), 10);
}

#[test]
fn test_insertion_revalidates() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let unknown = DataField::new("fees", "Fees", FieldType::Number);

    session.insert_field_reference(&unknown);
    assert_eq!(
        session.validation(),
        &Validation::Invalid(FormulaError::UnknownField("fees".to_string()))
    );

    session.insert_operator("(");
    assert_eq!(
        session.validation(),
        &Validation::Invalid(FormulaError::UnbalancedParentheses)
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// SAVE GATING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_save_valid_field_emits_once() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let mut recorder = Recorder::default();

    session.set_alias("Annual Dues");
    session.set_formula("{dues} * 12");
    session.save(&mut recorder).unwrap();

    assert_eq!(recorder.saved.len(), 1);
    let field = &recorder.saved[0];
    assert_eq!(field.alias, "Annual Dues");
    assert_eq!(field.formula, "{dues} * 12");
    assert!(field.is_valid);
    assert!(field.validation_error.is_none());
    assert_eq!(field.id, session.id());
}

#[test]
fn test_save_invalid_formula_never_emits() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let mut recorder = Recorder::default();

    session.set_alias("Broken");
    session.set_formula("FOO({dues})");
    let err = session.save(&mut recorder).unwrap_err();

    assert_eq!(err.to_string(), "Unknown function: FOO");
    assert!(recorder.saved.is_empty());
}

#[test]
fn test_save_without_alias_never_emits() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let mut recorder = Recorder::default();

    session.set_formula("{dues}");
    assert_eq!(session.save(&mut recorder), Err(SaveError::MissingAlias));
    assert_eq!(
        SaveError::MissingAlias.to_string(),
        "Field alias is required"
    );
    assert!(recorder.saved.is_empty());
}

#[test]
fn test_save_empty_formula_never_emits() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let mut recorder = Recorder::default();

    session.set_alias("Nothing");
    assert_eq!(session.save(&mut recorder), Err(SaveError::EmptyFormula));
    assert!(recorder.saved.is_empty());
}

#[test]
fn test_alias_checked_before_formula() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    session.set_formula("SUM(");
    assert_eq!(session.build(), Err(SaveError::MissingAlias));
}

#[test]
fn test_close_emits_nothing() {
    let fields = members_registry();
    let mut session = EditorSession::new(&fields, catalog());
    let mut recorder = Recorder::default();

    session.set_alias("Draft");
    session.set_formula("{dues}");
    session.close(&mut recorder);

    assert_eq!(recorder.closed, 1);
    assert!(recorder.saved.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// EDIT IN PLACE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_reopen_existing_field_keeps_id() {
    let fields = members_registry();
    let mut first = EditorSession::new(&fields, catalog());
    first.set_alias("Tenure");
    first.set_formula("DATE_DIFF({joined_on}, TODAY(), \"years\")");
    let saved = first.build().unwrap();

    let mut session = EditorSession::from_existing(&saved, &fields, catalog());
    assert_eq!(session.id(), saved.id);
    assert_eq!(session.alias(), "Tenure");
    assert_eq!(session.cursor(), saved.formula.chars().count());
    assert!(session.is_valid());

    session.insert_operator(" * 12");
    let updated = session.build().unwrap();
    assert_eq!(updated.id, saved.id);
    assert!(updated.formula.ends_with(" * 12"));
}

#[test]
fn test_reopen_against_new_source_revalidates() {
    let fields = members_registry();
    let mut first = EditorSession::new(&fields, catalog());
    first.set_alias("Annual Dues");
    first.set_formula("{dues} * 12");
    let saved = first.build().unwrap();

    let other = FieldRegistry::new(vec![DataField::new(
        "claim_amount",
        "Claim Amount",
        FieldType::Number,
    )]);
    let session = EditorSession::from_existing(&saved, &other, catalog());
    assert_eq!(
        session.build(),
        Err(SaveError::Invalid(FormulaError::UnknownField(
            "dues".to_string()
        )))
    );
}
