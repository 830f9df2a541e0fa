//! Formula engine: function catalog, field registry, validator and editor sessions

pub mod catalog;
pub mod editor;
pub mod fields;
pub mod validator;

pub use catalog::{CategoryFilter, FormulaFunction, FunctionCatalog, FunctionCategory};
pub use editor::{EditorSession, SessionHandler};
pub use fields::FieldRegistry;
pub use validator::{references, FormulaReferences, Validation, Validator};
