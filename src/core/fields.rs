//! Field registry for the selected data source

use crate::types::DataField;
use std::collections::HashMap;

/// Fields available to formulas in one editing session.
///
/// The set is replaced as a whole when the data source changes. There is no
/// way to add or remove individual fields.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<DataField>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    pub fn new(fields: Vec<DataField>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            // first occurrence wins
            index.entry(field.id.clone()).or_insert(i);
        }
        Self { fields, index }
    }

    /// Swap in the field list of a newly selected data source
    pub fn replace(&mut self, fields: Vec<DataField>) {
        *self = Self::new(fields);
    }

    /// Exact match on `id`
    pub fn lookup_field(&self, id: &str) -> Option<&DataField> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    /// Fields in the order the host supplied them
    pub fn fields(&self) -> &[DataField] {
        &self.fields
    }

    /// Number of distinct field ids
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl From<Vec<DataField>> for FieldRegistry {
    fn from(fields: Vec<DataField>) -> Self {
        Self::new(fields)
    }
}
