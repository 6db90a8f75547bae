use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{FieldMap, RecordId, Table};

/// A single row in the record store: an opaque id plus its field payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: FieldMap,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String view of a field; non-string values read as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

/// Server-side filter expression: equality tests composed with OR.
///
/// The store evaluates these natively; [`Filter::matches`] mirrors that
/// evaluation for in-memory substitutes. An equality test against the empty
/// string also accepts a missing or null field — the store treats blank and
/// absent alike.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    Any(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn any(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Any(filters.into_iter().collect())
    }

    pub fn matches(&self, fields: &FieldMap) -> bool {
        match self {
            Filter::Eq { field, value } => match fields.get(field) {
                None | Some(Value::Null) => is_blank(value),
                Some(stored) => stored == value,
            },
            Filter::Any(filters) => filters.iter().any(|filter| filter.matches(fields)),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Capability contract for the keyed record store.
///
/// Each operation is applied independently by the store; there is no
/// cross-record transaction.
pub trait RecordRepository: Send + Sync {
    fn find_first(&self, table: Table, filter: &Filter)
        -> Result<Option<Record>, RepositoryError>;
    fn find_all(&self, table: Table, filter: &Filter) -> Result<Vec<Record>, RepositoryError>;
    fn create(&self, table: Table, fields: FieldMap) -> Result<Record, RepositoryError>;
    /// Merge `fields` into the identified record; untouched fields keep
    /// their stored values.
    fn update(
        &self,
        table: Table,
        id: &RecordId,
        fields: FieldMap,
    ) -> Result<Record, RepositoryError>;
    fn batch_create(
        &self,
        table: Table,
        rows: Vec<FieldMap>,
    ) -> Result<Vec<Record>, RepositoryError>;
    fn batch_delete(&self, table: Table, ids: &[RecordId]) -> Result<(), RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
