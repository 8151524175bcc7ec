//! Core types for SQLProbe

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// A database value that can represent any scalar a supported backend returns
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean (SQL Server `bit`)
    Bool(bool),
    /// Any integral type, widened to 64 bits
    Integer(i64),
    /// Any floating point type, widened to 64 bits
    Float(f64),
    /// UTF-8 text. Decimals, GUIDs and times are carried as text so no
    /// precision is lost.
    Text(String),
    /// Date without time
    Date(NaiveDate),
    /// Date and time without timezone
    DateTime(NaiveDateTime),
    /// Binary data
    Binary(Vec<u8>),
}

impl Value {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Text(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Short name of the variant, used in logs and column metadata
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Binary(_) => "binary",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::Binary(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// Values serialize as plain JSON scalars: dates as ISO-8601 strings and
/// binary data as base64.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Integer(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Date(v) => serializer.collect_str(&v.format("%Y-%m-%d")),
            Value::DateTime(v) => serializer.collect_str(&v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Binary(v) => serializer.serialize_str(&BASE64.encode(v)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Column metadata as reported by the backend for one result set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMeta {
    /// Column name (may repeat within a result set)
    pub name: String,
    /// Data type (backend-specific string)
    pub data_type: String,
    /// Column ordinal position (0-based)
    pub ordinal: usize,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ordinal,
        }
    }
}

/// Raw tabular output of one command: the backend's column schema and
/// positional row values, exactly as the driver read them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    /// Create an empty row set with the given columns
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a row set from column names, inferring the data type from the
    /// first row's values.
    pub fn from_values(column_names: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let columns = column_names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let data_type = rows
                    .first()
                    .and_then(|row| row.get(idx))
                    .map(Value::type_name)
                    .unwrap_or("null");
                ColumnMeta::new(*name, data_type, idx)
            })
            .collect();
        Self { columns, rows }
    }

    /// Append a row
    pub fn push_row(&mut self, values: Vec<Value>) {
        self.rows.push(values);
    }

    /// Column names in backend order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One materialized row: column name to value, in backend column order
pub type Record = IndexMap<String, Value>;

/// Backend-independent result of a query: an ordered sequence of records
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct QueryResult {
    rows: Vec<Record>,
}

impl QueryResult {
    /// Create a new empty query result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a result from already materialized records
    pub fn from_records(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Append a record
    pub fn push(&mut self, record: Record) {
        self.rows.push(record);
    }

    /// The materialized records
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Consume the result, returning its records
    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Check if the result has rows
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::Integer(7).as_i64(), Some(7));
        assert_eq!(Value::Text("42".into()).as_i64(), Some(42));
        assert_eq!(Value::Integer(2).as_f64(), Some(2.0));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Float(1.5).as_bool(), None);
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Binary(vec![1, 2, 3]).to_string(), "<3 bytes>");
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-01-15");
    }

    #[test]
    fn test_value_serialization() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let values = vec![
            Value::Null,
            Value::Bool(false),
            Value::Integer(1),
            Value::Float(2.5),
            Value::Text("x".into()),
            Value::Date(dt.date()),
            Value::DateTime(dt),
            Value::Binary(vec![0xde, 0xad]),
        ];
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                null,
                false,
                1,
                2.5,
                "x",
                "2024-03-01",
                "2024-03-01T10:30:00",
                "3q0="
            ])
        );
    }

    #[test]
    fn test_row_set_from_values() {
        let set = RowSet::from_values(
            &["id", "name"],
            vec![vec![Value::Integer(1), Value::from("a")]],
        );
        assert_eq!(set.column_count(), 2);
        assert_eq!(set.row_count(), 1);
        assert_eq!(set.columns[0].data_type, "integer");
        assert_eq!(set.columns[1].ordinal, 1);
        assert_eq!(set.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_query_result_serializes_as_ordered_maps() {
        let mut record = Record::new();
        record.insert("b".to_string(), Value::Integer(1));
        record.insert("a".to_string(), Value::from("x"));
        let result = QueryResult::from_records(vec![record]);

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"[{"b":1,"a":"x"}]"#);
        assert!(result.has_rows());
        assert_eq!(QueryResult::empty().row_count(), 0);
    }
}
