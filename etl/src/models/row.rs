use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single record moving through the pipeline. Column order is the order
/// in which fields were first set; setting an existing column overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.0.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_in_place() {
        let mut row = Row::new();
        row.set("id", "1");
        row.set("amount", "9.99");
        row.set("id", "2");

        assert_eq!(row.len(), 2);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "amount"]);
        assert_eq!(row.get_str("id"), Some("2"));
    }

    #[test]
    fn test_json_line_keeps_column_order() {
        let row: Row = vec![("b", Value::from("x")), ("a", Value::from("y"))]
            .into_iter()
            .collect();
        assert_eq!(row.to_json_line().unwrap(), r#"{"b":"x","a":"y"}"#);
        assert_eq!(row.to_string(), r#"{"b":"x","a":"y"}"#);
    }
}
