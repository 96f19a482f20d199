//! Variable storage shared across evaluations of one session

use super::{DataType, RuntimeValue};
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Name to value map that remembers declaration order, so dumps and
/// snapshots list variables the way the script introduced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    entries: Vec<(String, RuntimeValue)>,
    index: HashMap<String, usize>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RuntimeValue> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Bind a name, replacing any previous binding in place
    pub fn declare(&mut self, name: &str, value: RuntimeValue) {
        match self.index.get(name) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value));
            }
        }
    }

    /// Update an existing binding. Returns false when the name is unknown.
    pub fn assign(&mut self, name: &str, value: RuntimeValue) -> bool {
        match self.index.get(name) {
            Some(&slot) => {
                self.entries[slot].1 = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuntimeValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

struct VariableEntry<'a> {
    name: &'a str,
    value: &'a RuntimeValue,
}

impl Serialize for VariableEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data_type: DataType = self.value.data_type();
        let mut entry = serializer.serialize_struct("Variable", 3)?;
        entry.serialize_field("name", self.name)?;
        entry.serialize_field("data_type", &data_type)?;
        entry.serialize_field("value", &self.value.to_string())?;
        entry.end()
    }
}

impl Serialize for VariableTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (name, value) in self.iter() {
            seq.serialize_element(&VariableEntry { name, value })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_assign() {
        let mut table = VariableTable::new();
        assert!(!table.assign("x", RuntimeValue::Int(1)));

        table.declare("x", RuntimeValue::Int(0));
        assert!(table.assign("x", RuntimeValue::Str("now a string".to_string())));
        assert_eq!(
            table.get("x"),
            Some(&RuntimeValue::Str("now a string".to_string()))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_redeclare_keeps_order() {
        let mut table = VariableTable::new();
        table.declare("a", RuntimeValue::Int(1));
        table.declare("b", RuntimeValue::Int(2));
        table.declare("a", RuntimeValue::Bool(true));

        let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table.get("a"), Some(&RuntimeValue::Bool(true)));
    }

    #[test]
    fn test_clear() {
        let mut table = VariableTable::new();
        table.declare("a", RuntimeValue::Int(1));
        table.clear();
        assert!(table.is_empty());
        assert!(!table.contains("a"));
    }

    #[test]
    fn test_serialize() {
        let mut table = VariableTable::new();
        table.declare("pi", RuntimeValue::Double(3.5));
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"name":"pi","data_type":"Double","value":"3.5"}]"#);
    }
}
