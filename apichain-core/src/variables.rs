use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// Run-scoped variables extracted from earlier responses.
///
/// Created empty when a run starts and dropped with it; never shared between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableBag {
    values: BTreeMap<String, JsonValue>,
}

impl VariableBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }

    /// The value as it is spliced into request text.
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.values.get(name).map(value_to_string)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.values.iter()
    }
}

impl FromIterator<(String, JsonValue)> for VariableBag {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

pub fn value_to_string(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stringifies_scalars_and_structures() {
        let bag: VariableBag = [
            ("s".to_string(), json!("abc")),
            ("n".to_string(), json!(42)),
            ("b".to_string(), json!(true)),
            ("a".to_string(), json!([1, 2])),
        ]
        .into_iter()
        .collect();
        assert_eq!(bag.get_str("s").as_deref(), Some("abc"));
        assert_eq!(bag.get_str("n").as_deref(), Some("42"));
        assert_eq!(bag.get_str("b").as_deref(), Some("true"));
        assert_eq!(bag.get_str("a").as_deref(), Some("[1,2]"));
        assert_eq!(bag.get_str("missing"), None);
    }
}
