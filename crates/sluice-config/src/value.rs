//! The configuration tree: [`ConfigNode`] maps keys to [`ConfigValue`]s.

use serde_json::{Map, Value};

// ── ConfigValue ───────────────────────────────────────────────────────────

/// One value in a [`ConfigNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A scalar argument in its string form: `charset "UTF-8"`, `skip 1`.
    Scalar(String),
    /// A sequence or mapping argument, stored exactly as written.
    Structured(Value),
    /// The body of a call with a `{ }` block.
    Node(ConfigNode),
}

impl ConfigValue {
    /// Classify a call argument: sequences and mappings pass through
    /// untouched, everything else is stringified.
    pub fn from_argument(value: Value) -> Self {
        match value {
            Value::Array(_) | Value::Object(_) => ConfigValue::Structured(value),
            other => ConfigValue::Scalar(stringify(&other)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&ConfigNode> {
        match self {
            ConfigValue::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            ConfigValue::Structured(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Scalar(s) => Value::String(s.clone()),
            ConfigValue::Structured(v) => v.clone(),
            ConfigValue::Node(n) => Value::Object(n.to_json()),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Scalar(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Scalar(s)
    }
}

impl From<ConfigNode> for ConfigValue {
    fn from(n: ConfigNode) -> Self {
        ConfigValue::Node(n)
    }
}

/// String form of a scalar argument. `null` becomes the empty string.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── ConfigNode ────────────────────────────────────────────────────────────

/// Ordered key/value entries for one nesting level.
///
/// Keys are unique. Writing an existing key replaces its value in place, so
/// the first write decides the position and the last write decides the value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigNode {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a value as `&str` if it is a scalar.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Get a value as a nested node.
    pub fn get_node(&self, key: &str) -> Option<&ConfigNode> {
        self.get(key)?.as_node()
    }

    /// Get a sequence or mapping value as written.
    pub fn get_structured(&self, key: &str) -> Option<&Value> {
        self.get(key)?.as_structured()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Copy every entry of `other` into `self`, overwriting shared keys.
    pub fn merge(&mut self, other: ConfigNode) {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Convert the whole tree to a JSON object, keeping entry order.
    pub fn to_json(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigNode {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut node = ConfigNode::new();
        for (k, v) in iter {
            node.insert(k, v);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── stringify ─────────────────────────────────────────────────────────

    #[test]
    fn stringify_scalars() {
        assert_eq!(stringify(&json!("UTF-8")), "UTF-8");
        assert_eq!(stringify(&json!(1)), "1");
        assert_eq!(stringify(&json!(-2.5)), "-2.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&Value::Null), "");
    }

    #[test]
    fn from_argument_keeps_structured_values() {
        let seq = json!([1, 2]);
        assert_eq!(ConfigValue::from_argument(seq.clone()), ConfigValue::Structured(seq));
        assert_eq!(ConfigValue::from_argument(json!(1)), ConfigValue::Scalar("1".into()));
    }

    // ── ConfigNode ────────────────────────────────────────────────────────

    #[test]
    fn insert_is_last_write_wins() {
        let mut node = ConfigNode::new();
        assert!(node.insert("x", "a").is_none());
        assert_eq!(node.insert("x", "b"), Some(ConfigValue::from("a")));
        assert_eq!(node.len(), 1);
        assert_eq!(node.get_str("x"), Some("b"));
    }

    #[test]
    fn overwrite_keeps_first_position() {
        let mut node: ConfigNode = [("a", "1"), ("b", "2")].into_iter().collect();
        node.insert("a", "3");
        assert_eq!(node.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn merge_overwrites_shared_keys() {
        let mut node: ConfigNode = [("type", "old"), ("charset", "UTF-8")].into_iter().collect();
        node.merge([("type", "csv")].into_iter().collect());
        assert_eq!(node.get_str("type"), Some("csv"));
        assert_eq!(node.get_str("charset"), Some("UTF-8"));
    }

    #[test]
    fn remove_entry() {
        let mut node: ConfigNode = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(node.remove("a"), Some(ConfigValue::from("1")));
        assert!(node.remove("a").is_none());
        assert!(!node.contains_key("a"));
    }

    #[test]
    fn typed_getters() {
        let mut inner = ConfigNode::new();
        inner.insert("type", "csv");
        let mut node = ConfigNode::new();
        node.insert("parser", inner.clone());
        node.insert("columns", ConfigValue::Structured(json!([{"name": "id"}])));

        assert_eq!(node.get_node("parser"), Some(&inner));
        assert_eq!(node.get_structured("columns"), Some(&json!([{"name": "id"}])));
        assert!(node.get_str("parser").is_none());
    }

    #[test]
    fn to_json_keeps_order_and_nesting() {
        let mut parser = ConfigNode::new();
        parser.insert("type", "csv");
        let mut node = ConfigNode::new();
        node.insert("z", "last");
        node.insert("parser", parser);

        let json = Value::Object(node.to_json());
        assert_eq!(json, json!({"z": "last", "parser": {"type": "csv"}}));
        assert_eq!(json.as_object().unwrap().keys().collect::<Vec<_>>(), ["z", "parser"]);
    }
}
