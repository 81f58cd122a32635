//! Generic configuration tree shared by the legacy reader, the migration
//! rules and the current-format writer.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Case-insensitive key that keeps the spelling it was first stored with.
#[derive(Debug, Clone)]
pub struct Key(String);

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leaf value of a configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A node of the tree: scalar, nested tree, or ordered list.
///
/// There is no null variant. Absence is expressed by the key not being
/// present, so every `move`/`copy` of a missing field is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Tree(Tree),
    List(Vec<Value>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(s.into()))
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_tree_mut(&mut self) -> Option<&mut Tree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Renders a scalar as text so it can serve as a key; containers have
    /// no key form.
    pub fn to_key_string(&self) -> Option<String> {
        match self {
            Self::Scalar(scalar) => Some(scalar.to_string()),
            _ => None,
        }
    }

    /// Converts parsed JSON, dropping nulls (at any depth).
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;

        match value {
            Json::Null => None,
            Json::Bool(b) => Some(Self::Scalar(Scalar::Bool(b))),
            Json::Number(n) => Some(Self::Scalar(Scalar::Number(n))),
            Json::String(s) => Some(Self::string(s)),
            Json::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            Json::Object(map) => Some(Self::Tree(Tree::from_json_map(map))),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::string(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

/// Ordered mapping from case-insensitive keys to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    entries: IndexMap<Key, Value>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from a JSON value; `None` unless it is an object.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => Some(Self::from_json_map(map)),
            _ => None,
        }
    }

    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut tree = Self::new();
        for (key, value) in map {
            if let Some(value) = Value::from_json(value) {
                tree.insert(key, value);
            }
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&Key::from(key))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(&Key::from(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(&Key::from(key))
    }

    pub fn get_tree(&self, key: &str) -> Option<&Tree> {
        self.get(key).and_then(Value::as_tree)
    }

    pub fn get_list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Sets `key`. An existing entry that matches case-insensitively keeps
    /// its spelling and position; only the value is replaced.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(&Key::from(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(Key::as_str)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.values_mut()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &mut Value) -> bool) {
        self.entries.retain(|k, v| keep(k.as_str(), v));
    }

    /// Returns the sub-tree under `key`, creating it when absent. A
    /// non-tree value already stored there is replaced.
    pub fn tree_or_insert(&mut self, key: &str) -> &mut Tree {
        let slot = self
            .entries
            .entry(Key::from(key))
            .or_insert_with(|| Value::Tree(Tree::new()));
        if !slot.is_tree() {
            *slot = Value::Tree(Tree::new());
        }
        match slot {
            Value::Tree(tree) => tree,
            _ => unreachable!("slot was just set to a tree"),
        }
    }

    /// Removes and returns the list under `key`. A single tree is what a
    /// lone repeated element looks like, so it is returned as a one-element
    /// list. Scalars are left in place.
    pub fn take_list(&mut self, key: &str) -> Option<Vec<Value>> {
        if matches!(self.get(key)?, Value::Scalar(_)) {
            return None;
        }
        match self.remove(key)? {
            Value::List(items) => Some(items),
            tree => Some(vec![tree]),
        }
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Tree(tree) => tree.serialize(serializer),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Number(n) => n.serialize(serializer),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}
