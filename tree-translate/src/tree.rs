//! Document tree produced by every parser and consumed by the serializer.

use serde_json::{Number, Value};

/// A parsed document: strings are translatable, scalars never are.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    String(String),
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

/// Non-translatable leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(Number),
    Bool(bool),
    Null,
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Null => write!(f, "null"),
        }
    }
}

/// Ordered key/value entries with unique keys.
///
/// Keys keep the position they were first seen at. Inserting a key that is
/// already present replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping(Vec<(String, Node)>);

impl Mapping {
    pub fn new() -> Self {
        Mapping(Vec::new())
    }

    pub fn with_entry(mut self, key: &str, value: Node) -> Self {
        self.insert(key.to_string(), value);
        self
    }

    pub fn insert(&mut self, key: String, value: Node) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Node)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = &'a (String, Node);
    type IntoIter = std::slice::Iter<'a, (String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Node {
    pub fn string(value: &str) -> Self {
        Node::String(value.to_string())
    }

    pub fn integer(value: i64) -> Self {
        Node::Scalar(Scalar::Number(Number::from(value)))
    }

    pub fn bool(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }

    /// Number of `String` leaves, i.e. how many translations a rebuild consumes.
    pub fn string_count(&self) -> usize {
        match self {
            Node::String(_) => 1,
            Node::Scalar(_) => 0,
            Node::Sequence(items) => items.iter().map(Node::string_count).sum(),
            Node::Mapping(entries) => entries.iter().map(|(_, v)| v.string_count()).sum(),
        }
    }

    /// Same shape, same kinds, same keys in the same order. Leaf values may differ
    /// as long as string leaves stay strings and scalars stay equal.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::String(_), Node::String(_)) => true,
            (Node::Scalar(a), Node::Scalar(b)) => a == b,
            (Node::Sequence(a), Node::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (Node::Mapping(a), Node::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_shape(vb))
            }
            _ => false,
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Node::String(s),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Mapping(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::String(s) => Value::String(s.clone()),
            Node::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Sequence(items) => Value::Array(items.iter().map(Value::from).collect()),
            Node::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
