use crate::Dialect;
use crate::error::{FormatError, FormatResult};
use crate::normalize::{normalize, normalize_loose};
use crate::tree::Node;
use serde_json::Value;

/// Parse nested JSON (or a near-JSON object literal) into a document tree.
pub fn parse_json(raw: &str) -> FormatResult<Node> {
    from_repaired(normalize(raw), Dialect::Json)
}

/// Parse flat key/value JSON, where `key: some words,` reads as a string.
pub fn parse_simple_json(raw: &str) -> FormatResult<Node> {
    from_repaired(normalize_loose(raw), Dialect::SimpleJson)
}

fn from_repaired(text: String, dialect: Dialect) -> FormatResult<Node> {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(Node::from(value)),
        Err(e) => Err(FormatError::Invalid {
            dialect,
            message: e.to_string(),
            text,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Mapping, Scalar};

    #[test]
    fn test_parse_nested() {
        let node = parse_json(r#"{ "a": "Hi", "b": { "c": "Bye" } }"#).unwrap();
        assert_eq!(
            node,
            Node::Mapping(
                Mapping::new()
                    .with_entry("a", Node::string("Hi"))
                    .with_entry("b", Node::Mapping(Mapping::new().with_entry("c", Node::string("Bye"))))
            )
        );
    }

    #[test]
    fn test_parse_repaired_object_literal() {
        let node = parse_json("{ title: 'Home', count: 2, ok: true, items: [\"a\", \"b\",], }").unwrap();
        match node {
            Node::Mapping(entries) => {
                assert_eq!(entries.get("title"), Some(&Node::string("Home")));
                assert_eq!(entries.get("count"), Some(&Node::integer(2)));
                assert_eq!(entries.get("ok"), Some(&Node::bool(true)));
                assert_eq!(
                    entries.keys().collect::<Vec<_>>(),
                    vec!["title", "count", "ok", "items"]
                );
            }
            other => panic!("Expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_json_reads_bare_words_as_strings() {
        let node = parse_simple_json("{ login: Log in, count: 3 }").unwrap();
        assert_eq!(
            node,
            Node::Mapping(
                Mapping::new()
                    .with_entry("login", Node::string("Log in"))
                    .with_entry("count", Node::string("3"))
            )
        );
    }

    #[test]
    fn test_nested_json_keeps_null() {
        let node = parse_json(r#"{"a": null}"#).unwrap();
        assert_eq!(
            node,
            Node::Mapping(Mapping::new().with_entry("a", Node::Scalar(Scalar::Null)))
        );
    }

    #[test]
    fn test_invalid_reports_normalized_text() {
        let err = parse_json("{ title: Hello }").unwrap_err();
        match err {
            FormatError::Invalid {
                dialect, text, ..
            } => {
                assert_eq!(dialect, Dialect::Json);
                assert_eq!(text, r#"{ "title": Hello }"#);
            }
            other => panic!("Expected invalid input error, got {:?}", other),
        }
    }
}
