//! Structured-text parsing for translation.
//!
//! Locale files come in several shapes: plain text, JSON (often hand-written and not
//! quite valid), and PHP array literals. This crate turns each of them into one
//! [`Node`] tree, pulls the translatable strings out of it in a fixed order, puts
//! translations back in the same order, and renders the result in any of the
//! supported output formats.
//!
//! ```
//! use tree_translate::{Dialect, OutputFormat, flatten, parse, serialize, substitute};
//!
//! let tree = parse("return ['x' => 'Hello', 'y' => ['z' => 'World']];", Dialect::Php).unwrap();
//! assert_eq!(flatten(&tree), vec!["Hello", "World"]);
//!
//! let translated = substitute(&tree, &["你好".to_string(), "世界".to_string()]);
//! assert_eq!(
//!     serialize(&translated.tree, &OutputFormat::Php, false),
//!     "<?php return ['x' => '你好', 'y' => ['z' => '世界']]; ?>"
//! );
//! ```

pub mod dialect;
pub mod error;
pub mod flatten;
pub mod json;
pub mod normalize;
pub mod php;
pub mod serialize;
pub mod tree;

pub use dialect::{Dialect, sample_input};
pub use error::{FormatError, FormatResult};
pub use flatten::{Rebuilt, flatten, rebuild, substitute};
pub use json::{parse_json, parse_simple_json};
pub use normalize::{normalize, normalize_loose};
pub use php::{PhpArrayParser, parse_php_array};
pub use serialize::{OutputFormat, serialize};
pub use tree::{Mapping, Node, Scalar};

/// Parse `raw` as `dialect`.
///
/// Whitespace-only input is rejected for every dialect.
pub fn parse(raw: &str, dialect: Dialect) -> FormatResult<Node> {
    if raw.trim().is_empty() {
        return Err(FormatError::Empty);
    }
    match dialect {
        Dialect::Text => Ok(parse_text(raw)),
        Dialect::Json => parse_json(raw),
        Dialect::SimpleJson => parse_simple_json(raw),
        Dialect::Php => parse_php_array(raw),
    }
}

/// One string leaf per line.
pub fn parse_text(raw: &str) -> Node {
    Node::Sequence(raw.lines().map(Node::string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        for dialect in Dialect::ALL {
            assert_eq!(parse("  \n\t", dialect), Err(FormatError::Empty));
        }
    }

    #[test]
    fn test_parse_text_lines() {
        let tree = parse("Hello World!\n\nWelcome.\n", Dialect::Text).unwrap();
        assert_eq!(
            tree,
            Node::Sequence(vec![
                Node::string("Hello World!"),
                Node::string(""),
                Node::string("Welcome."),
            ])
        );
        assert_eq!(
            serialize(&tree, &OutputFormat::Text, false),
            "Hello World!\n\nWelcome."
        );
    }

    #[test]
    fn test_parse_samples() {
        for dialect in Dialect::ALL {
            let tree = parse(sample_input(dialect), dialect).unwrap();
            assert!(tree.string_count() > 0, "{} sample has no strings", dialect);
        }
    }

    #[test]
    fn test_error_names_dialect() {
        let err = parse("{ a: b c d", Dialect::Json).unwrap_err();
        assert_eq!(err.dialect(), Some(Dialect::Json));
        assert!(err.to_string().starts_with("Invalid JSON input"));

        let err = parse("['a' => 'b'", Dialect::Php).unwrap_err();
        assert_eq!(err.dialect(), Some(Dialect::Php));
    }
}
