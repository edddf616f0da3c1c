use crate::tree::{Node, Scalar};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column limit for the single-line PHP form
const PHP_INLINE_WIDTH: usize = 80;
const PHP_INDENT: &str = "    ";

/// Output format for a translated tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty JSON, two-space indentation
    Json,
    /// `const <name> = {...};` JavaScript module snippet
    Module { name: String },
    /// `<?php return [...]; ?>` source snippet
    Php,
    /// Leaves one per line
    Text,
}

/// Render `tree` in `format`.
///
/// `export` appends `export default <name>;` to module output and is ignored by
/// the other formats.
pub fn serialize(tree: &Node, format: &OutputFormat, export: bool) -> String {
    match format {
        OutputFormat::Json => to_json(tree),
        OutputFormat::Module { name } => {
            let mut out = format!("const {} = {};", name, to_json(tree));
            if export {
                out.push_str(&format!("\n\nexport default {};", name));
            }
            out
        }
        OutputFormat::Php => to_php(tree),
        OutputFormat::Text => to_text(tree),
    }
}

fn to_json(tree: &Node) -> String {
    format!("{:#}", Value::from(tree))
}

fn to_text(tree: &Node) -> String {
    let mut lines = Vec::new();
    collect_leaves(tree, &mut lines);
    lines.join("\n")
}

fn collect_leaves(node: &Node, lines: &mut Vec<String>) {
    match node {
        Node::String(s) => lines.push(s.clone()),
        Node::Scalar(scalar) => lines.push(scalar.to_string()),
        Node::Sequence(items) => items.iter().for_each(|item| collect_leaves(item, lines)),
        Node::Mapping(entries) => entries
            .iter()
            .for_each(|(_, value)| collect_leaves(value, lines)),
    }
}

/// `<?php return [...]; ?>` on one line when it fits, else one entry per line.
fn to_php(tree: &Node) -> String {
    let inline = format!("<?php return {}; ?>", php_inline(tree));
    if inline.chars().count() <= PHP_INLINE_WIDTH {
        return inline;
    }

    match tree {
        Node::Sequence(_) | Node::Mapping(_) => {
            let body = php_entries(tree, 1);
            if body.is_empty() {
                "<?php\nreturn [];\n?>".to_string()
            } else {
                format!("<?php\nreturn [\n{}\n];\n?>", body)
            }
        }
        leaf => format!("<?php\nreturn {};\n?>", php_inline(leaf)),
    }
}

fn php_inline(node: &Node) -> String {
    match node {
        Node::String(s) => php_quote(s),
        Node::Scalar(scalar) => php_scalar(scalar),
        Node::Sequence(items) => {
            let items: Vec<String> = items.iter().map(php_inline).collect();
            format!("[{}]", items.join(", "))
        }
        Node::Mapping(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{} => {}", php_quote(key), php_inline(value)))
                .collect();
            format!("[{}]", entries.join(", "))
        }
    }
}

/// The entries of an array, one per line at `depth`, without the brackets.
fn php_entries(node: &Node, depth: usize) -> String {
    let indent = PHP_INDENT.repeat(depth);
    let render = |key: Option<&str>, value: &Node| {
        let prefix = match key {
            Some(key) => format!("{}{} => ", indent, php_quote(key)),
            None => indent.clone(),
        };
        match value {
            Node::Sequence(items) if !items.is_empty() => {
                format!("{}[\n{}\n{}]", prefix, php_entries(value, depth + 1), indent)
            }
            Node::Mapping(entries) if !entries.is_empty() => {
                format!("{}[\n{}\n{}]", prefix, php_entries(value, depth + 1), indent)
            }
            leaf => format!("{}{}", prefix, php_inline(leaf)),
        }
    };

    let lines: Vec<String> = match node {
        Node::Sequence(items) => items.iter().map(|item| render(None, item)).collect(),
        Node::Mapping(entries) => entries
            .iter()
            .map(|(key, value)| render(Some(key), value))
            .collect(),
        _ => Vec::new(),
    };
    lines.join(",\n")
}

fn php_scalar(scalar: &Scalar) -> String {
    scalar.to_string()
}

/// Single-quoted PHP string literal; only `\` and `'` need escaping.
fn php_quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::php::parse_php_array;
    use crate::tree::Mapping;
    use crate::{Dialect, flatten, parse};

    fn sample_tree() -> Node {
        Node::Mapping(
            Mapping::new()
                .with_entry("title", Node::string("Home"))
                .with_entry("count", Node::integer(3))
                .with_entry(
                    "nested",
                    Node::Mapping(
                        Mapping::new()
                            .with_entry("items", Node::Sequence(vec![Node::string("a"), Node::bool(true)]))
                            .with_entry("none", Node::Scalar(Scalar::Null)),
                    ),
                ),
        )
    }

    #[test]
    fn test_json_pretty() {
        let tree = Node::Mapping(
            Mapping::new()
                .with_entry("b", Node::string("x"))
                .with_entry("a", Node::Sequence(vec![Node::integer(1)])),
        );
        assert_eq!(
            serialize(&tree, &OutputFormat::Json, false),
            "{\n  \"b\": \"x\",\n  \"a\": [\n    1\n  ]\n}"
        );
    }

    #[test]
    fn test_module() {
        let tree = Node::Mapping(Mapping::new().with_entry("hello", Node::string("你好")));
        let format = OutputFormat::Module {
            name: "zh".to_string(),
        };
        assert_eq!(
            serialize(&tree, &format, false),
            "const zh = {\n  \"hello\": \"你好\"\n};"
        );
        assert_eq!(
            serialize(&tree, &format, true),
            "const zh = {\n  \"hello\": \"你好\"\n};\n\nexport default zh;"
        );
    }

    #[test]
    fn test_php_single_line() {
        let tree = parse_php_array("return ['x' => 'Hello', 'y' => ['z' => 'World']];").unwrap();
        assert_eq!(
            serialize(&tree, &OutputFormat::Php, false),
            "<?php return ['x' => 'Hello', 'y' => ['z' => 'World']]; ?>"
        );
    }

    #[test]
    fn test_php_multi_line() {
        let tree = parse_php_array(
            "['page_common' => ['login_welcome_title' => 'Welcome to', 'error_text' => 'Abnormal error'], 'list' => ['one', 2], 'error' => 'Exception Error']",
        )
        .unwrap();
        let expected = "<?php
return [
    'page_common' => [
        'login_welcome_title' => 'Welcome to',
        'error_text' => 'Abnormal error'
    ],
    'list' => [
        'one',
        2
    ],
    'error' => 'Exception Error'
];
?>";
        assert_eq!(serialize(&tree, &OutputFormat::Php, false), expected);
    }

    #[test]
    fn test_php_escaping() {
        let tree = Node::Mapping(Mapping::new().with_entry("it's", Node::string("back\\slash 'q'")));
        let php = serialize(&tree, &OutputFormat::Php, false);
        assert_eq!(php, r"<?php return ['it\'s' => 'back\\slash \'q\'']; ?>");
        assert_eq!(parse_php_array(&php).unwrap(), tree);
    }

    #[test]
    fn test_text() {
        assert_eq!(
            serialize(&sample_tree(), &OutputFormat::Text, true),
            "Home\n3\na\ntrue\nnull"
        );
    }

    #[test]
    fn test_round_trip() {
        let tree = sample_tree();

        let json = serialize(&tree, &OutputFormat::Json, false);
        assert_eq!(parse(&json, Dialect::Json).unwrap(), tree);

        let module = serialize(&tree, &OutputFormat::Module { name: "en".to_string() }, true);
        assert_eq!(parse(&module, Dialect::Json).unwrap(), tree);

        let php = serialize(&tree, &OutputFormat::Php, false);
        assert_eq!(parse(&php, Dialect::Php).unwrap(), tree);
    }

    #[test]
    fn test_php_round_trip_keeps_exponent_floats() {
        let tree = parse(r#"{"big": 1e20, "small": 1.5e-7, "t": "x"}"#, Dialect::Json).unwrap();
        let php = serialize(&tree, &OutputFormat::Php, false);

        let back = parse(&php, Dialect::Php).unwrap();
        assert_eq!(back, tree);
        assert_eq!(flatten(&back), vec!["x"]);
    }

    #[test]
    fn test_round_trip_long_php() {
        let long = "A considerably longer sentence that forces the multi-line layout";
        let tree = Node::Mapping(
            Mapping::new()
                .with_entry("first", Node::string(long))
                .with_entry("second", Node::Sequence(vec![Node::string(long), Node::integer(-2)])),
        );
        let php = serialize(&tree, &OutputFormat::Php, false);
        assert!(php.starts_with("<?php\nreturn [\n"));
        assert_eq!(parse(&php, Dialect::Php).unwrap(), tree);
    }

    #[test]
    fn test_output_format_serde() {
        let format: OutputFormat =
            serde_json::from_str(r#"{"format": "module", "name": "fra"}"#).unwrap();
        assert_eq!(
            format,
            OutputFormat::Module {
                name: "fra".to_string()
            }
        );
        let format: OutputFormat = serde_json::from_str(r#"{"format": "php"}"#).unwrap();
        assert_eq!(format, OutputFormat::Php);
    }
}
