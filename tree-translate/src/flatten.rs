//! Extraction of translatable strings from a tree and substitution of their
//! translations.
//!
//! Both directions walk the tree in the same depth-first order: mapping entries
//! in insertion order, sequence items by index. The n-th string yielded by
//! [`flatten`] is therefore the one replaced by the n-th translation.

use crate::tree::{Mapping, Node};

/// All string leaves of `node`, depth-first.
pub fn flatten(node: &Node) -> Vec<String> {
    let mut strings = Vec::with_capacity(node.string_count());
    collect(node, &mut strings);
    strings
}

fn collect(node: &Node, strings: &mut Vec<String>) {
    match node {
        Node::String(s) => strings.push(s.clone()),
        Node::Scalar(_) => {}
        Node::Sequence(items) => items.iter().for_each(|item| collect(item, strings)),
        Node::Mapping(entries) => entries.iter().for_each(|(_, value)| collect(value, strings)),
    }
}

/// Rebuild `node` with its string leaves replaced from `translations`, starting at
/// `cursor`.
///
/// Returns the new tree and the cursor after the last consumed leaf. Every string
/// leaf advances the cursor by one; a leaf whose index is past the end of
/// `translations` keeps its original text.
pub fn rebuild(node: &Node, translations: &[String], cursor: usize) -> (Node, usize) {
    match node {
        Node::String(original) => {
            let text = translations.get(cursor).unwrap_or(original);
            (Node::String(text.clone()), cursor + 1)
        }
        Node::Scalar(_) => (node.clone(), cursor),
        Node::Sequence(items) => {
            let mut cursor = cursor;
            let mut rebuilt = Vec::with_capacity(items.len());
            for item in items {
                let (node, next) = rebuild(item, translations, cursor);
                rebuilt.push(node);
                cursor = next;
            }
            (Node::Sequence(rebuilt), cursor)
        }
        Node::Mapping(entries) => {
            let mut cursor = cursor;
            let mut rebuilt = Mapping::new();
            for (key, value) in entries {
                let (node, next) = rebuild(value, translations, cursor);
                rebuilt.insert(key.clone(), node);
                cursor = next;
            }
            (Node::Mapping(rebuilt), cursor)
        }
    }
}

/// A rebuilt tree and the number of leaves that fell back to their original text.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebuilt {
    pub tree: Node,
    pub missing: usize,
}

/// Substitute `translations` into `node` from the first leaf on.
pub fn substitute(node: &Node, translations: &[String]) -> Rebuilt {
    let (tree, consumed) = rebuild(node, translations, 0);
    Rebuilt {
        tree,
        missing: consumed.saturating_sub(translations.len()),
    }
}
