use crate::Dialect;
use crate::error::{FormatError, FormatResult};
use crate::tree::{Mapping, Node, Scalar};
use serde_json::Number;

/// A parser for PHP array literals such as Laravel/ThinkPHP language files.
///
/// Only the literal syntax is understood: `[ key => value, ... ]` with quoted or
/// identifier keys, quoted strings, nested arrays, numbers, booleans and `null`.
/// Nothing is evaluated. A `<?php` open tag, a `?>` close tag, a leading `return`
/// and a trailing `;` are accepted around the array.
///
/// The parser walks a single cursor forward through the source and never backs up.
pub struct PhpArrayParser<'a> {
    input: &'a str,
    position: usize,
    /// Offset of `input` inside the text the user submitted, for error messages
    base: usize,
}

/// What a value position held before we know whether it is a key or a value
enum Term {
    Quoted(String),
    Bare(String),
    Array(Node),
}

impl Term {
    fn into_node(self) -> Node {
        match self {
            Term::Quoted(s) => Node::String(s),
            Term::Bare(raw) => coerce_bare(&raw),
            Term::Array(node) => node,
        }
    }
}

/// Parse a PHP array literal into a document tree.
pub fn parse_php_array(source: &str) -> FormatResult<Node> {
    let (base, body) = strip_php_wrapper(source);
    if body.is_empty() {
        return Err(FormatError::Empty);
    }
    PhpArrayParser::new(body, base).parse_document()
}

/// Remove `<?php`, `?>`, a leading `return` and a trailing `;`.
///
/// Returns the remaining body together with its byte offset in `source`.
fn strip_php_wrapper(source: &str) -> (usize, &str) {
    let mut body = source.trim_start();
    if let Some(rest) = body.strip_prefix("<?php") {
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_prefix("return") {
        if rest.starts_with(|c: char| c.is_whitespace() || c == '[') {
            body = rest.trim_start();
        }
    }
    let base = source.len() - body.len();

    body = body.trim_end();
    if let Some(rest) = body.strip_suffix("?>") {
        body = rest.trim_end();
    }
    if let Some(rest) = body.strip_suffix(';') {
        body = rest.trim_end();
    }
    (base, body)
}

impl<'a> PhpArrayParser<'a> {
    pub fn new(input: &'a str, base: usize) -> Self {
        PhpArrayParser {
            input,
            position: 0,
            base,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.input[self.position..].starts_with(pattern)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn error_at(&self, position: usize, message: impl Into<String>) -> FormatError {
        FormatError::Syntax {
            dialect: Dialect::Php,
            offset: self.base + position,
            message: message.into(),
        }
    }

    /// Skip whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) {
        loop {
            if let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
                self.position += c.len_utf8();
            } else if self.starts_with("//") {
                self.position = self.input[self.position..]
                    .find('\n')
                    .map_or(self.input.len(), |i| self.position + i);
            } else if self.starts_with("/*") {
                // An unterminated block comment swallows the rest of the input
                self.position = self.input[self.position + 2..]
                    .find("*/")
                    .map_or(self.input.len(), |i| self.position + 2 + i + 2);
            } else {
                break;
            }
        }
    }

    pub fn parse_document(&mut self) -> FormatResult<Node> {
        self.skip_trivia();
        if self.peek() != Some('[') {
            // Bare entry list without the surrounding brackets
            return self.parse_entries();
        }

        let node = self.parse_array()?;
        self.skip_trivia();
        if !self.at_end() {
            return Err(self.error_at(self.position, "unexpected content after the array"));
        }
        Ok(node)
    }

    /// Parses a `[...]` array starting at the cursor.
    ///
    /// The matching `]` is located first by counting bracket depth (brackets inside
    /// strings and comments do not count); the text between the brackets is then
    /// parsed as an entry list by a parser of its own.
    fn parse_array(&mut self) -> FormatResult<Node> {
        let open = self.position;
        let close = self.find_matching_bracket(open)?;

        let inner = &self.input[open + 1..close];
        let node = PhpArrayParser::new(inner, self.base + open + 1).parse_entries()?;

        self.position = close + 1;
        Ok(node)
    }

    fn find_matching_bracket(&self, open: usize) -> FormatResult<usize> {
        let bytes = self.input.as_bytes();
        let mut depth = 0usize;
        let mut i = open;

        while i < bytes.len() {
            match bytes[i] {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                quote @ (b'\'' | b'"') => {
                    let start = i;
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return Err(self.error_at(start, "unterminated string"));
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                    continue;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    match self.input[i + 2..].find("*/") {
                        Some(end) => i += 2 + end + 1,
                        None => break,
                    }
                }
                _ => {}
            }
            i += 1;
        }

        Err(self.error_at(open, "unmatched '['"))
    }

    /// `entry (',' entry)* ','?` up to the end of this parser's input.
    fn parse_entries(&mut self) -> FormatResult<Node> {
        let mut entries: Vec<(usize, Option<String>, Node)> = Vec::new();

        loop {
            self.skip_trivia();
            if self.at_end() {
                break;
            }

            let start = self.position;
            let (key, value) = self.parse_entry()?;
            entries.push((start, key, value));

            self.skip_trivia();
            match self.peek() {
                None => break,
                Some(',') => self.position += 1,
                Some(c) => {
                    return Err(self.error_at(
                        self.position,
                        format!("expected ',' between array entries, found '{}'", c),
                    ));
                }
            }
        }

        self.build_array(entries)
    }

    /// `key => value` or a bare `value`.
    fn parse_entry(&mut self) -> FormatResult<(Option<String>, Node)> {
        let start = self.position;
        let first = self.parse_term()?;

        self.skip_trivia();
        if !self.starts_with("=>") {
            return Ok((None, first.into_node()));
        }
        self.position += 2;
        self.skip_trivia();

        let key = match first {
            Term::Quoted(key) => key,
            Term::Bare(key) if is_identifier(&key) => key,
            _ => return Err(self.error_at(start, "array keys must be strings or identifiers")),
        };
        let value = self.parse_term()?.into_node();
        Ok((Some(key), value))
    }

    fn parse_term(&mut self) -> FormatResult<Term> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => self.parse_quoted(quote).map(Term::Quoted),
            Some('[') => self.parse_array().map(Term::Array),
            Some(_) => self.parse_bare().map(Term::Bare),
            None => Err(self.error_at(self.position, "expected a value")),
        }
    }

    /// A single or double quoted string. A backslash makes the next character
    /// literal: `'It\'s'` reads as `It's`.
    fn parse_quoted(&mut self, quote: char) -> FormatResult<String> {
        let start = self.position;
        let mut chars = self.input[start + 1..].char_indices();
        let mut value = String::new();

        while let Some((offset, c)) = chars.next() {
            if c == quote {
                self.position = start + 1 + offset + c.len_utf8();
                return Ok(value);
            }
            if c == '\\' {
                match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                }
            } else {
                value.push(c);
            }
        }

        Err(self.error_at(start, "unterminated string"))
    }

    /// Everything up to the next `,`, `]`, newline, `=>` or comment, trimmed.
    fn parse_bare(&mut self) -> FormatResult<String> {
        let start = self.position;
        while let Some(c) = self.peek() {
            if matches!(c, ',' | ']' | '\n')
                || self.starts_with("=>")
                || self.starts_with("//")
                || self.starts_with("/*")
            {
                break;
            }
            self.position += c.len_utf8();
        }

        let raw = self.input[start..self.position].trim();
        if raw.is_empty() {
            return Err(self.error_at(start, "expected a value"));
        }
        Ok(raw.to_string())
    }

    /// All-bare arrays are lists. Arrays with at least one explicit key are maps,
    /// bare values in them get the next integer key the way PHP assigns them.
    fn build_array(&self, entries: Vec<(usize, Option<String>, Node)>) -> FormatResult<Node> {
        if entries.iter().all(|(_, key, _)| key.is_none()) {
            return Ok(Node::Sequence(
                entries.into_iter().map(|(_, _, value)| value).collect(),
            ));
        }

        let mut mapping = Mapping::new();
        // None once an explicit key has used up the index range
        let mut next_index: Option<i64> = Some(0);
        for (start, key, value) in entries {
            let key = match key {
                Some(key) => {
                    if let Ok(index) = key.parse::<i64>() {
                        next_index = next_index
                            .and_then(|next| index.checked_add(1).map(|after| next.max(after)));
                    }
                    key
                }
                None => {
                    let index = next_index
                        .ok_or_else(|| self.error_at(start, "next array index is out of range"))?;
                    next_index = index.checked_add(1);
                    index.to_string()
                }
            };
            mapping.insert(key, value);
        }
        Ok(Node::Mapping(mapping))
    }
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_integer(text: &str) -> bool {
    is_digits(text.strip_prefix('-').unwrap_or(text))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// `1.5`, `-0.25`, `1e20`, `1.5e-7`, `2E+3`
fn is_float(text: &str) -> bool {
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (text, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, fraction)) => is_integer(whole) && is_digits(fraction),
        None => exponent.is_some() && is_integer(mantissa),
    };
    let exponent_ok = exponent.is_none_or(|exponent| {
        is_digits(exponent.strip_prefix(['+', '-']).unwrap_or(exponent))
    });
    mantissa_ok && exponent_ok
}

/// Unquoted values: numbers, `true`, `false` and `null` become scalars, anything
/// else (constants, expressions) is kept as text.
fn coerce_bare(raw: &str) -> Node {
    let number = if is_integer(raw) {
        raw.parse::<i64>()
            .map(Number::from)
            .or_else(|_| raw.parse::<u64>().map(Number::from))
            .ok()
    } else if is_float(raw) {
        raw.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        None
    };

    match (raw, number) {
        (_, Some(n)) => Node::Scalar(Scalar::Number(n)),
        ("true", _) => Node::bool(true),
        ("false", _) => Node::bool(false),
        ("null", _) => Node::Scalar(Scalar::Null),
        _ => Node::String(raw.to_string()),
    }
}
