//! Best-effort repair of near-JSON text
//!
//! Hand-edited locale files are rarely strict JSON: keys without quotes, single-quoted
//! values, trailing commas, a stray `;` after the closing brace. The functions here rewrite
//! such text with a fixed chain of regex substitutions so that `serde_json` can read it.
//!
//! The chain is order-sensitive; each step sees the output of the previous one:
//!
//! 1. `,` before a closing bracket is dropped
//! 2. identifier keys (`key:`, `'key':`, `"key":`) after `{` or `,` are double-quoted
//! 3. single-quoted values (`: '...'`) become double-quoted
//! 4. `;` before a closing bracket or at the end of input is dropped
//! 5. `,;` / `;,` leftovers before a closing bracket are dropped
//! 6. doubled quotes (`""`, `' '`) collapse to one, unless the pair is an empty string literal
//!
//! [`normalize_loose`] additionally quotes bare words after a colon (`key: Hello,`), which is
//! what the flat key/value mode accepts.
//!
//! None of this is a parser. Input that is already valid JSON skips the chain entirely;
//! anything else is a guess.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static MODULE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+default\s+|(?:const|let|var)\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=\s*)")
        .expect("Invalid module prefix regex")
});

static MODULE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*export\s+default\s+[A-Za-z_$][A-Za-z0-9_$]*\s*;?\s*$")
        .expect("Invalid module suffix regex")
});

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("Invalid trailing comma regex"));

static UNQUOTED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([{,]\s*)(?:"([A-Za-z0-9_]+)"|'([A-Za-z0-9_]+)'|([A-Za-z0-9_]+))(\s*:\s*)"#)
        .expect("Invalid key regex")
});

static SINGLE_QUOTED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*'([^']*)'").expect("Invalid single quote regex"));

static SEMICOLON_BEFORE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";\s*([\]}])").expect("Invalid semicolon regex"));

static SEMICOLON_AT_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*;\s*$").expect("Invalid trailing semicolon regex"));

static SEPARATOR_BEFORE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,]\s*([\]}])").expect("Invalid separator regex"));

static DOUBLED_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*"|'\s*'"#).expect("Invalid doubled quote regex"));

static BARE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":\s*([A-Za-z0-9_\s]*[A-Za-z0-9_])(\s*[,}])").expect("Invalid bare value regex")
});

/// Repair near-JSON text (nested JSON mode).
///
/// Text that is already valid JSON (after dropping a module wrapper) is returned
/// as is; the substitutions only run on text `serde_json` rejects.
pub fn normalize(text: &str) -> String {
    let unwrapped = strip_module_wrapper(text);
    if let Some(json) = already_json(&unwrapped) {
        return json;
    }

    let repaired = repair(&unwrapped);
    tracing::debug!(
        original_len = text.len(),
        repaired_len = repaired.len(),
        "Normalized near-JSON input"
    );
    repaired
}

/// Repair near-JSON text and quote bare words after a colon (flat key/value mode).
///
/// `{ title: Hello world, count: 3 }` becomes `{ "title": "Hello world", "count": "3" }`.
/// Numbers and booleans written bare are read as strings in this mode, unless the
/// whole text is already valid JSON.
pub fn normalize_loose(text: &str) -> String {
    let unwrapped = strip_module_wrapper(text);
    if let Some(json) = already_json(&unwrapped) {
        return json;
    }

    let repaired = repair(&unwrapped);
    BARE_VALUE
        .replace_all(&repaired, ": \"${1}\"${2}")
        .into_owned()
}

/// `text` itself if it is valid JSON, or without its trailing `;` if that makes it valid.
fn already_json(text: &str) -> Option<String> {
    let is_json = |candidate: &str| serde_json::from_str::<Value>(candidate).is_ok();
    if is_json(text) {
        return Some(text.to_string());
    }
    let trimmed = text.trim_end();
    trimmed
        .strip_suffix(';')
        .map(str::trim_end)
        .filter(|candidate| is_json(candidate))
        .map(str::to_string)
}

/// The substitution chain, in order.
fn repair(text: &str) -> String {
    let step = TRAILING_COMMA.replace_all(text, "${1}");
    let step = UNQUOTED_KEY.replace_all(&step, |caps: &Captures| {
        let key = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        format!("{}\"{}\"{}", &caps[1], key, &caps[5])
    });
    let step = SINGLE_QUOTED_VALUE.replace_all(&step, ": \"${1}\"");
    let step = SEMICOLON_BEFORE_CLOSE.replace_all(&step, "${1}");
    let step = SEMICOLON_AT_END.replace_all(&step, "");
    let step = SEPARATOR_BEFORE_CLOSE.replace_all(&step, "${1}");
    collapse_doubled_quotes(&step)
}

/// Drop a `const name =` / `export default` wrapper around an object literal.
pub fn strip_module_wrapper(text: &str) -> String {
    let without_suffix = MODULE_SUFFIX.replace(text, "");
    MODULE_PREFIX.replace(&without_suffix, "").into_owned()
}

/// Collapse `""` / `''` pairs that are not themselves an empty string literal.
///
/// A pair counts as a literal when it sits where a key or value can start
/// (after `{`, `[`, `,`, `:` or at the start) and is followed by a separator
/// or closing bracket.
fn collapse_doubled_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in DOUBLED_QUOTES.find_iter(text) {
        out.push_str(&text[last..m.start()]);

        let before = text[..m.start()].trim_end().chars().last();
        let after = text[m.end()..].trim_start().chars().next();
        let opens_token = matches!(before, None | Some('{' | '[' | ',' | ':'));
        let closes_token = matches!(after, None | Some(',' | ']' | '}' | ':'));

        if opens_token && closes_token {
            out.push_str(m.as_str());
        } else {
            out.push_str(&m.as_str()[..1]);
        }
        last = m.end();
    }

    out.push_str(&text[last..]);
    out
}
