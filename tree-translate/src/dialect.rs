use crate::json::parse_json;
use crate::normalize::strip_module_wrapper;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// One translatable string per line
    Text,
    /// Nested JSON, or a JS object literal close enough to it
    Json,
    /// Flat key/value JSON where bare words after a colon are strings
    SimpleJson,
    /// `return [ 'key' => 'value' ];` array literal
    Php,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Text,
        Dialect::Json,
        Dialect::SimpleJson,
        Dialect::Php,
    ];

    /// Guess the dialect of `raw`.
    ///
    /// `<?php` and `return [` mean PHP. Text that starts with `{` or `[`, possibly
    /// behind a `const x =` / `export default` prefix, is JSON when it parses as
    /// JSON, even if a string value contains `=>`. Otherwise an `=>` in text that
    /// starts like an array or a quoted key means PHP. Anything else is plain text.
    /// [`Dialect::SimpleJson`] is never guessed since it differs from JSON only in
    /// how leniently values are read.
    pub fn detect(raw: &str) -> Dialect {
        if raw.contains("<?php") || raw.contains("return [") {
            return Dialect::Php;
        }

        let unwrapped = strip_module_wrapper(raw);
        let first = unwrapped.trim_start().chars().next();
        let json_like = matches!(first, Some('{' | '['));
        if json_like && parse_json(raw).is_ok() {
            return Dialect::Json;
        }
        if raw.contains("=>") && matches!(first, Some('[' | '\'' | '"')) {
            return Dialect::Php;
        }
        if json_like {
            Dialect::Json
        } else {
            Dialect::Text
        }
    }

    /// Number of strings sent per gateway call.
    pub fn default_chunk_size(self) -> usize {
        match self {
            Dialect::SimpleJson => 8,
            _ => 10,
        }
    }

    /// Name used on the command line and in the web API
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Text => "text",
            Dialect::Json => "json",
            Dialect::SimpleJson => "simple-json",
            Dialect::Php => "php",
        }
    }

    /// A representative input for this dialect
    pub fn sample_input(self) -> &'static str {
        match self {
            Dialect::Text => TEXT_SAMPLE,
            Dialect::Json => JSON_SAMPLE,
            Dialect::SimpleJson => SIMPLE_JSON_SAMPLE,
            Dialect::Php => PHP_SAMPLE,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Text => "plain text",
            Dialect::Json => "JSON",
            Dialect::SimpleJson => "flat JSON",
            Dialect::Php => "PHP array",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown dialect '{}'. Expected one of: text, json, simple-json, php",
                    s
                )
            })
    }
}

/// Example input for `dialect`, as shown by `--sample`.
pub fn sample_input(dialect: Dialect) -> &'static str {
    dialect.sample_input()
}

const TEXT_SAMPLE: &str = "This is a translation program that can translate various languages.
It supports text translation in multiple formats.
Hello World!
Welcome to our application.";

const SIMPLE_JSON_SAMPLE: &str = r#"{
  "welcome_message": "Welcome to our website",
  "login_button": "Login",
  "register_button": "Register",
  "home_title": "Home Page",
  "about_us": "About Us",
  "contact_info": "Contact Information",
  "search_placeholder": "Search...",
  "submit_button": "Submit",
  "cancel_button": "Cancel"
}"#;

const JSON_SAMPLE: &str = r#"{
  "talented": "You're good!",
  "mode": {
    "title": "Mode",
    "game_mode": {
      "title": "Game Mode",
      "single": "Single",
      "multi": "Multi"
    }
  },
  "navigation": {
    "header": {
      "home": "Home",
      "about": "About Us",
      "contact": "Contact"
    },
    "footer": {
      "copyright": "All rights reserved",
      "privacy": "Privacy Policy"
    }
  }
}"#;

const PHP_SAMPLE: &str = "<?php
return [
    'page_common' => [
        'login_welcome_title' => 'Welcome to',
        'error_text' => 'Abnormal error',
        'input_empty_tips' => 'Please enter data',
        'data_error' => 'Data error',
        'confirm_name' => 'Confirm',
        'cancel_name' => 'Cancel'
    ],
    'error' => 'Exception Error',
    'operate_fail' => 'Operation Failed',
    'operate_success' => 'Operation Succeeded'
];
?>";
