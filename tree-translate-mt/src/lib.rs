//! Machine translation for tree-translate documents
//!
//! This crate sends the strings of a parsed document to a translation provider
//! and rebuilds the document with the translations in place.
//!
//! # Workflow Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tree_translate::{Dialect, OutputFormat, parse};
//! use tree_translate_mt::{BatchOptions, ProxyGateway, TreeTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Parse the document
//!     let tree = parse("return ['title' => 'Home', 'menu' => ['about' => 'About us']];", Dialect::Php)?;
//!
//!     // 2. Translate its strings, ten per request
//!     let translator = TreeTranslator::new(Arc::new(ProxyGateway::from_env()?))
//!         .with_options(BatchOptions::for_dialect(Dialect::Php));
//!     let translated = translator.translate_tree(&tree, "en", "zh").await?;
//!
//!     // 3. Render it in the original format
//!     println!("{}", translated.render(&OutputFormat::Php, false));
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod gateway;
pub mod languages;
pub mod mock;
pub mod pipeline;
pub mod proxy;
pub mod session;


// Re-export main types for convenient access
pub use batch::{BatchOutcome, translate_strings};
pub use config::{BatchOptions, GatewayConfig};
pub use error::{GatewayError, GatewayErrorKind, MtError, MtResult};
pub use gateway::TranslationGateway;
pub use languages::{LANGUAGES, Language, language_name, validate_language_pair};
pub use mock::{MockCall, MockGateway, MockMode};
pub use pipeline::{PartialResult, TranslatedTree, TreeTranslator};
pub use proxy::ProxyGateway;
pub use session::{RequestTicket, TranslationSession};
