use crate::batch::translate_strings;
use crate::config::BatchOptions;
use crate::error::MtResult;
use crate::gateway::TranslationGateway;
use crate::languages::validate_language_pair;
use crate::session::{RequestTicket, TranslationSession};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tree_translate::{Dialect, Node, OutputFormat, flatten, parse, serialize, substitute};

/// Some strings kept their original text because the gateway returned too few lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartialResult {
    pub missing: usize,
    pub total: usize,
}

impl fmt::Display for PartialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} strings were not translated and keep their original text",
            self.missing, self.total
        )
    }
}

/// A translated document: same shape as the input, strings replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedTree {
    pub tree: Node,
    /// Strings that kept their original text
    pub missing: usize,
    /// String leaves in the tree
    pub total: usize,
}

impl TranslatedTree {
    pub fn partial(&self) -> Option<PartialResult> {
        (self.missing > 0).then_some(PartialResult {
            missing: self.missing,
            total: self.total,
        })
    }

    pub fn render(&self, format: &OutputFormat, export: bool) -> String {
        serialize(&self.tree, format, export)
    }
}

/// Translates document trees through a gateway.
///
/// Each translator owns a [`TranslationSession`]: starting a translation on it
/// supersedes any translation still running on the same translator.
#[derive(Clone)]
pub struct TreeTranslator {
    gateway: Arc<dyn TranslationGateway>,
    options: BatchOptions,
    session: TranslationSession,
}

impl TreeTranslator {
    pub fn new(gateway: Arc<dyn TranslationGateway>) -> Self {
        TreeTranslator {
            gateway,
            options: BatchOptions::default(),
            session: TranslationSession::new(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Translate every string leaf of `tree` from `from` to `to`.
    ///
    /// Starts a new request on this translator's session.
    pub async fn translate_tree(&self, tree: &Node, from: &str, to: &str) -> MtResult<TranslatedTree> {
        let ticket = self.session.begin();
        self.translate_tree_with_ticket(tree, from, to, &ticket).await
    }

    /// Like [`translate_tree`](Self::translate_tree), under a ticket from another session.
    pub async fn translate_tree_with_ticket(
        &self,
        tree: &Node,
        from: &str,
        to: &str,
        ticket: &RequestTicket,
    ) -> MtResult<TranslatedTree> {
        validate_language_pair(from, to)?;

        let strings = flatten(tree);
        if strings.is_empty() {
            return Ok(TranslatedTree {
                tree: tree.clone(),
                missing: 0,
                total: 0,
            });
        }

        tracing::debug!(
            request = ticket.id(),
            strings = strings.len(),
            from,
            to,
            "Translating tree"
        );
        let outcome = translate_strings(
            self.gateway.as_ref(),
            &strings,
            from,
            to,
            &self.options,
            ticket,
        )
        .await?;

        let rebuilt = substitute(tree, &outcome.translations);
        let translated = TranslatedTree {
            tree: rebuilt.tree,
            missing: outcome.missing + rebuilt.missing,
            total: strings.len(),
        };
        if let Some(partial) = translated.partial() {
            tracing::warn!(missing = partial.missing, total = partial.total, "{}", partial);
        }
        Ok(translated)
    }

    /// Parse `raw` as `dialect` and translate it.
    pub async fn translate_document(
        &self,
        raw: &str,
        dialect: Dialect,
        from: &str,
        to: &str,
    ) -> MtResult<TranslatedTree> {
        let tree = parse(raw, dialect)?;
        self.translate_tree(&tree, from, to).await
    }
}

impl fmt::Debug for TreeTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeTranslator")
            .field("gateway", &self.gateway.provider_name())
            .field("options", &self.options)
            .finish()
    }
}
