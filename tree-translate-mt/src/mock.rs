//! Mock translation gateway for testing
//!
//! Deterministic, network-free gateway for exercising the pipeline. Every call is
//! recorded together with the (tokio) instant it was made at, so tests can check
//! chunking and pacing.
//!
//! # Example
//!
//! ```ignore
//! use tree_translate_mt::{MockGateway, MockMode, TranslationGateway};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockGateway::new(MockMode::Suffix);
//!     let lines = mock.translate_batch("hello\nworld", "en", "fra").await.unwrap();
//!     assert_eq!(lines, vec!["hello_fra", "world_fra"]);
//! }
//! ```

use crate::error::GatewayError;
use crate::gateway::TranslationGateway;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target code: "hello" → "hello_fra"
    Suffix,

    /// (line, target) → translation, falling back to suffix mode
    Mappings(HashMap<(String, String), String>),

    /// Reverse the words of each line
    Reorder,

    /// Fail every call with this error
    Error(GatewayError),

    /// Return every line unchanged
    NoOp,

    /// Suffix mode, but the last line of each call is dropped
    DropLast,
}

/// One recorded gateway call
#[derive(Debug, Clone)]
pub struct MockCall {
    pub query: String,
    pub from: String,
    pub to: String,
    pub at: Instant,
}

impl MockCall {
    pub fn line_count(&self) -> usize {
        self.query.split('\n').count()
    }
}

/// Gateway that translates locally according to a [`MockMode`].
///
/// Clones share the call log.
#[derive(Debug, Clone)]
pub struct MockGateway {
    mode: MockMode,
    /// Simulated latency per call
    delay: Duration,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGateway {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, Duration::ZERO)
    }

    /// Create a MockGateway whose calls take `delay` to answer
    pub fn with_delay(mode: MockMode, delay: Duration) -> Self {
        Self {
            mode,
            delay,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Calls made so far, oldest first
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<MockCall>> {
        // A panic while holding the lock cannot leave the log half-written
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn translate_line(&self, line: &str, to: &str) -> String {
        match &self.mode {
            MockMode::Suffix | MockMode::DropLast | MockMode::Error(_) => {
                format!("{}_{}", line, to)
            }
            MockMode::Mappings(map) => map
                .get(&(line.to_string(), to.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", line, to)),
            MockMode::Reorder => line.split_whitespace().rev().collect::<Vec<_>>().join(" "),
            MockMode::NoOp => line.to_string(),
        }
    }
}

#[async_trait]
impl TranslationGateway for MockGateway {
    async fn translate_batch(
        &self,
        query: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, GatewayError> {
        self.lock_calls().push(MockCall {
            query: query.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            at: Instant::now(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let MockMode::Error(error) = &self.mode {
            return Err(error.clone());
        }

        let mut lines: Vec<String> = query
            .split('\n')
            .map(|line| self.translate_line(line, to))
            .collect();
        if matches!(self.mode, MockMode::DropLast) {
            lines.pop();
        }
        Ok(lines)
    }

    fn provider_name(&self) -> &str {
        "Mock gateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayErrorKind;

    #[tokio::test]
    async fn test_suffix_translates_each_line() {
        let mock = MockGateway::new(MockMode::Suffix);
        let lines = mock.translate_batch("hello\nworld", "en", "fra").await.unwrap();
        assert_eq!(lines, vec!["hello_fra", "world_fra"]);
    }

    #[tokio::test]
    async fn test_mapping_with_fallback() {
        let mut map = HashMap::new();
        map.insert(("Hello".to_string(), "zh".to_string()), "你好".to_string());

        let mock = MockGateway::new(MockMode::Mappings(map));
        let lines = mock.translate_batch("Hello\nBye", "en", "zh").await.unwrap();
        assert_eq!(lines, vec!["你好", "Bye_zh"]);
    }

    #[tokio::test]
    async fn test_reorder() {
        let mock = MockGateway::new(MockMode::Reorder);
        let lines = mock
            .translate_batch("one two three\nsingle", "en", "jp")
            .await
            .unwrap();
        assert_eq!(lines, vec!["three two one", "single"]);
    }

    #[tokio::test]
    async fn test_noop() {
        let mock = MockGateway::new(MockMode::NoOp);
        let lines = mock.translate_batch("Hello world", "en", "de").await.unwrap();
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[tokio::test]
    async fn test_drop_last() {
        let mock = MockGateway::new(MockMode::DropLast);
        let lines = mock.translate_batch("a\nb\nc", "en", "de").await.unwrap();
        assert_eq!(lines, vec!["a_de", "b_de"]);
    }

    #[tokio::test]
    async fn test_error_mode() {
        let error = GatewayError::from_provider("54004", "Insufficient balance");
        let mock = MockGateway::new(MockMode::Error(error.clone()));
        let result = mock.translate_batch("hello", "en", "de").await;
        assert_eq!(result, Err(error));
        assert_eq!(
            result.unwrap_err().kind,
            GatewayErrorKind::QuotaExceeded
        );
        // Failed calls are still recorded
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_calls_are_shared_between_clones() {
        let mock = MockGateway::new(MockMode::Suffix);
        let clone = mock.clone();
        clone.translate_batch("a\nb", "auto", "zh").await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "a\nb");
        assert_eq!(calls[0].from, "auto");
        assert_eq!(calls[0].to, "zh");
        assert_eq!(calls[0].line_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_adds_latency() {
        let mock = MockGateway::with_delay(MockMode::Suffix, Duration::from_millis(50));
        let start = Instant::now();
        mock.translate_batch("hello", "en", "fra").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_provider_name() {
        let mock = MockGateway::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock gateway");
    }
}
