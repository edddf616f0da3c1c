//! Chunked, paced translation of an ordered list of strings
//!
//! Strings are grouped into chunks of at most `chunk_size` strings and at most
//! `max_query_chars` characters. Each chunk is sent as one newline-joined query,
//! chunks strictly one after another with `pace` between them. The result has the
//! same length and order as the input.
//!
//! Blank strings are never sent. A string spanning several lines is sent as several
//! query lines and its translated lines are joined back with `\n`; its blank lines
//! stay as they are.
//!
//! A chunk whose reply is short does not fail the batch: the strings whose lines
//! did not all come back keep their original text and are counted as missing.

use crate::config::BatchOptions;
use crate::error::{MtError, MtResult};
use crate::gateway::TranslationGateway;
use crate::session::RequestTicket;
use tokio::time::Instant;

/// Translations in input order, and how many strings kept their original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub translations: Vec<String>,
    pub missing: usize,
}

/// One string to send: its lines, and which of them go to the gateway.
#[derive(Debug)]
struct Unit<'a> {
    index: usize,
    lines: Vec<&'a str>,
    sent: Vec<usize>,
}

impl<'a> Unit<'a> {
    fn new(index: usize, text: &'a str) -> Option<Self> {
        let lines: Vec<&str> = text.split('\n').collect();
        let sent: Vec<usize> = (0..lines.len())
            .filter(|&i| !lines[i].trim().is_empty())
            .collect();
        if sent.is_empty() {
            None
        } else {
            Some(Unit { index, lines, sent })
        }
    }

    fn sent_lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.sent.iter().map(|&i| self.lines[i])
    }

    /// Length of this unit's part of the query
    fn query_chars(&self) -> usize {
        self.sent_lines().map(|line| line.chars().count()).sum::<usize>() + self.sent.len() - 1
    }

    fn assemble(&self, translated: Vec<String>) -> String {
        let mut lines: Vec<String> = self.lines.iter().map(|line| line.to_string()).collect();
        for (&i, line) in self.sent.iter().zip(translated) {
            lines[i] = line;
        }
        lines.join("\n")
    }
}

/// Group the non-blank strings into chunks.
fn plan_chunks<'a>(strings: &'a [String], options: &BatchOptions) -> MtResult<Vec<Vec<Unit<'a>>>> {
    let mut chunks = Vec::new();
    let mut current: Vec<Unit> = Vec::new();
    let mut current_chars = 0;

    for unit in strings
        .iter()
        .enumerate()
        .filter_map(|(index, text)| Unit::new(index, text))
    {
        let chars = unit.query_chars();
        if chars > options.max_query_chars {
            return Err(MtError::QueryTooLong {
                index: unit.index,
                length: chars,
                limit: options.max_query_chars,
            });
        }

        if !current.is_empty()
            && (current.len() >= options.chunk_size
                || current_chars + 1 + chars > options.max_query_chars)
        {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        current_chars += if current.is_empty() { chars } else { 1 + chars };
        current.push(unit);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}

/// Translate `strings` through `gateway`, one chunk at a time.
///
/// Fails with [`MtError::Superseded`] when `ticket` is no longer current before a
/// chunk is sent, and with [`MtError::Gateway`] as soon as any chunk fails. In both
/// cases the translations of earlier chunks are discarded.
pub async fn translate_strings(
    gateway: &dyn TranslationGateway,
    strings: &[String],
    from: &str,
    to: &str,
    options: &BatchOptions,
    ticket: &RequestTicket,
) -> MtResult<BatchOutcome> {
    let chunks = plan_chunks(strings, options)?;
    let mut translations = strings.to_vec();
    let mut missing = 0;

    for (number, chunk) in chunks.iter().enumerate() {
        if number > 0 && !options.pace.is_zero() {
            tokio::time::sleep(options.pace).await;
        }
        if !ticket.is_current() {
            tracing::debug!(request = ticket.id(), chunk = number + 1, "Request superseded");
            return Err(MtError::Superseded);
        }

        let query = chunk
            .iter()
            .flat_map(|unit| unit.sent_lines())
            .collect::<Vec<_>>()
            .join("\n");
        let expected: usize = chunk.iter().map(|unit| unit.sent.len()).sum();

        let started = Instant::now();
        let lines = gateway
            .translate_batch(&query, from, to)
            .await
            .map_err(|e| {
                tracing::warn!(chunk = number + 1, error = %e, "Chunk translation failed");
                MtError::from(e)
            })?;
        tracing::debug!(
            provider = gateway.provider_name(),
            chunk = number + 1,
            chunks = chunks.len(),
            strings = chunk.len(),
            chars = query.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Translated chunk"
        );

        if lines.len() > expected {
            tracing::warn!(
                chunk = number + 1,
                expected,
                received = lines.len(),
                "Gateway returned more lines than requested, ignoring the rest"
            );
        } else if lines.len() < expected {
            tracing::warn!(
                chunk = number + 1,
                expected,
                received = lines.len(),
                "Gateway returned fewer lines than requested"
            );
        }

        let mut returned = lines.into_iter();
        for unit in chunk {
            let taken: Vec<String> = returned.by_ref().take(unit.sent.len()).collect();
            if taken.len() < unit.sent.len() {
                missing += 1;
                continue;
            }
            translations[unit.index] = unit.assemble(taken);
        }
    }

    Ok(BatchOutcome {
        translations,
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, GatewayErrorKind};
    use crate::mock::{MockGateway, MockMode};
    use crate::session::TranslationSession;
    use std::time::Duration;

    fn strings(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("s{}", i)).collect()
    }

    fn options(chunk_size: usize) -> BatchOptions {
        BatchOptions::default().with_chunk_size(chunk_size)
    }

    fn chunk_sizes(strings: &[String], options: &BatchOptions) -> Vec<usize> {
        plan_chunks(strings, options)
            .unwrap()
            .iter()
            .map(|chunk| chunk.len())
            .collect()
    }

    async fn run(
        gateway: &MockGateway,
        strings: &[String],
        options: &BatchOptions,
    ) -> MtResult<BatchOutcome> {
        translate_strings(gateway, strings, "en", "zh", options, &RequestTicket::detached()).await
    }

    #[test]
    fn test_plan_by_count() {
        assert_eq!(chunk_sizes(&strings(9), &options(10)), vec![9]);
        assert_eq!(chunk_sizes(&strings(9), &options(4)), vec![4, 4, 1]);
        assert_eq!(chunk_sizes(&strings(8), &options(8)), vec![8]);
        assert!(chunk_sizes(&[], &options(10)).is_empty());
    }

    #[test]
    fn test_plan_by_length() {
        let texts = vec!["a".repeat(40), "b".repeat(40), "c".repeat(40)];
        let options = options(10).with_max_query_chars(100);
        // 40 + 1 + 40 = 81 fits, adding another 41 does not
        assert_eq!(chunk_sizes(&texts, &options), vec![2, 1]);
    }

    #[test]
    fn test_plan_counts_characters_not_bytes() {
        let texts = vec!["你".repeat(30), "好".repeat(30)];
        let options = options(10).with_max_query_chars(61);
        assert_eq!(chunk_sizes(&texts, &options), vec![2]);
    }

    #[test]
    fn test_plan_skips_blank_strings() {
        let texts = vec!["".to_string(), "a".to_string(), "  ".to_string(), "b".to_string()];
        let chunks = plan_chunks(&texts, &options(10)).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].iter().map(|unit| unit.index).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn test_plan_rejects_oversized_string() {
        let texts = vec!["ok".to_string(), "x".repeat(6001)];
        match plan_chunks(&texts, &BatchOptions::default()) {
            Err(MtError::QueryTooLong {
                index,
                length,
                limit,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(length, 6001);
                assert_eq!(limit, 6000);
            }
            other => panic!("Expected QueryTooLong, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_translate_in_order() {
        let gateway = MockGateway::new(MockMode::Suffix);
        let outcome = run(&gateway, &strings(5), &options(2)).await.unwrap();

        assert_eq!(
            outcome.translations,
            vec!["s1_zh", "s2_zh", "s3_zh", "s4_zh", "s5_zh"]
        );
        assert_eq!(outcome.missing, 0);
        assert_eq!(gateway.call_count(), 3);
        assert_eq!(gateway.calls()[0].query, "s1\ns2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_chunks() {
        let gateway = MockGateway::new(MockMode::Suffix);
        run(&gateway, &strings(9), &options(4)).await.unwrap();

        let calls = gateway.calls();
        assert_eq!(
            calls.iter().map(|call| call.line_count()).collect::<Vec<_>>(),
            vec![4, 4, 1]
        );
        for pair in calls.windows(2) {
            assert!(pair[1].at - pair[0].at >= Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn test_blank_strings_are_not_sent() {
        let gateway = MockGateway::new(MockMode::Suffix);
        let texts = vec!["".to_string(), " ".to_string()];
        let outcome = run(&gateway, &texts, &options(10)).await.unwrap();

        assert_eq!(outcome.translations, texts);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_multi_line_string_is_rejoined() {
        let gateway = MockGateway::new(MockMode::Suffix);
        let texts = vec!["first\n\nsecond".to_string(), "third".to_string()];
        let outcome = run(&gateway, &texts, &options(10)).await.unwrap();

        assert_eq!(outcome.translations, vec!["first_zh\n\nsecond_zh", "third_zh"]);
        assert_eq!(gateway.calls()[0].query, "first\nsecond\nthird");
    }

    #[tokio::test]
    async fn test_short_reply_falls_back() {
        let gateway = MockGateway::new(MockMode::DropLast);
        let outcome = run(&gateway, &strings(3), &options(10)).await.unwrap();

        assert_eq!(outcome.translations, vec!["s1_zh", "s2_zh", "s3"]);
        assert_eq!(outcome.missing, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_reply_keeps_later_chunks_aligned() {
        let gateway = MockGateway::new(MockMode::DropLast);
        let outcome = run(&gateway, &strings(4), &options(2)).await.unwrap();

        assert_eq!(outcome.translations, vec!["s1_zh", "s2", "s3_zh", "s4"]);
        assert_eq!(outcome.missing, 2);
    }

    /// Replies with the same lines whatever the query
    struct FixedReply(Vec<&'static str>);

    #[async_trait::async_trait]
    impl TranslationGateway for FixedReply {
        async fn translate_batch(
            &self,
            _query: &str,
            _from: &str,
            _to: &str,
        ) -> Result<Vec<String>, GatewayError> {
            Ok(self.0.iter().map(|line| line.to_string()).collect())
        }

        fn provider_name(&self) -> &str {
            "Fixed reply"
        }
    }

    #[tokio::test]
    async fn test_extra_lines_are_ignored() {
        let gateway = FixedReply(vec!["一", "二", "多余"]);
        let outcome = translate_strings(
            &gateway,
            &strings(2),
            "en",
            "zh",
            &options(10),
            &RequestTicket::detached(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.translations, vec!["一", "二"]);
        assert_eq!(outcome.missing, 0);
    }

    #[tokio::test]
    async fn test_gateway_error_fails_batch() {
        let error = GatewayError::from_provider("52003", "UNAUTHORIZED USER");
        let gateway = MockGateway::new(MockMode::Error(error.clone()));
        let result = run(&gateway, &strings(3), &options(1)).await;

        assert_eq!(result, Err(MtError::Gateway(error)));
        // Nothing after the failing chunk is sent
        assert_eq!(gateway.call_count(), 1);
        match result {
            Err(MtError::Gateway(e)) => assert_eq!(e.kind, GatewayErrorKind::Authentication),
            _ => unreachable!(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_before_next_chunk() {
        let gateway = MockGateway::new(MockMode::Suffix);
        let session = TranslationSession::new();
        let ticket = session.begin();
        let texts = strings(3);
        let options = options(1);

        let translation = translate_strings(&gateway, &texts, "en", "zh", &options, &ticket);
        let newer = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            session.begin()
        };
        let (result, _) = tokio::join!(translation, newer);

        assert_eq!(result, Err(MtError::Superseded));
        assert_eq!(gateway.call_count(), 1);
    }
}
