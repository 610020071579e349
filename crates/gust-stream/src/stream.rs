//! Stream consumption: bytes in, reply events out

use std::pin::Pin;

use async_stream::stream;
use bytes::Bytes;
use futures::StreamExt;
use tokio_stream::Stream;

use crate::{
    classify::{StreamEvent, classify_line},
    decoder::LineDecoder,
    error::Result,
};

/// A response body as a stream of raw chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Events emitted while reading one reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    /// Reply text delta, in stream order
    Delta(String),
    /// The reply finished, either by a finish frame or end of data
    Finished,
    /// Reading the body failed
    Failed(String),
}

impl ReplyEvent {
    /// Check if this is a terminal event (Finished or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReplyEvent::Finished | ReplyEvent::Failed(_))
    }
}

/// A stream of reply events
pub type ReplyEventStream = Pin<Box<dyn Stream<Item = ReplyEvent> + Send>>;

/// How a consumed reply ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Finished,
    Failed(String),
}

/// Receiver for the reply of one turn.
///
/// Exactly one of [`on_finish`](Self::on_finish) or
/// [`on_error`](Self::on_error) is called per consumed stream.
pub trait StreamHandler {
    /// New reply text arrived
    fn on_chunk(&mut self, text: &str);
    /// The reply completed
    fn on_finish(&mut self);
    /// The reply failed
    fn on_error(&mut self, message: &str);
}

/// Decode a response body into reply events.
///
/// The returned stream yields any number of [`ReplyEvent::Delta`] followed by
/// exactly one terminal event, then ends. The body is dropped as soon as the
/// terminal event is produced, so no reads happen after a finish frame.
pub fn reply_events(mut body: ByteStream) -> ReplyEventStream {
    Box::pin(stream! {
        let mut decoder = LineDecoder::new();

        loop {
            match body.next().await {
                Some(Ok(chunk)) => {
                    for line in decoder.push(&chunk) {
                        match classify_line(&line) {
                            Ok(StreamEvent::ContentDelta(text)) => {
                                yield ReplyEvent::Delta(text);
                            }
                            Ok(StreamEvent::Finish) => {
                                let dropped = decoder.discard_remainder();
                                if dropped > 0 {
                                    tracing::debug!("finish frame with {} buffered bytes unread", dropped);
                                }
                                yield ReplyEvent::Finished;
                                return;
                            }
                            Ok(StreamEvent::Skip) => {}
                            Err(e) => {
                                tracing::warn!("Failed to parse stream line: {}", e);
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("Reply stream failed: {}", e);
                    yield ReplyEvent::Failed(e.to_string());
                    return;
                }
                None => {
                    let dropped = decoder.discard_remainder();
                    if dropped > 0 {
                        tracing::warn!("Discarding {} bytes of unterminated trailing line", dropped);
                    }
                    yield ReplyEvent::Finished;
                    return;
                }
            }
        }
    })
}

/// Drive a response body to completion, reporting to `handler`.
pub async fn consume<H>(body: ByteStream, handler: &mut H) -> TurnOutcome
where
    H: StreamHandler + ?Sized,
{
    let mut events = reply_events(body);
    let mut outcome = TurnOutcome::Finished;

    while let Some(event) = events.next().await {
        match event {
            ReplyEvent::Delta(text) => handler.on_chunk(&text),
            ReplyEvent::Finished => break,
            ReplyEvent::Failed(message) => {
                outcome = TurnOutcome::Failed(message);
                break;
            }
        }
    }
    drop(events);

    match &outcome {
        TurnOutcome::Finished => handler.on_finish(),
        TurnOutcome::Failed(message) => handler.on_error(message),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    #[derive(Default)]
    struct Recorder {
        chunks: Vec<String>,
        finishes: u32,
        errors: Vec<String>,
    }

    impl Recorder {
        fn text(&self) -> String {
            self.chunks.concat()
        }
    }

    impl StreamHandler for Recorder {
        fn on_chunk(&mut self, text: &str) {
            self.chunks.push(text.to_string());
        }
        fn on_finish(&mut self) {
            self.finishes += 1;
        }
        fn on_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn body(chunks: &[&'static str]) -> ByteStream {
        let items: Vec<Result<Bytes>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        Box::pin(futures::stream::iter(items))
    }

    async fn run(chunks: &[&'static str]) -> (Recorder, TurnOutcome) {
        let mut recorder = Recorder::default();
        let outcome = consume(body(chunks), &mut recorder).await;
        (recorder, outcome)
    }

    #[tokio::test]
    async fn test_deltas_accumulate_in_order() {
        let (rec, outcome) = run(&["0:\"abc\"\n", "0:\"def\"\n"]).await;
        assert_eq!(rec.text(), "abcdef");
        assert_eq!(rec.chunks, vec!["abc", "def"]);
        assert_eq!(outcome, TurnOutcome::Finished);
        assert_eq!(rec.finishes, 1);
        assert!(rec.errors.is_empty());
    }

    #[tokio::test]
    async fn test_message_id_frame_produces_nothing() {
        let (rec, _) = run(&["f:{\"messageId\":\"m1\"}\n"]).await;
        assert!(rec.chunks.is_empty());
        // end of data still finishes the turn
        assert_eq!(rec.finishes, 1);
    }

    #[tokio::test]
    async fn test_stop_finishes_and_ignores_rest() {
        let (rec, outcome) = run(&[
            "0:\"Rain\"\ne:{\"finishReason\":\"stop\"}\n0:\"ignored\"\n",
            "0:\"also ignored\"\n",
        ])
        .await;
        assert_eq!(rec.text(), "Rain");
        assert_eq!(rec.finishes, 1);
        assert_eq!(outcome, TurnOutcome::Finished);
    }

    #[tokio::test]
    async fn test_no_reads_after_finish() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let chunks = vec!["d:{}\n", "0:\"late\"\n", "0:\"later\"\n"];
        let stream: ByteStream = Box::pin(futures::stream::iter(chunks).map(move |c| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(c.as_bytes()))
        }));

        let mut rec = Recorder::default();
        consume(stream, &mut rec).await;
        assert_eq!(polled.load(Ordering::SeqCst), 1);
        assert!(rec.chunks.is_empty());
        assert_eq!(rec.finishes, 1);
    }

    #[tokio::test]
    async fn test_non_stop_finish_reason_continues() {
        let (rec, _) = run(&[
            "0:\"Cloudy\"\n",
            "e:{\"finishReason\":\"length\"}\n",
            "0:\" later\"\n",
        ])
        .await;
        assert_eq!(rec.text(), "Cloudy later");
        assert_eq!(rec.finishes, 1);
    }

    #[tokio::test]
    async fn test_malformed_line_is_skipped() {
        let (rec, outcome) = run(&["xyz\n0:\"ok\"\ne:{broken\n0:\"!\"\n"]).await;
        assert_eq!(rec.text(), "ok!");
        assert_eq!(outcome, TurnOutcome::Finished);
        assert!(rec.errors.is_empty());
    }

    #[tokio::test]
    async fn test_unterminated_tail_is_dropped() {
        let (rec, _) = run(&["0:\"kept\"\n0:\"lost\""]).await;
        assert_eq!(rec.text(), "kept");
        assert_eq!(rec.finishes, 1);
    }

    #[tokio::test]
    async fn test_read_failure_reports_error_once() {
        let items: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"0:\"partial\"\n")),
            Err(Error::Stream("connection reset".into())),
            Ok(Bytes::from_static(b"0:\"never\"\n")),
        ];
        let mut rec = Recorder::default();
        let outcome = consume(Box::pin(futures::stream::iter(items)), &mut rec).await;

        assert_eq!(rec.text(), "partial");
        assert_eq!(rec.finishes, 0);
        assert_eq!(rec.errors, vec!["Stream error: connection reset"]);
        assert_eq!(
            outcome,
            TurnOutcome::Failed("Stream error: connection reset".into())
        );
    }

    #[tokio::test]
    async fn test_body_released_on_every_exit() {
        for chunks in [
            vec![Ok(Bytes::from_static(b"d:{}\n"))],
            vec![Ok(Bytes::from_static(b"0:\"x\"\n"))],
            vec![Err(Error::Stream("boom".into()))],
        ] {
            let released = Arc::new(AtomicBool::new(false));
            let guard = ReleaseGuard(released.clone());
            let stream: ByteStream = Box::pin(futures::stream::iter(chunks).map(move |c| {
                let _guard = &guard;
                c
            }));

            let mut rec = Recorder::default();
            consume(stream, &mut rec).await;
            assert!(released.load(Ordering::SeqCst));
        }
    }

    struct ReleaseGuard(Arc<AtomicBool>);

    impl Drop for ReleaseGuard {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_chunk_boundaries_do_not_change_deltas() {
        let body_text: &'static str =
            "f:{\"messageId\":\"m1\"}\n0:\"It is \"\n0:\"14°C \"\n0:\"in Bergen\"\ne:{\"finishReason\":\"stop\"}\n";
        let (whole, _) = run(&[body_text]).await;

        for size in 1..body_text.len() {
            let items: Vec<Result<Bytes>> = body_text
                .as_bytes()
                .chunks(size)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            let mut rec = Recorder::default();
            consume(Box::pin(futures::stream::iter(items)), &mut rec).await;
            assert_eq!(rec.chunks, whole.chunks, "chunk size {}", size);
            assert_eq!(rec.finishes, 1);
        }
    }

    #[tokio::test]
    async fn test_reply_events_terminal_is_last() {
        let events: Vec<ReplyEvent> = reply_events(body(&["0:\"a\"\n", "d:{}\n"]))
            .collect()
            .await;
        assert_eq!(
            events,
            vec![ReplyEvent::Delta("a".into()), ReplyEvent::Finished]
        );
        assert!(events.last().unwrap().is_terminal());
    }
}
