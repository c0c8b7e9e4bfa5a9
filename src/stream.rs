//! Streaming session: pull loop, transcript accumulation, termination.
//!
//! One [`StreamSession`] drives one response stream. Transport chunks are
//! framed into lines, classified, decoded, and appended to the transcript,
//! with one [`TranscriptUpdate`] sent to the observer per decoded fragment.
//! Pulling the next chunk is the only suspension point; everything
//! downstream of it runs synchronously and in arrival order.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::events::TranscriptUpdate;
use crate::sse::{classify_line, decode_payload, Decoded, LineFramer};

/// Outcome of routing one transport chunk through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchOutcome {
    /// Every available line was consumed; pull the next chunk.
    NeedMoreData,
    /// The termination sentinel was decoded; stop pulling.
    Terminated,
    /// The observer dropped its receiver; stop pulling.
    Cancelled,
}

/// State for one in-flight response stream.
///
/// A session is single-use: it is consumed by [`StreamSession::run`] and
/// owns its carry-over buffer and transcript exclusively. Independent
/// sessions share no state.
#[derive(Debug, Default)]
pub struct StreamSession {
    framer: LineFramer,
    transcript: String,
    finished: bool,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript accumulated so far.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Whether the termination sentinel has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append a fragment and report the full transcript.
    ///
    /// Empty fragments leave the transcript unchanged but still report it,
    /// so the observer sees one notification per processed data line.
    fn accumulate(&mut self, fragment: &str) -> &str {
        self.transcript.push_str(fragment);
        &self.transcript
    }

    /// Accumulate a fragment and notify the observer.
    ///
    /// Returns `false` when the observer has dropped its receiver.
    fn emit(&mut self, fragment: &str, updates: &UnboundedSender<TranscriptUpdate>) -> bool {
        let transcript = self.accumulate(fragment).to_string();
        updates.send(TranscriptUpdate { transcript }).is_ok()
    }

    /// Route one chunk of transport text through framing, classification,
    /// decoding, and accumulation.
    fn ingest(&mut self, chunk: &str, updates: &UnboundedSender<TranscriptUpdate>) -> BatchOutcome {
        if self.finished {
            return BatchOutcome::Terminated;
        }
        self.framer.feed(chunk);
        self.drain_lines(updates)
    }

    fn drain_lines(&mut self, updates: &UnboundedSender<TranscriptUpdate>) -> BatchOutcome {
        while let Some(line) = self.framer.next_line() {
            let Some(payload) = classify_line(&line) else {
                continue;
            };
            match decode_payload(payload) {
                Decoded::Terminal => {
                    self.finished = true;
                    return BatchOutcome::Terminated;
                }
                Decoded::Fragment(text) => {
                    if !self.emit(&text, updates) {
                        return BatchOutcome::Cancelled;
                    }
                }
                Decoded::Malformed => {
                    // A chunk boundary cut the payload mid-document. Put the
                    // whole line back and retry once more data arrives; lines
                    // behind it stay queued in order.
                    debug!(len = line.len(), "requeueing partial data line");
                    self.framer.requeue(&line);
                    return BatchOutcome::NeedMoreData;
                }
            }
        }
        BatchOutcome::NeedMoreData
    }

    /// Process whatever the framer still holds once the transport reports
    /// end-of-data: complete lines queued behind a rolled-back partial,
    /// then the unterminated residual (streams that close right after the
    /// final line without a trailing newline).
    fn drain_carry_over(&mut self, updates: &UnboundedSender<TranscriptUpdate>) {
        while let Some(line) = self.framer.next_line() {
            if self.finish_line(&line, updates) {
                return;
            }
        }
        let rest = self.framer.take_pending();
        let line = rest.strip_suffix('\r').unwrap_or(&rest);
        if !line.is_empty() {
            self.finish_line(line, updates);
        }
    }

    /// Decode one line during the final drain, where no further data can
    /// complete a partial payload. Returns `true` when processing must stop.
    fn finish_line(&mut self, line: &str, updates: &UnboundedSender<TranscriptUpdate>) -> bool {
        let Some(payload) = classify_line(line) else {
            return false;
        };
        match decode_payload(payload) {
            Decoded::Terminal => {
                self.finished = true;
                true
            }
            Decoded::Fragment(text) => !self.emit(&text, updates),
            Decoded::Malformed => {
                warn!(len = line.len(), "stream ended inside a data payload");
                false
            }
        }
    }

    /// Drive the pull loop to completion.
    ///
    /// Returns the final transcript when the stream terminates (sentinel
    /// seen, transport end-of-data, or observer cancellation). Transport
    /// failures are returned as errors and end the session; no further
    /// input is accepted either way.
    pub async fn run<S>(
        mut self,
        chunks: S,
        updates: UnboundedSender<TranscriptUpdate>,
    ) -> Result<String, ClientError>
    where
        S: Stream<Item = Result<Bytes, ClientError>>,
    {
        tokio::pin!(chunks);

        // Bytes held back until a later chunk completes their UTF-8 sequence.
        let mut undecoded: Vec<u8> = Vec::new();

        while let Some(next) = chunks.next().await {
            let bytes = next?;
            undecoded.extend_from_slice(&bytes);
            let text = take_utf8_prefix(&mut undecoded);
            if text.is_empty() {
                continue;
            }
            match self.ingest(&text, &updates) {
                BatchOutcome::NeedMoreData => {}
                BatchOutcome::Terminated => {
                    debug!("stream terminated by sentinel");
                    return Ok(self.transcript);
                }
                BatchOutcome::Cancelled => {
                    debug!("observer gone, abandoning stream");
                    return Ok(self.transcript);
                }
            }
        }

        // Transport closed without the sentinel: drain what is left and
        // complete anyway rather than hang.
        self.drain_carry_over(&updates);
        if !self.finished {
            debug!("transport ended without sentinel");
        }
        Ok(self.transcript)
    }
}

/// Split off the longest valid UTF-8 prefix of `pending`, leaving an
/// incomplete trailing sequence in place for the next chunk.
fn take_utf8_prefix(pending: &mut Vec<u8>) -> String {
    match std::str::from_utf8(pending) {
        Ok(text) => {
            let text = text.to_string();
            pending.clear();
            text
        }
        Err(err) if err.error_len().is_none() => {
            // Incomplete multi-byte sequence at the tail: hold it back.
            let rest = pending.split_off(err.valid_up_to());
            let prefix = std::mem::replace(pending, rest);
            String::from_utf8(prefix).unwrap_or_default()
        }
        Err(_) => {
            // Invalid bytes mid-chunk: decode lossily rather than stall.
            let text = String::from_utf8_lossy(pending).into_owned();
            pending.clear();
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tokio::sync::mpsc;

    fn chunk_stream(chunks: Vec<&[u8]>) -> impl Stream<Item = Result<Bytes, ClientError>> {
        let items: Vec<Result<Bytes, ClientError>> = chunks
            .into_iter()
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        stream::iter(items)
    }

    async fn run_session(chunks: Vec<&[u8]>) -> (String, Vec<String>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transcript = StreamSession::new()
            .run(chunk_stream(chunks), tx)
            .await
            .expect("stream should not fail");
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update.transcript);
        }
        (transcript, updates)
    }

    #[tokio::test]
    async fn test_single_chunk_stream() {
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello, \"}}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"world!\"}}]}\n\
                     data: [DONE]\n";
        let (transcript, updates) = run_session(vec![body]).await;
        assert_eq!(transcript, "Hello, world!");
        assert_eq!(updates, vec!["Hello, ", "Hello, world!"]);
    }

    #[tokio::test]
    async fn test_json_split_across_chunks() {
        let (transcript, updates) = run_session(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel",
            b"lo\"}}]}\n",
        ])
        .await;
        assert_eq!(transcript, "Hello");
        assert_eq!(updates, vec!["Hello"]);
    }

    #[tokio::test]
    async fn test_split_inside_data_prefix() {
        let (transcript, _) = run_session(vec![
            b"da",
            b"ta: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\ndata: [DONE]\n",
        ])
        .await;
        assert_eq!(transcript, "ok");
    }

    #[tokio::test]
    async fn test_keepalive_produces_no_updates() {
        let (transcript, updates) = run_session(vec![b":keep-alive\n\n: ping\n"]).await;
        assert_eq!(transcript, "");
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_event_lines_skipped() {
        let body = b"event: message\nid: 7\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n";
        let (transcript, updates) = run_session(vec![body]).await;
        assert_eq!(transcript, "x");
        assert_eq!(updates.len(), 1);
    }

    #[tokio::test]
    async fn test_done_stops_processing_rest_of_chunk() {
        let body = b"data: [DONE]\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n";
        let (transcript, updates) = run_session(vec![body]).await;
        assert_eq!(transcript, "");
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_done_stops_pulling_later_chunks() {
        let (transcript, _) = run_session(vec![
            b"data: [DONE]\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        ])
        .await;
        assert_eq!(transcript, "");
    }

    #[tokio::test]
    async fn test_stream_without_sentinel_completes() {
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n";
        let (transcript, _) = run_session(vec![body]).await;
        assert_eq!(transcript, "partial");
    }

    #[tokio::test]
    async fn test_structural_chunk_is_noop_update() {
        let body = b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n";
        let (transcript, updates) = run_session(vec![body]).await;
        assert_eq!(transcript, "hi");
        // Structural event still notifies, with the unchanged transcript
        assert_eq!(updates, vec!["", "hi"]);
    }

    #[tokio::test]
    async fn test_truncated_then_completed_document_is_noop_not_malformed() {
        // The field is irrelevant; after reassembly this decodes cleanly
        let (transcript, updates) = run_session(vec![b"data: {\"a\"", b":1}\n"]).await;
        assert_eq!(transcript, "");
        assert_eq!(updates, vec![""]);
    }

    #[tokio::test]
    async fn test_final_line_without_newline_is_drained() {
        let (transcript, _) =
            run_session(vec![b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}"]).await;
        assert_eq!(transcript, "tail");
    }

    #[tokio::test]
    async fn test_done_without_newline_is_drained() {
        let mut session = StreamSession::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let outcome =
            session.ingest("data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\ndata: [DONE]", &tx);
        assert_eq!(outcome, BatchOutcome::NeedMoreData);
        session.drain_carry_over(&tx);
        assert!(session.is_finished());
        assert_eq!(session.transcript(), "x");
    }

    #[tokio::test]
    async fn test_malformed_line_is_requeued_until_end() {
        // A genuinely bad complete line stalls fragment extraction while
        // the transport is open, never escapes as an error, and lines
        // queued behind it are recovered by the final drain
        let (transcript, updates) = run_session(vec![
            b"data: not-json\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"after\"}}]}\n",
        ])
        .await;
        assert_eq!(transcript, "after");
        assert_eq!(updates, vec!["after"]);
    }

    #[tokio::test]
    async fn test_crlf_stream() {
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\ndata: [DONE]\r\n";
        let (transcript, _) = run_session(vec![body]).await;
        assert_eq!(transcript, "a");
    }

    #[tokio::test]
    async fn test_multibyte_utf8_split_across_chunks() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo 👋\"}}]}\n".as_bytes();
        // Split inside the emoji's four-byte sequence
        let split = body.len() - 8;
        let (transcript, _) = run_session(vec![&body[..split], &body[split..]]).await;
        assert_eq!(transcript, "héllo 👋");
    }

    #[tokio::test]
    async fn test_transport_error_fails_session() {
        let items: Vec<Result<Bytes, ClientError>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n",
            )),
            Err(ClientError::Server {
                status: 502,
                message: "connection reset".to_string(),
            }),
        ];
        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = StreamSession::new().run(stream::iter(items), tx).await;
        assert!(result.is_err());
        // The fragment before the failure was still delivered
        assert_eq!(rx.try_recv().unwrap().transcript, "a");
    }

    #[tokio::test]
    async fn test_dropped_receiver_cancels_pull_loop() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n";
        let transcript = StreamSession::new()
            .run(chunk_stream(vec![body]), tx)
            .await
            .expect("cancellation is not an error");
        // The first fragment was accumulated before the failed send was seen
        assert_eq!(transcript, "a");
    }

    #[tokio::test]
    async fn test_transcript_updates_grow_monotonically() {
        let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\
                     data: {\"choices\":[{\"delta\":{\"content\":\"c\"}}]}\n\
                     data: [DONE]\n";
        let (transcript, updates) = run_session(vec![body]).await;
        assert_eq!(transcript, "abc");
        for pair in updates.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
        }
    }

    #[test]
    fn test_take_utf8_prefix_holds_back_partial_sequence() {
        let emoji = "👋".as_bytes();
        let mut pending = b"ok ".to_vec();
        pending.extend_from_slice(&emoji[..2]);
        assert_eq!(take_utf8_prefix(&mut pending), "ok ");
        pending.extend_from_slice(&emoji[2..]);
        assert_eq!(take_utf8_prefix(&mut pending), "👋");
        assert!(pending.is_empty());
    }

    #[test]
    fn test_take_utf8_prefix_replaces_invalid_bytes() {
        let mut pending = vec![b'a', 0xff, b'b'];
        let text = take_utf8_prefix(&mut pending);
        assert!(text.starts_with('a'));
        assert!(text.ends_with('b'));
        assert!(pending.is_empty());
    }
}
