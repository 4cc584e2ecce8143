//! Incremental line reassembly for chunked byte streams.
//!
//! Network reads carry no alignment guarantee: a chunk can end in the
//! middle of a line, between a `\r` and its `\n`, or in the middle of a
//! multi-byte UTF-8 character. [`LineDecoder`] keeps the unterminated tail
//! between calls so the lines it yields are the same no matter how the
//! input was partitioned.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

/// Stateful decoder turning raw chunks into complete lines.
///
/// Lines are split on `\n` and a single trailing `\r` is removed. Whatever
/// follows the last terminator is held until more input arrives; when the
/// stream ends it is discarded since a partial final record is never valid.
#[derive(Debug, Default)]
pub struct LineDecoder {
    // Decoded text that has not been handed out as a line yet
    carry: String,
    // Leading bytes of a UTF-8 sequence cut off by the chunk boundary
    pending: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk and append it to the carry.
    ///
    /// Invalid byte sequences are dropped and decoding carries on with the
    /// bytes that follow them.
    pub fn push(&mut self, chunk: &[u8]) {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.carry.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.carry.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        // Incomplete sequence at the end of the input
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                        Some(len) => {
                            tracing::warn!("Dropping {} undecodable byte(s) from stream", len);
                            rest = &after[len..];
                        }
                    }
                }
            }
        }
    }

    /// Pop the next complete line, if one is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.carry.find('\n')?;
        let mut line: String = self.carry.drain(..=end).collect();
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }

    /// End of input. Drops the unterminated tail and returns how many
    /// bytes of it were discarded.
    pub fn finish(&mut self) -> usize {
        let dropped = self.carry.len() + self.pending.len();
        if dropped > 0 {
            tracing::debug!("Discarding {} byte(s) of unterminated input", dropped);
        }
        self.carry.clear();
        self.pending.clear();
        dropped
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.carry.is_empty() && self.pending.is_empty()
    }
}

/// Adapts a stream of byte chunks into a stream of complete lines.
///
/// Each chunk is fully decoded before the next one is polled, so lines come
/// out in the order the bytes went in. A transport error is passed through
/// once and ends the stream.
pub struct LineStream<S> {
    inner: S,
    decoder: LineDecoder,
    done: bool,
}

impl<S> LineStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: LineDecoder::new(),
            done: false,
        }
    }
}

impl<S, B, E> Stream for LineStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<String, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(line) = this.decoder.next_line() {
                return Poll::Ready(Some(Ok(line)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.decoder.push(chunk.as_ref());
                }
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    this.decoder.finish();
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    this.decoder.finish();
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
