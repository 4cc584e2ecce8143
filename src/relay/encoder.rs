//! Turns an upstream byte stream into the downstream event stream.

use std::fmt::Display;
use std::time::Duration;

use async_stream::stream;
use axum::response::sse::Event;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use super::envelope::encode_record;
use super::event::{Extracted, SemanticEvent};
use super::lines::LineStream;

/// Sent in-band when the upstream connection fails after streaming began.
pub const STREAM_FAILED: &str = "Stream processing failed";

/// Sent in-band when the upstream goes quiet for longer than the idle timeout.
pub const STREAM_STALLED: &str = "Upstream stalled";

pub type EventStream = BoxStream<'static, SemanticEvent>;

/// Relay an upstream response as a stream of [`SemanticEvent`]s.
///
/// `extract` interprets each complete line under the upstream framing.
/// The returned stream always ends with exactly one terminal event: `Done`
/// when the upstream says so or simply ends, `Error` when the transport
/// fails or no line arrives within `idle_timeout`. Malformed records are
/// logged and skipped. Dropping the returned stream drops `upstream`.
pub fn relay<S, B, E, F>(upstream: S, extract: F, idle_timeout: Duration) -> EventStream
where
    S: futures_util::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    F: Fn(&str) -> Option<Extracted> + Send + 'static,
{
    let events = stream! {
        let mut lines = LineStream::new(Box::pin(upstream));
        let mut relayed = 0usize;

        loop {
            let next = match tokio::time::timeout(idle_timeout, lines.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::error!(
                        "No upstream data for {:?}, closing after {} record(s)",
                        idle_timeout,
                        relayed
                    );
                    yield SemanticEvent::Error(STREAM_STALLED.to_string());
                    return;
                }
            };

            let line = match next {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    tracing::error!("Upstream stream failed after {} record(s): {}", relayed, e);
                    yield SemanticEvent::Error(STREAM_FAILED.to_string());
                    return;
                }
                // Upstream ended without a sentinel
                None => {
                    tracing::debug!("Upstream ended after {} record(s)", relayed);
                    yield SemanticEvent::Done;
                    return;
                }
            };

            match extract(&line) {
                None => {}
                Some(Extracted::Malformed(raw)) => {
                    tracing::warn!("Skipping malformed upstream record: {}", raw);
                }
                Some(Extracted::Event(event)) => {
                    let terminal = event.is_terminal();
                    relayed += 1;
                    yield event;
                    if terminal {
                        tracing::debug!("Relay finished after {} record(s)", relayed);
                        return;
                    }
                }
            }
        }
    };

    events.boxed()
}

/// Wrap an event in the SSE record sent downstream.
pub fn to_sse_event(event: &SemanticEvent) -> Event {
    Event::default().data(encode_record(event))
}
