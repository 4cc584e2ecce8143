use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

/// Wraps a response stream to notice when the client goes away.
///
/// Axum drops the body stream when the connection closes. Dropping the
/// inner stream releases whatever it owns (for the relay, the upstream
/// connection), so all that is left to do here is record it.
pub struct DetectDisconnect<S> {
    inner: S,
    finished: bool,
}

impl<S> DetectDisconnect<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            finished: false,
        }
    }
}

impl<S: Stream + Unpin> Stream for DetectDisconnect<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let poll = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(None) = poll {
            self.finished = true;
        }
        poll
    }
}

impl<S> Drop for DetectDisconnect<S> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!("Client disconnected before the stream finished, releasing upstream");
        }
    }
}
