//! One-shot completion signals fired from inside a frame tick.
//!
//! A `Signal` is held by whatever animation finishes (a bolt, a tween); the
//! matching `Completion` is awaited by the sequencer. Firing is idempotent and
//! dropping an unfired `Signal` resolves the completion with `Interrupted`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::NetworkError;

#[derive(Debug)]
pub struct Signal(Option<oneshot::Sender<()>>);

impl Signal {
    /// Fire the signal. Only the first call has any effect.
    pub fn fire(&mut self) {
        if let Some(tx) = self.0.take() {
            // The receiver may already be gone (run dropped); nothing to wake.
            let _ = tx.send(());
        }
    }

    pub fn is_fired(&self) -> bool {
        self.0.is_none()
    }
}

pub fn signal() -> (Signal, Completion) {
    let (tx, rx) = oneshot::channel();
    (Signal(Some(tx)), Completion { pending: vec![rx] })
}

/// Resolves once every underlying signal has fired.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion {
    pending: Vec<oneshot::Receiver<()>>,
}

impl Completion {
    /// Already resolved.
    pub fn ready() -> Self {
        Self { pending: Vec::new() }
    }

    /// Wait for all of `parts`.
    pub fn all(parts: impl IntoIterator<Item = Completion>) -> Self {
        Self { pending: parts.into_iter().flat_map(|c| c.pending).collect() }
    }
}

impl Future for Completion {
    type Output = Result<(), NetworkError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut i = 0;
        while i < self.pending.len() {
            match Pin::new(&mut self.pending[i]).poll(cx) {
                Poll::Ready(Ok(())) => {
                    self.pending.swap_remove(i);
                }
                Poll::Ready(Err(oneshot::Canceled)) => {
                    self.pending.clear();
                    return Poll::Ready(Err(NetworkError::Interrupted));
                }
                Poll::Pending => i += 1,
            }
        }
        if self.pending.is_empty() { Poll::Ready(Ok(())) } else { Poll::Pending }
    }
}
