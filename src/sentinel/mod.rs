//! Visibility sentinel module
//!
//! A platform-neutral stand-in for the browser's intersection callback: the
//! presentation layer places one boundary marker after the rendered list and
//! reports its not-visible → visible transitions through a [`Sentinel`]; a
//! [`SentinelBinding`] forwards each transition to the feed controller.
//!
//! The binding is only installed while the feed still has more to load, and
//! tears itself down (abort on drop) so a replaced or discarded binding can
//! never invoke the handler against defunct state. After a merge changes the
//! cursor, install a fresh binding; [`SentinelBinding::install`] re-checks
//! whether observation is still warranted.

use crate::feed::FeedController;
use crate::fetch::PageFetcher;
use crate::types::FeedItem;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Handle held by the presentation layer; reports visibility transitions.
#[derive(Debug, Clone)]
pub struct Sentinel {
    tx: mpsc::UnboundedSender<()>,
}

impl Sentinel {
    /// Create a sentinel and the event stream a binding will consume
    pub fn new() -> (Self, SentinelEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, SentinelEvents { rx })
    }

    /// Report one not-visible → visible transition. Never blocks; events
    /// sent after the binding is torn down are dropped.
    pub fn mark_visible(&self) {
        let _ = self.tx.send(());
    }
}

/// The receiving half of a sentinel's event channel
#[derive(Debug)]
pub struct SentinelEvents {
    rx: mpsc::UnboundedReceiver<()>,
}

/// A live subscription forwarding sentinel events to a controller.
///
/// Dropping the binding aborts the forwarding task.
#[derive(Debug)]
pub struct SentinelBinding {
    handle: JoinHandle<()>,
}

impl SentinelBinding {
    /// Install a binding for `controller`, consuming the event stream.
    ///
    /// Returns `None` without installing anything when the feed is already
    /// exhausted or has no cursor: no trigger could ever pass the
    /// eligibility gate, so observation would be redundant work. An
    /// installed binding exits on its own once the feed becomes exhausted.
    pub async fn install<T, F>(
        controller: &FeedController<T, F>,
        mut events: SentinelEvents,
    ) -> Option<Self>
    where
        T: FeedItem + Send + 'static,
        F: PageFetcher<T> + 'static,
    {
        if !controller.should_observe_sentinel().await {
            trace!("feed exhausted, sentinel binding not installed");
            return None;
        }

        let controller = controller.clone();
        let handle = tokio::spawn(async move {
            while let Some(()) = events.rx.recv().await {
                controller.on_sentinel_visible().await;
                if !controller.should_observe_sentinel().await {
                    break;
                }
            }
        });

        Some(Self { handle })
    }

    /// Tear the binding down explicitly, equivalent to dropping it
    pub fn teardown(self) {
        // Drop impl aborts the task
    }

    /// Check if the forwarding task has exited (feed exhausted or channel
    /// closed)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SentinelBinding {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests;
