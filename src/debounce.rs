use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Trailing-edge debouncer for the search box.
///
/// Every `push` disarms the previous timer and arms a new one; the value is
/// delivered on the channel only once it has survived a full `window` without
/// another push. Dropping the debouncer aborts whatever is still pending.
pub struct Debouncer {
  window: Duration,
  tx: mpsc::UnboundedSender<String>,
  pending: Option<JoinHandle<()>>,
}

impl Debouncer {
  pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { window, tx, pending: None }, rx)
  }

  /// Arm the timer for `value`. Empty strings are emitted like anything else.
  pub fn push(&mut self, value: String) {
    self.cancel();
    let tx = self.tx.clone();
    let window = self.window;
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(window).await;
      trace!(value = %value, "debounce fired");
      let _ = tx.send(value);
    }));
  }

  /// Disarm the pending emission, if any.
  pub fn cancel(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }

  #[cfg(test)]
  pub fn is_pending(&self) -> bool {
    self.pending.as_ref().is_some_and(|h| !h.is_finished())
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}
