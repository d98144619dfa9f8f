//! Ordered persistence of the reading position.
//!
//! All saves go through one writer task, so they reach the store in the order
//! they were issued. Queued positions that are already superseded are skipped.

use selah_core::session::{ReadingState, SessionStore};
use tokio::sync::{mpsc, oneshot};

enum Command {
  Save(ReadingState),
  Flush(oneshot::Sender<()>),
}

/// Handle to the writer task. Cheap to clone.
#[derive(Clone)]
pub struct SessionWriter {
  tx: mpsc::UnboundedSender<Command>,
}

impl SessionWriter {
  /// Spawn the writer task over `store`. Must be called inside a runtime.
  pub fn spawn<S>(store: S) -> Self
  where
    S: SessionStore + 'static,
  {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
      while let Some(cmd) = rx.recv().await {
        let (mut state, mut flush) = match cmd {
          Command::Save(state) => (state, None),
          Command::Flush(done) => {
            let _ = done.send(());
            continue;
          }
        };

        // Only the newest queued position needs writing; stop at a flush so
        // it is answered after this write.
        while flush.is_none() {
          match rx.try_recv() {
            Ok(Command::Save(next)) => state = next,
            Ok(Command::Flush(done)) => flush = Some(done),
            Err(_) => break,
          }
        }

        if let Err(e) = store.save_reading_state(&state).await {
          tracing::warn!("failed to save reading state: {e}");
        }
        if let Some(done) = flush {
          let _ = done.send(());
        }
      }
    });
    Self { tx }
  }

  /// Queue `state` for writing.
  pub fn save(&self, state: ReadingState) {
    if self.tx.send(Command::Save(state)).is_err() {
      tracing::warn!("session writer has stopped; reading state not saved");
    }
  }

  /// Wait until every save queued before this call has been written.
  pub async fn flush(&self) {
    let (done, written) = oneshot::channel();
    if self.tx.send(Command::Flush(done)).is_ok() {
      let _ = written.await;
    }
  }
}
