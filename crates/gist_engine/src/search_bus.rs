use std::time::Duration;

use tokio::sync::watch;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Process-wide search term. Publishing the current value again is a no-op.
#[derive(Debug)]
pub struct SearchTermBus {
    tx: watch::Sender<String>,
}

impl Default for SearchTermBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTermBus {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(String::new());
        Self { tx }
    }

    /// Returns true when the term differs from the current one.
    pub fn publish(&self, term: impl Into<String>) -> bool {
        let term = term.into();
        self.tx.send_if_modified(|current| {
            if *current == term {
                return false;
            }
            *current = term;
            true
        })
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

/// Waits for a term that stays unchanged for `quiet` and differs from `last`.
///
/// Returns `None` once the bus is gone and nothing is pending.
pub async fn next_settled(
    rx: &mut watch::Receiver<String>,
    quiet: Duration,
    last: &str,
) -> Option<String> {
    loop {
        rx.changed().await.ok()?;
        // Every change inside the window restarts it.
        while let Ok(Ok(())) = tokio::time::timeout(quiet, rx.changed()).await {}
        let term = rx.borrow_and_update().clone();
        if term != last {
            return Some(term);
        }
    }
}
