use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// System-wide suspend/resume signal for globally rate-limited responses.
///
/// Starts open. [`GlobalGate::trip`] closes it and schedules the reopen;
/// every caller of [`GlobalGate::wait`] is held until then.
#[derive(Debug, Clone)]
pub struct GlobalGate {
    open: Arc<watch::Sender<bool>>,
}

impl Default for GlobalGate {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalGate {
    pub fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            open: Arc::new(open),
        }
    }

    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    /// Return once the gate is open.
    pub async fn wait(&self) {
        let mut rx = self.open.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Close the gate for `duration`.
    ///
    /// Only the call that moves the gate from open to closed schedules the
    /// reopen; others while it is closed are no-ops and return `false`.
    pub fn trip(&self, duration: Duration) -> bool {
        let closed_now = self.open.send_if_modified(|open| {
            if *open {
                *open = false;
                true
            } else {
                false
            }
        });

        if !closed_now {
            debug!("global rate limit already in effect");
            return false;
        }

        warn!(
            retry_after_ms = duration.as_millis() as u64,
            "global rate limit hit, suspending all requests"
        );
        let open = Arc::clone(&self.open);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            open.send_replace(true);
            debug!("global rate limit lifted");
        });
        true
    }
}
