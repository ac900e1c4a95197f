//! Graceful shutdown handle.
//!
//! A `watch` flag rather than a one-shot message: a listener that subscribes
//! after the trigger still sees it, and dropping every `Shutdown` clone
//! releases the listeners as well.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::lifecycle::signals;

/// Cloneable trigger side. All clones share one flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    flag: Arc<watch::Sender<bool>>,
}

/// Listener side, handed to the server.
#[derive(Debug)]
pub struct ShutdownSignal {
    flag: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag: Arc::new(flag) }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            flag: self.flag.subscribe(),
        }
    }

    /// Raise the flag. Idempotent.
    pub fn trigger(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Trigger on SIGINT or SIGTERM.
    pub fn trigger_on_signal(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            shutdown.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once the flag is raised or the trigger side is gone.
    pub async fn wait(mut self) {
        let _ = self.flag.wait_for(|triggered| *triggered).await;
    }
}
