use std::sync::Arc;

use tokio::runtime::{Handle, Runtime};
use tracing::{error, info};

use super::{IpcServer, StyleWatcher};
use crate::config::ConfigPaths;
use crate::messages::BarEvent;

/// Owns the tokio runtime and the background services of the bar
pub struct ServiceHub {
    /// Event receiver drained on the GTK main loop
    event_rx: async_channel::Receiver<BarEvent>,
    runtime: Arc<Runtime>,
}

impl ServiceHub {
    /// Create the runtime and start the control socket and style watcher
    pub fn new(paths: &ConfigPaths) -> anyhow::Result<Self> {
        let runtime = Arc::new(Runtime::new()?);
        let (event_tx, event_rx) = async_channel::bounded::<BarEvent>(64);

        let ipc = IpcServer::new(paths.socket.clone(), event_tx.clone());
        runtime.spawn(async move {
            if let Err(e) = ipc.run().await {
                error!("IPC server error: {}", e);
            }
        });

        let watcher = StyleWatcher::new(paths.style.clone(), event_tx);
        runtime.spawn(async move {
            if let Err(e) = watcher.run().await {
                error!("Style watcher error: {}", e);
            }
        });

        info!("ServiceHub initialized");

        Ok(Self { event_rx, runtime })
    }

    /// Get a clone of the event receiver for the main loop
    pub fn event_receiver(&self) -> async_channel::Receiver<BarEvent> {
        self.event_rx.clone()
    }

    /// Enter the runtime context (for GTK callbacks)
    pub fn enter_runtime(&self) -> tokio::runtime::EnterGuard<'_> {
        self.runtime.enter()
    }

    /// Handle for modules spawning blocking work off the main loop
    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }
}
