use std::path::PathBuf;
use std::time::Duration;

use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::messages::BarEvent;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches the user stylesheet and reports changes to the main loop
pub struct StyleWatcher {
    path: PathBuf,
    event_tx: Sender<BarEvent>,
}

impl StyleWatcher {
    pub fn new(path: PathBuf, event_tx: Sender<BarEvent>) -> Self {
        Self { path, event_tx }
    }

    /// Run the watcher (blocks forever)
    pub async fn run(self) -> anyhow::Result<()> {
        let Some(dir) = self.path.parent().map(PathBuf::from) else {
            return Ok(());
        };
        if !dir.exists() {
            debug!("Style directory {:?} does not exist, not watching", dir);
            return Ok(());
        }

        let (notify_tx, mut notify_rx) = mpsc::channel::<PathBuf>(32);
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        for path in event.paths {
                            let _ = notify_tx.blocking_send(path);
                        }
                    }
                }
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Editors replace the file, so watch the directory
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!("Watching stylesheet {:?}", self.path);

        let mut deadline: Option<tokio::time::Instant> = None;
        loop {
            tokio::select! {
                Some(path) = notify_rx.recv() => {
                    if path == self.path {
                        deadline = Some(tokio::time::Instant::now() + DEBOUNCE);
                    }
                }

                _ = async {
                    match deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    deadline = None;
                    debug!("Stylesheet changed: {:?}", self.path);
                    if self.event_tx.send(BarEvent::StyleChanged).await.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }
}
