//! Periodic driver for the watch job.

use crate::data::Store;
use crate::globalsearch::ClassSearch;
use crate::notify::Notifier;
use crate::scraper::watch::{WatchJob, WatchOptions};
use crate::utils::fmt_duration;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};

/// Runs the watch job on a fixed interval until shutdown.
pub struct WatchScheduler {
    search: Arc<dyn ClassSearch>,
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    options: WatchOptions,
    interval: Duration,
    shutdown_timeout: Duration,
}

impl WatchScheduler {
    pub fn new(
        search: Arc<dyn ClassSearch>,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        options: WatchOptions,
        interval: Duration,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            search,
            store,
            notifier,
            options,
            interval,
            shutdown_timeout,
        }
    }

    /// Runs the scheduler's main loop with graceful shutdown support.
    ///
    /// A run starts immediately and then every `interval`. A tick that lands
    /// while the previous run is still going is skipped. On shutdown an
    /// in-flight run gets `shutdown_timeout` to finish before it is abandoned.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(interval = fmt_duration(self.interval), "Watch scheduler started");

        let mut next_run = time::Instant::now();
        let mut current: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = time::sleep_until(next_run) => {
                    next_run = time::Instant::now() + self.interval;

                    if current.as_ref().is_some_and(|handle| !handle.is_finished()) {
                        warn!("Previous watch run still in progress, skipping this tick");
                        continue;
                    }

                    current = Some(self.spawn_run());
                }
                _ = shutdown_rx.recv() => {
                    info!("Watch scheduler received shutdown signal");

                    if let Some(handle) = current.take() {
                        if handle.is_finished() {
                            debug!("No watch run in progress");
                        } else {
                            info!("Waiting for in-flight watch run to finish");
                            match time::timeout(self.shutdown_timeout, handle).await {
                                Ok(_) => debug!("Watch run completed before shutdown"),
                                Err(_) => warn!(
                                    timeout = fmt_duration(self.shutdown_timeout),
                                    "Watch run did not finish in time, abandoning"
                                ),
                            }
                        }
                    }

                    info!("Watch scheduler exiting gracefully");
                    break;
                }
            }
        }
    }

    fn spawn_run(&self) -> JoinHandle<()> {
        let search = self.search.clone();
        let store = self.store.clone();
        let notifier = self.notifier.clone();
        let options = self.options;

        tokio::spawn(async move {
            let job = WatchJob::new(search.as_ref(), store.as_ref(), notifier.as_ref(), options);
            if let Err(e) = job.run().await {
                error!(error = ?e, "Watch run failed");
            }
        })
    }
}
