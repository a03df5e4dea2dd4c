//! The long running process the browser extension talks to. Requests arrive as native messaging
//! frames on stdin and are answered on stdout, while a [tracker::Tracker] owns the ledger and a
//! [maintenance::MaintenanceModule] keeps the retention horizon in check.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use maintenance::MaintenanceModule;
use protocol::Framing;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracker::Tracker;

use crate::{
    config::TrackerConfig,
    domain::CategoryClassifier,
    ledger::TimeLedger,
    storage::ledger_storage::JsonFileStorage,
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod maintenance;
pub mod protocol;
pub mod server;
pub mod shutdown;
pub mod tracker;

/// Represents the starting point for the host
pub async fn start_host(dir: PathBuf, config: TrackerConfig, framing: Framing) -> Result<()> {
    run_host(
        dir,
        config,
        Arc::new(DefaultClock),
        framing,
        tokio::io::stdin(),
        tokio::io::stdout(),
    )
    .await
}

async fn run_host<R, W>(
    dir: PathBuf,
    config: TrackerConfig,
    clock: Arc<dyn Clock>,
    framing: Framing,
    reader: R,
    writer: W,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let storage = JsonFileStorage::new(&dir)?;
    let ledger = TimeLedger::open(
        storage,
        CategoryClassifier::default(),
        clock.clone(),
        config.retention_days,
    )
    .await?;
    info!(
        "Host started with {} domains in {}",
        ledger.snapshot().domains.len(),
        dir.display()
    );

    let (tracker, handle) = Tracker::new(
        ledger,
        clock.clone(),
        config.retention_days,
        config.top_domains,
    );
    let tracker_task = tokio::spawn(tracker.run());

    let shutdown_token = CancellationToken::new();
    let maintenance = MaintenanceModule::new(
        handle.clone(),
        shutdown_token.clone(),
        config.prune_interval,
        clock,
    );

    let (_, serving_result, _) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        async {
            let result =
                server::serve(reader, writer, framing, handle, shutdown_token.clone()).await;
            shutdown_token.cancel();
            result
        },
        maintenance.run(),
    );

    if let Err(serving_result) = &serving_result {
        error!("Serving got an error {:?}", serving_result);
    }

    // Every handle is gone now, the tracker drains what is left and stops.
    tracker_task.await?;
    info!("Host stopped");
    serving_result
}
