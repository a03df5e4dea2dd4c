use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::utils::clock::Clock;

use super::tracker::TrackerHandle;

/// Periodically prunes day records past the retention horizon. Pruning goes through the tracker
/// like any other mutation, so it never races with incoming events.
pub struct MaintenanceModule {
    tracker: TrackerHandle,
    shutdown: CancellationToken,
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl MaintenanceModule {
    pub fn new(
        tracker: TrackerHandle,
        shutdown: CancellationToken,
        interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tracker,
            shutdown,
            interval,
            clock,
        }
    }

    /// Executes the maintenance loop until shutdown.
    pub async fn run(self) {
        let mut next_run = self.clock.instant();
        loop {
            next_run += self.interval;

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return
                }
                _ = self.clock.sleep_until(next_run) => ()
            }

            match self.tracker.prune().await {
                Ok(report) if report.removed() == 0 => (),
                Ok(report) => info!("Maintenance pruned {report:?}"),
                Err(e) => error!("Maintenance failed to prune {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    use crate::{
        domain::CategoryClassifier,
        host::tracker::Tracker,
        ledger::{entities::DayRecord, TimeLedger},
        storage::ledger_storage::{JsonFileStorage, LedgerStorage},
        utils::{
            clock::{Clock, FixedClock},
            time::day_key,
        },
    };

    use super::MaintenanceModule;

    #[tokio::test]
    async fn test_prunes_on_interval_until_cancelled() -> Result<()> {
        let dir = tempdir()?;
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(today));
        let storage = Arc::new(JsonFileStorage::new(dir.path())?);
        let ledger =
            TimeLedger::open(storage.clone(), CategoryClassifier::default(), clock.clone(), 30)
                .await?;
        let (tracker, handle) = Tracker::new(ledger, clock.clone(), 30, 10);
        let tracker_task = tokio::spawn(tracker.run());

        // Written behind the tracker's back, as the cli would.
        let mut state = storage.load().await?;
        state.days.insert(
            day_key(today - chrono::Duration::days(40)),
            DayRecord::default(),
        );
        storage.store(&state).await?;

        let shutdown = CancellationToken::new();
        let maintenance = MaintenanceModule::new(
            handle.clone(),
            shutdown.clone(),
            Duration::from_millis(20),
            clock,
        );
        let maintenance_task = tokio::spawn(maintenance.run());

        tokio::time::timeout(Duration::from_secs(5), async {
            while !storage.load().await?.days.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            anyhow::Ok(())
        })
        .await??;

        shutdown.cancel();
        maintenance_task.await?;
        drop(handle);
        tracker_task.await?;
        Ok(())
    }
}
