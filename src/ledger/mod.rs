//! The aggregation store. [entities] holds the persisted shapes, [aggregate] the pure operations
//! on them, [migration] the re-keying of legacy data, and [TimeLedger] ties them to a
//! [LedgerStorage].

pub mod aggregate;
pub mod entities;
pub mod error;
pub mod migration;

use std::sync::Arc;

use aggregate::{PruneReport, ReanalyzeReport};
use chrono::NaiveDate;
use entities::{Ledger, VisitEvent};
use error::LedgerError;
use migration::migrate;
use tracing::{debug, info};

use crate::{
    domain::{CategoryClassifier, CategoryOverrides},
    storage::ledger_storage::LedgerStorage,
    utils::{clock::Clock, time::day_key},
};

/// Which parts of the ledger a reset clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Recorded time only, category overrides survive.
    Activity,
    /// Category overrides only. Recorded time is reclassified by keywords.
    Categories,
    Everything,
}

/// Service object owning the ledger of one store.
///
/// Every mutation is a full cycle: lock the store, load it, apply the change, store it and only
/// then publish the result as the new committed state. A failed cycle leaves both the store and
/// [TimeLedger::snapshot] as they were.
pub struct TimeLedger<S> {
    storage: S,
    classifier: CategoryClassifier,
    clock: Arc<dyn Clock>,
    committed: Ledger,
    pruned_on_open: PruneReport,
}

impl<S: LedgerStorage> TimeLedger<S> {
    /// Opens the stored ledger, migrating legacy keys and pruning days older than
    /// `retention_days`.
    pub async fn open(
        storage: S,
        classifier: CategoryClassifier,
        clock: Arc<dyn Clock>,
        retention_days: u32,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self {
            storage,
            classifier,
            clock,
            committed: Ledger::default(),
            pruned_on_open: PruneReport::default(),
        };

        let today = ledger.clock.today();
        let now = ledger.clock.now_millis();
        let classifier = &ledger.classifier;
        ledger.pruned_on_open = commit(&ledger.storage, &mut ledger.committed, |state| {
            let report = migrate(state);
            if report.changed() {
                info!("Migrated legacy domain keys {report:?}");
                let overrides = state.overrides.clone();
                state.reanalyze(overrides, classifier, now);
            }
            state.prune_days(today, retention_days)
        })
        .await?;
        log_pruned(ledger.pruned_on_open, retention_days);

        Ok(ledger)
    }

    /// Adds a visit to today's statistics.
    pub async fn record_visit(&mut self, event: VisitEvent) -> Result<(), LedgerError> {
        let visit = event.into_visit(self.clock.now_millis())?;
        let day = day_key(self.clock.today());
        let classifier = &self.classifier;
        commit(&self.storage, &mut self.committed, |state| {
            state.record_visit(&visit, classifier, &day)
        })
        .await?;
        debug!("Recorded {}s on {} for {day}", visit.seconds, visit.domain);
        Ok(())
    }

    /// Replaces the override map and re-derives categories and day buckets from it.
    pub async fn reanalyze(
        &mut self,
        overrides: CategoryOverrides,
    ) -> Result<ReanalyzeReport, LedgerError> {
        let now = self.clock.now_millis();
        let classifier = &self.classifier;
        let report = commit(&self.storage, &mut self.committed, |state| {
            state.reanalyze(overrides, classifier, now)
        })
        .await?;
        info!(
            "Reanalysis complete for {} domains: {report:?}",
            self.committed.domains.len()
        );
        Ok(report)
    }

    /// Edits the override map as stored right now, under the same lock as the write. Another
    /// writer's overrides committed since this ledger was opened are kept. `edit` returns whether
    /// it changed anything, nothing is reanalyzed when it did not.
    pub async fn edit_overrides(
        &mut self,
        edit: impl FnOnce(&mut CategoryOverrides) -> bool,
    ) -> Result<Option<ReanalyzeReport>, LedgerError> {
        let now = self.clock.now_millis();
        let classifier = &self.classifier;
        let report = commit(&self.storage, &mut self.committed, |state| {
            let mut overrides = state.overrides.clone();
            if !edit(&mut overrides) {
                return None;
            }
            Some(state.reanalyze(overrides, classifier, now))
        })
        .await?;
        if let Some(report) = &report {
            info!("Overrides edited: {report:?}");
        }
        Ok(report)
    }

    /// Removes day records strictly older than `horizon_days` before today, along with day records
    /// whose key is not a date.
    pub async fn prune_retention(&mut self, horizon_days: u32) -> Result<PruneReport, LedgerError> {
        let today = self.clock.today();
        let report = commit(&self.storage, &mut self.committed, |state| {
            state.prune_days(today, horizon_days)
        })
        .await?;
        log_pruned(report, horizon_days);
        Ok(report)
    }

    pub async fn reset(&mut self, scope: ResetScope) -> Result<(), LedgerError> {
        let now = self.clock.now_millis();
        let classifier = &self.classifier;
        commit(&self.storage, &mut self.committed, |state| match scope {
            ResetScope::Activity => state.clear_activity(),
            ResetScope::Categories => {
                state.reanalyze(CategoryOverrides::new(), classifier, now);
            }
            ResetScope::Everything => *state = Ledger::default(),
        })
        .await?;
        info!("Reset {scope:?}");
        Ok(())
    }

    /// The last committed state.
    pub fn snapshot(&self) -> &Ledger {
        &self.committed
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// What [TimeLedger::open] pruned.
    pub fn pruned_on_open(&self) -> PruneReport {
        self.pruned_on_open
    }
}

/// Runs `op` inside a locked load-modify-store cycle and publishes the result into `committed`
/// once it was stored.
async fn commit<S: LedgerStorage, T>(
    storage: &S,
    committed: &mut Ledger,
    op: impl FnOnce(&mut Ledger) -> T,
) -> Result<T, LedgerError> {
    let guard = storage.lock().await?;
    let mut state = storage.load().await?;
    let output = op(&mut state);
    storage.store(&state).await?;
    guard.release().await?;
    *committed = state;
    Ok(output)
}

fn log_pruned(report: PruneReport, horizon_days: u32) {
    if report.expired > 0 {
        info!(
            "Pruned {} day records older than {horizon_days} days",
            report.expired
        );
    }
    if report.unreadable > 0 {
        info!("Pruned {} day records with unreadable keys", report.unreadable);
    }
}
