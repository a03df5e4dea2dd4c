use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};

use crate::{
    domain::CategoryOverrides,
    ledger::{
        aggregate::{PruneReport, ReanalyzeReport},
        entities::{Ledger, VisitEvent},
        error::LedgerError,
        ResetScope, TimeLedger,
    },
    stats::{time_stats, TimeStats},
    storage::ledger_storage::LedgerStorage,
    utils::clock::Clock,
};

const COMMAND_BUFFER: usize = 32;

type Reply<T> = oneshot::Sender<Result<T, LedgerError>>;

enum Command {
    Record(VisitEvent, Reply<()>),
    Reanalyze(CategoryOverrides, Reply<ReanalyzeReport>),
    Reset(ResetScope, Reply<()>),
    Prune(Reply<PruneReport>),
}

/// Single owner of a [TimeLedger]. Mutations arrive through a channel and are applied one at a
/// time, so no two read-modify-write cycles ever overlap within the process. Every committed
/// state is published for readers, who never wait for writers.
pub struct Tracker<S> {
    ledger: TimeLedger<S>,
    commands: mpsc::Receiver<Command>,
    snapshot: watch::Sender<Arc<Ledger>>,
    retention_days: u32,
}

/// Cloneable entry point to a running [Tracker].
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<Arc<Ledger>>,
    clock: Arc<dyn Clock>,
    top_domains: usize,
}

impl<S: LedgerStorage> Tracker<S> {
    pub fn new(
        ledger: TimeLedger<S>,
        clock: Arc<dyn Clock>,
        retention_days: u32,
        top_domains: usize,
    ) -> (Self, TrackerHandle) {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_sender, snapshot_receiver) =
            watch::channel(Arc::new(ledger.snapshot().clone()));
        let tracker = Self {
            ledger,
            commands: receiver,
            snapshot: snapshot_sender,
            retention_days,
        };
        let handle = TrackerHandle {
            commands: sender,
            snapshot: snapshot_receiver,
            clock,
            top_domains,
        };
        (tracker, handle)
    }

    /// Processes commands until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Record(event, reply) => {
                    let result = self.ledger.record_visit(event).await;
                    self.finish("record", result, reply);
                }
                Command::Reanalyze(overrides, reply) => {
                    let result = self.ledger.reanalyze(overrides).await;
                    self.finish("reanalyze", result, reply);
                }
                Command::Reset(scope, reply) => {
                    let result = self.ledger.reset(scope).await;
                    self.finish("reset", result, reply);
                }
                Command::Prune(reply) => {
                    let result = self.ledger.prune_retention(self.retention_days).await;
                    self.finish("prune", result, reply);
                }
            }
        }
        info!("Tracker stopped");
    }

    fn finish<T>(&self, operation: &str, result: Result<T, LedgerError>, reply: Reply<T>) {
        match &result {
            Ok(_) => {
                debug!("Committed {operation}");
                self.snapshot
                    .send_replace(Arc::new(self.ledger.snapshot().clone()));
            }
            Err(e) => error!("Failed to {operation}: {e}"),
        }
        // The requester may have gone away, the change is committed regardless.
        let _ = reply.send(result);
    }
}

impl TrackerHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, LedgerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| LedgerError::Stopped)?;
        response.await.map_err(|_| LedgerError::Stopped)?
    }

    pub async fn record(&self, event: VisitEvent) -> Result<(), LedgerError> {
        self.request(|reply| Command::Record(event, reply)).await
    }

    pub async fn reanalyze(
        &self,
        overrides: CategoryOverrides,
    ) -> Result<ReanalyzeReport, LedgerError> {
        self.request(|reply| Command::Reanalyze(overrides, reply))
            .await
    }

    pub async fn reset(&self, scope: ResetScope) -> Result<(), LedgerError> {
        self.request(|reply| Command::Reset(scope, reply)).await
    }

    pub async fn prune(&self) -> Result<PruneReport, LedgerError> {
        self.request(Command::Prune).await
    }

    /// Latest committed ledger.
    pub fn snapshot(&self) -> Arc<Ledger> {
        self.snapshot.borrow().clone()
    }

    pub fn stats(&self) -> TimeStats {
        time_stats(&self.snapshot(), self.clock.today(), self.top_domains)
    }
}
