//! Node wiring: ledger, airline automation, oracle agents and the REST façade.

use std::sync::Arc;
use std::time::Duration;

use surety_admission::FlightCatalog;
use surety_ledger::{LedgerFacade, LocalLedger};
use surety_rpc::{RpcServer, RpcState, SharedCatalog};
use surety_types::{Clock, SystemClock};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::automation::{run_automation, AnteSender, FlightScheduler};
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;
use crate::oracle_service::OracleService;
use crate::shutdown::{ShutdownController, StopReason};

/// Timeout for waiting on background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SuretyNode {
    pub config: NodeConfig,
    pub ledger: Arc<dyn LedgerFacade>,
    pub catalog: SharedCatalog,
    pub metrics: Arc<NodeMetrics>,
    pub shutdown: Arc<ShutdownController>,
    clock: Arc<dyn Clock>,
    /// Handles for spawned background tasks (joined during shutdown).
    task_handles: Vec<JoinHandle<()>>,
    started: bool,
}

impl SuretyNode {
    /// Node backed by an in-process ledger with OS entropy and the system clock.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let ledger = LocalLedger::with_system_sources(
            config.params.clone(),
            config.owner,
            config.founder,
        )?;
        Self::with_ledger(config, Arc::new(ledger), Arc::new(SystemClock))
    }

    /// Node driving an existing ledger.
    pub fn with_ledger(
        config: NodeConfig,
        ledger: Arc<dyn LedgerFacade>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NodeError> {
        let catalog = Arc::new(Mutex::new(FlightCatalog::new(config.flight_catalog.clone())));
        Ok(Self {
            config,
            ledger,
            catalog,
            metrics: Arc::new(NodeMetrics::new()?),
            shutdown: Arc::new(ShutdownController::new()),
            clock,
            task_handles: Vec::new(),
            started: false,
        })
    }

    /// Start all node tasks.
    ///
    /// 1. Starts the airline automation (ante sender, flight scheduler)
    /// 2. Registers the configured oracles and spawns their agents
    /// 3. Proposes the configured airlines
    /// 4. Optionally starts the REST server
    pub async fn start(&mut self) -> Result<(), NodeError> {
        if self.started {
            return Err(NodeError::AlreadyStarted);
        }
        self.started = true;
        tracing::info!(
            owner = %self.config.owner,
            founder = %self.config.founder,
            oracles = self.config.oracles.len(),
            event_start = ?self.config.event_start,
            "flight surety node starting"
        );

        // ── Airline automation ───────────────────────────────────────────
        let ante = AnteSender::new(Arc::clone(&self.ledger), Arc::clone(&self.metrics));
        let scheduler = FlightScheduler::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.catalog),
            Arc::clone(&self.clock),
            Arc::clone(&self.metrics),
        );
        let events = self.ledger.subscribe(self.config.event_start);
        let automation_handle = tokio::spawn(run_automation(
            ante,
            scheduler,
            Arc::clone(&self.metrics),
            events,
            self.shutdown.subscribe(),
        ));
        self.task_handles.push(automation_handle);

        // ── Oracle agents ────────────────────────────────────────────────
        let service = OracleService::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.clock),
            Arc::clone(&self.metrics),
            self.config.clock_granularity_secs,
        );
        let agents = service.register_all(&self.config.oracles);
        let agent_handles = service.spawn(agents, self.config.event_start, &self.shutdown);
        tracing::info!(agents = agent_handles.len(), "oracle agents running");
        self.task_handles.extend(agent_handles);

        // ── Configured airlines ──────────────────────────────────────────
        self.register_configured_airlines().await;

        // ── REST server (optional) ───────────────────────────────────────
        if self.config.enable_rpc {
            let rpc_state = Arc::new(RpcState {
                ledger: Arc::clone(&self.ledger),
                catalog: Arc::clone(&self.catalog),
                metrics: self
                    .config
                    .enable_metrics
                    .then(|| self.metrics.registry.clone()),
            });
            let rpc_server = RpcServer::with_state(self.config.rpc_port, rpc_state);
            let mut stop = self.shutdown.subscribe();
            let rpc_handle = tokio::spawn(async move {
                tokio::select! {
                    biased;
                    reason = stop.stopped() => {
                        tracing::info!(%reason, "REST server shutting down");
                    }
                    result = rpc_server.start() => {
                        match result {
                            Ok(()) => tracing::info!("REST server exited"),
                            Err(e) => tracing::error!("REST server error: {e}"),
                        }
                    }
                }
            });
            self.task_handles.push(rpc_handle);
        }

        Ok(())
    }

    /// Give each configured airline a catalog schedule and propose it.
    /// Failures are logged; the node keeps running.
    async fn register_configured_airlines(&self) {
        for airline in &self.config.airlines {
            let registrar = airline.registrar.unwrap_or(self.config.founder);
            self.catalog.lock().await.assign(airline.account);
            match self.ledger.register_airline(registrar, airline.account) {
                Ok(outcome) => {
                    tracing::info!(airline = %airline.account, %registrar, ?outcome, "configured airline proposed");
                }
                Err(e) => {
                    tracing::warn!(airline = %airline.account, %registrar, error = %e, "configured airline registration failed");
                }
            }
        }
    }

    /// Signal every task to stop and wait for them, up to a timeout.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        self.stop_for(StopReason::Requested).await
    }

    /// Like [`stop`](Self::stop), recording why. A reason already recorded
    /// by an earlier trigger is kept.
    pub async fn stop_for(&mut self, reason: StopReason) -> Result<(), NodeError> {
        self.shutdown.trigger(reason);
        let reason = self.shutdown.reason().unwrap_or(reason);
        tracing::info!(%reason, "flight surety node stopping");

        let handles: Vec<JoinHandle<()>> = self.task_handles.drain(..).collect();
        let wait_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };

        if tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all)
            .await
            .is_err()
        {
            tracing::warn!(
                "shutdown timeout ({:?}), some tasks may still be running",
                SHUTDOWN_TIMEOUT
            );
        }

        tracing::info!("flight surety node stopped");
        Ok(())
    }

    /// Number of background tasks currently tracked.
    pub fn task_count(&self) -> usize {
        self.task_handles.len()
    }
}
