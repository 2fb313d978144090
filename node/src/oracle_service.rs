//! Registers the node's oracles and runs one agent per oracle.

use std::sync::Arc;

use surety_ledger::{LedgerFacade, StartFrom};
use surety_oracles::{ClockDerived, FixedStatus, OracleResponder, StatusDecider};
use surety_types::Clock;
use tokio::task::JoinHandle;

use crate::config::{DecisionConfig, OracleConfig};
use crate::metrics::NodeMetrics;
use crate::oracle_agent::OracleAgent;
use crate::shutdown::ShutdownController;

pub fn decider_for(decision: DecisionConfig, granularity_secs: u64) -> Arc<dyn StatusDecider> {
    match decision {
        DecisionConfig::Fixed(status) => Arc::new(FixedStatus(status)),
        DecisionConfig::Clock => Arc::new(ClockDerived::new(granularity_secs)),
    }
}

pub struct OracleService {
    ledger: Arc<dyn LedgerFacade>,
    clock: Arc<dyn Clock>,
    metrics: Arc<NodeMetrics>,
    granularity_secs: u64,
}

impl OracleService {
    pub fn new(
        ledger: Arc<dyn LedgerFacade>,
        clock: Arc<dyn Clock>,
        metrics: Arc<NodeMetrics>,
        granularity_secs: u64,
    ) -> Self {
        Self {
            ledger,
            clock,
            metrics,
            granularity_secs,
        }
    }

    /// Register each oracle with the required stake, read back its indices and
    /// build its agent.
    ///
    /// A failed registration is logged and the agent is still built; it treats
    /// every request as not its own until indices become available.
    pub fn register_all(&self, oracles: &[OracleConfig]) -> Vec<OracleAgent> {
        let stake = self.ledger.params().oracle_stake;
        oracles
            .iter()
            .map(|cfg| {
                let decider = decider_for(cfg.decision, self.granularity_secs);
                let mut responder = OracleResponder::new(cfg.account, decider);
                let indexes = self
                    .ledger
                    .register_oracle(cfg.account, stake)
                    .and_then(|_| self.ledger.get_my_indexes(cfg.account));
                match indexes {
                    Ok(indexes) => {
                        tracing::info!(oracle = %cfg.account, %indexes, "oracle registered");
                        responder.set_indexes(indexes);
                    }
                    Err(e) => {
                        tracing::warn!(oracle = %cfg.account, error = %e, "oracle registration failed");
                    }
                }
                OracleAgent::new(
                    responder,
                    Arc::clone(&self.ledger),
                    Arc::clone(&self.clock),
                    Arc::clone(&self.metrics),
                )
            })
            .collect()
    }

    /// Spawn one task per agent, each with its own subscription.
    pub fn spawn(
        &self,
        agents: Vec<OracleAgent>,
        start: StartFrom,
        shutdown: &ShutdownController,
    ) -> Vec<JoinHandle<()>> {
        agents
            .into_iter()
            .map(|agent| {
                let events = self.ledger.subscribe(start);
                let stop = shutdown.subscribe();
                let metrics = Arc::clone(&self.metrics);
                metrics.oracle_agents.inc();
                tokio::spawn(async move {
                    agent.run(events, stop).await;
                    metrics.oracle_agents.dec();
                })
            })
            .collect()
    }
}
