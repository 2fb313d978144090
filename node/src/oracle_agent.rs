//! Oracle agent: the event loop around one oracle's response decision.
//!
//! Each agent follows the ledger's event feed on its own task, answers the
//! requests dispatched to one of its indices and ignores everything else.
//! A failed submission is logged and dropped; the loop keeps going.

use std::sync::Arc;

use surety_ledger::{EventSubscription, LedgerEvent, LedgerFacade};
use surety_oracles::{Decision, OracleResponder, ResponseOutcome};
use surety_types::{AccountId, Clock};
use crate::metrics::NodeMetrics;
use crate::shutdown::StopSignal;

/// What an agent did with one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentAction {
    /// Not a dispatch event.
    Ignored,
    /// Dispatched to an index this oracle does not hold (or holds none yet).
    NotMine,
    Submitted(ResponseOutcome),
    /// The submission failed. Not retried.
    Failed,
}

pub struct OracleAgent {
    responder: OracleResponder,
    ledger: Arc<dyn LedgerFacade>,
    clock: Arc<dyn Clock>,
    metrics: Arc<NodeMetrics>,
}

impl OracleAgent {
    pub fn new(
        responder: OracleResponder,
        ledger: Arc<dyn LedgerFacade>,
        clock: Arc<dyn Clock>,
        metrics: Arc<NodeMetrics>,
    ) -> Self {
        Self {
            responder,
            ledger,
            clock,
            metrics,
        }
    }

    pub fn oracle(&self) -> AccountId {
        self.responder.oracle()
    }

    pub fn responder(&self) -> &OracleResponder {
        &self.responder
    }

    pub fn handle(&mut self, event: &LedgerEvent) -> AgentAction {
        let Some(request) = event.as_oracle_request() else {
            return AgentAction::Ignored;
        };
        self.metrics.oracle_requests_observed.inc();
        let oracle = self.responder.oracle();
        if self.responder.indexes().is_none() {
            self.fetch_indexes();
        }

        match self.responder.decide(&request, self.clock.now()) {
            Decision::NoIndexes => {
                tracing::trace!(%oracle, index = request.index, "no indexes yet, request not mine");
                AgentAction::NotMine
            }
            Decision::NotMine => {
                tracing::trace!(%oracle, index = request.index, "request not mine");
                AgentAction::NotMine
            }
            Decision::Respond(response) => {
                let status = response.status;
                match self.ledger.submit_oracle_response(response) {
                    Ok(outcome) => {
                        tracing::debug!(%oracle, index = request.index, flight = %request.key, %status, ?outcome, "oracle response submitted");
                        self.metrics.oracle_responses_submitted.inc();
                        AgentAction::Submitted(outcome)
                    }
                    Err(e) => {
                        tracing::warn!(%oracle, index = request.index, flight = %request.key, error = %e, "oracle response lost");
                        self.metrics.oracle_responses_rejected.inc();
                        AgentAction::Failed
                    }
                }
            }
        }
    }

    /// Registration may not have landed when the first request arrives; until
    /// it has, every request is treated as not ours.
    fn fetch_indexes(&mut self) {
        let oracle = self.responder.oracle();
        match self.ledger.get_my_indexes(oracle) {
            Ok(indexes) => {
                tracing::info!(%oracle, %indexes, "oracle indexes loaded");
                self.responder.set_indexes(indexes);
            }
            Err(e) => tracing::debug!(%oracle, error = %e, "oracle indexes not available"),
        }
    }

    /// Follow the event feed until shutdown or until the feed ends.
    pub async fn run(
        mut self,
        mut events: EventSubscription,
        mut stop: StopSignal,
    ) {
        let oracle = self.oracle();
        tracing::debug!(%oracle, decider = self.responder.decider_name(), from = events.position(), "oracle agent started");
        loop {
            tokio::select! {
                biased;
                reason = stop.stopped() => {
                    tracing::debug!(%oracle, %reason, "oracle agent shutting down");
                    break;
                }
                next = events.recv() => match next {
                    Some(event) => {
                        self.handle(&event.event);
                    }
                    None => {
                        tracing::debug!(%oracle, "event feed closed, oracle agent stopping");
                        break;
                    }
                }
            }
        }
    }
}
