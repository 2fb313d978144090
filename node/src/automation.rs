//! Airline automation driven by ledger events.
//!
//! - [`AnteSender`] pays the ante for an airline as soon as its registration is
//!   approved.
//! - [`FlightScheduler`] registers an airline's catalog flights once it can
//!   participate.
//!
//! Both act on the accounts this node operates and never retry a failed call.

use std::collections::HashSet;
use std::sync::Arc;

use surety_ledger::{EventSubscription, LedgerEvent, LedgerFacade};
use surety_rpc::SharedCatalog;
use surety_types::{AccountId, Clock, FlightKey};
use crate::metrics::NodeMetrics;
use crate::shutdown::StopSignal;

pub struct AnteSender {
    ledger: Arc<dyn LedgerFacade>,
    metrics: Arc<NodeMetrics>,
}

impl AnteSender {
    pub fn new(ledger: Arc<dyn LedgerFacade>, metrics: Arc<NodeMetrics>) -> Self {
        Self { ledger, metrics }
    }

    /// Returns the airline funded, if any.
    pub fn handle(&self, event: &LedgerEvent) -> Option<AccountId> {
        let LedgerEvent::RegistrationPending {
            candidate,
            approved: true,
        } = event
        else {
            return None;
        };
        let ante = self.ledger.params().airline_ante;
        match self.ledger.fund(*candidate, ante) {
            Ok(()) => {
                tracing::info!(airline = %candidate, %ante, "ante sent");
                self.metrics.antes_sent.inc();
                Some(*candidate)
            }
            Err(e) => {
                tracing::warn!(airline = %candidate, error = %e, "sending ante failed");
                None
            }
        }
    }
}

pub struct FlightScheduler {
    ledger: Arc<dyn LedgerFacade>,
    catalog: SharedCatalog,
    clock: Arc<dyn Clock>,
    metrics: Arc<NodeMetrics>,
    scheduled: HashSet<AccountId>,
}

impl FlightScheduler {
    pub fn new(
        ledger: Arc<dyn LedgerFacade>,
        catalog: SharedCatalog,
        clock: Arc<dyn Clock>,
        metrics: Arc<NodeMetrics>,
    ) -> Self {
        Self {
            ledger,
            catalog,
            clock,
            metrics,
            scheduled: HashSet::new(),
        }
    }

    /// Register the catalog flights of an airline that just became able to
    /// participate. Each airline is scheduled at most once, so a redelivered
    /// event registers nothing new. Returns the flights registered.
    pub async fn handle(&mut self, event: &LedgerEvent) -> Vec<FlightKey> {
        let LedgerEvent::Registered {
            airline,
            can_participate: true,
        } = event
        else {
            return Vec::new();
        };
        let airline = *airline;
        let mut catalog = self.catalog.lock().await;
        if catalog.schedule_for(&airline).is_none() || !self.scheduled.insert(airline) {
            return Vec::new();
        }

        let mut registered = Vec::new();
        for key in catalog.materialize(&airline, self.clock.now()) {
            match self.ledger.register_flight(key.clone()) {
                Ok(()) => {
                    tracing::info!(%airline, flight = %key, "scheduled flight registered");
                    self.metrics.flights_registered.inc();
                    catalog.record_registered(key.clone());
                    registered.push(key);
                }
                Err(e) => {
                    tracing::warn!(%airline, flight = %key, error = %e, "flight registration failed");
                }
            }
        }
        registered
    }
}

/// Follow the event feed, feeding every event to both automations.
pub async fn run_automation(
    ante: AnteSender,
    mut scheduler: FlightScheduler,
    metrics: Arc<NodeMetrics>,
    mut events: EventSubscription,
    mut stop: StopSignal,
) {
    loop {
        tokio::select! {
            biased;
            reason = stop.stopped() => {
                tracing::debug!(%reason, "airline automation shutting down");
                break;
            }
            next = events.recv() => {
                let Some(next) = next else {
                    tracing::debug!("event feed closed, airline automation stopping");
                    break;
                };
                if let LedgerEvent::FlightStatusInfo { key, status, request } = &next.event {
                    tracing::info!(%request, flight = %key, %status, "flight status finalized");
                    metrics.statuses_finalized.inc();
                }
                ante.handle(&next.event);
                scheduler.handle(&next.event).await;
            }
        }
    }
}
