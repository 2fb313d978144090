//! Prometheus metrics for the node.
//!
//! [`NodeMetrics`] owns a dedicated [`Registry`] that the REST `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

pub struct NodeMetrics {
    pub registry: Registry,

    // ── Oracle agents ───────────────────────────────────────────────────
    /// Dispatch events seen, summed over all agents.
    pub oracle_requests_observed: IntCounter,
    pub oracle_responses_submitted: IntCounter,
    /// Submissions the ledger refused or that failed in transit.
    pub oracle_responses_rejected: IntCounter,
    pub oracle_agents: IntGauge,

    // ── Airline automation ──────────────────────────────────────────────
    pub antes_sent: IntCounter,
    pub flights_registered: IntCounter,
    pub statuses_finalized: IntCounter,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let oracle_requests_observed = register_int_counter_with_registry!(
            Opts::new(
                "surety_oracle_requests_observed_total",
                "Oracle request events observed by local agents"
            ),
            registry
        )?;
        let oracle_responses_submitted = register_int_counter_with_registry!(
            Opts::new(
                "surety_oracle_responses_submitted_total",
                "Oracle responses accepted by the ledger"
            ),
            registry
        )?;
        let oracle_responses_rejected = register_int_counter_with_registry!(
            Opts::new(
                "surety_oracle_responses_rejected_total",
                "Oracle responses rejected or lost in submission"
            ),
            registry
        )?;
        let oracle_agents = register_int_gauge_with_registry!(
            Opts::new("surety_oracle_agents", "Running oracle agents"),
            registry
        )?;
        let antes_sent = register_int_counter_with_registry!(
            Opts::new("surety_antes_sent_total", "Airline antes sent"),
            registry
        )?;
        let flights_registered = register_int_counter_with_registry!(
            Opts::new(
                "surety_flights_registered_total",
                "Scheduled flights registered on the ledger"
            ),
            registry
        )?;
        let statuses_finalized = register_int_counter_with_registry!(
            Opts::new(
                "surety_statuses_finalized_total",
                "Flight status requests that reached quorum"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            oracle_requests_observed,
            oracle_responses_submitted,
            oracle_responses_rejected,
            oracle_agents,
            antes_sent,
            flights_registered,
            statuses_finalized,
        })
    }
}
