//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use surety_admission::{AirlineSchedule, ScheduledFlight};
use surety_ledger::StartFrom;
use surety_types::{AccountId, FlightStatus, ProtocolParams};

use crate::NodeError;

/// How an oracle chooses the status it reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionConfig {
    /// Always report this status code.
    Fixed(FlightStatus),
    /// Derive the status from the wall clock, bucketed by
    /// `clock_granularity_secs`.
    Clock,
}

/// An oracle account operated by this node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    pub account: AccountId,
    pub decision: DecisionConfig,
}

/// An airline this node proposes for admission at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineConfig {
    pub account: AccountId,
    /// The registered airline proposing it. Defaults to the founder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<AccountId>,
}

/// Configuration for a flight surety node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Ledger owner; the only account that may pause the ledger.
    #[serde(default = "default_owner")]
    pub owner: AccountId,

    /// First airline, registered and funded at genesis.
    #[serde(default = "default_founder")]
    pub founder: AccountId,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to enable the REST server.
    #[serde(default = "default_true")]
    pub enable_rpc: bool,

    /// REST port (if enabled).
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Whether to expose Prometheus metrics at `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Where oracle agents and automation start reading the event feed.
    #[serde(default)]
    pub event_start: StartFrom,

    /// Bucket width for clock-derived oracle decisions.
    #[serde(default = "default_clock_granularity")]
    pub clock_granularity_secs: u64,

    #[serde(default)]
    pub params: ProtocolParams,

    #[serde(default = "default_oracles")]
    pub oracles: Vec<OracleConfig>,

    #[serde(default)]
    pub airlines: Vec<AirlineConfig>,

    #[serde(default = "default_flight_catalog")]
    pub flight_catalog: Vec<AirlineSchedule>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_owner() -> AccountId {
    AccountId::from_seed(0xF0)
}

fn default_founder() -> AccountId {
    AccountId::from_seed(1)
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rpc_port() -> u16 {
    3000
}

fn default_clock_granularity() -> u64 {
    10
}

/// Twenty oracles, all reporting the airline at fault.
fn default_oracles() -> Vec<OracleConfig> {
    (20..40)
        .map(|seed| OracleConfig {
            account: AccountId::from_seed(seed),
            decision: DecisionConfig::Fixed(FlightStatus::LateAirline),
        })
        .collect()
}

fn default_flight_catalog() -> Vec<AirlineSchedule> {
    let schedule = |name: &str, flights: &[(&str, u64, u64)]| AirlineSchedule {
        airline_name: name.to_string(),
        flights: flights
            .iter()
            .map(|(flight, days_offset, seconds_offset)| ScheduledFlight {
                flight: flight.to_string(),
                days_offset: *days_offset,
                seconds_offset: *seconds_offset,
            })
            .collect(),
    };
    vec![
        schedule("Northwind", &[("NW100", 1, 0), ("NW220", 1, 7_200), ("NW301", 2, 3_600)]),
        schedule("Blue Heron", &[("BH010", 0, 21_600), ("BH455", 3, 0)]),
        schedule("Skylark", &[("SK700", 1, 43_200)]),
    ]
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        self.params
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        if self.founder.is_zero() {
            return Err(NodeError::Config("founder must not be the zero account".into()));
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            founder: default_founder(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_rpc: default_true(),
            rpc_port: default_rpc_port(),
            enable_metrics: false,
            event_start: StartFrom::default(),
            clock_granularity_secs: default_clock_granularity(),
            params: ProtocolParams::default(),
            oracles: default_oracles(),
            airlines: Vec::new(),
            flight_catalog: default_flight_catalog(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.oracles, config.oracles);
        assert_eq!(parsed.flight_catalog, config.flight_catalog);
        assert_eq!(parsed.founder, config.founder);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 3000);
        assert_eq!(config.oracles.len(), 20);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.event_start, StartFrom::Genesis);
        assert_eq!(config.params.min_responses, 3);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            event_start = "latest"

            [params]
            min_responses = 5

            [[oracles]]
            account = "0x0000000000000000000000000000000000000abc"
            decision = { fixed = 40 }

            [[oracles]]
            account = "0x0000000000000000000000000000000000000abd"
            decision = "clock"
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.event_start, StartFrom::Latest);
        assert_eq!(config.params.min_responses, 5);
        assert_eq!(config.params.index_space, 10);
        assert_eq!(
            config.oracles[0].decision,
            DecisionConfig::Fixed(FlightStatus::LateTechnical)
        );
        assert_eq!(config.oracles[1].decision, DecisionConfig::Clock);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        let toml = r#"
            [[oracles]]
            account = "0x0000000000000000000000000000000000000abc"
            decision = { fixed = 25 }
        "#;
        assert!(matches!(
            NodeConfig::from_toml_str(toml),
            Err(NodeError::Config(_))
        ));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let toml = r#"
            [params]
            index_space = 2
        "#;
        assert!(NodeConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn event_start_at_sequence() {
        let config = NodeConfig::from_toml_str("event_start = { seq = 42 }").unwrap();
        assert_eq!(config.event_start, StartFrom::Seq(42));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/surety.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
