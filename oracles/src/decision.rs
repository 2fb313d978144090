//! Status decision functions used by oracle responders.

use surety_types::{FlightStatus, Timestamp};

use crate::request::OracleRequest;

/// Chooses the status an oracle reports for a request it holds.
pub trait StatusDecider: Send + Sync {
    fn decide(&self, request: &OracleRequest, now: Timestamp) -> FlightStatus;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// Always reports the same status.
#[derive(Clone, Copy, Debug)]
pub struct FixedStatus(pub FlightStatus);

impl StatusDecider for FixedStatus {
    fn decide(&self, _request: &OracleRequest, _now: Timestamp) -> FlightStatus {
        self.0
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Picks a status from the wall clock at response time.
///
/// Time is bucketed by `granularity_secs`, so oracles answering within the same
/// bucket agree on the status.
#[derive(Clone, Copy, Debug)]
pub struct ClockDerived {
    pub granularity_secs: u64,
}

impl ClockDerived {
    pub const DEFAULT_GRANULARITY_SECS: u64 = 10;

    pub fn new(granularity_secs: u64) -> Self {
        Self {
            granularity_secs: granularity_secs.max(1),
        }
    }
}

impl Default for ClockDerived {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GRANULARITY_SECS)
    }
}

impl StatusDecider for ClockDerived {
    fn decide(&self, _request: &OracleRequest, now: Timestamp) -> FlightStatus {
        let bucket = now.as_secs() / self.granularity_secs.max(1);
        let all = FlightStatus::ALL;
        all[(bucket % all.len() as u64) as usize]
    }

    fn name(&self) -> &str {
        "clock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_types::{AccountId, FlightKey};

    fn request() -> OracleRequest {
        OracleRequest {
            index: 4,
            key: FlightKey::new(AccountId::from_seed(1), "ONE0001", Timestamp::new(0)),
        }
    }

    #[test]
    fn fixed_ignores_clock() {
        let d = FixedStatus(FlightStatus::LateWeather);
        assert_eq!(d.decide(&request(), Timestamp::new(1)), FlightStatus::LateWeather);
        assert_eq!(d.decide(&request(), Timestamp::new(99_999)), FlightStatus::LateWeather);
    }

    #[test]
    fn clock_agrees_within_a_bucket() {
        let d = ClockDerived::new(10);
        assert_eq!(
            d.decide(&request(), Timestamp::new(20)),
            d.decide(&request(), Timestamp::new(29))
        );
        assert_eq!(d.decide(&request(), Timestamp::new(20)), FlightStatus::LateAirline);
    }

    #[test]
    fn clock_cycles_through_every_status() {
        let d = ClockDerived::new(1);
        let seen: std::collections::BTreeSet<_> =
            (0..6).map(|s| d.decide(&request(), Timestamp::new(s))).collect();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn zero_granularity_is_clamped() {
        assert_eq!(ClockDerived::new(0).granularity_secs, 1);
    }
}
