//! Flight identity and delay status codes.

use crate::address::AccountId;
use crate::error::TypesError;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one scheduled flight: the operating airline, the flight code and
/// the scheduled departure.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: AccountId,
    pub flight: String,
    pub timestamp: Timestamp,
}

impl FlightKey {
    pub fn new(airline: AccountId, flight: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            airline,
            flight: flight.into(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.flight, self.timestamp, self.airline)
    }
}

/// Delay status reported by oracles. Serialized as its wire code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    pub fn code(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::OnTime => 10,
            Self::LateAirline => 20,
            Self::LateWeather => 30,
            Self::LateTechnical => 40,
            Self::LateOther => 50,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, TypesError> {
        match code {
            0 => Ok(Self::Unknown),
            10 => Ok(Self::OnTime),
            20 => Ok(Self::LateAirline),
            30 => Ok(Self::LateWeather),
            40 => Ok(Self::LateTechnical),
            50 => Ok(Self::LateOther),
            other => Err(TypesError::InvalidStatusCode(other)),
        }
    }

    /// Whether the airline is at fault (the only status that triggers payouts downstream).
    pub fn is_airline_fault(&self) -> bool {
        matches!(self, Self::LateAirline)
    }

    /// Human-readable display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::OnTime => "ON TIME",
            Self::LateAirline => "LATE (AIRLINE)",
            Self::LateWeather => "LATE (WEATHER)",
            Self::LateTechnical => "LATE (TECHNICAL)",
            Self::LateOther => "LATE (OTHER)",
        }
    }
}

impl TryFrom<u8> for FlightStatus {
    type Error = TypesError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<FlightStatus> for u8 {
    fn from(status: FlightStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}
