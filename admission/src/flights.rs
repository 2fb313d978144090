//! Registry of flights registered by participating airlines.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_types::{FlightKey, FlightStatus, Timestamp};

use crate::coordinator::AdmissionCoordinator;
use crate::error::AdmissionError;

/// A registered flight and the last status finalized for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredFlight {
    pub key: FlightKey,
    pub status: FlightStatus,
    pub updated: Timestamp,
}

#[derive(Default)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightKey, RegisteredFlight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flight for its airline. Only funded, registered airlines may
    /// register flights, and each key is registered once.
    pub fn register(
        &mut self,
        admission: &AdmissionCoordinator,
        key: FlightKey,
        now: Timestamp,
    ) -> Result<(), AdmissionError> {
        if !admission.can_participate(&key.airline) {
            return Err(AdmissionError::NotParticipating(key.airline));
        }
        if self.flights.contains_key(&key) {
            return Err(AdmissionError::FlightAlreadyRegistered(key.to_string()));
        }
        self.flights.insert(
            key.clone(),
            RegisteredFlight {
                key,
                status: FlightStatus::Unknown,
                updated: now,
            },
        );
        Ok(())
    }

    /// Store a finalized status. Returns `false` for flights never registered.
    pub fn record_status(&mut self, key: &FlightKey, status: FlightStatus, now: Timestamp) -> bool {
        match self.flights.get_mut(key) {
            Some(flight) => {
                flight.status = status;
                flight.updated = now;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &FlightKey) -> Option<&RegisteredFlight> {
        self.flights.get(key)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
