//! Off-chain flight schedule catalog.
//!
//! Each newly registered airline is handed the next unused schedule template.
//! Once the airline can participate, its templates are turned into concrete
//! flights relative to "now" and registered on the ledger. The catalog keeps
//! the explicit airline → schedule mapping and the list of flights that were
//! registered, which the REST façade lists.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surety_types::{AccountId, FlightKey, Timestamp};

/// One flight template: the code plus an offset from the moment of scheduling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledFlight {
    pub flight: String,
    #[serde(default)]
    pub days_offset: u64,
    #[serde(default)]
    pub seconds_offset: u64,
}

/// A named airline's schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineSchedule {
    pub airline_name: String,
    #[serde(default)]
    pub flights: Vec<ScheduledFlight>,
}

pub struct FlightCatalog {
    templates: Vec<AirlineSchedule>,
    next_template: usize,
    assignments: HashMap<AccountId, usize>,
    registered: Vec<FlightKey>,
}

impl FlightCatalog {
    pub fn new(templates: Vec<AirlineSchedule>) -> Self {
        Self {
            templates,
            next_template: 0,
            assignments: HashMap::new(),
            registered: Vec::new(),
        }
    }

    /// Hand `airline` the next unused schedule. An airline keeps the schedule
    /// it was first given; `None` once templates run out.
    pub fn assign(&mut self, airline: AccountId) -> Option<&AirlineSchedule> {
        if let Some(&idx) = self.assignments.get(&airline) {
            return self.templates.get(idx);
        }
        if self.next_template >= self.templates.len() {
            return None;
        }
        let idx = self.next_template;
        self.next_template += 1;
        self.assignments.insert(airline, idx);
        let schedule = self.templates.get(idx)?;
        tracing::info!(%airline, name = %schedule.airline_name, "assigned flight schedule");
        Some(schedule)
    }

    pub fn schedule_for(&self, airline: &AccountId) -> Option<&AirlineSchedule> {
        self.assignments
            .get(airline)
            .and_then(|&idx| self.templates.get(idx))
    }

    /// Concrete flight keys for `airline`'s schedule, relative to `now`.
    pub fn materialize(&self, airline: &AccountId, now: Timestamp) -> Vec<FlightKey> {
        self.schedule_for(airline)
            .map(|schedule| {
                schedule
                    .flights
                    .iter()
                    .map(|f| {
                        FlightKey::new(
                            *airline,
                            f.flight.clone(),
                            now.offset(f.days_offset, f.seconds_offset),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn record_registered(&mut self, key: FlightKey) {
        if !self.registered.contains(&key) {
            self.registered.push(key);
        }
    }

    pub fn registered_flights(&self) -> &[FlightKey] {
        &self.registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> Vec<AirlineSchedule> {
        vec![
            AirlineSchedule {
                airline_name: "One Air".into(),
                flights: vec![
                    ScheduledFlight {
                        flight: "ONE0001".into(),
                        days_offset: 1,
                        seconds_offset: 30,
                    },
                    ScheduledFlight {
                        flight: "ONE0002".into(),
                        days_offset: 2,
                        seconds_offset: 0,
                    },
                ],
            },
            AirlineSchedule {
                airline_name: "Two Air".into(),
                flights: vec![],
            },
        ]
    }

    #[test]
    fn assignment_is_sticky_and_in_order() {
        let mut catalog = FlightCatalog::new(templates());
        let a = AccountId::from_seed(1);
        let b = AccountId::from_seed(2);
        assert_eq!(catalog.assign(a).unwrap().airline_name, "One Air");
        assert_eq!(catalog.assign(a).unwrap().airline_name, "One Air");
        assert_eq!(catalog.assign(b).unwrap().airline_name, "Two Air");
        assert!(catalog.assign(AccountId::from_seed(3)).is_none());
    }

    #[test]
    fn materialize_applies_offsets() {
        let mut catalog = FlightCatalog::new(templates());
        let a = AccountId::from_seed(1);
        catalog.assign(a);
        let flights = catalog.materialize(&a, Timestamp::new(1_000));
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].timestamp, Timestamp::new(1_000 + 86_400 + 30));
        assert_eq!(flights[1].flight, "ONE0002");
    }

    #[test]
    fn unassigned_airline_has_no_flights() {
        let catalog = FlightCatalog::new(templates());
        assert!(catalog.materialize(&AccountId::from_seed(9), Timestamp::new(0)).is_empty());
    }

    #[test]
    fn registered_flights_are_deduplicated() {
        let mut catalog = FlightCatalog::new(templates());
        let key = FlightKey::new(AccountId::from_seed(1), "ONE0001", Timestamp::new(5));
        catalog.record_registered(key.clone());
        catalog.record_registered(key);
        assert_eq!(catalog.registered_flights().len(), 1);
    }
}
