//! Airline admission for the flight surety network.
//!
//! Two-phase process:
//! 1. **Registration**: while the network is small, any funded airline admits new
//!    airlines directly. Past `auto_approve_limit` registered airlines, registration
//!    becomes a vote and a candidate is admitted once `ceil(registered / 2)` distinct
//!    funded airlines have proposed it.
//! 2. **Funding**: an admitted airline pays the ante before it can participate
//!    (propose, vote, register flights).
//!
//! Also owns the airline-side flight data: the registry of flights airlines have
//! registered and the off-chain schedule catalog handed to newly admitted airlines.

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod flights;
pub mod state;

pub use catalog::{AirlineSchedule, FlightCatalog, ScheduledFlight};
pub use coordinator::AdmissionCoordinator;
pub use error::AdmissionError;
pub use flights::{FlightRegistry, RegisteredFlight};
pub use state::{AdmissionNotice, AdmissionPhase, AirlineRecord, RegistrationOutcome};
