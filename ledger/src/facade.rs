use surety_admission::{AirlineRecord, RegisteredFlight, RegistrationOutcome};
use surety_oracles::{RequestId, RequestState, ResponseOutcome, StatusRequest, StatusResponse};
use surety_types::{AccountId, Amount, FlightKey, IndexSet, ProtocolParams};

use crate::error::LedgerError;
use crate::event::SequencedEvent;
use crate::subscription::{EventSubscription, StartFrom};

/// Calls accepted by the ledger, and its event feed.
///
/// Each call applies atomically or not at all. Callers own retry policy; the
/// node never retries.
pub trait LedgerFacade: Send + Sync {
    /// `registerAirline(candidate)` sent by `proposer`.
    fn register_airline(
        &self,
        proposer: AccountId,
        candidate: AccountId,
    ) -> Result<RegistrationOutcome, LedgerError>;

    /// Ante transfer from `airline`.
    fn fund(&self, airline: AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// `registerOracle()` sent by `oracle` with `stake` attached.
    fn register_oracle(&self, oracle: AccountId, stake: Amount) -> Result<IndexSet, LedgerError>;

    /// `getMyIndexes()` sent by `oracle`.
    fn get_my_indexes(&self, oracle: AccountId) -> Result<IndexSet, LedgerError>;

    fn submit_oracle_response(
        &self,
        response: StatusResponse,
    ) -> Result<ResponseOutcome, LedgerError>;

    /// Dispatch a status request. The answer arrives later as a
    /// `FlightStatusInfo` event.
    fn fetch_flight_status(
        &self,
        requester: AccountId,
        key: FlightKey,
    ) -> Result<RequestId, LedgerError>;

    /// Register a flight on behalf of `key.airline`.
    fn register_flight(&self, key: FlightKey) -> Result<(), LedgerError>;

    fn set_operating_status(&self, caller: AccountId, operational: bool)
        -> Result<(), LedgerError>;

    fn is_operational(&self) -> Result<bool, LedgerError>;

    fn airline(&self, id: AccountId) -> Result<Option<AirlineRecord>, LedgerError>;

    fn flight(&self, key: &FlightKey) -> Result<Option<RegisteredFlight>, LedgerError>;

    fn open_requests(&self) -> Result<Vec<StatusRequest>, LedgerError>;

    fn request_state(&self, id: RequestId) -> Result<Option<RequestState>, LedgerError>;

    fn params(&self) -> ProtocolParams;

    fn subscribe(&self, start: StartFrom) -> EventSubscription;

    /// Published events from `seq` on.
    fn events_since(&self, seq: u64) -> Vec<SequencedEvent>;
}
