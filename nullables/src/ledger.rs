//! Nullable ledger failures: wraps a real ledger and fails scripted calls.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use surety_admission::{AirlineRecord, RegisteredFlight, RegistrationOutcome};
use surety_ledger::{EventSubscription, LedgerError, LedgerFacade, SequencedEvent, StartFrom};
use surety_oracles::{RequestId, RequestState, ResponseOutcome, StatusRequest, StatusResponse};
use surety_types::{AccountId, Amount, FlightKey, IndexSet, ProtocolParams};

/// Ledger calls that can be scripted to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerCall {
    RegisterAirline,
    Fund,
    RegisterOracle,
    GetMyIndexes,
    SubmitOracleResponse,
    FetchFlightStatus,
    RegisterFlight,
}

#[derive(Default)]
struct Script {
    pending_failures: HashMap<LedgerCall, u32>,
    calls: HashMap<LedgerCall, u32>,
}

/// Delegates to `inner`, except for calls scripted to fail, which return
/// [`LedgerError::Unavailable`] without reaching the inner ledger.
pub struct FailingLedger<L> {
    inner: L,
    script: Mutex<Script>,
}

impl<L: LedgerFacade> FailingLedger<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            script: Mutex::new(Script::default()),
        }
    }

    /// Fail the next `times` invocations of `call`.
    pub fn fail_next(&self, call: LedgerCall, times: u32) {
        *self.script().pending_failures.entry(call).or_default() += times;
    }

    /// How many times `call` was attempted, failed or not.
    pub fn calls(&self, call: LedgerCall) -> u32 {
        self.script().calls.get(&call).copied().unwrap_or(0)
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, call: LedgerCall) -> Result<(), LedgerError> {
        let mut script = self.script();
        *script.calls.entry(call).or_default() += 1;
        match script.pending_failures.get_mut(&call) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(LedgerError::Unavailable(format!("scripted failure: {call:?}")))
            }
            _ => Ok(()),
        }
    }
}

impl<L: LedgerFacade> LedgerFacade for FailingLedger<L> {
    fn register_airline(
        &self,
        proposer: AccountId,
        candidate: AccountId,
    ) -> Result<RegistrationOutcome, LedgerError> {
        self.check(LedgerCall::RegisterAirline)?;
        self.inner.register_airline(proposer, candidate)
    }

    fn fund(&self, airline: AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.check(LedgerCall::Fund)?;
        self.inner.fund(airline, amount)
    }

    fn register_oracle(&self, oracle: AccountId, stake: Amount) -> Result<IndexSet, LedgerError> {
        self.check(LedgerCall::RegisterOracle)?;
        self.inner.register_oracle(oracle, stake)
    }

    fn get_my_indexes(&self, oracle: AccountId) -> Result<IndexSet, LedgerError> {
        self.check(LedgerCall::GetMyIndexes)?;
        self.inner.get_my_indexes(oracle)
    }

    fn submit_oracle_response(
        &self,
        response: StatusResponse,
    ) -> Result<ResponseOutcome, LedgerError> {
        self.check(LedgerCall::SubmitOracleResponse)?;
        self.inner.submit_oracle_response(response)
    }

    fn fetch_flight_status(
        &self,
        requester: AccountId,
        key: FlightKey,
    ) -> Result<RequestId, LedgerError> {
        self.check(LedgerCall::FetchFlightStatus)?;
        self.inner.fetch_flight_status(requester, key)
    }

    fn register_flight(&self, key: FlightKey) -> Result<(), LedgerError> {
        self.check(LedgerCall::RegisterFlight)?;
        self.inner.register_flight(key)
    }

    fn set_operating_status(
        &self,
        caller: AccountId,
        operational: bool,
    ) -> Result<(), LedgerError> {
        self.inner.set_operating_status(caller, operational)
    }

    fn is_operational(&self) -> Result<bool, LedgerError> {
        self.inner.is_operational()
    }

    fn airline(&self, id: AccountId) -> Result<Option<AirlineRecord>, LedgerError> {
        self.inner.airline(id)
    }

    fn flight(&self, key: &FlightKey) -> Result<Option<RegisteredFlight>, LedgerError> {
        self.inner.flight(key)
    }

    fn open_requests(&self) -> Result<Vec<StatusRequest>, LedgerError> {
        self.inner.open_requests()
    }

    fn request_state(&self, id: RequestId) -> Result<Option<RequestState>, LedgerError> {
        self.inner.request_state(id)
    }

    fn params(&self) -> ProtocolParams {
        self.inner.params()
    }

    fn subscribe(&self, start: StartFrom) -> EventSubscription {
        self.inner.subscribe(start)
    }

    fn events_since(&self, seq: u64) -> Vec<SequencedEvent> {
        self.inner.events_since(seq)
    }
}
