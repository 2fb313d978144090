//! In-process ledger.

use std::sync::{Arc, Mutex, MutexGuard};

use surety_admission::{
    AdmissionCoordinator, AirlineRecord, FlightRegistry, RegisteredFlight, RegistrationOutcome,
};
use surety_oracles::{
    Dispatcher, EntropySource, OracleRegistry, OsEntropy, RequestId, RequestState,
    ResponseAggregator, ResponseOutcome, StatusRequest, StatusResponse,
};
use surety_types::{
    AccountId, Amount, Clock, FlightKey, IndexSet, ProtocolParams, SystemClock,
};
use tokio::sync::broadcast;

use crate::error::LedgerError;
use crate::event::{LedgerEvent, SequencedEvent};
use crate::facade::LedgerFacade;
use crate::subscription::{EventLog, EventSubscription, StartFrom};

/// Live channel depth. Subscribers that fall further behind replay from the log.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

struct LedgerState {
    admission: AdmissionCoordinator,
    flights: FlightRegistry,
    oracles: OracleRegistry,
    dispatcher: Dispatcher,
    aggregator: ResponseAggregator,
    operational: bool,
}

/// A ledger held in memory, shared between tasks behind an `Arc`.
///
/// All mutations take the same lock and publish their events before
/// releasing it, so the event order is the commit order.
pub struct LocalLedger {
    owner: AccountId,
    params: ProtocolParams,
    clock: Arc<dyn Clock>,
    state: Mutex<LedgerState>,
    log: Arc<EventLog>,
    events: broadcast::Sender<SequencedEvent>,
}

impl LocalLedger {
    /// Create a ledger owned by `owner` with `founder` as the first airline.
    pub fn new(
        params: ProtocolParams,
        owner: AccountId,
        founder: AccountId,
        entropy: Arc<dyn EntropySource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let oracles = OracleRegistry::new(params.clone(), Arc::clone(&entropy))?;
        let dispatcher = Dispatcher::new(entropy, params.index_space);
        let mut admission = AdmissionCoordinator::new(params.clone(), founder);
        let genesis = admission.drain_notices();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let ledger = Self {
            owner,
            clock,
            state: Mutex::new(LedgerState {
                admission,
                flights: FlightRegistry::new(),
                oracles,
                dispatcher,
                aggregator: ResponseAggregator::new(params.min_responses),
                operational: true,
            }),
            params,
            log: Arc::new(EventLog::default()),
            events,
        };
        {
            let state = ledger.lock()?;
            ledger.publish(&state, genesis.into_iter().map(LedgerEvent::from));
        }
        tracing::info!(%owner, %founder, "ledger created");
        Ok(ledger)
    }

    /// Ledger backed by OS entropy and the system clock.
    pub fn with_system_sources(
        params: ProtocolParams,
        owner: AccountId,
        founder: AccountId,
    ) -> Result<Self, LedgerError> {
        Self::new(
            params,
            owner,
            founder,
            Arc::new(OsEntropy),
            Arc::new(SystemClock),
        )
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger state lock poisoned".into()))
    }

    fn lock_operational(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        let state = self.lock()?;
        if !state.operational {
            return Err(LedgerError::NotOperational);
        }
        Ok(state)
    }

    /// Append events to the log and broadcast them. Takes the locked state so
    /// publication always happens inside the commit.
    fn publish(&self, _state: &LedgerState, events: impl IntoIterator<Item = LedgerEvent>) {
        let at = self.clock.now();
        for event in events {
            let sequenced = SequencedEvent {
                seq: self.log.next_seq(),
                at,
                event,
            };
            tracing::trace!(seq = sequenced.seq, kind = sequenced.event.kind(), "event published");
            self.log.append(sequenced.clone());
            // No live subscribers is fine; the log keeps the event.
            let _ = self.events.send(sequenced);
        }
    }
}

impl LedgerFacade for LocalLedger {
    fn register_airline(
        &self,
        proposer: AccountId,
        candidate: AccountId,
    ) -> Result<RegistrationOutcome, LedgerError> {
        let mut state = self.lock_operational()?;
        let outcome = state.admission.register(candidate, proposer)?;
        let notices = state.admission.drain_notices();
        self.publish(&state, notices.into_iter().map(LedgerEvent::from));
        Ok(outcome)
    }

    fn fund(&self, airline: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let mut state = self.lock()?;
        state.admission.fund(airline, amount)?;
        let notices = state.admission.drain_notices();
        self.publish(&state, notices.into_iter().map(LedgerEvent::from));
        Ok(())
    }

    fn register_oracle(&self, oracle: AccountId, stake: Amount) -> Result<IndexSet, LedgerError> {
        let mut state = self.lock()?;
        let known = state.oracles.is_registered(&oracle);
        let indexes = state.oracles.register(oracle, stake, self.clock.now())?;
        if !known {
            self.publish(
                &state,
                [LedgerEvent::OracleRegistered {
                    oracle,
                    indexes: indexes.clone(),
                }],
            );
        }
        Ok(indexes)
    }

    fn get_my_indexes(&self, oracle: AccountId) -> Result<IndexSet, LedgerError> {
        Ok(self.lock()?.oracles.get_indexes(&oracle)?)
    }

    fn submit_oracle_response(
        &self,
        response: StatusResponse,
    ) -> Result<ResponseOutcome, LedgerError> {
        let mut guard = self.lock_operational()?;
        let state = &mut *guard;
        let outcome = state.aggregator.submit(&response, &state.oracles)?;

        let mut events = Vec::new();
        if outcome.counted() {
            events.push(LedgerEvent::OracleReport {
                key: response.key.clone(),
                status: response.status,
                responder: response.responder,
            });
        }
        if let ResponseOutcome::Finalized { request, status } = outcome {
            state
                .flights
                .record_status(&response.key, status, self.clock.now());
            events.push(LedgerEvent::FlightStatusInfo {
                request,
                key: response.key.clone(),
                status,
            });
        }
        self.publish(state, events);
        Ok(outcome)
    }

    fn fetch_flight_status(
        &self,
        requester: AccountId,
        key: FlightKey,
    ) -> Result<RequestId, LedgerError> {
        let mut state = self.lock_operational()?;
        let request = state
            .dispatcher
            .dispatch(key, requester, self.clock.now())?;
        let event = LedgerEvent::OracleRequest {
            request: request.id,
            index: request.index,
            key: request.key.clone(),
        };
        let id = request.id;
        tracing::info!(request = %id, index = request.index, flight = %request.key, %requester, "flight status requested");
        state.aggregator.open(request);
        self.publish(&state, [event]);
        Ok(id)
    }

    fn register_flight(&self, key: FlightKey) -> Result<(), LedgerError> {
        let mut guard = self.lock_operational()?;
        let state = &mut *guard;
        state
            .flights
            .register(&state.admission, key.clone(), self.clock.now())?;
        tracing::info!(flight = %key, "flight registered");
        self.publish(state, [LedgerEvent::FlightRegistered { key }]);
        Ok(())
    }

    fn set_operating_status(
        &self,
        caller: AccountId,
        operational: bool,
    ) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::NotOwner(caller));
        }
        let mut state = self.lock()?;
        if state.operational == operational {
            return Ok(());
        }
        state.operational = operational;
        tracing::warn!(operational, "ledger operating status changed");
        self.publish(&state, [LedgerEvent::OperationalStatusChanged { operational }]);
        Ok(())
    }

    fn is_operational(&self) -> Result<bool, LedgerError> {
        Ok(self.lock()?.operational)
    }

    fn airline(&self, id: AccountId) -> Result<Option<AirlineRecord>, LedgerError> {
        Ok(self.lock()?.admission.airline(&id).cloned())
    }

    fn flight(&self, key: &FlightKey) -> Result<Option<RegisteredFlight>, LedgerError> {
        Ok(self.lock()?.flights.get(key).cloned())
    }

    fn open_requests(&self) -> Result<Vec<StatusRequest>, LedgerError> {
        Ok(self
            .lock()?
            .aggregator
            .open_requests()
            .into_iter()
            .cloned()
            .collect())
    }

    fn request_state(&self, id: RequestId) -> Result<Option<RequestState>, LedgerError> {
        Ok(self.lock()?.aggregator.state(id).cloned())
    }

    fn params(&self) -> ProtocolParams {
        self.params.clone()
    }

    fn subscribe(&self, start: StartFrom) -> EventSubscription {
        EventSubscription::new(Arc::clone(&self.log), self.events.subscribe(), start)
    }

    fn events_since(&self, seq: u64) -> Vec<SequencedEvent> {
        self.log.since(seq)
    }
}
