//! Admission coordinator: decides auto-approval vs. voting and tallies votes.

use std::collections::HashMap;

use surety_types::{AccountId, Amount, ProtocolParams};

use crate::error::AdmissionError;
use crate::state::{AdmissionNotice, AirlineRecord, RegistrationOutcome};

/// Owns the admission ledger: registration, funding and vote state per airline.
///
/// Not internally synchronized; callers that share it wrap it in a lock so that
/// concurrent votes for one candidate serialize.
pub struct AdmissionCoordinator {
    params: ProtocolParams,
    airlines: HashMap<AccountId, AirlineRecord>,
    registered_count: u32,
    notices: Vec<AdmissionNotice>,
}

impl AdmissionCoordinator {
    /// Create the admission ledger with its founding airline, registered and
    /// funded at genesis.
    pub fn new(params: ProtocolParams, founder: AccountId) -> Self {
        let mut record = AirlineRecord::new(founder);
        record.registered = true;
        record.funded = true;
        let mut airlines = HashMap::new();
        airlines.insert(founder, record);
        Self {
            params,
            airlines,
            registered_count: 1,
            notices: vec![AdmissionNotice::Registered {
                airline: founder,
                can_participate: true,
            }],
        }
    }

    /// Propose `candidate` on behalf of `proposer`.
    ///
    /// The proposer must be a registered, funded airline. Below the auto-approve
    /// limit the candidate is admitted at once; above it the proposer's vote is
    /// recorded and the candidate is admitted when distinct voters reach
    /// `ceil(registered / 2)`, using the registered count at the time of this
    /// vote. A repeated vote from the same proposer changes nothing.
    pub fn register(
        &mut self,
        candidate: AccountId,
        proposer: AccountId,
    ) -> Result<RegistrationOutcome, AdmissionError> {
        if candidate.is_zero() {
            return Err(AdmissionError::InvalidCandidate);
        }
        match self.airlines.get(&proposer) {
            Some(record) if record.registered => {
                if !record.funded {
                    return Err(AdmissionError::Unfunded(proposer));
                }
            }
            _ => return Err(AdmissionError::NotRegistered(proposer)),
        }
        if candidate == proposer {
            return Err(AdmissionError::SelfVote(proposer));
        }

        let registered_count = self.registered_count;
        let auto_approve = registered_count < self.params.auto_approve_limit;
        let required = self.params.required_votes(registered_count);

        let record = self
            .airlines
            .entry(candidate)
            .or_insert_with(|| AirlineRecord::new(candidate));
        if record.registered {
            return Ok(RegistrationOutcome::Approved);
        }

        if auto_approve {
            tracing::debug!(%candidate, %proposer, registered_count, "auto-approving airline");
            self.approve(candidate);
            return Ok(RegistrationOutcome::Approved);
        }

        if !record.votes.insert(proposer) {
            tracing::debug!(%candidate, %proposer, "duplicate admission vote ignored");
            return Ok(RegistrationOutcome::Pending {
                votes: record.votes.len() as u32,
                required,
            });
        }

        let votes = record.votes.len() as u32;
        if votes >= required {
            tracing::info!(%candidate, votes, required, "airline admitted by vote");
            self.approve(candidate);
            Ok(RegistrationOutcome::Approved)
        } else {
            tracing::debug!(%candidate, %proposer, votes, required, "admission vote recorded");
            self.notices.push(AdmissionNotice::RegistrationPending {
                candidate,
                approved: false,
            });
            Ok(RegistrationOutcome::Pending { votes, required })
        }
    }

    /// Record an ante payment from `airline`.
    ///
    /// Returns `true` if this payment changed the airline's state; a second
    /// payment is accepted but has no effect.
    pub fn fund(&mut self, airline: AccountId, amount: Amount) -> Result<bool, AdmissionError> {
        if amount < self.params.airline_ante {
            return Err(AdmissionError::InsufficientAnte {
                needed: self.params.airline_ante,
                provided: amount,
            });
        }
        let record = self
            .airlines
            .entry(airline)
            .or_insert_with(|| AirlineRecord::new(airline));
        if record.funded {
            return Ok(false);
        }
        record.funded = true;
        let can_participate = record.registered;
        tracing::info!(%airline, can_participate, "airline ante received");
        self.notices.push(AdmissionNotice::Registered {
            airline,
            can_participate,
        });
        Ok(true)
    }

    fn approve(&mut self, candidate: AccountId) {
        let Some(record) = self.airlines.get_mut(&candidate) else {
            return;
        };
        record.registered = true;
        self.registered_count += 1;
        let notice = if record.funded {
            AdmissionNotice::Registered {
                airline: candidate,
                can_participate: true,
            }
        } else {
            AdmissionNotice::RegistrationPending {
                candidate,
                approved: true,
            }
        };
        self.notices.push(notice);
    }

    /// Take the notices produced since the last drain, in emission order.
    pub fn drain_notices(&mut self) -> Vec<AdmissionNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn airline(&self, id: &AccountId) -> Option<&AirlineRecord> {
        self.airlines.get(id)
    }

    pub fn is_registered(&self, id: &AccountId) -> bool {
        self.airlines.get(id).is_some_and(|r| r.registered)
    }

    pub fn is_funded(&self, id: &AccountId) -> bool {
        self.airlines.get(id).is_some_and(|r| r.funded)
    }

    pub fn can_participate(&self, id: &AccountId) -> bool {
        self.airlines.get(id).is_some_and(|r| r.can_participate())
    }

    pub fn registered_count(&self) -> u32 {
        self.registered_count
    }

    /// Candidates that have votes but are not yet admitted.
    pub fn pending_candidates(&self) -> Vec<&AirlineRecord> {
        let mut pending: Vec<&AirlineRecord> = self
            .airlines
            .values()
            .filter(|r| !r.registered && !r.votes.is_empty())
            .collect();
        pending.sort_by_key(|r| r.id);
        pending
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }
}
