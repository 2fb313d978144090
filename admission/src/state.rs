//! Per-airline admission state and the notices emitted on transitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use surety_types::AccountId;

/// Where a candidate sits in the admission state machine.
///
/// `Unregistered → PendingVotes → Approved`. `Approved` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionPhase {
    Unregistered,
    PendingVotes,
    Approved,
}

/// Admission ledger entry for one airline or candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AirlineRecord {
    pub id: AccountId,
    pub funded: bool,
    pub registered: bool,
    /// Distinct airlines that proposed this candidate. Frozen once registered.
    pub votes: BTreeSet<AccountId>,
}

impl AirlineRecord {
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            funded: false,
            registered: false,
            votes: BTreeSet::new(),
        }
    }

    pub fn phase(&self) -> AdmissionPhase {
        if self.registered {
            AdmissionPhase::Approved
        } else if self.votes.is_empty() {
            AdmissionPhase::Unregistered
        } else {
            AdmissionPhase::PendingVotes
        }
    }

    /// Registered and funded: may propose, vote and register flights.
    pub fn can_participate(&self) -> bool {
        self.registered && self.funded
    }
}

/// Result of one registration call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationOutcome {
    /// The candidate is registered (now or previously).
    Approved,
    /// The candidate still needs votes.
    Pending { votes: u32, required: u32 },
}

impl RegistrationOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Notification produced by an admission transition, for external consumers
/// (ante automation, flight scheduling, UI).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionNotice {
    /// A registration attempt was recorded. `approved` means the candidate is
    /// admitted and now owes the ante.
    RegistrationPending { candidate: AccountId, approved: bool },
    /// Funding or admission completed. `can_participate` is false for an
    /// airline that paid the ante before being admitted.
    Registered {
        airline: AccountId,
        can_participate: bool,
    },
}
