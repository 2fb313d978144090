//! Events published by the ledger, in commit order.

use serde::{Deserialize, Serialize};
use surety_admission::AdmissionNotice;
use surety_oracles::{OracleRequest, RequestId};
use surety_types::{AccountId, FlightKey, FlightStatus, IndexSet, ShardIndex, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A registration attempt was recorded; `approved` means the ante is now due.
    RegistrationPending { candidate: AccountId, approved: bool },
    /// An airline paid its ante, or was admitted after paying it.
    Registered {
        airline: AccountId,
        can_participate: bool,
    },
    OracleRegistered { oracle: AccountId, indexes: IndexSet },
    /// A status request was dispatched to the oracles holding `index`.
    OracleRequest {
        request: RequestId,
        index: ShardIndex,
        key: FlightKey,
    },
    /// An oracle response was counted.
    OracleReport {
        key: FlightKey,
        status: FlightStatus,
        responder: AccountId,
    },
    /// A request reached quorum.
    FlightStatusInfo {
        request: RequestId,
        key: FlightKey,
        status: FlightStatus,
    },
    FlightRegistered { key: FlightKey },
    OperationalStatusChanged { operational: bool },
}

impl LedgerEvent {
    /// The view an oracle gets of a dispatch event.
    pub fn as_oracle_request(&self) -> Option<OracleRequest> {
        match self {
            Self::OracleRequest { index, key, .. } => Some(OracleRequest {
                index: *index,
                key: key.clone(),
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegistrationPending { .. } => "registration_pending",
            Self::Registered { .. } => "registered",
            Self::OracleRegistered { .. } => "oracle_registered",
            Self::OracleRequest { .. } => "oracle_request",
            Self::OracleReport { .. } => "oracle_report",
            Self::FlightStatusInfo { .. } => "flight_status_info",
            Self::FlightRegistered { .. } => "flight_registered",
            Self::OperationalStatusChanged { .. } => "operational_status_changed",
        }
    }
}

impl From<AdmissionNotice> for LedgerEvent {
    fn from(notice: AdmissionNotice) -> Self {
        match notice {
            AdmissionNotice::RegistrationPending {
                candidate,
                approved,
            } => Self::RegistrationPending {
                candidate,
                approved,
            },
            AdmissionNotice::Registered {
                airline,
                can_participate,
            } => Self::Registered {
                airline,
                can_participate,
            },
        }
    }
}

/// An event with its position in the feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub seq: u64,
    pub at: Timestamp,
    pub event: LedgerEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dispatch_events_become_oracle_requests() {
        let key = FlightKey::new(AccountId::from_seed(1), "ONE0001", Timestamp::new(9));
        let dispatch = LedgerEvent::OracleRequest {
            request: RequestId(3),
            index: 4,
            key: key.clone(),
        };
        assert_eq!(
            dispatch.as_oracle_request(),
            Some(OracleRequest { index: 4, key })
        );
        let other = LedgerEvent::OperationalStatusChanged { operational: false };
        assert_eq!(other.as_oracle_request(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = LedgerEvent::RegistrationPending {
            candidate: AccountId::from_seed(2),
            approved: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "registration_pending");
        assert_eq!(json["approved"], true);
        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn admission_notices_convert() {
        let notice = AdmissionNotice::Registered {
            airline: AccountId::from_seed(5),
            can_participate: false,
        };
        assert_eq!(
            LedgerEvent::from(notice),
            LedgerEvent::Registered {
                airline: AccountId::from_seed(5),
                can_participate: false
            }
        );
    }
}
