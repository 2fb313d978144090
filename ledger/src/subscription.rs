//! Ordered, replayable event feed.
//!
//! Every published event is appended to an in-memory log and broadcast live.
//! A subscription replays the log from its starting point, then follows the
//! live channel; if it falls behind the channel it refills from the log, so
//! a slow subscriber sees every event in order and never skips one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::event::SequencedEvent;

/// Where a new subscription begins reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartFrom {
    /// Replay everything since the ledger was created.
    #[default]
    Genesis,
    /// Only events published after subscribing.
    Latest,
    /// Replay from this sequence number.
    Seq(u64),
}

/// Append-only log of published events.
#[derive(Default)]
pub(crate) struct EventLog {
    entries: Mutex<Vec<SequencedEvent>>,
}

impl EventLog {
    // The log is only ever appended to, so a poisoned lock still guards a
    // consistent prefix.
    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<SequencedEvent>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn append(&self, event: SequencedEvent) {
        self.entries().push(event);
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.entries().len() as u64
    }

    pub(crate) fn since(&self, seq: u64) -> Vec<SequencedEvent> {
        let entries = self.entries();
        let start = usize::try_from(seq).unwrap_or(usize::MAX).min(entries.len());
        entries[start..].to_vec()
    }
}

pub struct EventSubscription {
    log: Arc<EventLog>,
    rx: broadcast::Receiver<SequencedEvent>,
    backlog: VecDeque<SequencedEvent>,
    next_seq: u64,
}

impl EventSubscription {
    pub(crate) fn new(
        log: Arc<EventLog>,
        rx: broadcast::Receiver<SequencedEvent>,
        start: StartFrom,
    ) -> Self {
        // The receiver exists before the log is read, so nothing published in
        // between can be missed; overlap is dropped by sequence number.
        let next_seq = match start {
            StartFrom::Genesis => 0,
            StartFrom::Latest => log.next_seq(),
            StartFrom::Seq(seq) => seq,
        };
        let backlog = log.since(next_seq).into();
        Self {
            log,
            rx,
            backlog,
            next_seq,
        }
    }

    /// Wait for the next event. Returns `None` once the ledger is gone and
    /// every published event has been delivered.
    pub async fn recv(&mut self) -> Option<SequencedEvent> {
        loop {
            if let Some(event) = self.take_backlog() {
                return Some(event);
            }
            match self.rx.recv().await {
                Ok(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, next_seq = self.next_seq, "event subscriber lagged, replaying from log");
                    self.refill();
                }
                Err(RecvError::Closed) => {
                    self.refill();
                    return self.take_backlog();
                }
            }
        }
    }

    /// Next event if one is already available.
    pub fn try_next(&mut self) -> Option<SequencedEvent> {
        loop {
            if let Some(event) = self.take_backlog() {
                return Some(event);
            }
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Lagged(_)) => self.refill(),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.refill();
                    return self.take_backlog();
                }
            }
        }
    }

    /// Sequence number of the next event this subscription will yield.
    pub fn position(&self) -> u64 {
        self.next_seq
    }

    fn take_backlog(&mut self) -> Option<SequencedEvent> {
        while let Some(event) = self.backlog.pop_front() {
            if event.seq >= self.next_seq {
                self.next_seq = event.seq + 1;
                return Some(event);
            }
        }
        None
    }

    fn accept(&mut self, event: SequencedEvent) -> Option<SequencedEvent> {
        if event.seq < self.next_seq {
            return None;
        }
        if event.seq > self.next_seq {
            // A gap the channel did not report; the log has everything.
            self.refill();
            return self.take_backlog();
        }
        self.next_seq = event.seq + 1;
        Some(event)
    }

    fn refill(&mut self) {
        self.backlog = self.log.since(self.next_seq).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LedgerEvent;
    use surety_types::Timestamp;

    fn publish(log: &EventLog, tx: &broadcast::Sender<SequencedEvent>, operational: bool) {
        let event = SequencedEvent {
            seq: log.next_seq(),
            at: Timestamp::new(0),
            event: LedgerEvent::OperationalStatusChanged { operational },
        };
        log.append(event.clone());
        let _ = tx.send(event);
    }

    fn seqs(sub: &mut EventSubscription) -> Vec<u64> {
        std::iter::from_fn(|| sub.try_next()).map(|e| e.seq).collect()
    }

    #[test]
    fn genesis_replays_history_then_follows_live() {
        let log = Arc::new(EventLog::default());
        let (tx, _) = broadcast::channel(16);
        publish(&log, &tx, true);
        publish(&log, &tx, false);

        let mut sub = EventSubscription::new(Arc::clone(&log), tx.subscribe(), StartFrom::Genesis);
        publish(&log, &tx, true);
        assert_eq!(seqs(&mut sub), vec![0, 1, 2]);
    }

    #[test]
    fn latest_skips_history() {
        let log = Arc::new(EventLog::default());
        let (tx, _) = broadcast::channel(16);
        publish(&log, &tx, true);

        let mut sub = EventSubscription::new(Arc::clone(&log), tx.subscribe(), StartFrom::Latest);
        assert!(sub.try_next().is_none());
        publish(&log, &tx, false);
        assert_eq!(seqs(&mut sub), vec![1]);
    }

    #[test]
    fn explicit_start_point() {
        let log = Arc::new(EventLog::default());
        let (tx, _) = broadcast::channel(16);
        for _ in 0..5 {
            publish(&log, &tx, true);
        }
        let mut sub = EventSubscription::new(Arc::clone(&log), tx.subscribe(), StartFrom::Seq(3));
        assert_eq!(seqs(&mut sub), vec![3, 4]);
    }

    #[test]
    fn lagging_subscriber_recovers_from_log() {
        let log = Arc::new(EventLog::default());
        let (tx, _) = broadcast::channel(2);
        let mut sub = EventSubscription::new(Arc::clone(&log), tx.subscribe(), StartFrom::Genesis);
        for _ in 0..10 {
            publish(&log, &tx, true);
        }
        assert_eq!(seqs(&mut sub), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn recv_ends_after_sender_dropped() {
        let log = Arc::new(EventLog::default());
        let (tx, _) = broadcast::channel(4);
        let mut sub = EventSubscription::new(Arc::clone(&log), tx.subscribe(), StartFrom::Genesis);
        publish(&log, &tx, true);
        drop(tx);
        assert_eq!(sub.recv().await.map(|e| e.seq), Some(0));
        assert!(sub.recv().await.is_none());
    }
}
