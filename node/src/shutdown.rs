//! Node-wide stop signal.
//!
//! The first trigger wins and records why the node is stopping. Agents, the
//! airline automation and the REST task each log that reason on the way out.
//! Backed by a `watch` channel, so a task spawned after the trigger still
//! stops immediately.

use std::fmt;

use tokio::sync::watch;

/// Why the node is stopping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// SIGINT from the operator.
    Interrupt,
    /// SIGTERM from a supervisor.
    Terminate,
    /// `SuretyNode::stop` called directly (tests, embedding).
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::Interrupt => "interrupt",
            StopReason::Terminate => "terminate",
            StopReason::Requested => "requested",
        })
    }
}

pub struct ShutdownController {
    tx: watch::Sender<Option<StopReason>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Record `reason` and wake every [`StopSignal`]. Returns `false` when the
    /// node was already stopping; the earlier reason is kept.
    pub fn trigger(&self, reason: StopReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    /// The reason recorded by the first trigger, if any.
    pub fn reason(&self) -> Option<StopReason> {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// One task's view of the stop signal.
pub struct StopSignal {
    rx: watch::Receiver<Option<StopReason>>,
}

impl StopSignal {
    /// Resolves once the node is told to stop. A dropped controller counts
    /// as a requested stop.
    pub async fn stopped(&mut self) -> StopReason {
        match self.rx.wait_for(Option::is_some).await {
            Ok(reason) => (*reason).unwrap_or(StopReason::Requested),
            Err(_) => StopReason::Requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_wakes_every_signal_with_reason() {
        let controller = ShutdownController::new();
        let mut a = controller.subscribe();
        let mut b = controller.subscribe();
        assert!(controller.trigger(StopReason::Terminate));
        assert_eq!(a.stopped().await, StopReason::Terminate);
        assert_eq!(b.stopped().await, StopReason::Terminate);
    }

    #[tokio::test]
    async fn first_reason_wins() {
        let controller = ShutdownController::new();
        assert_eq!(controller.reason(), None);
        assert!(controller.trigger(StopReason::Interrupt));
        assert!(!controller.trigger(StopReason::Requested));
        assert_eq!(controller.reason(), Some(StopReason::Interrupt));
    }

    #[tokio::test]
    async fn late_subscriber_sees_earlier_trigger() {
        let controller = ShutdownController::new();
        controller.trigger(StopReason::Requested);
        let mut late = controller.subscribe();
        let reason = tokio::time::timeout(std::time::Duration::from_secs(1), late.stopped())
            .await
            .expect("late subscriber should not wait");
        assert_eq!(reason, StopReason::Requested);
    }

    #[tokio::test]
    async fn dropped_controller_reads_as_requested() {
        let controller = ShutdownController::new();
        let mut signal = controller.subscribe();
        drop(controller);
        assert_eq!(signal.stopped().await, StopReason::Requested);
    }
}
