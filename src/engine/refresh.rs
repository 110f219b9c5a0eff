use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use crate::api::{NetworkApi, Snapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollDecision {
    NotDue,
    Skipped,
    Poll,
}

/// Fixed-interval poll clock with a guard evaluated on every due tick.
#[derive(Clone, Debug)]
pub struct PollSchedule {
    interval_secs: f64,
    next_due: f64,
}

impl PollSchedule {
    pub fn new(interval_secs: f64, now: f64) -> Self {
        Self {
            interval_secs: interval_secs.max(0.001),
            next_due: now,
        }
    }

    pub fn next_due(&self) -> f64 {
        self.next_due
    }

    pub fn tick(&mut self, now: f64, may_poll: bool) -> PollDecision {
        if now < self.next_due {
            return PollDecision::NotDue;
        }

        self.next_due += self.interval_secs;
        if self.next_due <= now {
            self.next_due = now + self.interval_secs;
        }

        if may_poll {
            PollDecision::Poll
        } else {
            PollDecision::Skipped
        }
    }

    pub fn request_now(&mut self, now: f64) {
        self.next_due = self.next_due.min(now);
    }
}

#[derive(Debug, PartialEq)]
pub enum RefreshEvent {
    Idle,
    Skipped,
    Started,
    Loaded(Snapshot),
    Failed(String),
}

pub struct RefreshLoop {
    api: Arc<dyn NetworkApi>,
    transfer_limit: usize,
    schedule: PollSchedule,
    in_flight: Option<Receiver<Result<Snapshot, String>>>,
    disposed: bool,
}

impl RefreshLoop {
    pub fn new(
        api: Arc<dyn NetworkApi>,
        interval_secs: f64,
        transfer_limit: usize,
        now: f64,
    ) -> Self {
        Self {
            api,
            transfer_limit,
            schedule: PollSchedule::new(interval_secs, now),
            in_flight: None,
            disposed: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn next_due(&self) -> f64 {
        self.schedule.next_due()
    }

    pub fn request_now(&mut self, now: f64) {
        self.schedule.request_now(now);
    }

    fn spawn_fetch(&self) -> Receiver<Result<Snapshot, String>> {
        let (tx, rx) = mpsc::channel();
        let api = Arc::clone(&self.api);
        let limit = self.transfer_limit;

        thread::spawn(move || {
            let result = api.fetch_snapshot(limit).map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        rx
    }

    /// Drains a finished fetch, then asks the schedule whether to start the
    /// next one. `animations_idle` is the pause guard.
    pub fn tick(&mut self, now: f64, animations_idle: bool) -> RefreshEvent {
        if self.disposed {
            return RefreshEvent::Idle;
        }

        if let Some(rx) = self.in_flight.take() {
            match rx.try_recv() {
                Ok(Ok(snapshot)) => return RefreshEvent::Loaded(snapshot),
                Ok(Err(error)) => {
                    warn!(%error, "network refresh failed");
                    return RefreshEvent::Failed(error);
                }
                Err(TryRecvError::Empty) => {
                    self.in_flight = Some(rx);
                }
                Err(TryRecvError::Disconnected) => {
                    return RefreshEvent::Failed(
                        "Background refresh worker disconnected".to_owned(),
                    );
                }
            }
        }

        let may_poll = animations_idle && self.in_flight.is_none();
        match self.schedule.tick(now, may_poll) {
            PollDecision::NotDue => RefreshEvent::Idle,
            PollDecision::Skipped => {
                debug!(now, "skipping poll while animations or a fetch are in flight");
                RefreshEvent::Skipped
            }
            PollDecision::Poll => {
                self.in_flight = Some(self.spawn_fetch());
                RefreshEvent::Started
            }
        }
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.in_flight = None;
    }
}
