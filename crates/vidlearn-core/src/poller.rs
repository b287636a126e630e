//! Session poller driving top-level routing.
//!
//! The poller re-reads the `SessionStore` on start and then on a fixed
//! interval, publishing `authenticated`/`unauthenticated` through a watch
//! channel. It never talks to the auth service: a logout or a 401 elsewhere
//! becomes visible here on the next tick.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::auth::SessionStore;
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

impl AuthState {
    fn from_logged_in(logged_in: bool) -> Self {
        if logged_in {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }
}

/// Current state and when it was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: AuthState,
    pub since: DateTime<Utc>,
}

impl SessionStatus {
    fn new(state: AuthState) -> Self {
        Self {
            state,
            since: Utc::now(),
        }
    }
}

/// Shortest allowed poll interval; `tokio::time::interval` rejects zero
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct SessionPoller {
    session: SessionStore,
    interval: Duration,
    status: watch::Sender<SessionStatus>,
}

impl SessionPoller {
    /// Starts out unauthenticated until the first check says otherwise.
    /// Intervals below one millisecond are raised to it.
    pub fn new(session: SessionStore, interval: Duration) -> Self {
        let (status, _) = watch::channel(SessionStatus::new(AuthState::Unauthenticated));
        Self {
            session,
            interval: interval.max(MIN_INTERVAL),
            status,
        }
    }

    pub fn from_config(config: &Config, session: SessionStore) -> Self {
        Self::new(session, config.poll_interval())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.status.borrow().state
    }

    /// Run one poll tick. Returns the new state when it changed.
    pub async fn check(&self) -> Option<AuthState> {
        let next = AuthState::from_logged_in(self.session.is_logged_in().await);
        let changed = self.status.send_if_modified(|status| {
            if status.state == next {
                false
            } else {
                *status = SessionStatus::new(next);
                true
            }
        });

        if changed {
            info!(state = ?next, "Session state changed");
            Some(next)
        } else {
            None
        }
    }

    /// Poll in a background task until the returned handle is stopped or dropped.
    pub fn spawn(self) -> PollerHandle {
        let status = self.subscribe();
        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(interval_ms = self.interval.as_millis() as u64, "Session poller started");

            loop {
                // First tick completes immediately, covering the initial check
                ticker.tick().await;
                self.check().await;
            }
        });

        PollerHandle { task, status }
    }
}

impl std::fmt::Debug for SessionPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPoller")
            .field("interval", &self.interval)
            .field("status", &*self.status.borrow())
            .finish()
    }
}

/// Handle to a running poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
    status: watch::Receiver<SessionStatus>,
}

impl PollerHandle {
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    pub fn state(&self) -> AuthState {
        self.status.borrow().state
    }

    pub fn stop(self) {
        debug!("Session poller stopped");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
