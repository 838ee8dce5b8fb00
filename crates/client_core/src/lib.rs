use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{DecodeMode, UserListState},
    protocol::decode_users_payload,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info};
use url::Url;

pub mod error;
pub mod source;

pub use error::{FetchError, FetchErrorKind};
pub use source::{HttpUsersSource, UsersSource, DEFAULT_USERS_URL};

/// Text shown to the user whenever a listing request fails, whatever the cause.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load users";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching,
    Populated,
    Failed,
}

impl FetchPhase {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Populated | Self::Failed)
    }
}

/// How responses of overlapping fetches are applied to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyPolicy {
    /// Every response is applied as it arrives; the last one to arrive wins.
    #[default]
    LastArrivalWins,
    /// Only the response to the most recently issued request is applied.
    LatestIssuedOnly,
}

impl std::str::FromStr for ApplyPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "last-arrival-wins" => Ok(Self::LastArrivalWins),
            "latest-issued-only" => Ok(Self::LatestIssuedOnly),
            other => Err(format!(
                "unknown apply policy '{other}' (expected last-arrival-wins|latest-issued-only)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    pub decode_mode: DecodeMode,
    pub apply_policy: ApplyPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    pub message: String,
    pub reason: String,
    pub kind: FetchErrorKind,
}

impl From<&FetchError> for FailureNotice {
    fn from(err: &FetchError) -> Self {
        Self {
            message: LOAD_FAILED_MESSAGE.to_string(),
            reason: err.to_string(),
            kind: err.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserListEvent {
    /// `count` is `None` when the applied payload is not a list.
    Loaded { count: Option<usize> },
    LoadFailed(FailureNotice),
}

/// Owns the reactive user list and keeps it in sync with a [`UsersSource`].
///
/// Readers bind to the state through [`subscribe`](Self::subscribe) or
/// [`stream`](Self::stream); it is only ever replaced as a whole.
pub struct UserListController {
    source: Arc<dyn UsersSource>,
    options: ControllerOptions,
    users: watch::Sender<UserListState>,
    phase: watch::Sender<FetchPhase>,
    events: broadcast::Sender<UserListEvent>,
    issued: AtomicU64,
}

impl UserListController {
    pub fn new(source: Arc<dyn UsersSource>) -> Arc<Self> {
        Self::new_with_options(source, ControllerOptions::default())
    }

    pub fn new_with_options(
        source: Arc<dyn UsersSource>,
        options: ControllerOptions,
    ) -> Arc<Self> {
        let (users, _) = watch::channel(UserListState::default());
        let (phase, _) = watch::channel(FetchPhase::Idle);
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            source,
            options,
            users,
            phase,
            events,
            issued: AtomicU64::new(0),
        })
    }

    pub fn for_url(url: Url, options: ControllerOptions) -> Arc<Self> {
        Self::new_with_options(Arc::new(HttpUsersSource::new(url)), options)
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    /// Mount hook: issues exactly one fetch per call.
    pub fn init(self: &Arc<Self>) -> JoinHandle<()> {
        self.fetch_users()
    }

    /// Starts an independent fetch and returns the handle of its task.
    ///
    /// Failures are handled inside the task: they are logged, the list is left
    /// as it was, and a single [`UserListEvent::LoadFailed`] is emitted.
    pub fn fetch_users(self: &Arc<Self>) -> JoinHandle<()> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.phase.send_replace(FetchPhase::Fetching);

        let this = Arc::clone(self);
        tokio::spawn(async move { this.run_fetch(generation).await })
    }

    pub fn users(&self) -> UserListState {
        self.users.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UserListState> {
        self.users.subscribe()
    }

    /// Yields the current state, then every replacement.
    pub fn stream(&self) -> WatchStream<UserListState> {
        WatchStream::new(self.users.subscribe())
    }

    pub fn phase(&self) -> FetchPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<FetchPhase> {
        self.phase.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<UserListEvent> {
        self.events.subscribe()
    }

    /// Waits until the phase is `Populated` or `Failed` and returns it.
    pub async fn wait_until_settled(&self) -> FetchPhase {
        let mut rx = self.phase.subscribe();
        loop {
            let current = *rx.borrow_and_update();
            if current.is_settled() {
                return current;
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }

    async fn run_fetch(&self, generation: u64) {
        let result = match self.source.fetch_users().await {
            Ok(payload) => {
                decode_users_payload(payload, self.options.decode_mode).map_err(FetchError::from)
            }
            Err(err) => Err(err),
        };

        if self.is_superseded(generation) {
            debug!(%generation, "discarding response of superseded users request");
            return;
        }

        match result {
            Ok(users) => {
                info!(%generation, users = %users.payload(), "users data");
                let count = users.record_count();
                self.users.send_replace(users);
                self.phase.send_replace(FetchPhase::Populated);
                let _ = self.events.send(UserListEvent::Loaded { count });
            }
            Err(err) => {
                error!(%generation, kind = ?err.kind(), error = %err, "error fetching users");
                self.phase.send_replace(FetchPhase::Failed);
                let _ = self
                    .events
                    .send(UserListEvent::LoadFailed(FailureNotice::from(&err)));
            }
        }
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.options.apply_policy == ApplyPolicy::LatestIssuedOnly
            && self.issued.load(Ordering::SeqCst) != generation
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
