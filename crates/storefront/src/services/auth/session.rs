//! Current-identity holder.
//!
//! [`SessionState`] is the single source of truth for who is signed in.
//! It starts [`AuthState::Unresolved`] until [`SessionState::resolve`] has
//! looked at persisted state, then moves between `SignedOut` and
//! `SignedIn` on every auth event. Consumers [`subscribe`] to observe the
//! changes.
//!
//! [`subscribe`]: SessionState::subscribe

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::Identity;
use crate::storage::KeyValueStore;

/// Storage key for the persisted identity.
pub const SESSION_STORAGE_KEY: &str = "shopnow-session";

/// Authentication state as seen by consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Persisted state has not been read yet.
    #[default]
    Unresolved,
    SignedOut,
    SignedIn(Identity),
}

impl AuthState {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::Unresolved | Self::SignedOut => None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// Shared holder of the current [`AuthState`].
///
/// Cheap to clone; clones observe and update the same state.
#[derive(Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<AuthState>>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A holder that keeps the session in memory only.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::Unresolved);
        Self {
            tx: Arc::new(tx),
            storage: None,
        }
    }

    /// A holder that persists the signed-in identity in `storage`.
    #[must_use]
    pub fn persisted(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage: Some(storage),
            ..Self::new()
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.tx.borrow().identity().cloned()
    }

    /// Start observing state changes.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Leave `Unresolved` by restoring the persisted identity.
    ///
    /// An unreadable or corrupt snapshot resolves to `SignedOut`. Calling
    /// this again after the state is resolved does nothing.
    pub fn resolve(&self) -> AuthState {
        if self.tx.borrow().is_resolved() {
            return self.current();
        }

        let restored = self.storage.as_ref().and_then(|storage| {
            match storage.load(SESSION_STORAGE_KEY) {
                Ok(Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                    Ok(identity) => Some(identity),
                    Err(e) => {
                        warn!(error = %e, "discarding unreadable session");
                        None
                    }
                },
                Ok(None) => None,
                Err(e) => {
                    warn!(error = %e, "failed to load session");
                    None
                }
            }
        });

        let state = restored.map_or(AuthState::SignedOut, AuthState::SignedIn);
        debug!(signed_in = state.identity().is_some(), "session resolved");
        self.tx.send_replace(state.clone());
        state
    }

    /// Record a successful sign-in.
    pub fn sign_in(&self, identity: Identity) {
        if let Some(storage) = &self.storage {
            let saved = serde_json::to_string(&identity)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    storage
                        .save(SESSION_STORAGE_KEY, &raw)
                        .map_err(|e| e.to_string())
                });
            if let Err(error) = saved {
                warn!(%error, "failed to persist session");
            }
        }
        self.tx.send_replace(AuthState::SignedIn(identity));
    }

    /// Record a sign-out.
    pub fn sign_out(&self) {
        if let Some(storage) = &self.storage
            && let Err(e) = storage.remove(SESSION_STORAGE_KEY)
        {
            warn!(error = %e, "failed to clear persisted session");
        }
        self.tx.send_replace(AuthState::SignedOut);
    }
}

/// Live view of the session state.
///
/// Dropping it, or calling [`Subscription::unsubscribe`], stops observing.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<AuthState>,
}

impl Subscription {
    /// The latest state, marking it seen.
    pub fn current(&mut self) -> AuthState {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next state change.
    ///
    /// Returns `None` once the session holder is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stop observing.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
