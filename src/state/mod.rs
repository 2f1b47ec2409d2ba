//! Shared application state handed to every request handler.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{auth::IdentityVerifier, dao::game_store::GameStore, error::ServiceError};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing the installed storage backend and the
/// identity client.
pub struct AppState {
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    degraded: watch::Sender<bool>,
    identity: IdentityVerifier,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    ///
    /// The application starts in degraded mode until the supervisor installs
    /// a storage backend.
    pub fn new(identity: IdentityVerifier) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            game_store: RwLock::new(None),
            degraded: degraded_tx,
            identity,
        })
    }

    /// Handle to the identity client resolving bearer credentials.
    pub fn identity(&self) -> &IdentityVerifier {
        &self.identity
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the installed game store or fail with a degraded-mode error.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub(crate) async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        let _ = self.degraded.send(value);
    }
}
