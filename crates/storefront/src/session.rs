//! Session store: who is logged in, and the "remembered user" snapshot.
//!
//! The current [`SessionState`] lives in a `tokio::sync::watch` channel so
//! that other parts of the storefront can react to login and logout.

use std::sync::Arc;

use bookstore_client::StoreBackend;
use bookstore_core::error::CoreError;
use bookstore_core::models::{LoginForm, RegistrationForm, User};
use bookstore_core::session::SessionState;
use tokio::sync::watch;

use crate::error::{StorefrontError, StorefrontResult};
use crate::storage::{Storage, REMEMBERED_USER_KEY};

/// Shown when a login fails without a backend message.
pub const LOGIN_FALLBACK: &str = "Error while logging";

/// Shown when a registration fails without a backend message.
pub const REGISTRATION_FALLBACK: &str = "Registration error!";

pub struct SessionStore {
    backend: Arc<dyn StoreBackend>,
    storage: Arc<dyn Storage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn StoreBackend>, storage: Arc<dyn Storage>) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            backend,
            storage,
            state,
        }
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every subsequent session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn require_user(&self, action: &str) -> Result<User, CoreError> {
        self.state.borrow().require_user(action).cloned()
    }

    pub fn require_admin(&self) -> Result<User, CoreError> {
        self.state.borrow().require_admin().cloned()
    }

    /// App-start restoration.
    ///
    /// A readable remembered-user snapshot authenticates immediately with
    /// no backend call; otherwise the backend session is checked.
    pub async fn restore(&self) -> SessionState {
        if let Some(user) = self.read_snapshot() {
            tracing::info!(user_id = user.user_id, "Restored remembered session");
            self.transition(SessionState::Authenticated(user));
            return self.current();
        }
        self.check_session().await
    }

    /// Ask the backend who the session cookie belongs to.
    ///
    /// Any failure (no session, network error) ends anonymous with the
    /// snapshot cleared.
    pub async fn check_session(&self) -> SessionState {
        match self.backend.check_auth().await {
            Ok(user) => {
                tracing::info!(user_id = user.user_id, "Backend session is active");
                self.write_snapshot(&user);
                self.transition(SessionState::Authenticated(user));
            }
            Err(e) => {
                tracing::debug!(error = %e, "No active backend session");
                self.clear_snapshot();
                self.transition(SessionState::Anonymous);
            }
        }
        self.current()
    }

    /// Log in. On failure the state is left exactly as it was.
    pub async fn login(&self, form: &LoginForm) -> StorefrontResult<User> {
        form.validate()?;

        let user = self.backend.login(form).await.map_err(|e| {
            tracing::warn!(email = %form.email, error = %e, "Login failed");
            CoreError::Unauthorized(
                e.backend_message().unwrap_or(LOGIN_FALLBACK).to_string(),
            )
        })?;

        tracing::info!(user_id = user.user_id, remember = form.remember_me, "Logged in");
        if form.remember_me {
            self.write_snapshot(&user);
        }
        self.transition(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Create an account. Registration never logs the new user in.
    pub async fn register(&self, form: &RegistrationForm) -> StorefrontResult<User> {
        form.validate()?;

        let user = self
            .backend
            .create_user(&form.to_new_user())
            .await
            .map_err(|e| {
                tracing::warn!(email = %form.email, error = %e, "Registration failed");
                CoreError::Validation(
                    e.backend_message()
                        .unwrap_or(REGISTRATION_FALLBACK)
                        .to_string(),
                )
            })?;

        tracing::info!(user_id = user.user_id, "Registered new user");
        Ok(user)
    }

    /// Log out. Always ends anonymous with the snapshot cleared, even if
    /// the backend call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            tracing::warn!(error = %e, "Backend logout failed; clearing local session anyway");
        }
        self.clear_snapshot();
        self.transition(SessionState::Anonymous);
        tracing::info!("Logged out");
    }

    // ---- private helpers ----

    fn transition(&self, next: SessionState) {
        self.state.send_replace(next);
    }

    fn read_snapshot(&self) -> Option<User> {
        let raw = match self.storage.get(REMEMBERED_USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read remembered user");
                return None;
            }
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt remembered user");
                self.clear_snapshot();
                None
            }
        }
    }

    fn write_snapshot(&self, user: &User) {
        let result = serde_json::to_string(user)
            .map_err(StorefrontError::from)
            .and_then(|json| self.storage.set(REMEMBERED_USER_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(user_id = user.user_id, error = %e, "Failed to persist remembered user");
        }
    }

    fn clear_snapshot(&self) {
        if let Err(e) = self.storage.remove(REMEMBERED_USER_KEY) {
            tracing::warn!(error = %e, "Failed to clear remembered user");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::test_support::{user, FakeBackend, PASSWORD};
    use assert_matches::assert_matches;

    fn store(backend: &Arc<FakeBackend>, storage: &Arc<MemoryStorage>) -> SessionStore {
        SessionStore::new(backend.clone(), storage.clone())
    }

    fn login_form(password: &str, remember_me: bool) -> LoginForm {
        LoginForm {
            email: "ada@example.com".into(),
            password: password.into(),
            remember_me,
        }
    }

    fn registration(password: &str, confirm: &str, email: &str) -> RegistrationForm {
        RegistrationForm {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: email.into(),
            phone: "555".into(),
            address: "Arlington".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    // -- login ----------------------------------------------------------

    #[tokio::test]
    async fn login_with_remember_persists_snapshot() {
        let backend = Arc::new(FakeBackend::with_users(vec![user(1, false)]));
        let storage = Arc::new(MemoryStorage::new());
        let sessions = store(&backend, &storage);

        let logged_in = sessions.login(&login_form(PASSWORD, true)).await.unwrap();
        assert_eq!(logged_in.user_id, 1);
        assert!(sessions.current().is_logged_in());

        let restarted = store(&backend, &storage);
        let restored = restarted.restore().await;
        assert_eq!(restored.user().map(|u| u.user_id), Some(1));
        assert_eq!(backend.calls("check_auth"), 0);
    }

    #[tokio::test]
    async fn login_without_remember_leaves_no_snapshot() {
        let backend = Arc::new(FakeBackend::with_users(vec![user(1, false)]));
        let storage = Arc::new(MemoryStorage::new());
        let sessions = store(&backend, &storage);

        sessions.login(&login_form(PASSWORD, false)).await.unwrap();
        assert!(sessions.current().is_logged_in());
        assert_eq!(storage.get(REMEMBERED_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn failed_login_keeps_state_and_reports_backend_message() {
        let backend = Arc::new(FakeBackend::with_users(vec![user(1, false)]));
        let storage = Arc::new(MemoryStorage::new());
        let sessions = store(&backend, &storage);

        let err = sessions.login(&login_form("nope", true)).await.unwrap_err();
        assert_matches!(err, StorefrontError::Core(CoreError::Unauthorized(ref m)) if m == "Wrong password");
        assert!(!sessions.current().is_logged_in());
        assert_eq!(storage.get(REMEMBERED_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn failed_login_without_message_uses_fallback() {
        let backend = Arc::new(FakeBackend::with_users(vec![user(1, false)]));
        backend.fail("login");
        let sessions = store(&backend, &Arc::new(MemoryStorage::new()));

        let err = sessions.login(&login_form(PASSWORD, false)).await.unwrap_err();
        assert_eq!(err.notice_text("unused"), LOGIN_FALLBACK);
    }

    #[tokio::test]
    async fn login_requires_both_fields_before_dispatch() {
        let backend = Arc::new(FakeBackend::default());
        let sessions = store(&backend, &Arc::new(MemoryStorage::new()));

        let err = sessions.login(&login_form("", false)).await.unwrap_err();
        assert_matches!(err, StorefrontError::Core(CoreError::Validation(_)));
        assert_eq!(backend.calls("login"), 0);
    }

    // -- logout ---------------------------------------------------------

    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        let backend = Arc::new(FakeBackend::with_users(vec![user(1, false)]));
        let storage = Arc::new(MemoryStorage::new());
        let sessions = store(&backend, &storage);
        sessions.login(&login_form(PASSWORD, true)).await.unwrap();

        backend.fail("logout");
        sessions.logout().await;

        assert_eq!(sessions.current(), SessionState::Anonymous);
        assert_eq!(storage.get(REMEMBERED_USER_KEY).unwrap(), None);
        assert_eq!(backend.calls("logout"), 1);
    }

    // -- restore / check ------------------------------------------------

    #[tokio::test]
    async fn restore_without_snapshot_checks_backend() {
        let backend = Arc::new(FakeBackend::with_users(vec![user(1, false)]));
        backend.set_session(Some(user(1, false)));
        let storage = Arc::new(MemoryStorage::new());
        let sessions = store(&backend, &storage);

        let state = sessions.restore().await;
        assert!(state.is_logged_in());
        assert_eq!(backend.calls("check_auth"), 1);
        assert!(storage.get(REMEMBERED_USER_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn check_session_failure_ends_anonymous() {
        let backend = Arc::new(FakeBackend::default());
        let storage = Arc::new(MemoryStorage::new());
        storage.set(REMEMBERED_USER_KEY, "stale").unwrap();
        let sessions = store(&backend, &storage);

        let state = sessions.check_session().await;
        assert_eq!(state, SessionState::Anonymous);
        assert_eq!(storage.get(REMEMBERED_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_discarded() {
        let backend = Arc::new(FakeBackend::default());
        let storage = Arc::new(MemoryStorage::new());
        storage.set(REMEMBERED_USER_KEY, "{not json").unwrap();
        let sessions = store(&backend, &storage);

        let state = sessions.restore().await;
        assert_eq!(state, SessionState::Anonymous);
        assert_eq!(backend.calls("check_auth"), 1);
        assert_eq!(storage.get(REMEMBERED_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let backend = Arc::new(FakeBackend::with_users(vec![user(1, true)]));
        let sessions = store(&backend, &Arc::new(MemoryStorage::new()));
        let mut rx = sessions.subscribe();

        sessions.login(&login_form(PASSWORD, false)).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_admin());
        assert_eq!(sessions.require_admin().unwrap().user_id, 1);
    }

    // -- register -------------------------------------------------------

    #[tokio::test]
    async fn register_does_not_log_in() {
        let backend = Arc::new(FakeBackend::default());
        let sessions = store(&backend, &Arc::new(MemoryStorage::new()));

        let created = sessions
            .register(&registration("pw", "pw", "grace@navy.mil"))
            .await
            .unwrap();
        assert_eq!(created.first_name, "Grace");
        assert!(!sessions.current().is_logged_in());
    }

    #[tokio::test]
    async fn register_validates_before_dispatch() {
        let backend = Arc::new(FakeBackend::default());
        let sessions = store(&backend, &Arc::new(MemoryStorage::new()));

        let err = sessions
            .register(&registration("pw", "other", "grace@navy.mil"))
            .await
            .unwrap_err();
        assert_eq!(err.notice_text(""), "Passwords aren't matching");

        let err = sessions
            .register(&registration("pw", "pw", "grace"))
            .await
            .unwrap_err();
        assert_eq!(err.notice_text(""), "Invalid email format");
        assert_eq!(backend.calls("create_user"), 0);
    }

    #[tokio::test]
    async fn register_failure_uses_fallback() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail("create_user");
        let sessions = store(&backend, &Arc::new(MemoryStorage::new()));

        let err = sessions
            .register(&registration("pw", "pw", "grace@navy.mil"))
            .await
            .unwrap_err();
        assert_eq!(err.notice_text(""), REGISTRATION_FALLBACK);
    }
}
