// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Authentication session.
//
// The session is the single writer of "who is signed in". Views get a
// `SessionReader`, which can observe the current user but never change it.
// Each sign-in opens a fresh cancellation scope; signing out cancels it, so
// every request started on behalf of the previous user stops committing.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use bizconnect_core::error::{BizError, Result};
use bizconnect_core::types::{Profile, User};

use crate::cancel::CancelToken;
use crate::traits::AuthProvider;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Restoring a remembered user; nothing is known yet.
    Initializing,
    SignedOut,
    SignedIn(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self, Self::Initializing)
    }
}

/// Owner of the signed-in user.
pub struct Session {
    auth: Arc<dyn AuthProvider>,
    state: watch::Sender<SessionState>,
    scope: Mutex<CancelToken>,
}

impl Session {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Initializing);
        Self {
            auth,
            state,
            scope: Mutex::new(CancelToken::new()),
        }
    }

    /// Restore the remembered user. A restore failure leaves the session
    /// signed out rather than stuck initializing.
    #[instrument(skip(self))]
    pub async fn init(&self) -> SessionState {
        let next = match self.auth.restore().await {
            Ok(Some(user)) => {
                info!(email = %user.email, "session restored");
                SessionState::SignedIn(user)
            }
            Ok(None) => SessionState::SignedOut,
            Err(e) => {
                warn!(error = %e, "session restore failed");
                SessionState::SignedOut
            }
        };
        self.state.send_replace(next.clone());
        next
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let user = self.auth.sign_in(email, password).await?;
        self.rotate_scope();
        self.state.send_replace(SessionState::SignedIn(user.clone()));
        info!(email = %user.email, "signed in");
        Ok(user)
    }

    /// Sign out and cancel everything started under the old user.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        self.rotate_scope();
        self.state.send_replace(SessionState::SignedOut);
        self.auth.sign_out().await?;
        info!("signed out");
        Ok(())
    }

    #[instrument(skip(self, profile))]
    pub async fn update_profile(&self, profile: Profile) -> Result<User> {
        let current = self.reader().require_user()?;
        let updated = self.auth.update_profile(current.id, profile).await?;
        self.state.send_modify(|state| {
            if let SessionState::SignedIn(user) = state {
                if user.id == updated.id {
                    *user = updated.clone();
                }
            }
        });
        Ok(updated)
    }

    /// Read-only handle for views.
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            state: self.state.subscribe(),
        }
    }

    /// Cancellation scope for requests made on behalf of the current user.
    /// Views take a `child()` of this and cancel it when they unmount.
    pub fn scope(&self) -> CancelToken {
        self.scope
            .lock()
            .map(|scope| scope.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn rotate_scope(&self) {
        let mut scope = self
            .scope
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        scope.cancel();
        *scope = CancelToken::new();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Observer of the session. Cannot sign in, out, or edit the user.
#[derive(Debug, Clone)]
pub struct SessionReader {
    state: watch::Receiver<SessionState>,
}

impl SessionReader {
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// The signed-in user, or `Unauthenticated`.
    pub fn require_user(&self) -> Result<User> {
        self.current_user().ok_or(BizError::Unauthenticated)
    }

    /// Wait for the next state change. Returns `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bizconnect_core::types::UserId;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeAuth {
        remembered: StdMutex<Option<User>>,
        fail_restore: bool,
    }

    #[async_trait]
    impl AuthProvider for FakeAuth {
        async fn restore(&self) -> Result<Option<User>> {
            if self.fail_restore {
                return Err(BizError::Database("unreadable".into()));
            }
            Ok(self.remembered.lock().unwrap().clone())
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
            if password.is_empty() {
                return Err(BizError::SignIn("password required".into()));
            }
            let user = User {
                id: UserId::new(),
                email: email.into(),
                profile: None,
            };
            *self.remembered.lock().unwrap() = Some(user.clone());
            Ok(user)
        }

        async fn sign_out(&self) -> Result<()> {
            *self.remembered.lock().unwrap() = None;
            Ok(())
        }

        async fn update_profile(&self, user: UserId, profile: Profile) -> Result<User> {
            let mut guard = self.remembered.lock().unwrap();
            let current = guard.as_mut().filter(|u| u.id == user).ok_or(BizError::Unauthenticated)?;
            current.profile = Some(profile);
            Ok(current.clone())
        }
    }

    #[tokio::test]
    async fn starts_initializing_then_settles() {
        let session = Session::new(Arc::new(FakeAuth::default()));
        let reader = session.reader();
        assert!(reader.state().is_initializing());

        assert_eq!(session.init().await, SessionState::SignedOut);
        assert_eq!(reader.state(), SessionState::SignedOut);
        assert!(matches!(reader.require_user(), Err(BizError::Unauthenticated)));
    }

    #[tokio::test]
    async fn failed_restore_signs_out() {
        let auth = FakeAuth {
            fail_restore: true,
            ..Default::default()
        };
        let session = Session::new(Arc::new(auth));
        assert_eq!(session.init().await, SessionState::SignedOut);
    }

    #[tokio::test]
    async fn sign_in_publishes_user_to_readers() {
        let session = Session::new(Arc::new(FakeAuth::default()));
        session.init().await;
        let mut reader = session.reader();

        let user = session.sign_in("ada@example.com", "pw").await.unwrap();
        assert_eq!(reader.changed().await, Some(SessionState::SignedIn(user.clone())));
        assert_eq!(reader.require_user().unwrap().id, user.id);
    }

    #[tokio::test]
    async fn rejected_sign_in_keeps_state() {
        let session = Session::new(Arc::new(FakeAuth::default()));
        session.init().await;
        let err = session.sign_in("ada@example.com", "").await.unwrap_err();
        assert!(matches!(err, BizError::SignIn(_)));
        assert_eq!(session.reader().state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn sign_out_cancels_previous_scope() {
        let session = Session::new(Arc::new(FakeAuth::default()));
        session.sign_in("ada@example.com", "pw").await.unwrap();
        let view = session.scope().child();

        session.sign_out().await.unwrap();
        assert!(view.is_cancelled());
        assert!(!session.scope().is_cancelled());
        assert_eq!(session.reader().current_user(), None);
    }

    #[tokio::test]
    async fn profile_update_reaches_readers() {
        let session = Session::new(Arc::new(FakeAuth::default()));
        session.sign_in("ada@example.com", "pw").await.unwrap();
        let reader = session.reader();

        session
            .update_profile(Profile {
                display_name: Some("Ada".into()),
                company_name: Some("Analytical Ltd".into()),
            })
            .await
            .unwrap();
        assert_eq!(reader.require_user().unwrap().greeting_name(), "Ada");
    }

    #[tokio::test]
    async fn restore_remembers_previous_user() {
        let auth = Arc::new(FakeAuth::default());
        let first = Session::new(auth.clone());
        let user = first.sign_in("ada@example.com", "pw").await.unwrap();

        let second = Session::new(auth);
        assert_eq!(second.init().await, SessionState::SignedIn(user));
    }
}
