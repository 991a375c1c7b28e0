// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state: reactive signals for the Dioxus UI.

use dioxus::prelude::*;

use bizconnect_core::AppConfig;
use bizconnect_core::types::{Entity, User};
use bizconnect_data::{CancelToken, CollectionBinding, CollectionSnapshot, SessionState};

use crate::services::app_services::AppServices;

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Mirror of the session, kept current by the root component.
    pub session: SessionState,
    /// Application settings, edited on the settings page.
    pub config: AppConfig,
    /// One-line feedback shown under the nav bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(svc: &AppServices) -> Self {
        Self {
            session: svc.reader().state(),
            config: svc.config(),
            status_message: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Show `message` under the nav bar, replacing any earlier one.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Dismissed by the user or on navigation.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

/// Mirror a binding's snapshots into a signal for the life of the component.
pub fn use_snapshot<T: Entity>(binding: CollectionBinding<T>) -> Signal<CollectionSnapshot<T>> {
    let initial = binding.snapshot();
    let mut snapshot = use_signal(move || initial);
    use_future(move || {
        let mut rx = binding.subscribe();
        async move {
            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                snapshot.set(next);
            }
        }
    });
    snapshot
}

/// A cancellation scope tied to the calling component: cancelled on unmount
/// and whenever the session signs out.
pub fn use_view_scope() -> CancelToken {
    let svc = use_context::<AppServices>();
    let scope = use_hook(move || svc.view_scope());
    let on_drop = scope.clone();
    use_drop(move || on_drop.cancel());
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_can_be_replaced_and_cleared() {
        let svc = AppServices::fallback().unwrap();
        let mut state = AppState::new(&svc);
        assert!(state.status_message.is_none());

        state.set_status("Delete failed.");
        state.set_status("Create failed.");
        assert_eq!(state.status_message.as_deref(), Some("Create failed."));

        state.clear_status();
        assert!(state.status_message.is_none());
    }
}
