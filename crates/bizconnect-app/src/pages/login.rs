// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sign-in page.

use dioxus::prelude::*;

use bizconnect_core::error::BizError;
use bizconnect_data::SessionState;

use crate::Route;
use crate::pages::common::{CARD_STYLE, PRIMARY_BUTTON, error_note};
use crate::services::app_services::AppServices;
use crate::state::AppState;

const INPUT_STYLE: &str = "width: 100%; padding: 10px; border: 1px solid #cbd5e1; border-radius: 8px; box-sizing: border-box; margin-bottom: 12px;";

#[component]
pub fn Login() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<BizError>::None);
    let mut busy = use_signal(|| false);

    if let SessionState::SignedIn(ref user) = state.read().session {
        let name = user.greeting_name().to_string();
        return rsx! {
            div { style: "{CARD_STYLE} max-width: 420px; margin: 48px auto; text-align: center;",
                h2 { "Welcome back, {name}" }
                p { style: "color: #64748b;", "You are already signed in." }
                Link { to: Route::Dashboard {}, style: "{PRIMARY_BUTTON}", "Go to Dashboard" }
            }
        };
    }

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let svc = svc.clone();
        let address = email.read().clone();
        let secret = password.read().clone();
        busy.set(true);
        error.set(None);
        spawn(async move {
            match svc.sign_in(&address, &secret).await {
                Ok(user) => {
                    tracing::info!(user = %user.id, "signed in");
                    state.write().session = SessionState::SignedIn(user);
                    password.set(String::new());
                    navigator().push(Route::Dashboard {});
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sign-in rejected");
                    error.set(Some(e));
                }
            }
            busy.set(false);
        });
    };

    rsx! {
        div { style: "{CARD_STYLE} max-width: 420px; margin: 48px auto;",
            h2 { style: "margin-top: 0;", "Log In" }
            p { style: "color: #64748b;", "Sign in to manage your services and invoices." }

            form { onsubmit: on_submit,
                label { style: "display: block; font-weight: bold; margin-bottom: 6px;", "Email" }
                input {
                    r#type: "email",
                    placeholder: "you@company.com",
                    value: "{email}",
                    style: "{INPUT_STYLE}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { style: "display: block; font-weight: bold; margin-bottom: 6px;", "Password" }
                input {
                    r#type: "password",
                    value: "{password}",
                    style: "{INPUT_STYLE}",
                    oninput: move |evt| password.set(evt.value()),
                }
                if let Some(ref e) = *error.read() {
                    {error_note(e)}
                }
                button {
                    r#type: "submit",
                    style: "{PRIMARY_BUTTON} width: 100%; padding: 12px;",
                    disabled: busy(),
                    if busy() { "Signing in..." } else { "Log In" }
                }
            }
        }
    }
}
