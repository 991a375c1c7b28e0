// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page: persistent app configuration and the signed-in profile.

use dioxus::prelude::*;

use bizconnect_core::config::SyncPolicy;
use bizconnect_core::types::{Profile, User};
use bizconnect_data::SessionState;

use crate::pages::common::{PRIMARY_BUTTON, report};
use crate::services::app_services::AppServices;
use crate::state::AppState;

const ROW_STYLE: &str = "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;";
const FIELD_STYLE: &str = "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;";

#[component]
pub fn Settings() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut save_msg = use_signal(|| Option::<String>::None);

    let user = state.read().user().cloned();
    let version = env!("CARGO_PKG_VERSION");

    rsx! {
        div {
            h1 { "Settings" }

            if let Some(user) = user {
                ProfileSection { user }
            }

            section { style: "margin: 16px 0;",
                h3 { "Data" }
                div { style: "{ROW_STYLE}",
                    span { "After creating or deleting" }
                    select {
                        style: "{FIELD_STYLE}",
                        value: sync_policy_value(state.read().config.sync_policy),
                        onchange: move |evt| {
                            if let Some(policy) = sync_policy_from_value(&evt.value()) {
                                state.write().config.sync_policy = policy;
                            }
                        },
                        option { value: "reload", "Reload the list" }
                        option { value: "local", "Update the list in place" }
                    }
                }
                SettingRow {
                    label: "Lock all delete buttons while a delete runs",
                    checked: state.read().config.lock_all_deletes,
                    on_toggle: move |v: bool| { state.write().config.lock_all_deletes = v; },
                }
                SettingRow {
                    label: "Add demo listings to an empty marketplace",
                    checked: state.read().config.seed_demo_data,
                    on_toggle: move |v: bool| { state.write().config.seed_demo_data = v; },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Display" }
                div { style: "{ROW_STYLE}",
                    span { "Invoice currency" }
                    input {
                        style: "{FIELD_STYLE} width: 80px; text-transform: uppercase;",
                        maxlength: "3",
                        value: "{state.read().config.currency_code}",
                        onchange: move |evt| {
                            let code = evt.value().trim().to_ascii_uppercase();
                            if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
                                state.write().config.currency_code = code;
                            }
                        },
                    }
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Diagnostics" }
                div { style: "{ROW_STYLE}",
                    span { "Log filter (applies on restart)" }
                    input {
                        style: "{FIELD_STYLE} width: 200px;",
                        value: "{state.read().config.log_filter}",
                        onchange: move |evt| {
                            let filter = evt.value().trim().to_string();
                            if !filter.is_empty() {
                                state.write().config.log_filter = filter;
                            }
                        },
                    }
                }
            }

            button {
                style: "{PRIMARY_BUTTON} width: 100%; padding: 12px; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let config = state.read().config.clone();
                        match svc.save_config(&config) {
                            Ok(()) => {
                                tracing::info!("settings saved");
                                save_msg.set(Some("Settings saved.".into()));
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "failed to save settings");
                                save_msg.set(Some(format!("Save failed: {e}")));
                            }
                        }
                    }
                },
                "Save Settings"
            }
            if let Some(ref msg) = *save_msg.read() {
                p { style: "color: #16a34a; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }

            section { style: "margin: 24px 0;",
                h3 { "About" }
                p { style: "color: #666; font-size: 14px;",
                    "BizConnect v{version}"
                    br {}
                    "Business services marketplace and invoicing"
                    br {}
                    "PMPL-1.0-or-later"
                }
            }
        }
    }
}

#[component]
fn ProfileSection(user: User) -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let profile = user.profile.clone().unwrap_or_default();
    let mut display_name = use_signal(move || profile.display_name.unwrap_or_default());
    let profile = user.profile.clone().unwrap_or_default();
    let mut company_name = use_signal(move || profile.company_name.unwrap_or_default());
    let mut saved = use_signal(|| false);

    rsx! {
        section { style: "margin: 16px 0;",
            h3 { "Profile" }
            p { style: "color: #64748b; font-size: 14px;", "Signed in as {user.email}" }
            div { style: "{ROW_STYLE}",
                span { "Display name" }
                input {
                    style: "{FIELD_STYLE} width: 220px;",
                    value: "{display_name}",
                    oninput: move |evt| {
                        display_name.set(evt.value());
                        saved.set(false);
                    },
                }
            }
            div { style: "{ROW_STYLE}",
                span { "Company" }
                input {
                    style: "{FIELD_STYLE} width: 220px;",
                    value: "{company_name}",
                    oninput: move |evt| {
                        company_name.set(evt.value());
                        saved.set(false);
                    },
                }
            }
            div { style: "display: flex; align-items: center; gap: 12px; margin-top: 12px;",
                button {
                    style: "{PRIMARY_BUTTON}",
                    onclick: move |_| {
                        let svc = svc.clone();
                        let profile = Profile {
                            display_name: Some(display_name.read().clone()),
                            company_name: Some(company_name.read().clone()),
                        };
                        spawn(async move {
                            match svc.update_profile(profile).await {
                                Ok(user) => {
                                    tracing::info!(user = %user.id, "profile updated");
                                    state.write().session = SessionState::SignedIn(user);
                                    saved.set(true);
                                }
                                Err(e) => report(state, "updating profile", &e),
                            }
                        });
                    },
                    "Save Profile"
                }
                if saved() {
                    span { style: "color: #16a34a; font-size: 14px;", "Profile saved." }
                }
            }
        }
    }
}

#[component]
fn SettingRow(label: &'static str, checked: bool, on_toggle: EventHandler<bool>) -> Element {
    rsx! {
        div { style: "{ROW_STYLE}",
            span { "{label}" }
            input {
                r#type: "checkbox",
                checked: checked,
                onchange: move |evt| {
                    on_toggle.call(evt.checked());
                },
            }
        }
    }
}

fn sync_policy_value(policy: SyncPolicy) -> &'static str {
    match policy {
        SyncPolicy::ReloadAfterMutation => "reload",
        SyncPolicy::ApplyLocally => "local",
    }
}

fn sync_policy_from_value(value: &str) -> Option<SyncPolicy> {
    match value {
        "reload" => Some(SyncPolicy::ReloadAfterMutation),
        "local" => Some(SyncPolicy::ApplyLocally),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_policy_select_values_round_trip() {
        for policy in [SyncPolicy::ReloadAfterMutation, SyncPolicy::ApplyLocally] {
            assert_eq!(sync_policy_from_value(sync_policy_value(policy)), Some(policy));
        }
        assert_eq!(sync_policy_from_value("bogus"), None);
    }
}
