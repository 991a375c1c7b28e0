// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dashboard page: the signed-in user's own listings, a create dialog,
// confirmed deletes, and listing counts.

use dioxus::prelude::*;

use bizconnect_core::catalog::service_stats;
use bizconnect_core::forms::{FormErrors, ServiceForm};
use bizconnect_core::types::{SERVICE_CATEGORIES, Service, User};
use bizconnect_data::{CancelToken, CollectionBinding, DeleteOutcome, SessionState, delete_with_confirmation};

use crate::Route;
use crate::pages::common::{
    CARD_STYLE, DANGER_BUTTON, OUTLINE_BUTTON, PRIMARY_BUTTON, SessionLoading, SkeletonCard, error_note,
    report, retry_note,
};
use crate::services::app_services::AppServices;
use crate::services::confirm::DialogConfirm;
use crate::state::{AppState, use_snapshot, use_view_scope};

const DELETE_PROMPT: &str = "Are you sure you want to delete this service?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Services,
    Analytics,
    Connections,
}

#[component]
pub fn Dashboard() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    use_effect(move || {
        if state.read().session == SessionState::SignedOut {
            navigator().replace(Route::Login {});
        }
    });

    let session = state.read().session.clone();
    match session {
        SessionState::Initializing => rsx! { SessionLoading {} },
        SessionState::SignedOut => rsx! {},
        SessionState::SignedIn(user) => match svc.bindings() {
            Ok(bindings) => rsx! { DashboardBody { user, services: bindings.services } },
            Err(e) => error_note(&e),
        },
    }
}

#[component]
fn DashboardBody(user: User, services: CollectionBinding<Service>) -> Element {
    let state = use_context::<Signal<AppState>>();
    let scope = use_view_scope();
    let snapshot = use_snapshot(services.clone());
    let mut tab = use_signal(|| Tab::Services);
    let mut show_create = use_signal(|| false);

    let binding = services.clone();
    let mount_scope = scope.clone();
    use_future(move || {
        let binding = binding.clone();
        let scope = mount_scope.clone();
        async move {
            if let Err(e) = binding.reload(&scope).await {
                report(state, "loading services", &e);
            }
        }
    });

    let greeting = user.greeting_name().to_string();
    let lock_all = state.read().config.lock_all_deletes;
    let snap = snapshot.read().clone();
    let stats = service_stats(snap.items());
    let failure = snap.last_error().map(|e| {
        let binding = services.clone();
        let scope = scope.clone();
        retry_note(e, move |_| {
            let binding = binding.clone();
            let scope = scope.clone();
            spawn(async move {
                if let Err(e) = binding.reload(&scope).await {
                    report(state, "loading services", &e);
                }
            });
        })
    });

    rsx! {
        div {
            h1 { "Welcome back, {greeting}" }
            p { style: "color: #64748b;", "Manage your services and grow your business network" }

            div { style: "display: grid; grid-template-columns: repeat(3, 1fr); gap: 4px; background: #f1f5f9; padding: 4px; border-radius: 8px; margin: 16px 0;",
                TabButton { label: "My Services", active: *tab.read() == Tab::Services, on_select: move |_| tab.set(Tab::Services) }
                TabButton { label: "Analytics", active: *tab.read() == Tab::Analytics, on_select: move |_| tab.set(Tab::Analytics) }
                TabButton { label: "Connections", active: *tab.read() == Tab::Connections, on_select: move |_| tab.set(Tab::Connections) }
            }

            {match *tab.read() {
                Tab::Services => rsx! {
                    div { style: "display: flex; justify-content: space-between; align-items: center;",
                        h2 { "Your Services" }
                        button {
                            style: "{PRIMARY_BUTTON}",
                            onclick: move |_| show_create.set(true),
                            "+ Add Service"
                        }
                    }
                    {failure}

                    if snap.is_loading() {
                        for i in 0..3 {
                            SkeletonCard { key: "{i}" }
                        }
                    } else if snap.is_empty_state() {
                        div { style: "{CARD_STYLE} text-align: center; padding: 48px;",
                            h3 { "No Services Yet" }
                            p { style: "color: #64748b;",
                                "Start by creating your first service to showcase your expertise"
                            }
                            button {
                                style: "{PRIMARY_BUTTON}",
                                onclick: move |_| show_create.set(true),
                                "Create Your First Service"
                            }
                        }
                    } else {
                        div { style: "display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 16px;",
                            for service in snap.items().iter() {
                                OwnedServiceCard {
                                    key: "{service.id}",
                                    service: service.clone(),
                                    binding: services.clone(),
                                    scope: scope.clone(),
                                    delete_disabled: snap.delete_locked(service.id, lock_all),
                                }
                            }
                        }
                    }
                },
                Tab::Analytics => rsx! {
                    div { style: "{CARD_STYLE}",
                        h3 { "Service Analytics" }
                        p { style: "color: #64748b;", "Track your service performance and engagement" }
                        div { style: "display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px;",
                            Stat { label: "Total", value: stats.total }
                            Stat { label: "Active", value: stats.active }
                            Stat { label: "Inactive", value: stats.inactive }
                            Stat { label: "Categories", value: stats.categories }
                        }
                    }
                },
                Tab::Connections => rsx! {
                    div { style: "{CARD_STYLE}",
                        h3 { "Business Connections" }
                        p { style: "color: #64748b;", "Manage your professional network" }
                        p { style: "color: #94a3b8;", "Connections coming soon..." }
                    }
                },
            }}

            if *show_create.read() {
                CreateServiceDialog {
                    binding: services.clone(),
                    scope: scope.clone(),
                    on_close: move |_| show_create.set(false),
                }
            }
        }
    }
}

#[component]
fn TabButton(label: &'static str, active: bool, on_select: EventHandler<()>) -> Element {
    let bg = if active { "white" } else { "transparent" };
    rsx! {
        button {
            style: "padding: 8px; border: none; border-radius: 6px; background: {bg}; font-size: 14px; cursor: pointer;",
            onclick: move |_| on_select.call(()),
            "{label}"
        }
    }
}

#[component]
fn Stat(label: &'static str, value: usize) -> Element {
    rsx! {
        div { style: "padding: 12px; border-radius: 8px; background: #f8fafc; text-align: center;",
            div { style: "font-size: 28px; font-weight: bold;", "{value}" }
            div { style: "color: #64748b; font-size: 13px;", "{label}" }
        }
    }
}

#[component]
fn OwnedServiceCard(
    service: Service,
    binding: CollectionBinding<Service>,
    scope: CancelToken,
    delete_disabled: bool,
) -> Element {
    let state = use_context::<Signal<AppState>>();
    let id = service.id;
    let (badge_bg, badge_fg, badge_text) = if service.is_active {
        ("#dcfce7", "#166534", "Active")
    } else {
        ("#f1f5f9", "#475569", "Inactive")
    };

    rsx! {
        div { style: "{CARD_STYLE} margin: 0;",
            div { style: "display: flex; justify-content: space-between; align-items: flex-start;",
                div {
                    strong { style: "font-size: 17px;", "{service.title}" }
                    p { style: "margin: 2px 0; color: #64748b; font-size: 13px;", "{service.category}" }
                }
                span { style: "font-size: 12px; padding: 2px 8px; border-radius: 4px; background: {badge_bg}; color: {badge_fg};",
                    "{badge_text}"
                }
            }
            p { style: "color: #475569; font-size: 14px;", "{service.description}" }
            div { style: "display: flex; gap: 8px;",
                button {
                    style: "{OUTLINE_BUTTON}",
                    onclick: move |_| {
                        navigator().push(Route::ServiceDetail { id: id.to_string() });
                    },
                    "View"
                }
                // Editing has no backing operation yet.
                button {
                    style: "{OUTLINE_BUTTON} opacity: 0.5;",
                    disabled: true,
                    title: "Editing coming soon",
                    "Edit"
                }
                button {
                    style: "{DANGER_BUTTON}",
                    disabled: delete_disabled,
                    onclick: move |_| {
                        let binding = binding.clone();
                        let scope = scope.clone();
                        spawn(async move {
                            let outcome =
                                delete_with_confirmation(&binding, id, DELETE_PROMPT, &DialogConfirm, &scope)
                                    .await;
                            if let DeleteOutcome::Failed(e) = outcome {
                                report(state, "deleting service", &e);
                            }
                        });
                    },
                    if delete_disabled { "Deleting..." } else { "Delete" }
                }
            }
        }
    }
}

#[component]
fn CreateServiceDialog(
    binding: CollectionBinding<Service>,
    scope: CancelToken,
    on_close: EventHandler<()>,
) -> Element {
    let state = use_context::<Signal<AppState>>();
    let mut form = use_signal(ServiceForm::default);
    let mut errors = use_signal(FormErrors::default);
    let mut submitting = use_signal(|| false);
    let snapshot = use_snapshot(binding.clone());

    let creating = *submitting.read() || snapshot.read().is_creating();
    let field_error = move |field: &str| errors.read().get(field).map(str::to_string);
    let submit_binding = binding.clone();
    let submit_scope = scope.clone();

    rsx! {
        div { style: "position: fixed; inset: 0; background: rgba(15, 23, 42, 0.4); display: flex; align-items: center; justify-content: center;",
            form {
                style: "width: 480px; max-width: 90vw; padding: 24px; border-radius: 12px; background: white;",
                onsubmit: move |evt| {
                    evt.prevent_default();
                    let draft = match form.read().validate() {
                        Ok(draft) => draft,
                        Err(e) => {
                            errors.set(e);
                            return;
                        }
                    };
                    errors.set(FormErrors::default());
                    submitting.set(true);
                    let binding = submit_binding.clone();
                    let scope = submit_scope.clone();
                    spawn(async move {
                        match binding.create(draft, &scope).await {
                            Ok(service) => {
                                tracing::info!(service_id = %service.id, "service created");
                                on_close.call(());
                            }
                            Err(e) => report(state, "creating service", &e),
                        }
                        submitting.set(false);
                    });
                },

                h2 { style: "margin-top: 0;", "Create New Service" }

                TextField {
                    label: "Title",
                    value: form.read().title.clone(),
                    error: field_error("title"),
                    on_input: move |v: String| form.write().title = v,
                }
                div { style: "margin-bottom: 12px;",
                    label { style: "display: block; font-weight: bold; margin-bottom: 4px;", "Category" }
                    select {
                        style: "width: 100%; padding: 8px; border: 1px solid #cbd5e1; border-radius: 6px;",
                        value: "{form.read().category}",
                        onchange: move |evt| form.write().category = evt.value(),
                        option { value: "", "Select a category" }
                        for cat in SERVICE_CATEGORIES.iter().copied() {
                            option { key: "{cat}", value: "{cat}", "{cat}" }
                        }
                    }
                    if let Some(msg) = field_error("category") {
                        p { style: "color: #dc2626; font-size: 13px; margin: 4px 0;", "{msg}" }
                    }
                }
                div { style: "margin-bottom: 12px;",
                    label { style: "display: block; font-weight: bold; margin-bottom: 4px;", "Description" }
                    textarea {
                        style: "width: 100%; padding: 8px; border: 1px solid #cbd5e1; border-radius: 6px; box-sizing: border-box;",
                        rows: "4",
                        value: "{form.read().description}",
                        oninput: move |evt| form.write().description = evt.value(),
                    }
                    if let Some(msg) = field_error("description") {
                        p { style: "color: #dc2626; font-size: 13px; margin: 4px 0;", "{msg}" }
                    }
                }
                TextField {
                    label: "Price range (optional)",
                    value: form.read().price_range.clone(),
                    error: None,
                    on_input: move |v: String| form.write().price_range = v,
                }
                TextField {
                    label: "Location (optional)",
                    value: form.read().location.clone(),
                    error: None,
                    on_input: move |v: String| form.write().location = v,
                }

                div { style: "display: flex; gap: 8px; justify-content: flex-end; margin-top: 16px;",
                    button {
                        r#type: "button",
                        style: "{OUTLINE_BUTTON}",
                        onclick: move |_| on_close.call(()),
                        "Cancel"
                    }
                    button {
                        r#type: "submit",
                        style: "{PRIMARY_BUTTON}",
                        disabled: creating,
                        if creating { "Creating..." } else { "Create Service" }
                    }
                }
            }
        }
    }
}

#[component]
fn TextField(
    label: &'static str,
    value: String,
    error: Option<String>,
    on_input: EventHandler<String>,
) -> Element {
    rsx! {
        div { style: "margin-bottom: 12px;",
            label { style: "display: block; font-weight: bold; margin-bottom: 4px;", "{label}" }
            input {
                r#type: "text",
                value: "{value}",
                style: "width: 100%; padding: 8px; border: 1px solid #cbd5e1; border-radius: 6px; box-sizing: border-box;",
                oninput: move |evt| on_input.call(evt.value()),
            }
            if let Some(msg) = error {
                p { style: "color: #dc2626; font-size: 13px; margin: 4px 0;", "{msg}" }
            }
        }
    }
}
