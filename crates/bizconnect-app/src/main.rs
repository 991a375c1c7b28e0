// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// BizConnect: business-services marketplace
//
// Entry point. Initialises logging, backend services, app state, and launches
// the Dioxus UI.

mod pages;
mod services;
mod state;

use dioxus::prelude::*;

use bizconnect_core::AppConfig;

use pages::browse::Browse;
use pages::create_invoice::CreateInvoice;
use pages::dashboard::Dashboard;
use pages::invoices::Invoices;
use pages::login::Login;
use pages::service_detail::ServiceDetail;
use pages::settings::Settings;

use services::app_services::{AppServices, load_config};
use services::data_dir;
use state::AppState;

fn main() {
    // Logging comes up before the services, so read the filter directly.
    let default_filter = data_dir::data_dir()
        .ok()
        .and_then(|dir| load_config(&dir))
        .unwrap_or_default()
        .log_filter;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&default_filter))
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(AppConfig::default().log_filter)
                }),
        )
        .init();

    tracing::info!("BizConnect starting");

    dioxus::launch(app);
}

/// Top-level route enum.
#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(NavLayout)]
    #[route("/")]
    Browse {},
    #[route("/dashboard")]
    Dashboard {},
    #[route("/services/:id")]
    ServiceDetail { id: String },
    #[route("/invoices")]
    Invoices {},
    #[route("/create-invoice")]
    CreateInvoice {},
    #[route("/login")]
    Login {},
    #[route("/settings")]
    Settings {},
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(|| match AppServices::init() {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!(error = %e, "persistent storage failed, using in-memory fallback");
            match AppServices::fallback() {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::error!(error = %e, "in-memory fallback failed");
                    None
                }
            }
        }
    });

    match svc {
        Some(svc) => rsx! { Shell { svc } },
        None => rsx! {
            div { style: "padding: 48px; font-family: system-ui, sans-serif; text-align: center;",
                h1 { "BizConnect could not start" }
                p { "Storage could not be opened. Check the log output for details." }
            }
        },
    }
}

/// Provides services and state to every page and keeps the session mirror
/// current.
#[component]
fn Shell(svc: AppServices) -> Element {
    use_context_provider(|| svc.clone());
    let mut state = use_context_provider(|| Signal::new(AppState::new(&svc)));

    use_future(move || {
        let svc = svc.clone();
        async move {
            let mut reader = svc.reader();
            let restored = svc.session().init().await;
            state.write().session = restored;
            while let Some(next) = reader.changed().await {
                tracing::debug!(?next, "session changed");
                state.write().session = next;
            }
        }
    });

    rsx! {
        Router::<Route> {}
    }
}

/// Top navigation bar wrapping all pages.
#[component]
fn NavLayout() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let signed_in = state.read().user().cloned();

    // A message belongs to the page it was raised on.
    let route = use_route::<Route>();
    use_effect(use_reactive!(|route| {
        tracing::debug!(?route, "navigated");
        state.write().clear_status();
    }));

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; min-height: 100vh; font-family: system-ui, -apple-system, sans-serif; background: #f8fafc;",

            header {
                style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 24px; border-bottom: 1px solid #e2e8f0; background: white;",
                Link { to: Route::Browse {},
                    style: "font-size: 20px; font-weight: bold; color: #1d4ed8; text-decoration: none;",
                    "BizConnect"
                }
                nav { style: "display: flex; gap: 16px; align-items: center;",
                    NavLink { to: Route::Browse {}, label: "Browse" }
                    NavLink { to: Route::Dashboard {}, label: "Dashboard" }
                    NavLink { to: Route::Invoices {}, label: "Invoices" }
                    NavLink { to: Route::Settings {}, label: "Settings" }
                    {match signed_in {
                        Some(user) => rsx! {
                            span { style: "color: #64748b; font-size: 14px;", "{user.email}" }
                            button {
                                style: "padding: 6px 12px; border-radius: 6px; border: 1px solid #cbd5e1; background: white; font-size: 13px;",
                                onclick: move |_| {
                                    let svc = svc.clone();
                                    spawn(async move {
                                        if let Err(e) = svc.sign_out().await {
                                            tracing::error!(error = %e, "sign-out failed");
                                        }
                                        navigator().push(Route::Browse {});
                                    });
                                },
                                "Sign Out"
                            }
                        },
                        None => rsx! {
                            NavLink { to: Route::Login {}, label: "Sign In" }
                        },
                    }}
                }
            }

            if let Some(ref msg) = state.read().status_message {
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 8px 24px; background: #eff6ff; color: #1e40af; font-size: 14px;",
                    span { "{msg}" }
                    button {
                        style: "border: none; background: transparent; color: #1e40af; font-size: 16px; cursor: pointer;",
                        title: "Dismiss",
                        onclick: move |_| state.write().clear_status(),
                        "\u{2715}"
                    }
                }
            }

            main { class: "page-content",
                style: "flex: 1; padding: 24px; max-width: 1100px; width: 100%; margin: 0 auto; box-sizing: border-box;",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn NavLink(to: Route, label: &'static str) -> Element {
    rsx! {
        Link { to: to,
            style: "text-decoration: none; color: #334155; font-size: 14px;",
            "{label}"
        }
    }
}
